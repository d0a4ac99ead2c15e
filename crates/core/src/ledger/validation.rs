//! Business rule validation for balance mutations.

use rust_decimal::Decimal;

use super::error::LedgerError;

/// Computes the net change a mutation applies to the wallet balance.
///
/// Creating a transaction is the `previous_amount == 0` case; updating
/// an existing transaction adjusts by the difference only.
#[must_use]
pub fn balance_delta(previous_amount: Decimal, new_amount: Decimal) -> Decimal {
    new_amount - previous_amount
}

/// Validates a balance mutation and returns the delta to apply.
///
/// `balance` must be the wallet balance read under the row lock, so no
/// concurrent mutation can interleave between this check and the write.
///
/// # Errors
///
/// Returns `LedgerError::ZeroAmount` if the resulting amount is zero, or
/// `LedgerError::InsufficientBalance` if applying the delta would make
/// the balance negative.
pub fn validate_mutation(
    balance: Decimal,
    previous_amount: Decimal,
    new_amount: Decimal,
) -> Result<Decimal, LedgerError> {
    if new_amount.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }

    let change = balance_delta(previous_amount, new_amount);

    if balance + change < Decimal::ZERO {
        return Err(LedgerError::InsufficientBalance { balance, change });
    }

    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_credit_accepted() {
        assert_eq!(validate_mutation(dec!(0), dec!(0), dec!(100)), Ok(dec!(100)));
    }

    #[test]
    fn test_create_debit_within_balance_accepted() {
        assert_eq!(
            validate_mutation(dec!(100), dec!(0), dec!(-40)),
            Ok(dec!(-40))
        );
    }

    #[test]
    fn test_debit_to_exactly_zero_accepted() {
        assert_eq!(
            validate_mutation(dec!(100), dec!(0), dec!(-100)),
            Ok(dec!(-100))
        );
    }

    #[test]
    fn test_zero_amount_rejected() {
        assert_eq!(
            validate_mutation(dec!(50), dec!(0), dec!(0)),
            Err(LedgerError::ZeroAmount)
        );
        // Updating an existing transaction to zero is equally invalid.
        assert_eq!(
            validate_mutation(dec!(50), dec!(50), dec!(0)),
            Err(LedgerError::ZeroAmount)
        );
    }

    #[test]
    fn test_overdraft_rejected() {
        assert_eq!(
            validate_mutation(dec!(50), dec!(0), dec!(-60)),
            Err(LedgerError::InsufficientBalance {
                balance: dec!(50),
                change: dec!(-60),
            })
        );
    }

    #[test]
    fn test_update_applies_delta_not_raw_amount() {
        // Wallet holds 100 from a single transaction of 100; bumping the
        // transaction to 150 must only add the 50 difference.
        assert_eq!(
            validate_mutation(dec!(100), dec!(100), dec!(150)),
            Ok(dec!(50))
        );
    }

    #[test]
    fn test_update_shrinking_sole_funding_transaction_rejected() {
        // Balance is 100, entirely from this transaction; flipping it to
        // -10 would require 110 the wallet does not have.
        assert_eq!(
            validate_mutation(dec!(100), dec!(100), dec!(-10)),
            Err(LedgerError::InsufficientBalance {
                balance: dec!(100),
                change: dec!(-110),
            })
        );
    }

    #[test]
    fn test_fractional_amounts_at_full_scale() {
        let tiny = dec!(0.000000000000000001);
        assert_eq!(validate_mutation(dec!(0), dec!(0), tiny), Ok(tiny));
        assert_eq!(
            validate_mutation(dec!(0), dec!(0), -tiny),
            Err(LedgerError::InsufficientBalance {
                balance: dec!(0),
                change: -tiny,
            })
        );
    }
}

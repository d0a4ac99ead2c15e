//! Property-based tests for balance mutation rules.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::validation::{balance_delta, validate_mutation};

/// Strategy to generate a non-negative wallet balance.
fn balance_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|units| Decimal::new(units, 6))
}

/// Strategy to generate a nonzero signed amount.
fn nonzero_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64, any::<bool>()).prop_map(|(units, negative)| {
        let amount = Decimal::new(units, 6);
        if negative { -amount } else { amount }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// An accepted mutation never drives the balance negative.
    #[test]
    fn prop_accepted_mutation_keeps_balance_non_negative(
        balance in balance_strategy(),
        previous in prop_oneof![Just(Decimal::ZERO), nonzero_amount()],
        new_amount in nonzero_amount(),
    ) {
        if let Ok(change) = validate_mutation(balance, previous, new_amount) {
            prop_assert!(
                balance + change >= Decimal::ZERO,
                "accepted mutation made balance negative: {} + {}",
                balance,
                change
            );
        }
    }

    /// A zero new amount is always rejected, whatever the balance.
    #[test]
    fn prop_zero_amount_always_rejected(
        balance in balance_strategy(),
        previous in prop_oneof![Just(Decimal::ZERO), nonzero_amount()],
    ) {
        let result = validate_mutation(balance, previous, Decimal::ZERO);
        prop_assert_eq!(result, Err(LedgerError::ZeroAmount));
    }

    /// A rejected mutation reports the exact balance and change it saw,
    /// and applying that change really would overdraw the wallet.
    #[test]
    fn prop_insufficient_balance_is_accurate(
        balance in balance_strategy(),
        previous in prop_oneof![Just(Decimal::ZERO), nonzero_amount()],
        new_amount in nonzero_amount(),
    ) {
        if let Err(LedgerError::InsufficientBalance { balance: b, change }) =
            validate_mutation(balance, previous, new_amount)
        {
            prop_assert_eq!(b, balance);
            prop_assert_eq!(change, balance_delta(previous, new_amount));
            prop_assert!(balance + change < Decimal::ZERO);
        }
    }

    /// Creating a positive (credit) transaction always succeeds and the
    /// delta equals the raw amount.
    #[test]
    fn prop_credit_creation_always_accepted(
        balance in balance_strategy(),
        units in 1i64..1_000_000_000i64,
    ) {
        let amount = Decimal::new(units, 6);
        prop_assert_eq!(validate_mutation(balance, Decimal::ZERO, amount), Ok(amount));
    }

    /// Update semantics: the delta is the difference, so re-validating a
    /// transaction against its own amount is a no-op change.
    #[test]
    fn prop_update_to_same_amount_is_noop(
        balance in balance_strategy(),
        amount in nonzero_amount(),
    ) {
        prop_assert_eq!(
            validate_mutation(balance, amount, amount),
            Ok(Decimal::ZERO)
        );
    }

    /// A sequence of accepted creations applied in order keeps the
    /// balance equal to the running sum of amounts and never negative.
    #[test]
    fn prop_sequential_creations_preserve_invariant(
        amounts in prop::collection::vec(nonzero_amount(), 0..20),
    ) {
        let mut balance = Decimal::ZERO;
        let mut applied_sum = Decimal::ZERO;

        for amount in amounts {
            if let Ok(change) = validate_mutation(balance, Decimal::ZERO, amount) {
                balance += change;
                applied_sum += amount;
            }
            prop_assert!(balance >= Decimal::ZERO);
            prop_assert_eq!(balance, applied_sum);
        }
    }
}

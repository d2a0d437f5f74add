//! Pre-flight sufficiency decision for a batch run. Pure arithmetic over
//! base units; no side effects.

use alloy_primitives::U256;
use serde::Serialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferPlan {
    pub recipient_count: usize,
    /// Per-recipient amount in token base units.
    pub per_recipient: U256,
    pub total_required: U256,
    /// Network fee estimated for one representative transfer, in wei.
    pub fee_per_transfer: U256,
    pub total_fee: U256,
}

/// Decide whether the funded identity can cover a batch of
/// `recipient_count` transfers of `per_recipient` base units each.
///
/// The fee side multiplies a single representative estimate by the batch
/// size.
pub fn plan(
    recipient_count: usize,
    per_recipient: U256,
    token_balance: U256,
    fee_per_transfer: U256,
    native_balance: U256,
) -> AppResult<TransferPlan> {
    if recipient_count == 0 {
        return Err(AppError::InvalidInput(
            "recipient list is empty".to_string(),
        ));
    }
    if per_recipient.is_zero() {
        return Err(AppError::InvalidInput(
            "per-recipient quantity must be positive".to_string(),
        ));
    }

    let count = U256::from(recipient_count);

    let total_required = per_recipient.checked_mul(count).ok_or_else(|| {
        AppError::InvalidInput("total required amount overflows 256 bits".to_string())
    })?;
    if total_required > token_balance {
        return Err(AppError::InsufficientBalance {
            required: total_required,
            available: token_balance,
        });
    }

    let total_fee = fee_per_transfer.checked_mul(count).ok_or_else(|| {
        AppError::InvalidInput("total fee estimate overflows 256 bits".to_string())
    })?;
    if total_fee > native_balance {
        return Err(AppError::InsufficientFee {
            estimated: total_fee,
            available: native_balance,
        });
    }

    Ok(TransferPlan {
        recipient_count,
        per_recipient,
        total_required,
        fee_per_transfer,
        total_fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(n: u64) -> U256 {
        U256::from(n)
    }

    #[test]
    fn test_plan_ok_at_exact_equality() {
        let plan = plan(4, wei(25), wei(100), wei(10), wei(40)).unwrap();
        assert_eq!(plan.total_required, wei(100));
        assert_eq!(plan.total_fee, wei(40));
    }

    #[test]
    fn test_insufficient_balance_by_one_base_unit() {
        let err = plan(4, wei(25), wei(99), wei(0), wei(0)).unwrap_err();
        match err {
            AppError::InsufficientBalance { required, available } => {
                assert_eq!(required, wei(100));
                assert_eq!(available, wei(99));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_insufficient_fee() {
        let err = plan(3, wei(1), wei(10), wei(7), wei(20)).unwrap_err();
        match err {
            AppError::InsufficientFee { estimated, available } => {
                assert_eq!(estimated, wei(21));
                assert_eq!(available, wei(20));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_recipients_rejected() {
        assert!(matches!(
            plan(0, wei(1), wei(10), wei(1), wei(10)),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert!(matches!(
            plan(3, U256::ZERO, wei(10), wei(1), wei(10)),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_total_required_overflow_rejected() {
        assert!(matches!(
            plan(2, U256::MAX, U256::MAX, wei(1), wei(10)),
            Err(AppError::InvalidInput(_))
        ));
    }
}

//! Integration tests for the sequential batch executor.

use std::collections::HashSet;
use std::sync::Mutex;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use airdrop_dispatcher::error::{AppError, AppResult};
use airdrop_dispatcher::executor::{execute, TransferBackend, TransferStatus};

/// Scripted stand-in for the chain: succeeds for every recipient except the
/// ones listed as failing, and records the order of submissions.
struct ScriptedBackend {
    failing: HashSet<Address>,
    calls: Mutex<Vec<Address>>,
}

impl ScriptedBackend {
    fn new(failing: &[Address]) -> Self {
        Self {
            failing: failing.iter().copied().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Address> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferBackend for ScriptedBackend {
    async fn transfer_and_confirm(
        &self,
        _token: Address,
        to: Address,
        _amount: U256,
    ) -> AppResult<B256> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(to);
            calls.len() as u8
        };

        if self.failing.contains(&to) {
            Err(AppError::TransferFailed {
                recipient: to,
                reason: "transaction reverted".to_string(),
            })
        } else {
            Ok(B256::from([call_number; 32]))
        }
    }
}

fn addr(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = n;
    Address::from_slice(&bytes)
}

const TOKEN: u8 = 0xEE;

#[tokio::test]
async fn test_failure_halts_run_and_leaves_remainder_pending() {
    let a = addr(1);
    let b = addr(2);
    let c = addr(3);
    let backend = ScriptedBackend::new(&[b]);

    let report = execute(&backend, addr(TOKEN), &[a, b, c], U256::from(100)).await;

    assert!(report.halted);
    assert_eq!(report.confirmed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.pending, 1);

    assert!(matches!(
        report.outcomes[0].status,
        TransferStatus::Confirmed { .. }
    ));
    assert!(matches!(
        report.outcomes[1].status,
        TransferStatus::Failed { .. }
    ));
    assert_eq!(report.outcomes[2].status, TransferStatus::Pending);

    // C was never attempted.
    assert_eq!(backend.calls(), vec![a, b]);
}

#[tokio::test]
async fn test_all_transfers_confirmed_in_order() {
    let recipients: Vec<Address> = (1..=5).map(addr).collect();
    let backend = ScriptedBackend::new(&[]);

    let report = execute(&backend, addr(TOKEN), &recipients, U256::from(7)).await;

    assert!(!report.halted);
    assert!(report.all_confirmed());
    assert_eq!(report.confirmed, 5);
    assert_eq!(report.failed, 0);
    assert_eq!(report.pending, 0);

    // Strict sequencing: submissions happen in recipient order.
    assert_eq!(backend.calls(), recipients);

    for outcome in &report.outcomes {
        assert!(matches!(outcome.status, TransferStatus::Confirmed { .. }));
    }
}

#[tokio::test]
async fn test_first_recipient_failure_attempts_nothing_else() {
    let recipients: Vec<Address> = (1..=4).map(addr).collect();
    let backend = ScriptedBackend::new(&[recipients[0]]);

    let report = execute(&backend, addr(TOKEN), &recipients, U256::from(1)).await;

    assert!(report.halted);
    assert_eq!(report.confirmed, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(report.pending, 3);
    assert_eq!(backend.calls(), vec![recipients[0]]);
}

#[tokio::test]
async fn test_empty_recipient_list_yields_empty_report() {
    let backend = ScriptedBackend::new(&[]);

    let report = execute(&backend, addr(TOKEN), &[], U256::from(1)).await;

    assert!(!report.halted);
    assert!(report.outcomes.is_empty());
    assert_eq!(report.confirmed, 0);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_failure_report_names_the_recipient() {
    let a = addr(9);
    let backend = ScriptedBackend::new(&[a]);

    let report = execute(&backend, addr(TOKEN), &[a], U256::from(1)).await;

    match &report.outcomes[0].status {
        TransferStatus::Failed { reason } => {
            assert!(reason.contains(&a.to_string()));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

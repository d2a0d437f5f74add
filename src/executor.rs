//! Sequential batch transfer execution.
//!
//! Each recipient walks an explicit `Pending -> Submitted -> Confirmed |
//! Failed` state machine. Submission for recipient *i+1* is never issued
//! before recipient *i* reaches a terminal state, and the first failure halts
//! the whole run with the remainder left `Pending`. Confirmed transfers are
//! irreversible and are never rolled back or retried.

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::AppResult;

/// The seam between the batch loop and the chain. The production
/// implementation is `TokenClient`; tests substitute a scripted mock.
#[async_trait]
pub trait TransferBackend: Send + Sync {
    /// Submit one token transfer from the funded identity and block until
    /// the network confirms it, returning the transaction hash.
    async fn transfer_and_confirm(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> AppResult<B256>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Submitted,
    Confirmed { tx_hash: B256 },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    pub recipient: Address,
    pub status: TransferStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct AirdropReport {
    pub run_id: Uuid,
    pub token: Address,
    pub per_recipient: U256,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<TransferOutcome>,
    pub confirmed: usize,
    pub failed: usize,
    pub pending: usize,
    /// True when the run stopped at a failure before reaching the end of the
    /// recipient list.
    pub halted: bool,
}

impl AirdropReport {
    pub fn all_confirmed(&self) -> bool {
        self.confirmed == self.outcomes.len()
    }
}

/// Run the batch: one transfer per recipient, strictly in order, stopping at
/// the first failure.
pub async fn execute(
    backend: &dyn TransferBackend,
    token: Address,
    recipients: &[Address],
    per_recipient: U256,
) -> AirdropReport {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let total = recipients.len();

    info!(
        "Starting airdrop run {}: {} recipients, {} base units each",
        run_id, total, per_recipient
    );

    let mut outcomes: Vec<TransferOutcome> = recipients
        .iter()
        .map(|&recipient| TransferOutcome {
            recipient,
            status: TransferStatus::Pending,
        })
        .collect();

    let mut halted = false;

    for (i, outcome) in outcomes.iter_mut().enumerate() {
        let recipient = outcome.recipient;
        outcome.status = TransferStatus::Submitted;
        info!(
            "Transferring {} base units to {} ({}/{})",
            per_recipient,
            recipient,
            i + 1,
            total
        );

        match backend.transfer_and_confirm(token, recipient, per_recipient).await {
            Ok(tx_hash) => {
                info!(
                    "Confirmed transfer to {}: 0x{}",
                    recipient,
                    hex::encode(tx_hash)
                );
                outcome.status = TransferStatus::Confirmed { tx_hash };
            }
            Err(e) => {
                error!("Transfer to {} failed, halting run {}: {}", recipient, run_id, e);
                outcome.status = TransferStatus::Failed {
                    reason: e.to_string(),
                };
                halted = true;
                break;
            }
        }
    }

    let confirmed = outcomes
        .iter()
        .filter(|o| matches!(o.status, TransferStatus::Confirmed { .. }))
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| matches!(o.status, TransferStatus::Failed { .. }))
        .count();
    let pending = outcomes
        .iter()
        .filter(|o| matches!(o.status, TransferStatus::Pending))
        .count();

    let report = AirdropReport {
        run_id,
        token,
        per_recipient,
        started_at,
        finished_at: Utc::now(),
        outcomes,
        confirmed,
        failed,
        pending,
        halted,
    };

    if report.halted {
        error!(
            "Airdrop run {} halted: {} confirmed, {} failed, {} unattempted",
            run_id, report.confirmed, report.failed, report.pending
        );
    } else {
        info!(
            "Airdrop run {} completed: {} transfers confirmed",
            run_id, report.confirmed
        );
    }

    report
}

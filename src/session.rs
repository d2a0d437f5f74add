//! Viewing-wallet session tracking.
//!
//! The wallet-extension handshake can only happen in the browser; the
//! dashboard relays its outcome here. The connected address determines whose
//! balance is displayed and nothing more — batch transfers are signed by the
//! separately-configured funded identity.

use alloy_primitives::Address;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{AppError, AppResult};

/// Outcome of the browser-side wallet handshake.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HandshakeOutcome {
    Connected { address: String },
    ProviderUnavailable,
    UserRejected,
}

#[derive(Debug, Default)]
pub struct SessionManager {
    connected: RwLock<Option<Address>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connect(&self, outcome: HandshakeOutcome) -> AppResult<Address> {
        match outcome {
            HandshakeOutcome::Connected { address } => {
                let address: Address = address.trim().parse().map_err(|e| {
                    AppError::InvalidInput(format!("Invalid wallet address: {}", e))
                })?;
                *self.connected.write().await = Some(address);
                info!("Wallet {} connected", address);
                Ok(address)
            }
            HandshakeOutcome::ProviderUnavailable => Err(AppError::ProviderUnavailable(
                "no compatible wallet extension found in the browser".to_string(),
            )),
            HandshakeOutcome::UserRejected => Err(AppError::UserRejected(
                "the connection prompt was declined".to_string(),
            )),
        }
    }

    /// Local state reset only; nothing happens on-chain. Without the
    /// confirmation flag the session is left untouched.
    pub async fn disconnect(&self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        match self.connected.write().await.take() {
            Some(address) => {
                info!("Wallet {} disconnected", address);
                true
            }
            None => false,
        }
    }

    pub async fn connected_address(&self) -> Option<Address> {
        *self.connected.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn test_connect_stores_address() {
        tokio_test::block_on(async {
            let session = SessionManager::new();
            let address = session
                .connect(HandshakeOutcome::Connected {
                    address: ADDR.to_string(),
                })
                .await
                .unwrap();
            assert_eq!(session.connected_address().await, Some(address));
        });
    }

    #[test]
    fn test_handshake_failures_map_to_taxonomy() {
        tokio_test::block_on(async {
            let session = SessionManager::new();
            assert!(matches!(
                session.connect(HandshakeOutcome::ProviderUnavailable).await,
                Err(AppError::ProviderUnavailable(_))
            ));
            assert!(matches!(
                session.connect(HandshakeOutcome::UserRejected).await,
                Err(AppError::UserRejected(_))
            ));
            assert_eq!(session.connected_address().await, None);
        });
    }

    #[test]
    fn test_disconnect_requires_confirmation() {
        tokio_test::block_on(async {
            let session = SessionManager::new();
            session
                .connect(HandshakeOutcome::Connected {
                    address: ADDR.to_string(),
                })
                .await
                .unwrap();

            assert!(!session.disconnect(false).await);
            assert!(session.connected_address().await.is_some());

            assert!(session.disconnect(true).await);
            assert_eq!(session.connected_address().await, None);

            // Disconnecting an empty session is a no-op.
            assert!(!session.disconnect(true).await);
        });
    }

    #[test]
    fn test_connect_rejects_malformed_address() {
        tokio_test::block_on(async {
            let session = SessionManager::new();
            assert!(matches!(
                session
                    .connect(HandshakeOutcome::Connected {
                        address: "not-an-address".to_string(),
                    })
                    .await,
                Err(AppError::InvalidInput(_))
            ));
        });
    }
}

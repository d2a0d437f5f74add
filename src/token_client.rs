use std::fmt::Display;
use std::future::IntoFuture;
use std::time::Duration;

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{
        utils::{format_units, parse_units},
        Address, B256, U256,
    },
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    sol,
    sol_types::SolCall,
};
use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::executor::TransferBackend;

// Inline Solidity interface using sol! macro
sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IErc20 {
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 value) external returns (bool);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenBalance {
    pub raw: U256,
    pub decimals: u8,
    /// Human-readable decimal rendering of `raw`. Integer scaling only;
    /// never goes through floating point.
    pub formatted: String,
}

/// Chain-facing client holding the funded signing identity.
///
/// Constructed once at startup from configuration and passed by reference
/// everywhere it is needed; nothing else in the process can sign.
pub struct TokenClient {
    provider: DynProvider,
    funded_address: Address,
    call_timeout: Duration,
    confirmation_timeout: Duration,
}

impl TokenClient {
    pub fn new(
        rpc_url: &str,
        private_key: &str,
        timeout_seconds: u64,
        confirmation_timeout_seconds: u64,
    ) -> AppResult<Self> {
        if private_key.trim().is_empty() {
            return Err(AppError::Config("wallet private key is not set".to_string()));
        }

        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid private key: {}", e)))?;
        let funded_address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let url: reqwest::Url = rpc_url
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url)
            .erased();

        Ok(Self {
            provider,
            funded_address,
            call_timeout: Duration::from_secs(timeout_seconds),
            confirmation_timeout: Duration::from_secs(confirmation_timeout_seconds),
        })
    }

    pub fn funded_address(&self) -> Address {
        self.funded_address
    }

    /// Check connectivity to the RPC endpoint and return its chain id.
    pub async fn check_connection(&self) -> AppResult<u64> {
        self.bounded("eth_chainId", self.provider.get_chain_id()).await
    }

    /// Fetch the token's precision. Re-queried on every use; never cached
    /// across token-address changes.
    pub async fn decimals(&self, token: Address) -> AppResult<u8> {
        if token == Address::ZERO {
            return Err(AppError::Config("token address is not set".to_string()));
        }
        let erc20 = IErc20::new(token, self.provider.clone());
        self.bounded("decimals()", erc20.decimals().call()).await
    }

    /// Read `owner`'s balance of `token`, converted to a human-readable
    /// decimal amount alongside the raw base units.
    pub async fn read_balance(&self, token: Address, owner: Address) -> AppResult<TokenBalance> {
        if token == Address::ZERO {
            return Err(AppError::Config("token address is not set".to_string()));
        }
        if owner == Address::ZERO {
            return Err(AppError::Config("owner address is not set".to_string()));
        }

        let erc20 = IErc20::new(token, self.provider.clone());
        let decimals = self.bounded("decimals()", erc20.decimals().call()).await?;
        let raw = self
            .bounded("balanceOf()", erc20.balanceOf(owner).call())
            .await?;
        let formatted = format_token_amount(raw, decimals)?;

        Ok(TokenBalance {
            raw,
            decimals,
            formatted,
        })
    }

    /// Native-currency balance in wei, used for the fee sufficiency check.
    pub async fn native_balance(&self, owner: Address) -> AppResult<U256> {
        self.bounded("eth_getBalance", self.provider.get_balance(owner))
            .await
    }

    /// Estimate the network fee for one representative transfer, in wei.
    pub async fn estimate_transfer_fee(
        &self,
        token: Address,
        representative: Address,
        amount: U256,
    ) -> AppResult<U256> {
        let calldata = IErc20::transferCall {
            to: representative,
            value: amount,
        }
        .abi_encode();

        let tx = TransactionRequest::default()
            .with_from(self.funded_address)
            .with_to(token)
            .with_input(calldata);

        let gas = self
            .bounded("eth_estimateGas", self.provider.estimate_gas(tx))
            .await?;
        let gas_price = self
            .bounded("eth_gasPrice", self.provider.get_gas_price())
            .await?;

        Ok(U256::from(gas).saturating_mul(U256::from(gas_price)))
    }

    /// Run `fut` with the per-call timeout, mapping both expiry and call
    /// failure to a network error.
    async fn bounded<T, E, F>(&self, what: &str, fut: F) -> AppResult<T>
    where
        E: Display,
        F: IntoFuture<Output = Result<T, E>>,
    {
        match tokio::time::timeout(self.call_timeout, fut.into_future()).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AppError::Network(format!("{} failed: {}", what, e))),
            Err(_) => Err(AppError::Network(format!(
                "{} timed out after {}s",
                what,
                self.call_timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl TransferBackend for TokenClient {
    async fn transfer_and_confirm(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> AppResult<B256> {
        let erc20 = IErc20::new(token, self.provider.clone());

        let pending = match tokio::time::timeout(
            self.call_timeout,
            erc20.transfer(to, amount).send(),
        )
        .await
        {
            Ok(Ok(pending)) => pending,
            Ok(Err(e)) => {
                return Err(AppError::TransferFailed {
                    recipient: to,
                    reason: format!("submission failed: {}", e),
                })
            }
            Err(_) => {
                return Err(AppError::Network(format!(
                    "transfer submission to {} timed out after {}s",
                    to,
                    self.call_timeout.as_secs()
                )))
            }
        };

        let receipt = match tokio::time::timeout(
            self.confirmation_timeout,
            pending.get_receipt(),
        )
        .await
        {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => {
                return Err(AppError::TransferFailed {
                    recipient: to,
                    reason: format!("confirmation failed: {}", e),
                })
            }
            Err(_) => {
                return Err(AppError::Network(format!(
                    "confirmation of transfer to {} timed out after {}s",
                    to,
                    self.confirmation_timeout.as_secs()
                )))
            }
        };

        if !receipt.status() {
            return Err(AppError::TransferFailed {
                recipient: to,
                reason: format!(
                    "transaction 0x{} reverted",
                    hex::encode(receipt.transaction_hash)
                ),
            });
        }

        Ok(receipt.transaction_hash)
    }
}

/// Parse an operator-entered decimal quantity into base units.
pub fn parse_token_amount(quantity: &str, decimals: u8) -> AppResult<U256> {
    let trimmed = quantity.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("quantity is empty".to_string()));
    }
    if trimmed.starts_with('-') {
        return Err(AppError::InvalidInput(
            "quantity must be positive".to_string(),
        ));
    }

    let amount = parse_units(trimmed, decimals)
        .map_err(|e| AppError::InvalidInput(format!("Invalid quantity '{}': {}", trimmed, e)))?
        .get_absolute();

    if amount.is_zero() {
        return Err(AppError::InvalidInput(
            "quantity must be positive".to_string(),
        ));
    }

    Ok(amount)
}

/// Render base units as a decimal string using the token's precision.
pub fn format_token_amount(raw: U256, decimals: u8) -> AppResult<String> {
    format_units(raw, decimals)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to format token amount: {}", e)))
}

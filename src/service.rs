use anyhow::Result;
use std::path::Path;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use alloy_primitives::Address;
use serde::Serialize;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::executor::{self, AirdropReport};
use crate::planner::{self, TransferPlan};
use crate::recipients::{self, Page, RecipientSet};
use crate::session::{HandshakeOutcome, SessionManager};
use crate::token_client::{parse_token_amount, TokenBalance, TokenClient};

#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    pub accepted: usize,
    pub invalid: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceView {
    pub token: Address,
    pub owner: Address,
    pub balance: TokenBalance,
}

#[derive(Debug, Clone, Serialize)]
pub struct FundedOverview {
    pub address: Address,
    pub token_balance: TokenBalance,
    pub native_balance_wei: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AirdropRunResponse {
    pub plan: TransferPlan,
    /// Operator-entered fee, informational display only; it is never applied
    /// as a surcharge on-chain.
    pub display_fee: Option<String>,
    pub report: AirdropReport,
}

pub struct AirdropService {
    config: Config,
    token_client: TokenClient,
    session: SessionManager,
    recipients: RwLock<RecipientSet>,
    token_address: RwLock<Address>,
    /// Held for the whole duration of a batch; at most one run in flight.
    airdrop_guard: Mutex<()>,
}

impl AirdropService {
    pub async fn new(config: Config) -> Result<Self> {
        if config.airdrop.page_size == 0 {
            anyhow::bail!("airdrop.page_size must be at least 1");
        }

        let token_client = TokenClient::new(
            &config.blockchain.rpc_url,
            &config.wallet.private_key,
            config.blockchain.timeout_seconds,
            config.blockchain.confirmation_timeout_seconds,
        )?;

        let chain_id = token_client.check_connection().await?;
        info!(
            "Connected to chain {} via {}",
            chain_id, config.blockchain.rpc_url
        );
        if chain_id != config.blockchain.chain_id {
            warn!(
                "Configured chain id {} does not match the node's {}",
                config.blockchain.chain_id, chain_id
            );
        }
        info!("Funded wallet: {}", token_client.funded_address());

        let token_address = if config.blockchain.token_address.trim().is_empty() {
            Address::ZERO
        } else {
            config.blockchain.token_address.trim().parse()?
        };

        Ok(Self {
            config,
            token_client,
            session: SessionManager::new(),
            recipients: RwLock::new(RecipientSet::default()),
            token_address: RwLock::new(token_address),
            airdrop_guard: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // --- session -----------------------------------------------------------

    pub async fn connect_session(&self, outcome: HandshakeOutcome) -> AppResult<Address> {
        self.session.connect(outcome).await
    }

    pub async fn disconnect_session(&self, confirmed: bool) -> bool {
        self.session.disconnect(confirmed).await
    }

    pub async fn session_address(&self) -> Option<Address> {
        self.session.connected_address().await
    }

    // --- token reference ---------------------------------------------------

    pub async fn token_address(&self) -> Address {
        *self.token_address.read().await
    }

    pub async fn set_token_address(&self, address: &str) -> AppResult<Address> {
        let address: Address = address
            .trim()
            .parse()
            .map_err(|e| AppError::InvalidInput(format!("Invalid token address: {}", e)))?;
        *self.token_address.write().await = address;
        info!("Token address set to {}", address);
        Ok(address)
    }

    /// Balance of the connected viewing wallet in the current token.
    pub async fn viewing_balance(&self) -> AppResult<BalanceView> {
        let owner = self
            .session
            .connected_address()
            .await
            .ok_or_else(|| AppError::Config("no viewing wallet is connected".to_string()))?;
        let token = self.token_address().await;
        let balance = self.token_client.read_balance(token, owner).await?;
        Ok(BalanceView {
            token,
            owner,
            balance,
        })
    }

    /// Holdings of the funded signing identity: its token balance and the
    /// native balance that pays for gas.
    pub async fn funded_overview(&self) -> AppResult<FundedOverview> {
        let funded = self.token_client.funded_address();
        let token = self.token_address().await;
        let token_balance = self.token_client.read_balance(token, funded).await?;
        let native_balance = self.token_client.native_balance(funded).await?;
        Ok(FundedOverview {
            address: funded,
            token_balance,
            native_balance_wei: native_balance.to_string(),
        })
    }

    // --- recipients --------------------------------------------------------

    /// Load the recipient file from its fixed location under the static
    /// asset root.
    pub async fn load_recipients_from_assets(&self) -> AppResult<UploadSummary> {
        let path = Path::new(&self.config.server.static_dir).join(&self.config.airdrop.wallets_file);
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AppError::NotFound(format!("wallets file {}: {}", path.display(), e))
        })?;
        self.replace_recipients(&raw).await
    }

    /// Replace the recipient set from an uploaded payload.
    pub async fn upload_recipients(&self, raw: &str) -> AppResult<UploadSummary> {
        self.replace_recipients(raw).await
    }

    async fn replace_recipients(&self, raw: &str) -> AppResult<UploadSummary> {
        let parsed = recipients::parse(raw);

        if parsed.valid.len() > self.config.airdrop.max_recipients {
            return Err(AppError::InvalidInput(format!(
                "{} recipients exceed the configured maximum of {}",
                parsed.valid.len(),
                self.config.airdrop.max_recipients
            )));
        }

        if !parsed.invalid.is_empty() {
            warn!(
                "Upload contained {} malformed addresses: {}",
                parsed.invalid.len(),
                parsed.invalid.join(", ")
            );
        }

        let accepted = parsed.valid.len();
        *self.recipients.write().await = RecipientSet::new(parsed.valid);
        info!("Recipient set replaced: {} addresses", accepted);

        Ok(UploadSummary {
            accepted,
            invalid: parsed.invalid,
        })
    }

    pub async fn recipients_page(&self, page: usize) -> AppResult<Page> {
        if page == 0 {
            return Err(AppError::InvalidInput(
                "page numbers start at 1".to_string(),
            ));
        }
        let set = self.recipients.read().await;
        Ok(set.page(page, self.config.airdrop.page_size))
    }

    // --- airdrop -----------------------------------------------------------

    /// Plan and run one batch: validate inputs, check that the funded
    /// identity covers the total amount and the estimated fees, then hand
    /// off to the sequential executor.
    pub async fn run_airdrop(
        &self,
        quantity: &str,
        display_fee: Option<String>,
    ) -> AppResult<AirdropRunResponse> {
        let _guard = self.airdrop_guard.try_lock().map_err(|_| {
            AppError::InvalidInput("an airdrop batch is already in progress".to_string())
        })?;

        let recipient_set = self.recipients.read().await.clone();
        if recipient_set.is_empty() {
            return Err(AppError::InvalidInput(
                "recipient list is empty; upload a wallets file first".to_string(),
            ));
        }

        let token = self.token_address().await;
        let funded = self.token_client.funded_address();

        let decimals = self.token_client.decimals(token).await?;
        let per_recipient = parse_token_amount(quantity, decimals)?;

        let token_balance = self.token_client.read_balance(token, funded).await?;
        let native_balance = self.token_client.native_balance(funded).await?;
        let fee_per_transfer = self
            .token_client
            .estimate_transfer_fee(token, recipient_set.addresses()[0], per_recipient)
            .await?;

        let plan = planner::plan(
            recipient_set.len(),
            per_recipient,
            token_balance.raw,
            fee_per_transfer,
            native_balance,
        )?;
        info!(
            "Airdrop plan accepted: {} recipients, {} base units each, {} wei estimated fees",
            plan.recipient_count, plan.per_recipient, plan.total_fee
        );

        let report = executor::execute(
            &self.token_client,
            token,
            recipient_set.addresses(),
            per_recipient,
        )
        .await;

        Ok(AirdropRunResponse {
            plan,
            display_fee,
            report,
        })
    }
}

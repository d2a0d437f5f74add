use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub blockchain: BlockchainConfig,
    pub wallet: WalletConfig,
    pub airdrop: AirdropConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    /// Token contract shown when the dashboard first loads; the operator can
    /// change it at runtime.
    #[serde(default)]
    pub token_address: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_confirmation_timeout")]
    pub confirmation_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Private key of the funded identity that signs all outgoing transfers.
    /// Supplied out-of-band; never the viewing wallet.
    pub private_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirdropConfig {
    #[serde(default = "default_wallets_file")]
    pub wallets_file: String,
    #[serde(default = "default_max_recipients")]
    pub max_recipients: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_max_upload_size() -> u64 {
    5 * 1024 * 1024
}

fn default_timeout() -> u64 {
    30
}

fn default_confirmation_timeout() -> u64 {
    120
}

fn default_wallets_file() -> String {
    "wallets.csv".to_string()
}

fn default_max_recipients() -> usize {
    10_000
}

fn default_page_size() -> usize {
    5
}

impl Config {
    pub async fn load_from_file(path: &str) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

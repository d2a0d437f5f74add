//! Airdrop dispatcher backend.
//!
//! Serves the airdrop dashboard: a viewing-wallet session, recipient list
//! ingestion with pagination, ERC-20 balance display, and a sequential batch
//! transfer workflow signed by a single funded identity configured at
//! startup.

pub mod config;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod planner;
pub mod recipients;
pub mod service;
pub mod session;
pub mod token_client;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use service::AirdropService;

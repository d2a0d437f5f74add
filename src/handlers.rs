use axum::{
    extract::{Multipart, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::service::AirdropService;
use crate::session::HandshakeOutcome;

#[derive(Deserialize)]
pub struct DisconnectRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Deserialize)]
pub struct SetTokenRequest {
    pub address: String,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

#[derive(Deserialize)]
pub struct ExecuteAirdropRequest {
    /// Per-recipient quantity in human-readable token units, e.g. "1.5".
    pub quantity: String,
    /// Informational fee figure entered by the operator; echoed back only.
    pub fee: Option<String>,
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn connect_session(
    State(service): State<Arc<AirdropService>>,
    Json(outcome): Json<HandshakeOutcome>,
) -> AppResult<Json<serde_json::Value>> {
    let address = service.connect_session(outcome).await?;

    Ok(Json(json!({
        "connected": true,
        "address": address
    })))
}

pub async fn disconnect_session(
    State(service): State<Arc<AirdropService>>,
    Json(payload): Json<DisconnectRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let disconnected = service.disconnect_session(payload.confirm).await;

    Ok(Json(json!({
        "disconnected": disconnected
    })))
}

pub async fn get_session(
    State(service): State<Arc<AirdropService>>,
) -> AppResult<Json<serde_json::Value>> {
    match service.session_address().await {
        Some(address) => Ok(Json(json!({
            "connected": true,
            "address": address
        }))),
        None => Ok(Json(json!({
            "connected": false
        }))),
    }
}

pub async fn get_token(
    State(service): State<Arc<AirdropService>>,
) -> AppResult<Json<serde_json::Value>> {
    let token = service.token_address().await;

    Ok(Json(json!({
        "token_address": token
    })))
}

pub async fn set_token_address(
    State(service): State<Arc<AirdropService>>,
    Json(payload): Json<SetTokenRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let address = service.set_token_address(&payload.address).await?;

    Ok(Json(json!({
        "token_address": address
    })))
}

pub async fn get_token_balance(
    State(service): State<Arc<AirdropService>>,
) -> AppResult<Json<crate::service::BalanceView>> {
    let view = service.viewing_balance().await?;
    Ok(Json(view))
}

pub async fn get_funded_overview(
    State(service): State<Arc<AirdropService>>,
) -> AppResult<Json<crate::service::FundedOverview>> {
    let overview = service.funded_overview().await?;
    Ok(Json(overview))
}

pub async fn load_recipients(
    State(service): State<Arc<AirdropService>>,
) -> AppResult<Json<serde_json::Value>> {
    let summary = service.load_recipients_from_assets().await?;

    Ok(Json(json!({
        "accepted": summary.accepted,
        "invalid": summary.invalid
    })))
}

pub async fn upload_recipients(
    State(service): State<Arc<AirdropService>>,
    mut multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    let mut payload: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or_default();

        match name {
            "wallets_file" => {
                payload = Some(field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read wallets file: {}", e))
                })?);
            }
            _ => {
                // Skip unknown fields
            }
        }
    }

    let payload =
        payload.ok_or_else(|| AppError::InvalidInput("wallets_file is required".to_string()))?;

    let summary = service.upload_recipients(&payload).await?;

    Ok(Json(json!({
        "accepted": summary.accepted,
        "invalid": summary.invalid
    })))
}

pub async fn get_recipients(
    State(service): State<Arc<AirdropService>>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<crate::recipients::Page>> {
    let page = service.recipients_page(query.page.unwrap_or(1)).await?;
    Ok(Json(page))
}

pub async fn execute_airdrop(
    State(service): State<Arc<AirdropService>>,
    Json(payload): Json<ExecuteAirdropRequest>,
) -> AppResult<Json<crate::service::AirdropRunResponse>> {
    let response = service.run_airdrop(&payload.quantity, payload.fee).await?;
    Ok(Json(response))
}

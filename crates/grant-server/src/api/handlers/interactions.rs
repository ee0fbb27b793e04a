//! Interaction webhook handler
//!
//! The signature is checked against the raw body before the body is
//! parsed; unsigned or mis-signed requests never reach the dispatcher.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use grant_core::{Interaction, InteractionResponse, InteractionVerifier};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::error::ApiError;
use crate::dispatch::Dispatcher;

/// Hex Ed25519 signature header
pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";

/// Signed timestamp header
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Application state shared across handlers
#[derive(Debug)]
pub struct AppState {
    /// Verifier bound to the application public key
    pub verifier: InteractionVerifier,
    /// Command dispatcher
    pub dispatcher: Dispatcher,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Receive a signed interaction
///
/// POST /interactions
pub async fn handle_interaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<InteractionResponse>, ApiError> {
    let signature = header(&headers, SIGNATURE_HEADER);
    let timestamp = header(&headers, TIMESTAMP_HEADER);

    if !state.verifier.verify(timestamp, &body, signature) {
        warn!(body_len = body.len(), "Rejected interaction with invalid signature");
        return Err(ApiError::InvalidSignature);
    }

    let interaction: Interaction = serde_json::from_slice(&body)?;
    debug!(
        kind = ?interaction.kind,
        command = %interaction.data.name,
        "Received interaction"
    );

    let response = state.dispatcher.dispatch(&interaction).await?;
    Ok(Json(response))
}

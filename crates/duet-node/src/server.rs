//! HTTP listener: the peer-facing routes plus the demonstration endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use duet_core::{Inbound, SessionError, Transcript, TranscriptEntry};
use duet_crypto::{decrypt, encrypt};
use duet_proto::{
    Ack, ErrorKind, ErrorReply, KeyPayload,
    demo::{
        DecryptReply, DecryptRequest, EncryptReply, EncryptRequest, ServiceInfo, WebhookReply,
        WebhookRequest,
    },
};
use serde::de::DeserializeOwned;

use crate::console::Console;

/// Routes served by every node.
pub const ENDPOINTS: [&str; 5] = ["/key", "/msg", "/encrypt", "/decrypt", "/webhook"];

/// Everything a request handler needs.
#[derive(Clone)]
pub struct AppState {
    /// Listener side of the session
    pub inbound: Inbound,
    /// Terminal output
    pub console: Console,
    /// Transcript for events outside the session (webhook notices)
    pub transcript: Arc<dyn Transcript>,
    /// This node's display name
    pub name: String,
}

/// Build the router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/key", post(receive_key))
        .route("/msg", post(receive_message))
        .route("/encrypt", post(encrypt_text))
        .route("/decrypt", post(decrypt_text))
        .route("/webhook", post(webhook))
        .with_state(state)
}

fn error_reply(status: StatusCode, kind: ErrorKind, error: impl Into<String>) -> Response {
    (status, Json(ErrorReply::new(kind, error))).into_response()
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        error_reply(
            StatusCode::BAD_REQUEST,
            ErrorKind::InvalidRequest,
            format!("invalid JSON body: {e}"),
        )
    })
}

async fn index(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: format!("{} RSA node running.", state.name),
        endpoints: ENDPOINTS.iter().map(|e| (*e).to_string()).collect(),
    })
}

async fn receive_key(State(state): State<AppState>, body: Bytes) -> Response {
    let peer = state.inbound.peer_name();
    match state.inbound.receive_key(&body) {
        Ok(key) => {
            state.console.system(format!("Public key from {peer} received: {key}"));
            (StatusCode::OK, Json(Ack::key_received())).into_response()
        },
        Err(e) => {
            state.console.system(format!("Error receiving key from {peer}: {e}"));
            error_reply(StatusCode::BAD_REQUEST, ErrorKind::DecodeFailure, e.to_string())
        },
    }
}

async fn receive_message(State(state): State<AppState>, body: Bytes) -> Response {
    let peer = state.inbound.peer_name();
    match state.inbound.receive_message(&body) {
        Ok(text) => {
            state.console.line(format!("[{peer}] {text}"));
            (StatusCode::OK, Json(Ack::message_received())).into_response()
        },
        Err(e @ SessionError::ProtocolOrderingViolation) => {
            state
                .console
                .system(format!("Public key from {peer} not received yet; message ignored."));
            error_reply(StatusCode::CONFLICT, ErrorKind::ProtocolOrderingViolation, e.to_string())
        },
        Err(e) => {
            state.console.system(format!("Error decrypting message from {peer}: {e}"));
            error_reply(StatusCode::BAD_REQUEST, ErrorKind::DecodeFailure, e.to_string())
        },
    }
}

async fn encrypt_text(State(state): State<AppState>, body: Bytes) -> Response {
    let request: EncryptRequest = match parse(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let Some(message) = request.message.filter(|m| !m.is_empty()) else {
        return error_reply(
            StatusCode::BAD_REQUEST,
            ErrorKind::InvalidRequest,
            "missing field 'message'",
        );
    };

    let public = *state.inbound.keypair().public();
    let encrypted = encrypt(&public, &message).into_inner();
    Json(EncryptReply { encrypted, public_key: KeyPayload { e: public.e, n: public.n } })
        .into_response()
}

async fn decrypt_text(State(state): State<AppState>, body: Bytes) -> Response {
    let request: DecryptRequest = match parse(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let Some(ciphertext) = request.ciphertext else {
        return error_reply(
            StatusCode::BAD_REQUEST,
            ErrorKind::InvalidRequest,
            "field 'ciphertext' must be a list of integers",
        );
    };

    match decrypt(state.inbound.keypair().private(), &ciphertext) {
        Ok(decrypted) => Json(DecryptReply { decrypted }).into_response(),
        Err(e) => error_reply(StatusCode::BAD_REQUEST, ErrorKind::DecodeFailure, e.to_string()),
    }
}

async fn webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let request: WebhookRequest = match parse(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    tracing::info!(message = %request.message, "webhook notification");
    state.console.line(format!("[webhook] {}", request.message));
    state.transcript.record(TranscriptEntry::system(format!("Webhook: {}", request.message)));
    Json(WebhookReply::received()).into_response()
}

//! Coherence engine routes: validate, resolve, convergence.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use reverie_canon::NarrativeContent;
use reverie_coherence::{ConsistencyIssue, Contradiction, NarrativeResolution};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /validate.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// The content to validate, as produced by the upstream generator.
    pub content: NarrativeContent,
}

/// Response body for POST /validate.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    /// The validated content.
    pub content_id: Uuid,
    /// Whether the content is free of contradictions.
    pub is_coherent: bool,
    /// Whether an unresolved critical contradiction blocks surfacing.
    pub blocks_surfacing: bool,
    /// Detected contradictions, most severe first.
    pub contradictions: Vec<Contradiction>,
    /// Generic issues, including degraded detection strategies.
    pub issues: Vec<ConsistencyIssue>,
}

/// Request body for POST /resolve.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    /// The content the contradiction was detected against.
    pub content: NarrativeContent,
    /// The contradiction to resolve, as returned by /validate.
    pub contradiction: Contradiction,
}

/// Request body for POST /convergence.
#[derive(Debug, Deserialize)]
pub struct ConvergenceRequest {
    /// The session whose stored threads should be analyzed.
    pub session_id: Uuid,
}

/// POST /validate
#[instrument(skip(state, request), fields(content_id = %request.content.id))]
async fn validate(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let result = state.validator.validate_content(&request.content).await?;
    Ok(Json(ValidateResponse {
        content_id: result.content_id,
        is_coherent: result.is_coherent(),
        blocks_surfacing: result.blocks_surfacing(),
        contradictions: result.contradictions,
        issues: result.issues,
    }))
}

/// POST /resolve
#[instrument(skip(state, request), fields(conflict_id = %request.contradiction.id))]
async fn resolve(
    State(state): State<AppState>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<NarrativeResolution>, ApiError> {
    let resolution = state
        .validator
        .resolve_conflict(&request.content, &request.contradiction)
        .await?;
    info!(
        success = resolution.implementation_success,
        kind = resolution.solution.kind.as_str(),
        "conflict resolution returned"
    );
    Ok(Json(resolution))
}

/// POST /convergence
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn convergence(
    State(state): State<AppState>,
    Json(request): Json<ConvergenceRequest>,
) -> Json<reverie_coherence::ConvergenceValidation> {
    Json(
        state
            .validator
            .validate_session_convergence(request.session_id)
            .await,
    )
}

/// Returns the router for the coherence engine.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/validate", post(validate))
        .route("/resolve", post(resolve))
        .route("/convergence", post(convergence))
}

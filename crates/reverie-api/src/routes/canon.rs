//! Canon ingestion routes: lore establishment, accepted content, threads.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::post, routing::put};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use reverie_canon::{
    Assertion, Immutability, LoreCategory, LoreEntry, NarrativeContent, OrderingClaim,
    StorylineThread, SubjectKey,
};
use reverie_core::score::UnitScore;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{session_id}/lore.
#[derive(Debug, Deserialize)]
pub struct EstablishLoreRequest {
    /// Kind of fact.
    pub category: LoreCategory,
    /// The canonical fact text.
    pub fact: String,
    /// Who or what the fact is about.
    pub subject: String,
    /// Which attribute it concerns.
    pub attribute: String,
    /// Narrative position at which the fact is established.
    pub established_at: u64,
    /// How firmly the fact is established.
    pub immutability: Immutability,
}

/// One assertion in a content request.
#[derive(Debug, Deserialize)]
pub struct AssertionRequest {
    /// Who or what the claim is about.
    pub subject: String,
    /// Which attribute it concerns.
    pub attribute: String,
    /// The asserted statement.
    pub statement: String,
    /// Assertion strength.
    pub strength: UnitScore,
}

/// Request body for POST /{session_id}/content.
#[derive(Debug, Deserialize)]
pub struct RecordContentRequest {
    /// The narrative text.
    pub text: String,
    /// Monotonic narrative position.
    pub position: u64,
    /// Referenced entity names.
    #[serde(default)]
    pub referenced_entities: Vec<String>,
    /// Structured claims.
    #[serde(default)]
    pub assertions: Vec<AssertionRequest>,
    /// Causal dependencies.
    #[serde(default)]
    pub causal_links: Vec<Uuid>,
    /// Implied orderings.
    #[serde(default)]
    pub ordering_claims: Vec<OrderingClaim>,
    /// Theme tags.
    #[serde(default)]
    pub themes: Vec<String>,
}

/// Request body for PUT /{session_id}/threads.
#[derive(Debug, Deserialize)]
pub struct UpsertThreadRequest {
    /// Thread identifier.
    pub id: Uuid,
    /// Thread title.
    pub title: String,
    /// Participants.
    #[serde(default)]
    pub participants: Vec<String>,
    /// Themes.
    #[serde(default)]
    pub themes: Vec<String>,
    /// Current tension.
    pub tension: UnitScore,
    /// Declared resolution target, if any.
    #[serde(default)]
    pub resolution_target: Option<String>,
}

/// Response body carrying the id of the created or updated entity.
#[derive(Debug, Serialize)]
pub struct EntityResponse {
    /// The entity id.
    pub id: Uuid,
}

/// POST /{session_id}/lore
#[instrument(skip(state, request), fields(session_id = %session_id))]
async fn establish_lore(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<EstablishLoreRequest>,
) -> Result<Json<EntityResponse>, ApiError> {
    let entry = LoreEntry::new(
        request.category,
        request.fact,
        SubjectKey::new(&request.subject, &request.attribute),
        request.established_at,
        request.immutability,
        state.clock.now(),
    );

    let session = state.canon.session(session_id);
    let mut guard = session.write().await;
    let id = guard.establish_lore(entry)?;
    info!(lore_id = %id, "lore established");
    Ok(Json(EntityResponse { id }))
}

/// POST /{session_id}/content
#[instrument(skip(state, request), fields(session_id = %session_id))]
async fn record_content(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<RecordContentRequest>,
) -> Result<Json<EntityResponse>, ApiError> {
    let mut content =
        NarrativeContent::new(session_id, request.text, request.position, state.clock.now());
    content.referenced_entities = request.referenced_entities;
    content.assertions = request
        .assertions
        .into_iter()
        .map(|a| {
            Assertion::new(
                SubjectKey::new(&a.subject, &a.attribute),
                a.statement,
                a.strength,
            )
        })
        .collect();
    content.causal_links = request.causal_links;
    content.ordering_claims = request.ordering_claims;
    content.themes = request.themes;

    let session = state.canon.session(session_id);
    let mut guard = session.write().await;
    let id = guard.record_content(content)?;
    info!(content_id = %id, "content recorded");
    Ok(Json(EntityResponse { id }))
}

/// PUT /{session_id}/threads
#[instrument(skip(state, request), fields(session_id = %session_id, thread_id = %request.id))]
async fn upsert_thread(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<UpsertThreadRequest>,
) -> Result<Json<EntityResponse>, ApiError> {
    let mut thread = StorylineThread::new(request.id, request.title);
    for participant in &request.participants {
        thread.add_participant(participant);
    }
    for theme in &request.themes {
        thread.add_theme(theme);
    }
    thread.tension = request.tension;
    thread.resolution_target = request.resolution_target;

    let id = thread.id;
    let session = state.canon.session(session_id);
    let mut guard = session.write().await;
    guard.upsert_thread(thread)?;
    Ok(Json(EntityResponse { id }))
}

/// Returns the router for canon ingestion.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{session_id}/lore", post(establish_lore))
        .route("/{session_id}/content", post(record_content))
        .route("/{session_id}/threads", put(upsert_thread))
}

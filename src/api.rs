//! HTTP boundary: thin axum glue over the core modules.
//!
//! Auth token handling is out of scope here; requests reference actors by id
//! and the core validates roles. Handlers contain no decision logic beyond
//! resolving ids — everything else lives in `store` / `workflow` /
//! `investigation` / `actors`.

use std::sync::Arc;

use shuttle_axum::axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::actors::ActorDirectory;
use crate::classify::{ClassifierPipeline, DynProvider, SharedClassifier};
use crate::config::ai::AiConfig;
use crate::error::{DeskError, DeskResult};
use crate::identity::{DocumentGate, NoExtractor};
use crate::investigation::InvestigationLog;
use crate::model::{
    Actor, ActorId, Classification, Complaint, ComplaintId, DocumentScan, IdentityStatus,
    InvestigationNote, Role, Status,
};
use crate::stats::{self, StatsSnapshot};
use crate::store::{ComplaintStore, NewComplaint};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ComplaintStore>,
    pub actors: Arc<ActorDirectory>,
    pub investigation: InvestigationLog,
    pub classifier: SharedClassifier,
    pub gate: Arc<DocumentGate>,
}

impl AppState {
    /// Production wiring: AI provider from `config/ai.json`, no OCR
    /// collaborator until one is configured.
    pub fn from_config() -> Self {
        let cfg = AiConfig::load_or_disabled("config/ai.json");
        let classifier = Arc::new(ClassifierPipeline::from_config(&cfg));
        Self::assemble(classifier, Arc::new(DocumentGate::new(Box::new(NoExtractor))))
    }

    /// Test wiring with an explicit provider (mock or disabled).
    pub fn with_provider(provider: DynProvider) -> Self {
        let classifier = Arc::new(ClassifierPipeline::new(provider));
        Self::assemble(classifier, Arc::new(DocumentGate::new(Box::new(NoExtractor))))
    }

    fn assemble(classifier: SharedClassifier, gate: Arc<DocumentGate>) -> Self {
        let store = Arc::new(ComplaintStore::new());
        Self {
            actors: Arc::new(ActorDirectory::new()),
            investigation: InvestigationLog::new(store.clone()),
            store,
            classifier,
            gate,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/classify", post(classify))
        .route("/complaints", post(create_complaint))
        .route("/complaints/{id}", get(get_complaint))
        .route("/complaints/{id}/status", patch(update_status))
        .route("/complaints/{id}/notes", post(append_note).get(list_notes))
        .route("/stats", get(get_stats))
        .route("/actors/citizens", post(register_citizen))
        .route("/actors/officers", post(register_officer))
        .route("/actors/admins", post(register_admin))
        .route("/actors/{id}/identity", post(decide_identity))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn resolve_actor(state: &AppState, id: Uuid) -> DeskResult<Actor> {
    state.actors.get(ActorId(id))
}

#[derive(serde::Deserialize)]
struct ClassifyReq {
    text: String,
}

/// Standalone classification for live submission-form feedback. Same pipeline
/// the creation path uses; nothing is persisted.
async fn classify(
    State(state): State<AppState>,
    Json(body): Json<ClassifyReq>,
) -> DeskResult<Json<Classification>> {
    if body.text.trim().is_empty() {
        return Err(DeskError::Validation("text is required".into()));
    }
    Ok(Json(state.classifier.classify(&body.text).await))
}

#[derive(serde::Deserialize)]
struct CreateComplaintReq {
    actor_id: Uuid,
    title: String,
    description: String,
    incident_type: String,
    location: String,
    incident_date: String,
    incident_time: String,
    #[serde(default)]
    evidence: Option<String>,
    #[serde(default)]
    ai_draft: Option<String>,
}

async fn create_complaint(
    State(state): State<AppState>,
    Json(body): Json<CreateComplaintReq>,
) -> DeskResult<(StatusCode, Json<Complaint>)> {
    let author = resolve_actor(&state, body.actor_id)?;

    let input = NewComplaint {
        title: body.title,
        description: body.description,
        incident_type: body.incident_type,
        location: body.location,
        incident_date: body.incident_date,
        incident_time: body.incident_time,
        evidence: body.evidence,
        ai_draft: body.ai_draft,
    };

    // A doomed request must not spend an AI call: identity gate and field
    // validation run before the one suspension point on this path. The store
    // lock is only taken after classification completes.
    state.store.admit(&author, &input)?;
    let classification = state.classifier.classify(&input.description).await;

    let complaint = state.store.create(&author, input, classification)?;
    Ok((StatusCode::CREATED, Json(complaint)))
}

async fn get_complaint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> DeskResult<Json<Complaint>> {
    Ok(Json(state.store.get(ComplaintId(id))?))
}

#[derive(serde::Deserialize)]
struct UpdateStatusReq {
    actor_id: Uuid,
    status: Status,
    #[serde(default)]
    assigned_officer: Option<Uuid>,
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusReq>,
) -> DeskResult<Json<Complaint>> {
    let actor = resolve_actor(&state, body.actor_id)?;

    // Assignees must exist and wear the officer role before the transition is
    // even attempted.
    let set_officer = match body.assigned_officer {
        Some(oid) => {
            let officer = resolve_actor(&state, oid)?;
            if officer.role != Role::Officer {
                return Err(DeskError::Validation(format!(
                    "actor {} is not an officer",
                    officer.id
                )));
            }
            Some(officer.id)
        }
        None => None,
    };

    let updated = state
        .store
        .update_status(&actor, ComplaintId(id), body.status, set_officer)?;
    Ok(Json(updated))
}

#[derive(serde::Deserialize)]
struct AppendNoteReq {
    actor_id: Uuid,
    note: String,
}

async fn append_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AppendNoteReq>,
) -> DeskResult<(StatusCode, Json<Vec<InvestigationNote>>)> {
    let actor = resolve_actor(&state, body.actor_id)?;
    let notes = state
        .investigation
        .append(&actor, ComplaintId(id), &body.note)?;
    Ok((StatusCode::CREATED, Json(notes)))
}

async fn list_notes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> DeskResult<Json<Vec<InvestigationNote>>> {
    Ok(Json(state.investigation.notes(ComplaintId(id))?))
}

async fn get_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(stats::project(&state.store.snapshot()))
}

#[derive(serde::Deserialize)]
struct RegisterCitizenReq {
    name: String,
    email: String,
    #[serde(default)]
    phone: String,
    /// Reference to the uploaded identity document, if any.
    #[serde(default)]
    document_ref: Option<String>,
}

async fn register_citizen(
    State(state): State<AppState>,
    Json(body): Json<RegisterCitizenReq>,
) -> DeskResult<(StatusCode, Json<Actor>)> {
    let scan: Option<DocumentScan> = match body.document_ref.as_deref() {
        Some(doc) => Some(state.gate.check_document(doc).await),
        None => None,
    };
    let actor = state
        .actors
        .register_citizen(&body.name, &body.email, &body.phone, scan)?;
    Ok((StatusCode::CREATED, Json(actor)))
}

#[derive(serde::Deserialize)]
struct RegisterOfficerReq {
    admin_id: Uuid,
    name: String,
    email: String,
    #[serde(default)]
    phone: String,
    badge_id: String,
}

async fn register_officer(
    State(state): State<AppState>,
    Json(body): Json<RegisterOfficerReq>,
) -> DeskResult<(StatusCode, Json<Actor>)> {
    let admin = resolve_actor(&state, body.admin_id)?;
    let actor = state.actors.register_officer(
        &admin,
        &body.name,
        &body.email,
        &body.phone,
        &body.badge_id,
    )?;
    Ok((StatusCode::CREATED, Json(actor)))
}

#[derive(serde::Deserialize)]
struct RegisterAdminReq {
    name: String,
    email: String,
    #[serde(default)]
    phone: String,
}

async fn register_admin(
    State(state): State<AppState>,
    Json(body): Json<RegisterAdminReq>,
) -> DeskResult<(StatusCode, Json<Actor>)> {
    let actor = state
        .actors
        .register_admin(&body.name, &body.email, &body.phone)?;
    Ok((StatusCode::CREATED, Json(actor)))
}

#[derive(serde::Deserialize)]
struct IdentityDecisionReq {
    admin_id: Uuid,
    decision: IdentityStatus,
    #[serde(default)]
    remark: String,
}

async fn decide_identity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<IdentityDecisionReq>,
) -> DeskResult<Json<Actor>> {
    let admin = resolve_actor(&state, body.admin_id)?;
    let updated =
        state
            .actors
            .decide_identity(&admin, ActorId(id), body.decision, &body.remark)?;
    Ok(Json(updated))
}

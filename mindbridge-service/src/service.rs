use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::{Next, from_fn},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
};
use mindbridge_core::analytics::{
    CohortSummary, OverviewFilter, PatientOverview, patient_overviews,
};
use mindbridge_core::report::{
    clinical_report_file_name, format_clinical_report, format_patient_report,
    patient_report_file_name,
};
use mindbridge_core::{
    InMemoryPatientStore, MentalHealthAnalyzer, MindBridgeError, PatientRecord, PatientStore,
    Session,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        ValidationError, display_name, validate_ic_number, validate_patient_login, verify_doctor,
    },
    config::ServiceConfig,
    models::{
        ChatRequest, ChatResponse, ConversationSummaryRequest, ConversationSummaryResponse,
        DoctorLoginRequest, DoctorLoginResponse, DoctorNotesRequest, PatientLoginRequest,
        PatientProfile, SessionView,
    },
    workflow::{ChatTurnError, run_chat_turn},
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn unauthorized_error(message: &str) -> ApiError {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, ic_number: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "ic_number": ic_number
        })),
    )
}

fn validation_error(e: ValidationError) -> ApiError {
    match e {
        ValidationError::InvalidCredentials => unauthorized_error(&e.to_string()),
        _ => bad_request_error(&e.to_string()),
    }
}

fn store_error(e: MindBridgeError) -> ApiError {
    match e {
        MindBridgeError::PatientNotFound(ic_number) => {
            not_found_error("Patient record not found", &ic_number)
        }
        MindBridgeError::SessionNotFound { ic_number, .. } => {
            not_found_error("Session not found", &ic_number)
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub patients: Arc<dyn PatientStore>,
    pub analyzer: Arc<MentalHealthAnalyzer>,
}

impl AppState {
    /// Demo patient records with the analyzer described by `config`.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            patients: Arc::new(InMemoryPatientStore::with_demo_patients()),
            analyzer: Arc::new(MentalHealthAnalyzer::from_config(&config.analyzer)),
        }
    }
}

pub fn create_app(config: &ServiceConfig) -> Router {
    build_router(AppState::from_config(config))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/patients/login", post(patient_login))
        .route("/patients/{ic}", get(get_patient))
        .route("/patients/{ic}/chat", post(chat))
        .route("/patients/{ic}/chat/summary", post(chat_summary))
        .route("/patients/{ic}/sessions", get(list_sessions))
        .route("/patients/{ic}/sessions/{n}/report", get(patient_report))
        .route("/doctors/login", post(doctor_login))
        .route("/doctors/patients", get(doctor_patient_list))
        .route("/doctors/analytics", get(analytics))
        .route(
            "/doctors/patients/{ic}/sessions/{n}/notes",
            put(update_doctor_notes),
        )
        .route(
            "/doctors/patients/{ic}/sessions/{n}/report",
            get(clinical_report),
        )
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tags each request with a fresh correlation id and runs it inside an
/// `http_request` span carrying that id.
async fn correlation_id_middleware(mut request: Request<axum::body::Body>, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "MindBridge Mental Health Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "AI-assisted mental health screening of patient conversations",
        "endpoints": {
            "POST /patients/login": "Validate IC number and consent, return the patient profile",
            "GET /patients/{ic}": "Patient profile",
            "POST /patients/{ic}/chat": "Send a message, get a supportive reply and an analysis",
            "POST /patients/{ic}/chat/summary": "Analyze a whole conversation without storing it",
            "GET /patients/{ic}/sessions": "Stored chat sessions with recommendations",
            "GET /patients/{ic}/sessions/{n}/report": "Download the patient report of session n",
            "POST /doctors/login": "Clinician login",
            "GET /doctors/patients": "Patient list (filters: risk_level, gender, min_sessions)",
            "GET /doctors/analytics": "Cohort analytics",
            "PUT /doctors/patients/{ic}/sessions/{n}/notes": "Save clinical notes for session n",
            "GET /doctors/patients/{ic}/sessions/{n}/report": "Download the clinical report of session n",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn load_patient(state: &AppState, ic_number: &str) -> Result<PatientRecord, ApiError> {
    validate_ic_number(ic_number).map_err(validation_error)?;
    state
        .patients
        .get(ic_number)
        .await
        .map_err(store_error)?
        .ok_or_else(|| not_found_error("Patient record not found", ic_number))
}

/// Resolves a 1-based session number from the URL.
async fn load_session(
    state: &AppState,
    ic_number: &str,
    session_number: usize,
) -> Result<(PatientRecord, Session), ApiError> {
    let patient = load_patient(state, ic_number).await?;
    let session = session_number
        .checked_sub(1)
        .and_then(|index| patient.chat_sessions.get(index))
        .cloned()
        .ok_or_else(|| not_found_error("Session not found", ic_number))?;
    Ok((patient, session))
}

fn text_attachment(file_name: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

async fn patient_login(
    State(state): State<AppState>,
    Json(request): Json<PatientLoginRequest>,
) -> ApiResult<PatientProfile> {
    validate_patient_login(&request.ic_number, request.consent).map_err(validation_error)?;
    let patient = load_patient(&state, &request.ic_number).await?;

    info!(ic_number = %request.ic_number, "Patient logged in");
    Ok(Json(PatientProfile::from_record(&request.ic_number, patient)))
}

async fn get_patient(
    State(state): State<AppState>,
    Path(ic_number): Path<String>,
) -> ApiResult<PatientProfile> {
    let patient = load_patient(&state, &ic_number).await?;
    Ok(Json(PatientProfile::from_record(&ic_number, patient)))
}

async fn chat(
    State(state): State<AppState>,
    Path(ic_number): Path<String>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    validate_ic_number(&ic_number).map_err(validation_error)?;

    let turn = run_chat_turn(
        state.patients.as_ref(),
        &state.analyzer,
        &ic_number,
        &request.message,
        request.history,
    )
    .await
    .map_err(|e| match e {
        ChatTurnError::Validation(e) => validation_error(e),
        ChatTurnError::Store(e) => store_error(e),
    })?;

    Ok(Json(ChatResponse {
        reply: turn.reply,
        analysis: turn.analysis,
        recommendations: turn.recommendations,
        session_index: turn.session_index + 1,
        messages: turn.messages,
    }))
}

async fn chat_summary(
    State(state): State<AppState>,
    Path(ic_number): Path<String>,
    Json(request): Json<ConversationSummaryRequest>,
) -> ApiResult<ConversationSummaryResponse> {
    load_patient(&state, &ic_number).await?;

    let analysis = state.analyzer.analyze_conversation(&request.messages).await;
    let recommendations = analysis.as_ref().map(|a| state.analyzer.recommend(a));

    Ok(Json(ConversationSummaryResponse {
        analysis,
        recommendations,
    }))
}

async fn list_sessions(
    State(state): State<AppState>,
    Path(ic_number): Path<String>,
) -> ApiResult<Vec<SessionView>> {
    let patient = load_patient(&state, &ic_number).await?;

    let sessions = patient
        .chat_sessions
        .into_iter()
        .enumerate()
        .map(|(index, session)| SessionView::new(index + 1, session))
        .collect();
    Ok(Json(sessions))
}

async fn patient_report(
    State(state): State<AppState>,
    Path((ic_number, session_number)): Path<(String, usize)>,
) -> Result<Response, ApiError> {
    let (patient, session) = load_session(&state, &ic_number, session_number).await?;

    let report = format_patient_report(&session, &patient);
    Ok(text_attachment(
        &patient_report_file_name(session_number),
        report,
    ))
}

async fn doctor_login(Json(request): Json<DoctorLoginRequest>) -> ApiResult<DoctorLoginResponse> {
    if let Err(e) = verify_doctor(&request.username, &request.password) {
        warn!(username = %request.username, "Rejected clinician login");
        return Err(validation_error(e));
    }

    info!(username = %request.username, "Clinician logged in");
    Ok(Json(DoctorLoginResponse {
        message: format!("Welcome, {}!", display_name(&request.username)),
        username: request.username,
    }))
}

async fn doctor_patient_list(
    State(state): State<AppState>,
    Query(filter): Query<OverviewFilter>,
) -> ApiResult<Vec<PatientOverview>> {
    let patients = state.patients.list().await.map_err(store_error)?;

    Ok(Json(patient_overviews(
        patients.iter().map(|(ic, record)| (ic.as_str(), record)),
        &filter,
    )))
}

async fn analytics(State(state): State<AppState>) -> ApiResult<CohortSummary> {
    let patients = state.patients.list().await.map_err(store_error)?;

    Ok(Json(CohortSummary::from_records(
        patients.iter().map(|(_, record)| record),
    )))
}

async fn update_doctor_notes(
    State(state): State<AppState>,
    Path((ic_number, session_number)): Path<(String, usize)>,
    Json(request): Json<DoctorNotesRequest>,
) -> ApiResult<Value> {
    validate_ic_number(&ic_number).map_err(validation_error)?;
    let index = session_number
        .checked_sub(1)
        .ok_or_else(|| not_found_error("Session not found", &ic_number))?;

    state
        .patients
        .update_doctor_notes(&ic_number, index, request.notes)
        .await
        .map_err(store_error)?;

    info!(ic_number = %ic_number, session_number, "Clinical notes saved");
    Ok(Json(json!({
        "ic_number": ic_number,
        "session_number": session_number,
        "status": "saved"
    })))
}

async fn clinical_report(
    State(state): State<AppState>,
    Path((ic_number, session_number)): Path<(String, usize)>,
) -> Result<Response, ApiError> {
    let (patient, session) = load_session(&state, &ic_number, session_number).await?;

    let report = format_clinical_report(
        &session,
        &patient,
        session.doctor_notes.as_deref().unwrap_or_default(),
    );
    Ok(text_attachment(
        &clinical_report_file_name(&patient.name, session_number),
        report,
    ))
}

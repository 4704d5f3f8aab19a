use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::editor::{ClassDraft, EntityDraft, HolidayDraft, VacationDraft};
use crate::manager::{CalendarManager, LOAD_FAILED_MESSAGE, ManagerError, SAVE_FAILED_MESSAGE};
use crate::persistence::SharedBackend;
use crate::status::StatusSnapshot;
use crate::validation::FieldErrors;
use crate::views;
use crate::{Entity, EntityKind, VacationPeriod};

pub type SharedManager = Arc<RwLock<CalendarManager<SharedBackend, SharedBackend>>>;

#[derive(Clone)]
pub struct AppState {
    manager: SharedManager,
}

impl AppState {
    pub fn new(manager: CalendarManager<SharedBackend, SharedBackend>) -> Self {
        Self {
            manager: Arc::new(RwLock::new(manager)),
        }
    }

    pub fn with_shared(manager: SharedManager) -> Self {
        Self { manager }
    }

    fn manager(&self) -> SharedManager {
        self.manager.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

#[derive(Debug)]
struct ApiError(ManagerError);

impl From<ManagerError> for ApiError {
    fn from(value: ManagerError) -> Self {
        ApiError(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            ManagerError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "invalid_request",
                    message: "some fields are invalid".into(),
                    fields: Some(fields),
                },
            ),
            ManagerError::NotFound { kind, id } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "not_found",
                    message: format!("no {kind} with id '{id}'"),
                    fields: None,
                },
            ),
            ManagerError::EditorClosed(kind) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    error: "conflict",
                    message: format!("the {kind} editor is not open"),
                    fields: None,
                },
            ),
            ManagerError::Load(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "internal_error",
                    message: LOAD_FAILED_MESSAGE.into(),
                    fields: None,
                },
            ),
            ManagerError::Save { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "internal_error",
                    message: SAVE_FAILED_MESSAGE.into(),
                    fields: None,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VacationRow<'a> {
    #[serde(flatten)]
    period: &'a VacationPeriod,
    duration_days: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(get_status))
        .route("/schedule", get(get_schedule))
        .route("/classes", axum::routing::post(save_class))
        .route("/classes/:id", delete(delete_class))
        .route("/holidays", get(list_holidays).post(save_holiday))
        .route("/holidays/:id", delete(delete_holiday))
        .route("/vacations", get(list_vacations).post(save_vacation))
        .route("/vacations/:id", delete(delete_vacation))
        .route("/groups", get(list_groups))
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    manager: CalendarManager<SharedBackend, SharedBackend>,
) -> std::io::Result<()> {
    let state = AppState::new(manager);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "school calendar API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    let manager = state.manager();
    let mut guard = manager.write();
    guard.tick();
    Json(guard.status().snapshot())
}

async fn get_schedule(State(state): State<AppState>) -> Response {
    let manager = state.manager();
    let guard = manager.read();
    Json(views::class_list(guard.schedule())).into_response()
}

async fn list_holidays(State(state): State<AppState>) -> Response {
    let manager = state.manager();
    let guard = manager.read();
    Json(views::holiday_list(guard.holidays())).into_response()
}

async fn list_vacations(State(state): State<AppState>) -> Response {
    let manager = state.manager();
    let guard = manager.read();
    let rows: Vec<VacationRow<'_>> = views::vacation_list(guard.vacations())
        .into_iter()
        .map(|period| VacationRow {
            period,
            duration_days: period.duration_days(),
        })
        .collect();
    Json(rows).into_response()
}

async fn list_groups(State(state): State<AppState>) -> Json<Vec<String>> {
    let manager = state.manager();
    let mut guard = manager.write();
    guard.refresh_group_options();
    Json(guard.group_options().to_vec())
}

fn save_draft(state: &AppState, draft: EntityDraft) -> Result<Response, ApiError> {
    let manager = state.manager();
    let mut guard = manager.write();
    let body = match guard.submit_draft(draft)? {
        Entity::Class(session) => json!(session),
        Entity::Holiday(holiday) => json!(holiday),
        Entity::Vacation(period) => json!(period),
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

fn delete_by_id(state: &AppState, kind: EntityKind, id: String) -> Result<Response, ApiError> {
    let manager = state.manager();
    let mut guard = manager.write();
    if guard.delete_entity(kind, &id)? {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(ApiError(ManagerError::NotFound { kind, id }))
    }
}

async fn save_class(
    State(state): State<AppState>,
    Json(draft): Json<ClassDraft>,
) -> Result<Response, ApiError> {
    save_draft(&state, EntityDraft::Class(draft))
}

async fn save_holiday(
    State(state): State<AppState>,
    Json(draft): Json<HolidayDraft>,
) -> Result<Response, ApiError> {
    save_draft(&state, EntityDraft::Holiday(draft))
}

async fn save_vacation(
    State(state): State<AppState>,
    Json(draft): Json<VacationDraft>,
) -> Result<Response, ApiError> {
    save_draft(&state, EntityDraft::Vacation(draft))
}

async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    delete_by_id(&state, EntityKind::Class, id)
}

async fn delete_holiday(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    delete_by_id(&state, EntityKind::Holiday, id)
}

async fn delete_vacation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    delete_by_id(&state, EntityKind::Vacation, id)
}

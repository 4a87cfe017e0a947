//! HTTP request handlers for the timesheet API.
//!
//! Every endpoint authenticates the caller through the `X-Actor-Id`
//! header against the actor directory, tags the request with a
//! correlation id, and maps engine errors to status codes through
//! [`ApiErrorResponse`].

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{Actor, ApprovalAction, Timesheet};

use super::request::{
    ApprovalActionRequest, CreateTimesheetRequest, QuoteRequest, UpdateTimesheetRequest,
};
use super::response::{ApiError, ApiErrorResponse, ApprovalActionResponse};
use super::state::AppState;

/// The header carrying the caller's identity.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/timesheets", post(create_timesheet))
        .route("/api/timesheets/quote", post(quote_timesheet))
        .route(
            "/api/timesheets/:id",
            get(get_timesheet)
                .put(update_timesheet)
                .delete(delete_timesheet),
        )
        .route("/api/timesheets/:id/confirm", put(tutor_confirm))
        .route("/api/approvals", post(perform_approval))
        .with_state(state)
}

/// Handler for `POST /api/timesheets`.
async fn create_timesheet(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateTimesheetRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing timesheet creation");

    let actor = match require_actor(&state, &headers, correlation_id).await {
        Ok(actor) => actor,
        Err(response) => return response.into_response(),
    };
    let request = match parse_json(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response.into_response(),
    };

    match state.service().create(&actor, request.into()).await {
        Ok(timesheet) => {
            info!(
                correlation_id = %correlation_id,
                timesheet_id = %timesheet.id,
                rate_code = %timesheet.rate_code,
                amount = %timesheet.amount,
                status = %timesheet.status,
                "Timesheet created"
            );
            (StatusCode::CREATED, Json(timesheet)).into_response()
        }
        Err(err) => fail(correlation_id, "Timesheet creation failed", err),
    }
}

/// Handler for `PUT /api/timesheets/{id}`.
async fn update_timesheet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    payload: Result<Json<UpdateTimesheetRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, timesheet_id = %id, "Processing timesheet update");

    let actor = match require_actor(&state, &headers, correlation_id).await {
        Ok(actor) => actor,
        Err(response) => return response.into_response(),
    };
    let request = match parse_json(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response.into_response(),
    };

    match state.service().update(&actor, id, request.into()).await {
        Ok(timesheet) => {
            info!(
                correlation_id = %correlation_id,
                timesheet_id = %timesheet.id,
                rate_code = %timesheet.rate_code,
                amount = %timesheet.amount,
                "Timesheet updated"
            );
            (StatusCode::OK, Json(timesheet)).into_response()
        }
        Err(err) => fail(correlation_id, "Timesheet update failed", err),
    }
}

/// Handler for `POST /api/timesheets/quote` — dry-run rate resolution.
async fn quote_timesheet(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing quote request");

    if let Err(response) = require_actor(&state, &headers, correlation_id).await {
        return response.into_response();
    }
    let request = match parse_json(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response.into_response(),
    };

    match state.service().quote(&request.into()).await {
        Ok(resolution) => {
            info!(
                correlation_id = %correlation_id,
                rate_code = %resolution.rate_code,
                amount = %resolution.amount,
                effective_repeat = resolution.effective_repeat,
                "Quote resolved"
            );
            (StatusCode::OK, Json(resolution)).into_response()
        }
        Err(err) => fail(correlation_id, "Quote failed", err),
    }
}

/// Handler for `POST /api/approvals`.
async fn perform_approval(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ApprovalActionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing approval action");

    let actor = match require_actor(&state, &headers, correlation_id).await {
        Ok(actor) => actor,
        Err(response) => return response.into_response(),
    };
    let request = match parse_json(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response.into_response(),
    };

    run_action(
        &state,
        correlation_id,
        &actor,
        request.timesheet_id,
        request.action,
        request.comment,
    )
    .await
}

/// Handler for `PUT /api/timesheets/{id}/confirm` — convenience alias for
/// `TUTOR_CONFIRM` under the caller's identity.
async fn tutor_confirm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, timesheet_id = %id, "Processing tutor confirmation");

    let actor = match require_actor(&state, &headers, correlation_id).await {
        Ok(actor) => actor,
        Err(response) => return response.into_response(),
    };

    run_action(
        &state,
        correlation_id,
        &actor,
        id,
        ApprovalAction::TutorConfirm,
        None,
    )
    .await
}

/// Handler for `GET /api/timesheets/{id}`.
async fn get_timesheet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let correlation_id = Uuid::new_v4();

    if let Err(response) = require_actor(&state, &headers, correlation_id).await {
        return response.into_response();
    }

    match state.service().get(id).await {
        Ok(timesheet) => (StatusCode::OK, Json(timesheet)).into_response(),
        Err(err) => fail(correlation_id, "Timesheet fetch failed", err),
    }
}

/// Handler for `DELETE /api/timesheets/{id}`.
async fn delete_timesheet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, timesheet_id = %id, "Processing timesheet removal");

    let actor = match require_actor(&state, &headers, correlation_id).await {
        Ok(actor) => actor,
        Err(response) => return response.into_response(),
    };

    match state.service().delete(&actor, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => fail(correlation_id, "Timesheet removal failed", err),
    }
}

async fn run_action(
    state: &AppState,
    correlation_id: Uuid,
    actor: &Actor,
    timesheet_id: Uuid,
    action: ApprovalAction,
    comment: Option<String>,
) -> Response {
    match state
        .service()
        .perform_action(actor, timesheet_id, action, comment)
        .await
    {
        Ok(timesheet) => {
            info!(
                correlation_id = %correlation_id,
                timesheet_id = %timesheet.id,
                action = %action,
                new_status = %timesheet.status,
                actor_id = %actor.id,
                "Approval action performed"
            );
            let response = approval_response(&timesheet, action, actor);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => fail(correlation_id, "Approval action failed", err),
    }
}

/// Logs a failed request and converts the engine error into the HTTP
/// error response, tagged with the correlation id.
fn fail(correlation_id: Uuid, context: &str, err: EngineError) -> Response {
    match &err {
        EngineError::PolicyConfiguration { .. } | EngineError::NoEffectiveRate { .. } => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "{}: policy data integrity problem", context
            );
        }
        _ => {
            warn!(correlation_id = %correlation_id, error = %err, "{}", context);
        }
    }
    ApiErrorResponse::from(err)
        .correlated(correlation_id)
        .into_response()
}

fn approval_response(
    timesheet: &Timesheet,
    action: ApprovalAction,
    actor: &Actor,
) -> ApprovalActionResponse {
    ApprovalActionResponse {
        timesheet_id: timesheet.id,
        action,
        confirmed: action.is_confirmation(),
        rejected: action == ApprovalAction::Reject,
        modification_requested: action == ApprovalAction::RequestModification,
        new_status: timesheet.status,
        next_actions: crate::workflow::next_actions(timesheet.status),
        actor_id: actor.id.clone(),
        actor_name: actor.name.clone(),
        timestamp: timesheet.updated_at,
    }
}

async fn require_actor(
    state: &AppState,
    headers: &HeaderMap,
    correlation_id: Uuid,
) -> Result<Actor, ApiErrorResponse> {
    let Some(actor_id) = headers.get(ACTOR_HEADER).and_then(|v| v.to_str().ok()) else {
        warn!(correlation_id = %correlation_id, "Missing X-Actor-Id header");
        return Err(ApiErrorResponse {
            status: StatusCode::FORBIDDEN,
            error: ApiError::missing_actor().correlated(correlation_id),
        });
    };
    state.service().actor(actor_id).await.map_err(|err| {
        warn!(
            correlation_id = %correlation_id,
            actor_id = %actor_id,
            "Unknown actor"
        );
        ApiErrorResponse::from(err).correlated(correlation_id)
    })
}

fn parse_json<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::new("VALIDATION_ERROR", body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            Err(ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: error.correlated(correlation_id),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::policy::PolicyLoader;
    use crate::service::TimesheetService;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let policy = PolicyLoader::load("./config/ea2023")
            .expect("Failed to load policy")
            .snapshot()
            .clone();
        let actors = vec![
            Actor {
                id: "tutor_001".to_string(),
                name: "Alex Nguyen".to_string(),
                role: Role::Tutor,
                course_assignments: vec![],
            },
            Actor {
                id: "lecturer_001".to_string(),
                name: "Sam Patel".to_string(),
                role: Role::Lecturer,
                course_assignments: vec!["COMP2022".to_string()],
            },
        ];
        AppState::new(TimesheetService::new(policy, actors))
    }

    fn create_body() -> String {
        r#"{
            "tutor_id": "tutor_001",
            "course_id": "COMP2022",
            "session_date": "2024-07-15",
            "task_type": "TUTORIAL",
            "qualification": "PHD",
            "delivery_hours": "1.0"
        }"#
        .to_string()
    }

    fn post(uri: &str, actor: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(actor) = actor {
            builder = builder.header("X-Actor-Id", actor);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_create_returns_201_with_computed_fields() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(post("/api/timesheets", Some("lecturer_001"), create_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let timesheet: Timesheet = serde_json::from_slice(&body).unwrap();
        assert_eq!(timesheet.rate_code, "TU1");
        assert_eq!(timesheet.amount.to_string(), "210.19");
    }

    #[tokio::test]
    async fn test_missing_actor_header_returns_403() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(post("/api/timesheets", None, create_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MISSING_ACTOR");
        assert!(error.correlation_id.is_some());
    }

    #[tokio::test]
    async fn test_unknown_actor_returns_403() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(post("/api/timesheets", Some("ghost"), create_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(post(
                "/api/timesheets/quote",
                Some("lecturer_001"),
                "{invalid json".to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_get_unknown_timesheet_returns_404() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/api/timesheets/{}", Uuid::new_v4()))
                    .header("X-Actor-Id", "lecturer_001")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "TIMESHEET_NOT_FOUND");
        assert!(error.correlation_id.is_some());
    }
}

//! HTTP handlers for the REST API.
//!
//! Each handler validates auth where required, then delegates to the
//! coordinator or repository. Mutation endpoints require a manager/admin
//! session token; reads are open.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast::error::RecvError;

use super::dto::*;
use super::error::AppError;
use super::state::AppState;
use crate::api::{Branch, BranchId, Employee, EmployeeId, FinalizedSchedule, Shift, ShiftId};
use crate::auth::AuthContext;
use crate::coordinator::{
    AddEmployeeRequest, CreateShiftRequest, DeleteShiftRequest, UpdateSettingsRequest,
    UpdateShiftRequest,
};
use crate::db::repository::{
    BranchRepository, EmployeeRepository, FinalizationRepository, FullRepository, ShiftFilter,
    ShiftRepository,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Session lifetime for minted tokens.
const SESSION_TTL_SECS: u64 = 8 * 60 * 60;

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Extract and verify the bearer token, requiring a managing role.
fn require_manager(state: &AppState, headers: &HeaderMap) -> Result<AuthContext, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let context = state
        .auth
        .verify(token, unix_now())
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    if !context.role.can_manage() {
        return Err(AppError::Forbidden);
    }
    Ok(context)
}

// =============================================================================
// Health & auth
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database,
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> HandlerResult<LoginResponse> {
    if request.user_id.is_empty() || request.user_id.contains(':') {
        return Err(AppError::BadRequest("Invalid user id".to_string()));
    }
    let token = state
        .auth
        .issue(&request.user_id, request.role, SESSION_TTL_SECS, unix_now());
    Ok(Json(LoginResponse { token }))
}

// =============================================================================
// Branches
// =============================================================================

/// POST /api/branches
pub async fn create_branch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateBranchRequest>,
) -> HandlerResult<Branch> {
    require_manager(&state, &headers)?;
    if request.name.is_empty() || request.location.is_empty() {
        return Err(AppError::BadRequest(
            "Name and location are required".to_string(),
        ));
    }
    let branch = Branch::new(request.name, request.location);
    state.repository.create_branch(&branch).await?;
    Ok(Json(branch))
}

/// GET /api/branches
pub async fn list_branches(State(state): State<AppState>) -> HandlerResult<Vec<Branch>> {
    Ok(Json(state.repository.list_branches().await?))
}

/// GET /api/branches/{branch_id}
pub async fn get_branch(
    State(state): State<AppState>,
    Path(branch_id): Path<String>,
) -> HandlerResult<Branch> {
    let branch = state
        .repository
        .get_branch(&BranchId::new(branch_id))
        .await?;
    Ok(Json(branch))
}

/// DELETE /api/branches/{branch_id}
pub async fn delete_branch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(branch_id): Path<String>,
) -> HandlerResult<MessageResponse> {
    require_manager(&state, &headers)?;
    state
        .repository
        .delete_branch(&BranchId::new(branch_id))
        .await?;
    Ok(Json(MessageResponse {
        message: "Branch deleted successfully".to_string(),
    }))
}

/// PUT /api/branches/{branch_id}/roles
pub async fn update_roles(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(branch_id): Path<String>,
    Json(request): Json<UpdateRolesRequest>,
) -> HandlerResult<Branch> {
    require_manager(&state, &headers)?;
    let branch = state
        .coordinator
        .update_roles(&BranchId::new(branch_id), request.roles)
        .await?;
    Ok(Json(branch))
}

/// PATCH /api/branches/{branch_id}/settings
pub async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(branch_id): Path<String>,
    Json(body): Json<UpdateSettingsBody>,
) -> HandlerResult<Branch> {
    require_manager(&state, &headers)?;
    let branch = state
        .coordinator
        .update_settings(UpdateSettingsRequest {
            branch_id: BranchId::new(branch_id),
            max_hours_per_day: body.max_hours_per_day,
            regular_employees_max_hours_per_week: body.regular_employees_max_hours_per_week,
        })
        .await?;
    Ok(Json(branch))
}

// =============================================================================
// Employees
// =============================================================================

/// POST /api/branches/{branch_id}/employees
pub async fn add_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(branch_id): Path<String>,
    Json(body): Json<AddEmployeeBody>,
) -> Result<(axum::http::StatusCode, Json<Employee>), AppError> {
    require_manager(&state, &headers)?;
    if body.first_name.is_empty() || body.last_name.is_empty() || body.email.is_empty() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }
    let employee = state
        .coordinator
        .add_employee(AddEmployeeRequest {
            branch_id: BranchId::new(branch_id),
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            phone: body.phone,
            role: body.role,
            employment_type: body.employment_type,
            hours_per_week: body.hours_per_week,
        })
        .await?;
    Ok((axum::http::StatusCode::CREATED, Json(employee)))
}

/// GET /api/branches/{branch_id}/employees
pub async fn list_employees(
    State(state): State<AppState>,
    Path(branch_id): Path<String>,
) -> HandlerResult<Vec<Employee>> {
    let employees = state
        .repository
        .list_employees(&BranchId::new(branch_id))
        .await?;
    Ok(Json(employees))
}

/// DELETE /api/employees/{employee_id}
pub async fn delete_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(employee_id): Path<String>,
) -> HandlerResult<MessageResponse> {
    require_manager(&state, &headers)?;
    state
        .repository
        .delete_employee(&EmployeeId::new(employee_id))
        .await?;
    Ok(Json(MessageResponse {
        message: "Employee deleted successfully".to_string(),
    }))
}

/// POST /api/employees/bulk-update-hours
pub async fn bulk_update_hours(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BulkUpdateHoursRequest>,
) -> HandlerResult<Vec<Employee>> {
    require_manager(&state, &headers)?;
    let updated = state
        .repository
        .bulk_update_hours(&request.updates)
        .await?;
    Ok(Json(updated))
}

// =============================================================================
// Shifts
// =============================================================================

/// POST /api/shifts
pub async fn create_shift(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateShiftRequest>,
) -> Result<(axum::http::StatusCode, Json<CreateOutcome>), AppError> {
    require_manager(&state, &headers)?;
    let outcome = state.coordinator.create_shift(request).await?;
    Ok((axum::http::StatusCode::CREATED, Json(outcome)))
}

/// GET /api/shifts
pub async fn list_shifts(
    State(state): State<AppState>,
    Query(query): Query<ShiftListQuery>,
) -> HandlerResult<Vec<Shift>> {
    let shifts = state
        .repository
        .list_shifts(&ShiftFilter {
            branch_id: query.branch_id,
            employee_id: query.employee_id,
            date_from: query.date_from,
            date_to: query.date_to,
        })
        .await?;
    Ok(Json(shifts))
}

/// DELETE /api/shifts/{shift_id}
pub async fn delete_shift(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(shift_id): Path<String>,
) -> HandlerResult<MessageResponse> {
    require_manager(&state, &headers)?;
    state
        .coordinator
        .delete_shift(DeleteShiftRequest {
            shift_id: ShiftId::new(shift_id),
        })
        .await?;
    Ok(Json(MessageResponse {
        message: "Shift deleted successfully".to_string(),
    }))
}

/// PATCH /api/shifts/{shift_id}
pub async fn update_shift(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(shift_id): Path<String>,
    Json(mut request): Json<UpdateShiftRequest>,
) -> HandlerResult<Shift> {
    require_manager(&state, &headers)?;
    request.shift_id = ShiftId::new(shift_id);
    let shift = state.coordinator.update_shift(request).await?;
    Ok(Json(shift))
}

/// POST /api/shifts/{shift_id}/refresh
///
/// Re-read the denormalized employee/branch names on a shift.
pub async fn refresh_shift(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(shift_id): Path<String>,
) -> HandlerResult<Shift> {
    require_manager(&state, &headers)?;
    let shift = state
        .coordinator
        .refresh_denormalized(&ShiftId::new(shift_id))
        .await?;
    Ok(Json(shift))
}

// =============================================================================
// Finalized schedules
// =============================================================================

/// GET /api/finalized?weekStart=YYYY-MM-DD
pub async fn list_finalized(
    State(state): State<AppState>,
    Query(query): Query<FinalizedQuery>,
) -> HandlerResult<Vec<FinalizedSchedule>> {
    let finalized = state.repository.list_finalized(query.week_start).await?;
    Ok(Json(finalized))
}

/// POST /api/finalized
pub async fn set_finalized(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(key): Json<FinalizedKey>,
) -> HandlerResult<FinalizedSchedule> {
    require_manager(&state, &headers)?;
    let record = state
        .coordinator
        .finalize_employee(&key.employee_id, key.week_start)
        .await?;
    Ok(Json(record))
}

/// DELETE /api/finalized?employeeId=...&weekStart=YYYY-MM-DD
pub async fn delete_finalized(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(key): Query<FinalizedKey>,
) -> HandlerResult<MessageResponse> {
    require_manager(&state, &headers)?;
    state
        .coordinator
        .unfinalize_employee(&key.employee_id, key.week_start)
        .await?;
    Ok(Json(MessageResponse {
        message: "Finalized record(s) deleted for the week".to_string(),
    }))
}

// =============================================================================
// Cross-branch requests & events
// =============================================================================

/// GET /api/pending-requests
pub async fn pending_requests(
    State(state): State<AppState>,
) -> HandlerResult<Vec<crate::api::CrossBranchRequest>> {
    Ok(Json(state.coordinator.pending_requests(chrono::Utc::now())))
}

/// GET /api/events
///
/// Server-sent event stream of every broadcast event. Fire-and-forget: a
/// subscriber that lags far enough to drop events should refetch on
/// reconnect.
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let mut rx = state.event_bus().subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let payload = serde_json::to_string(&event).unwrap_or_default();
                    yield Ok(SseEvent::default().event(event.kind()).data(payload));
                }
                // Dropped events are acceptable degraded mode; keep going.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

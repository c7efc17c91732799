//! Data Transfer Objects for the HTTP API.
//!
//! Mutation request bodies reuse the coordinator's tagged request types;
//! this module adds the path/query shims and small response envelopes.
//! Query parameters keep the camelCase names existing clients send.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{BranchId, EmployeeId, EmploymentType};
use crate::auth::Role;
use crate::db::repository::HoursUpdate;

// Re-export the coordinator request/response types used as bodies.
pub use crate::coordinator::{
    AddEmployeeRequest, CreateOutcome, CreateShiftRequest, UpdateSettingsRequest,
    UpdateShiftRequest,
};

/// Request body for creating a branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBranchRequest {
    pub name: String,
    pub location: String,
}

/// Body for `PUT /api/branches/{id}/roles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRolesRequest {
    pub roles: Vec<crate::api::RoleConfig>,
}

/// Body for `PATCH /api/branches/{id}/settings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsBody {
    #[serde(default)]
    pub max_hours_per_day: Option<u32>,
    #[serde(default)]
    pub regular_employees_max_hours_per_week: Option<u32>,
}

/// Body for `POST /api/branches/{id}/employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEmployeeBody {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: String,
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub hours_per_week: Option<u32>,
}

/// Body for `POST /api/employees/bulk-update-hours`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkUpdateHoursRequest {
    pub updates: Vec<HoursUpdate>,
}

/// Query parameters for `GET /api/shifts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftListQuery {
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

/// Query parameters for `GET /api/finalized`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedQuery {
    pub week_start: NaiveDate,
}

/// Body for `POST /api/finalized` and query for `DELETE /api/finalized`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedKey {
    pub employee_id: EmployeeId,
    pub week_start: NaiveDate,
}

/// Body for `POST /api/auth/login`.
///
/// Identity verification happens upstream; this endpoint only mints a
/// session token for an already-authenticated principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Generic message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

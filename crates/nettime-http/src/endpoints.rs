//! Endpoint paths and request/response types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Paths
// ============================================================================

pub const LOGIN: &str = "/api/login";
pub const LOGOUT: &str = "/api/logout";
pub const SETTINGS: &str = "/api/settings";

pub const CONTAINER_FIELDS: &str = "/api/container/fields";
pub const CONTAINER_ELEMENTS: &str = "/api/container/elements";
pub const CONTAINER_ACTION_EXEC: &str = "/api/container/action/exec";

pub const ASYNC_STATUS: &str = "/api/async/status";
pub const ASYNC_RESPONSE: &str = "/api/async/response";

pub const DAY_RESULTS: &str = "/api/day/results";
pub const ACCESS_CLOCKINGS: &str = "/api/access/clockings";
pub const RESULTS: &str = "/api/results";
pub const DAY_POST: &str = "/api/day/post/";
pub const CLOCKINGS: &str = "/api/clockings";
pub const PLANIFICATION_MANAGER: &str = "/api/planification/manager";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Form body for the login endpoint.
#[derive(Serialize)]
pub struct LoginForm<'a> {
    pub username: &'a str,
    pub pwd: &'a str,
}

/// Response from the login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Query parameters for container fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsQuery<'a> {
    pub container: &'a str,
    pub filter_fields: bool,
}

/// Query parameters for container elements.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementsQuery<'a> {
    pub page_start_index: u32,
    pub page_size: u32,
    pub search: &'a str,
    pub order: &'a str,
    pub desc: &'a str,
    pub container: &'a str,
    pub query: String,
}

/// Query parameters for the async status and response endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery<'a> {
    pub task_id: &'a str,
}

/// Query parameters for per-employee date range jobs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRangeQuery {
    pub id_emp: i64,
    pub date_ini: String,
    pub date_end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<String>,
}

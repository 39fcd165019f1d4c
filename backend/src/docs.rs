#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    handlers::{employees::EmployeeListQuery, leave_requests::RequestListQuery},
    models::{
        employee::{CreateEmployee, Employee, EmployeeStats, UpdateEmployee},
        leave_request::{
            CreateLeaveRequest, DecisionPayload, LeaveCategory, LeaveRequestResponse,
            LeaveRequestStats, LeaveStatus,
        },
        user::{CreateUser, LoginRequest, LoginResponse, UpdateUser, UserResponse},
        PaginatedResponse, PaginationQuery,
    },
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        login_doc,
        refresh_doc,
        me_doc,
        logout_doc,
        submit_request_doc,
        my_requests_doc,
        inbox_doc,
        request_detail_doc,
        advance_request_doc,
        reject_request_doc,
        list_requests_doc,
        delete_request_doc,
        request_stats_doc,
        list_employees_doc,
        create_employee_doc,
        employee_stats_doc,
        employee_detail_doc,
        update_employee_doc,
        delete_employee_doc,
        list_users_doc,
        create_user_doc,
        update_user_doc,
        delete_user_doc
    ),
    components(
        schemas(
            // auth
            LoginRequest,
            LoginResponse,
            // leave requests
            CreateLeaveRequest,
            DecisionPayload,
            LeaveRequestResponse,
            LeaveRequestStats,
            LeaveCategory,
            LeaveStatus,
            PaginatedResponse<LeaveRequestResponse>,
            // employees
            CreateEmployee,
            UpdateEmployee,
            Employee,
            EmployeeStats,
            PaginatedResponse<Employee>,
            // users
            CreateUser,
            UpdateUser,
            UserResponse,
            PaginatedResponse<UserResponse>
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Auth", description = "Login, token refresh, current user, logout"),
        (name = "Leave Requests", description = "Submission and staged review of leave requests"),
        (name = "Employees", description = "Personnel records and head-count statistics"),
        (name = "Users", description = "User account administration")
    ),
    security(("BearerAuth" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_string());

        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Tokens and user payload", body = LoginResponse),
        (status = 401, description = "Bad credentials")
    ),
    tag = "Auth",
    security(())
)]
fn login_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Rotated refresh token and new access token", body = LoginResponse),
        (status = 401, description = "Unknown, expired, or revoked refresh token")
    ),
    tag = "Auth",
    security(())
)]
fn refresh_doc() {}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses((status = 200, description = "The authenticated user", body = UserResponse)),
    tag = "Auth"
)]
fn me_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = serde_json::Value,
    responses((status = 200, description = "Presented refresh token revoked", body = serde_json::Value)),
    tag = "Auth"
)]
fn logout_doc() {}

#[utoipa::path(
    post,
    path = "/api/leave-requests",
    request_body = CreateLeaveRequest,
    responses(
        (status = 200, description = "Created request, parked at its initial stage", body = LeaveRequestResponse),
        (status = 400, description = "Validation failure naming the offending field")
    ),
    tag = "Leave Requests"
)]
fn submit_request_doc() {}

#[utoipa::path(
    get,
    path = "/api/leave-requests/me",
    responses((status = 200, description = "The caller's own requests, newest first", body = [LeaveRequestResponse])),
    tag = "Leave Requests"
)]
fn my_requests_doc() {}

#[utoipa::path(
    get,
    path = "/api/leave-requests/inbox",
    responses(
        (status = 200, description = "Pending requests waiting at the caller's stage, oldest first", body = [LeaveRequestResponse]),
        (status = 403, description = "Caller is not a reviewer")
    ),
    tag = "Leave Requests"
)]
fn inbox_doc() {}

#[utoipa::path(
    get,
    path = "/api/leave-requests/{id}",
    params(("id" = String, Path, description = "Leave request id")),
    responses(
        (status = 200, body = LeaveRequestResponse),
        (status = 403, description = "Not the requester and not a reviewer"),
        (status = 404, description = "No such request")
    ),
    tag = "Leave Requests"
)]
fn request_detail_doc() {}

#[utoipa::path(
    put,
    path = "/api/leave-requests/{id}/advance",
    params(("id" = String, Path, description = "Leave request id")),
    request_body = DecisionPayload,
    responses(
        (status = 200, description = "Request moved forward, approved when the caller held the final stage", body = LeaveRequestResponse),
        (status = 403, description = "Caller's role does not match the request's current stage"),
        (status = 409, description = "Request already decided")
    ),
    tag = "Leave Requests"
)]
fn advance_request_doc() {}

#[utoipa::path(
    put,
    path = "/api/leave-requests/{id}/reject",
    params(("id" = String, Path, description = "Leave request id")),
    request_body = DecisionPayload,
    responses(
        (status = 200, description = "Request rejected at its current stage", body = LeaveRequestResponse),
        (status = 403, description = "Caller's role does not match the request's current stage"),
        (status = 409, description = "Request already decided")
    ),
    tag = "Leave Requests"
)]
fn reject_request_doc() {}

#[utoipa::path(
    get,
    path = "/api/leave-requests",
    params(RequestListQuery),
    responses((status = 200, body = PaginatedResponse<LeaveRequestResponse>)),
    tag = "Leave Requests"
)]
fn list_requests_doc() {}

#[utoipa::path(
    delete,
    path = "/api/leave-requests/{id}",
    params(("id" = String, Path, description = "Leave request id")),
    responses(
        (status = 200, body = serde_json::Value),
        (status = 404, description = "No such request")
    ),
    tag = "Leave Requests"
)]
fn delete_request_doc() {}

#[utoipa::path(
    get,
    path = "/api/leave-requests/stats",
    responses((status = 200, description = "Request totals by status", body = LeaveRequestStats)),
    tag = "Leave Requests"
)]
fn request_stats_doc() {}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeListQuery),
    responses((status = 200, body = PaginatedResponse<Employee>)),
    tag = "Employees"
)]
fn list_employees_doc() {}

#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 200, body = Employee),
        (status = 409, description = "Email already registered")
    ),
    tag = "Employees"
)]
fn create_employee_doc() {}

#[utoipa::path(
    get,
    path = "/api/employees/stats",
    responses((status = 200, description = "Head-count totals by status", body = EmployeeStats)),
    tag = "Employees"
)]
fn employee_stats_doc() {}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(("id" = String, Path, description = "Employee id")),
    responses(
        (status = 200, body = Employee),
        (status = 404, description = "No such employee")
    ),
    tag = "Employees"
)]
fn employee_detail_doc() {}

#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(("id" = String, Path, description = "Employee id")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, body = Employee),
        (status = 404, description = "No such employee"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Employees"
)]
fn update_employee_doc() {}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id" = String, Path, description = "Employee id")),
    responses(
        (status = 200, body = serde_json::Value),
        (status = 404, description = "No such employee")
    ),
    tag = "Employees"
)]
fn delete_employee_doc() {}

#[utoipa::path(
    get,
    path = "/api/users",
    params(PaginationQuery),
    responses((status = 200, body = PaginatedResponse<UserResponse>)),
    tag = "Users"
)]
fn list_users_doc() {}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUser,
    responses(
        (status = 200, body = UserResponse),
        (status = 409, description = "Email already registered")
    ),
    tag = "Users"
)]
fn create_user_doc() {}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUser,
    responses(
        (status = 200, body = UserResponse),
        (status = 404, description = "No such user"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Users"
)]
fn update_user_doc() {}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, body = serde_json::Value),
        (status = 400, description = "Attempted self-deletion"),
        (status = 404, description = "No such user")
    ),
    tag = "Users"
)]
fn delete_user_doc() {}

//! Personnel records managed by the HR head, separate from login accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::rules;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub title: String,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Absent,
    Terminated,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Absent => "absent",
            EmployeeStatus::Terminated => "terminated",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for registering a new personnel record.
pub struct CreateEmployee {
    #[validate(custom(function = "rules::validate_display_name"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "department must be 1-100 characters"))]
    pub department: String,
    #[validate(length(min = 1, max = 100, message = "title must be 1-100 characters"))]
    pub title: String,
    #[serde(default)]
    pub status: EmployeeStatus,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for updating portions of an existing personnel record.
pub struct UpdateEmployee {
    #[validate(custom(function = "rules::validate_display_name"))]
    pub full_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "department must be 1-100 characters"))]
    pub department: Option<String>,
    #[validate(length(min = 1, max = 100, message = "title must be 1-100 characters"))]
    pub title: Option<String>,
    pub status: Option<EmployeeStatus>,
}

/// Head-count tiles shown on the personnel dashboard.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EmployeeStats {
    pub total: i64,
    pub active: i64,
    pub absent: i64,
    pub terminated: i64,
}

impl Employee {
    pub fn new(
        full_name: String,
        email: String,
        department: String,
        title: String,
        status: EmployeeStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            full_name,
            email,
            department,
            title,
            status,
            created_at: now,
            updated_at: now,
        }
    }
}

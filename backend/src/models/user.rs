//! Models that represent user accounts, authentication payloads, and role metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::rules;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of an authenticated user account.
pub struct User {
    /// Unique identifier for the user.
    pub id: String,
    /// Human-readable full name, copied onto requests the user files.
    pub full_name: String,
    /// Unique email address used for login.
    pub email: String,
    /// Argon2 hash of the user's password.
    pub password_hash: String,
    /// Role describing the user's privileges and review duties.
    pub role: UserRole,
    /// Optional link to the personnel record this account belongs to.
    pub employee_id: Option<String>,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp for auditing.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// Supported user roles stored in the database.
///
/// Reviewer roles double as workflow stages: a pending leave request is
/// parked at the role that must look at it next.
pub enum UserRole {
    /// Standard employee with no review duties.
    #[default]
    Employee,
    /// Reviews requests from their department before HR sees them.
    DepartmentHead,
    /// Final reviewer; also administers accounts and personnel records.
    HrHead,
}

impl UserRole {
    /// Returns the canonical snake_case representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Employee => "employee",
            UserRole::DepartmentHead => "department_head",
            UserRole::HrHead => "hr_head",
        }
    }

    /// Returns `true` for roles that act as review stages.
    pub fn is_reviewer(&self) -> bool {
        matches!(self, UserRole::DepartmentHead | UserRole::HrHead)
    }
}

impl Serialize for UserRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            // primary canonical values (snake_case)
            "employee" => Ok(UserRole::Employee),
            "department_head" => Ok(UserRole::DepartmentHead),
            "hr_head" => Ok(UserRole::HrHead),
            // tolerate common legacy casings
            "Employee" | "EMPLOYEE" => Ok(UserRole::Employee),
            "DepartmentHead" | "DEPARTMENT_HEAD" => Ok(UserRole::DepartmentHead),
            "HrHead" | "HR_HEAD" => Ok(UserRole::HrHead),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["employee", "department_head", "hr_head"],
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for creating a new user account.
pub struct CreateUser {
    #[validate(custom(function = "rules::validate_display_name"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom(function = "rules::validate_password_strength"))]
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub employee_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for updating portions of an existing user.
pub struct UpdateUser {
    #[validate(custom(function = "rules::validate_display_name"))]
    pub full_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(custom(function = "rules::validate_password_strength"))]
    pub password: Option<String>,
    pub role: Option<UserRole>,
    /// `Some(None)` clears the link, `None` leaves it untouched.
    #[serde(default, with = "double_option")]
    pub employee_id: Option<Option<String>>,
}

/// Distinguishes an absent field from an explicit `null` in PATCH-style payloads.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<Option<String>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Some(Option::deserialize(deserializer)?))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Credentials submitted by a user attempting to authenticate.
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Authentication tokens returned after a successful login.
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Public-facing representation of a user returned by the API.
pub struct UserResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub employee_id: Option<String>,
}

impl From<User> for UserResponse {
    /// Converts the persistent user model into the API response DTO.
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            role: user.role.as_str().to_string(),
            employee_id: user.employee_id,
        }
    }
}

impl User {
    /// Constructs a new user with freshly generated identifiers.
    pub fn new(
        full_name: String,
        email: String,
        password_hash: String,
        role: UserRole,
        employee_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            full_name,
            email,
            password_hash,
            role,
            employee_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` when the user may act on some review stage.
    pub fn is_reviewer(&self) -> bool {
        self.role.is_reviewer()
    }

    /// Returns `true` when the user holds the `HrHead` role.
    pub fn is_hr_head(&self) -> bool {
        matches!(self.role, UserRole::HrHead)
    }
}

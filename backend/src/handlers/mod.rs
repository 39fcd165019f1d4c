pub mod auth;
pub mod auth_repo;
pub mod employees;
pub mod leave_requests;
pub mod users;

pub use auth::*;
pub use employees::*;
pub use leave_requests::*;
pub use users::*;

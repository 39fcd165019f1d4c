pub mod common;
pub mod employee_repository;
pub mod leave_request_repository;
pub mod user_repository;

pub use employee_repository::{EmployeeFilters, EmployeeRepository, EmployeeRepositoryTrait};
pub use leave_request_repository::{
    LeaveRequestFilters, LeaveRequestRepository, LeaveRequestRepositoryTrait,
};
pub use user_repository::{UserRepository, UserRepositoryTrait};

//! Backend service for staffhub: employee records, user accounts, and the
//! staged review of leave requests.

pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod utils;
pub mod validation;
pub mod workflow;

//! The `taskdeck` library crate.
//!
//! Core business logic for the TaskDeck employee and task management API:
//! domain models, JWT authentication, role-based access policy, pagination,
//! routing configuration, and error handling. The binary (`main.rs`) uses
//! this crate to construct and run the HTTP server.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod policy;
pub mod routes;

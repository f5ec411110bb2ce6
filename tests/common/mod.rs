//! Shared test utilities for admin-records
//!
//! - An axum server speaking the backend contract over real HTTP
//! - Row fixtures in the backend's column naming

#![allow(dead_code)]

pub mod backend;

pub use backend::{control_family_row, submodule_row, MockBackend};

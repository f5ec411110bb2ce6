//! Integration tests for admin-records
//!
//! These run the store, the mutation gateway and the screen runtime against
//! an in-process HTTP backend.

#[path = "../common/mod.rs"]
pub mod common;

pub mod http_contract;
pub mod screen_flow;

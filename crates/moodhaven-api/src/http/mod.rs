//! HTTP/REST API layer for Moodhaven.
//!
//! Axum-based REST API at `/api/` with bearer token authentication, plus
//! the `/ws` realtime chat endpoint.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;

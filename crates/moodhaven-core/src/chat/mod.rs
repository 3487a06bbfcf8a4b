//! Chat session and message persistence abstractions.
//!
//! This module defines the `ChatRepository` trait the infrastructure layer
//! implements, and the `ChatService` session manager built on top of it.

pub mod repository;
pub mod service;

//! Business logic and repository trait definitions for Moodhaven.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the chat session manager, the realtime message
//! relay with its connection registry, and the wellness/auth services.
//! It depends only on `moodhaven-types` -- never on `moodhaven-infra` or any
//! database/IO crate.

pub mod chat;
pub mod relay;
pub mod repository;
pub mod service;

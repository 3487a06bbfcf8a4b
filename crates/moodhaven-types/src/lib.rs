//! Shared domain types for Moodhaven.
//!
//! This crate contains the core domain types used across the platform:
//! User, MoodEntry, ChatSession, ChatMessage, Achievement, CrisisAlert,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod achievement;
pub mod chat;
pub mod crisis;
pub mod error;
pub mod mood;
pub mod user;

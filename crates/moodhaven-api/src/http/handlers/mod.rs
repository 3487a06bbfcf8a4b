//! HTTP request handlers for the REST API and realtime endpoint.

pub mod achievement;
pub mod auth;
pub mod chat;
pub mod mood;
pub mod ws;

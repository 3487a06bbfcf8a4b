//! Realtime message relay: frames, connection registry, and the
//! persist-and-broadcast service behind the `/ws` endpoint.

pub mod frame;
pub mod registry;
pub mod service;

use std::fmt;
use std::str::FromStr;

/// How far a relayed chat message fans out.
///
/// `Global` preserves the historical behavior of delivering every message
/// to every open connection. `Session` delivers only to connections bound
/// to the message's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastScope {
    #[default]
    Global,
    Session,
}

impl fmt::Display for BroadcastScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroadcastScope::Global => write!(f, "global"),
            BroadcastScope::Session => write!(f, "session"),
        }
    }
}

impl FromStr for BroadcastScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "global" => Ok(BroadcastScope::Global),
            "session" => Ok(BroadcastScope::Session),
            other => Err(format!("invalid broadcast scope: '{other}'")),
        }
    }
}

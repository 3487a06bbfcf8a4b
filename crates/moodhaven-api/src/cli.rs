//! CLI argument definitions and the `status` command.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use sqlx::Row;

use moodhaven_core::chat::repository::ChatRepository;
use moodhaven_core::repository::user::UserRepository;

use crate::state::AppState;

/// Moodhaven: mood tracking and anonymous counselor chat.
#[derive(Debug, Parser)]
#[command(name = "mhaven", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the REST API and realtime chat server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1", env = "MOODHAVEN_HOST")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value_t = 5000, env = "MOODHAVEN_PORT")]
        port: u16,

        /// Chat fan-out scope: "global" or "session"
        #[arg(long, default_value = "global", env = "MOODHAVEN_BROADCAST_SCOPE")]
        broadcast_scope: String,
    },

    /// Show storage statistics
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Print user/session/message counts for the local database.
pub async fn status(state: &AppState, json: bool) -> anyhow::Result<()> {
    let users = state.auth_service.user_repo().count_users().await?;
    let sessions = state.chat_service.chat_repo().count_sessions().await?;
    let messages = state.chat_service.chat_repo().count_messages().await?;

    let active_row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_sessions WHERE is_active = 1")
        .fetch_one(&state.db_pool.reader)
        .await?;
    let active_sessions: i64 = active_row.try_get("cnt")?;

    if json {
        let out = serde_json::json!({
            "users": users,
            "chat_sessions": sessions,
            "active_chat_sessions": active_sessions,
            "chat_messages": messages,
            "data_dir": state.data_dir.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        println!(
            "  {} Moodhaven status ({})",
            console::style("📊").bold(),
            console::style(state.data_dir.display()).dim()
        );
        println!();
        println!("  Users:           {}", console::style(users).cyan());
        println!(
            "  Chat sessions:   {} ({} active)",
            console::style(sessions).cyan(),
            console::style(active_sessions).green()
        );
        println!("  Chat messages:   {}", console::style(messages).cyan());
        println!();
    }

    Ok(())
}

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "candychat", version, about = "CandyCode blog chat assistant server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve,

    /// Enter interactive terminal chat mode
    Chat {
        /// Resume an existing session; omit to start a fresh one
        #[arg(short, long)]
        session: Option<Uuid>,
    },

    /// Manage chat sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// List recorded sessions, newest first
    List,

    /// Print the full transcript of a session
    Show {
        id: Uuid,
    },
}

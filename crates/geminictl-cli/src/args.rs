use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "geminictl")]
#[command(about = "Session manager for the Gemini CLI", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Testbed base directory (redirects storage root and identity cache)
    #[arg(long, global = true)]
    pub testbed: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Browse and manage Gemini CLI projects and sessions
    Status {
        /// Clear the identity cache and rebuild it from a fresh scan
        #[arg(long)]
        reset_registry: bool,

        /// Include the full-filesystem sweep when resolving project paths
        #[arg(long)]
        deep: bool,
    },
}

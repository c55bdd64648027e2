mod args;
mod context;
mod handlers;
mod tui;

use anyhow::Result;
use clap::CommandFactory;

pub use args::{Cli, Commands};
use context::ExecutionContext;

pub fn run(cli: Cli) -> Result<()> {
    let ctx = ExecutionContext::new(cli.testbed.as_deref())?;

    match cli.command {
        Some(Commands::Status {
            reset_registry,
            deep,
        }) => handlers::status::handle(&ctx, reset_registry, deep),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

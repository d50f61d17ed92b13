//! AgriDetect Control - CLI client for AgriDetect
//!
//! Answers catalog and chat queries locally and talks to the agrid daemon
//! for status and remote chat.

use agrictl::cli::{Cli, Commands};
use agrictl::commands::{self, Context};
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context {
        json: cli.json,
        daemon: cli.daemon,
        knowledge: cli.knowledge,
    };

    match cli.command {
        Commands::Chat {
            message,
            lang,
            remote,
            session,
        } => commands::chat(&ctx, message, lang, remote, session).await,
        Commands::Diseases { crop, lang } => commands::diseases(&ctx, crop, lang),
        Commands::Show { id, lang } => commands::show(&ctx, &id, lang),
        Commands::Reconcile { label, key, lang } => commands::reconcile(&ctx, label, key, lang),
        Commands::Status => commands::status(&ctx).await,
        Commands::Completions { shell } => commands::completions(shell),
    }
}

//! Command-line argument parsing
//!
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// AgriDetect CLI
#[derive(Parser)]
#[command(name = "agrictl")]
#[command(about = "AgriDetect - plant disease catalog and assistant", long_about = None)]
#[command(version = agri_shared::VERSION)]
pub struct Cli {
    /// JSON knowledge file replacing the built-in catalog
    #[arg(long, global = true)]
    pub knowledge: Option<PathBuf>,

    /// Output JSON only
    #[arg(long, global = true)]
    pub json: bool,

    /// Daemon base URL for remote commands
    #[arg(long, global = true, default_value = agri_shared::DEFAULT_DAEMON_URL)]
    pub daemon: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Ask the assistant a question (reads lines from stdin when no message is given)
    Chat {
        /// Message words
        message: Vec<String>,

        /// Reply language: fr, wo or pu
        #[arg(long, short = 'l')]
        lang: Option<String>,

        /// Send to the daemon instead of answering locally
        #[arg(long)]
        remote: bool,

        /// Daemon session id (remote only; generated when omitted)
        #[arg(long)]
        session: Option<String>,
    },

    /// List catalog diseases
    Diseases {
        /// Only diseases of this crop (any language)
        #[arg(long)]
        crop: Option<String>,

        #[arg(long, short = 'l')]
        lang: Option<String>,
    },

    /// Show one disease fact sheet
    Show {
        /// Catalog id, e.g. tomato_late_blight
        id: String,

        #[arg(long, short = 'l')]
        lang: Option<String>,
    },

    /// Map a classifier label onto the catalog
    Reconcile {
        /// Classifier label, e.g. Tomato_Late_blight
        label: Option<String>,

        /// Classifier key, tried as a catalog id first
        #[arg(long)]
        key: Option<String>,

        #[arg(long, short = 'l')]
        lang: Option<String>,
    },

    /// Show daemon health
    Status,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

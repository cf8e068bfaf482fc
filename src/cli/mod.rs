use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CommentCraft - platform-aware comment suggestions for social posts.
#[derive(Parser, Debug)]
#[command(name = "commentcraft")]
#[command(version = "0.1.0")]
#[command(about = "Generate safe, platform-appropriate comment suggestions.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate comment suggestions for a captured page
    Suggest {
        /// Page URL, used to detect the platform
        #[arg(long)]
        url: String,

        /// Path to a saved HTML snapshot of the page
        #[arg(long)]
        html: PathBuf,

        /// Desired tone (defaults to the platform norm)
        #[arg(long)]
        tone: Option<String>,

        /// Length budget in characters (defaults to the platform norm)
        #[arg(long)]
        max_chars: Option<u32>,

        /// Keyword that must not appear in any suggestion (repeatable)
        #[arg(long)]
        avoid: Vec<String>,

        /// Free-text instruction forwarded to the generator
        #[arg(long)]
        instruction: Option<String>,

        /// Generate from this text instead of extracting from the page
        #[arg(long)]
        selection: Option<String>,
    },

    /// Manage the stored API key
    Auth {
        #[command(subcommand)]
        auth_command: AuthCommands,
    },

    /// List supported platforms and their defaults
    Platforms,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store the Gemini API key
    SetKey {
        /// Key value; prompted for interactively when omitted
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show the stored key (masked)
    Show,

    /// Remove the stored key
    Clear,
}

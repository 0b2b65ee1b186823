mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "judgeline-cli")]
#[command(about = "Judgeline CLI - Evaluate code against test cases and manage languages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a submission file ({code, language, testCases}) and print the verdict
    Run {
        /// Path to the submission JSON
        #[arg(short, long)]
        file: PathBuf,

        /// Print the verdict as JSON instead of a summary
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Run a source file once and compare its output with an expected string
    Check {
        /// Path to the source file
        #[arg(short, long)]
        file: PathBuf,

        /// Language identifier (e.g., java, python3, cpp17)
        #[arg(short, long, default_value = "java")]
        language: String,

        /// Expected output
        #[arg(short, long)]
        expected: String,
    },

    /// Send a prompt to the generation backend and print the reply
    Generate {
        /// Prompt text
        #[arg(short, long)]
        prompt: String,
    },

    /// List the language to version index table
    Languages,

    /// Add or update a language in a languages.json file
    AddLang {
        /// Language name (e.g., go, rust)
        #[arg(short, long)]
        name: String,

        /// Backend version index for the language
        #[arg(short, long)]
        version_index: String,

        /// languages.json to update
        #[arg(long, default_value = "config/languages.json")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, json } => {
            commands::run_submission(&file, json).await?;
        }
        Commands::Check {
            file,
            language,
            expected,
        } => {
            commands::check(&file, &language, &expected).await?;
        }
        Commands::Generate { prompt } => {
            commands::generate(&prompt).await?;
        }
        Commands::Languages => {
            commands::list_languages()?;
        }
        Commands::AddLang {
            name,
            version_index,
            path,
        } => {
            commands::add_language(&path, &name, &version_index)?;
        }
    }

    Ok(())
}

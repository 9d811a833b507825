//! Sowline CLI - Scope-of-work budget parsing from the command line

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use sowline_core::LoanType;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sowline - Turn construction budgets into categorized line items
#[derive(Parser)]
#[command(name = "sowline")]
#[command(version)]
#[command(about = "Parse construction scope-of-work documents into budget line items", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default config file
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Parse a scope-of-work document, or every document in a directory
    Parse {
        /// Path to a file or directory
        path: String,

        /// Override the detected file type (MIME type or extension, e.g. pdf)
        #[arg(short = 't', long)]
        file_type: Option<String>,

        /// Skip column-based parsing and go straight to the AI parser
        #[arg(long)]
        ai_only: bool,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,

        /// Loan type used for category display names
        #[arg(short, long, default_value = "fix_flip")]
        loan_type: LoanType,
    },

    /// Show the default line items for a loan type
    Template {
        /// fix_flip or new_construction
        #[arg(default_value = "fix_flip")]
        loan_type: LoanType,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which category a piece of text maps to
    Categorize {
        /// Text to classify, e.g. "Kitchen cabinets"
        text: String,
    },

    /// Check that the configured AI provider is reachable
    Check,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., llm.ollama.model)
        key: String,

        /// Value to set
        value: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sowline=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sowline=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    commands::apply_color_setting();

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value),
        },
        Commands::Parse {
            path,
            file_type,
            ai_only,
            json,
            loan_type,
        } => commands::parse::run(&path, file_type, ai_only, json, loan_type),
        Commands::Template { loan_type, json } => commands::template::run(loan_type, json),
        Commands::Categorize { text } => commands::categorize::run(&text),
        Commands::Check => commands::check::run(),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

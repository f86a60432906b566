// CLI module - command-line argument parsing and handlers
//
// Provides a subcommand for configuration inspection:
// - config --show: Display effective configuration (credential redacted)
// - config --path: Show config file path

use crate::config::{Config, VERSION};
use clap::{Parser, Subcommand};

/// Admin Relay - authenticated CORS relay for a backend API
#[derive(Parser)]
#[command(name = "admin-relay")]
#[command(version = VERSION)]
#[command(about = "Authenticated CORS relay for a backend API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Handle CLI commands. Returns true if a command was handled (exit after).
pub fn handle_cli() -> bool {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { show, path }) => {
            if path {
                handle_config_path();
            } else if show {
                handle_config_show();
            } else {
                // No flag provided, show help
                println!("Usage: admin-relay config [--show|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration (credential redacted)");
                println!("  --path    Show config file path");
            }
            true
        }
        None => false, // No subcommand, run the relay
    }
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    match Config::from_env() {
        Ok(config) => print!("{}", config.to_toml()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

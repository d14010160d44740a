// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Material database command-line interface.
//!
//! This is the main entry point for the `matdb` command.

use clap::{Parser, Subcommand};

mod commands;
mod diagnostic;

/// matdb: parse SCM material property databases into typed catalogs
#[derive(Debug, Parser)]
#[command(name = "matdb")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a database file and report diagnostics
    Check {
        /// The .scm database file
        file: String,
    },

    /// Parse a database file and emit the JSON catalog
    Export {
        /// The .scm database file
        file: String,

        /// Write the catalog here instead of stdout
        #[arg(long)]
        out: Option<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Parse a database file and store its materials in a JSON database
    Import {
        /// The .scm database file
        file: String,

        /// The database file to write
        #[arg(long, default_value = "materials.json")]
        db: String,
    },
}

fn main() {
    // Initialize tracing subscriber only if RUST_LOG is explicitly set,
    // keeping stderr clean for diagnostic rendering otherwise.
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    }

    // Install miette's fancy error handler for diagnostic rendering.
    let _ = miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }));

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check { file } => commands::check::run(&file),
        Command::Export { file, out, pretty } => {
            commands::export::run(&file, out.as_deref(), pretty)
        }
        Command::Import { file, db } => commands::import::run(&file, &db),
    };

    match result {
        Ok(()) => {}
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(error.exit_code());
        }
    }
}

//! Main entry point for the SweFreq CLI.

use clap::{Args, Parser, Subcommand};

use swefreq::{annotate, common, db};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Consequence decoration of VEP-annotated variants for SweFreq"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Annotation related commands.
    Annotate(Annotate),
    /// Database-related commands.
    Db(Db),
}

/// Parsing of "annotate *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Annotate {
    /// The sub command to run
    #[command(subcommand)]
    command: AnnotateCommands,
}

/// Enum supporting the parsing of "annotate *" sub commands.
#[derive(Debug, Subcommand)]
enum AnnotateCommands {
    Seqvars(annotate::seqvars::Args),
}

/// Parsing of "db *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Db {
    /// The sub command to run
    #[command(subcommand)]
    command: DbCommands,
}

/// Enum supporting the parsing of "db *" sub commands.
#[derive(Debug, Subcommand)]
enum DbCommands {
    Create(DbCreate),
}

/// Parsing of "db create *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct DbCreate {
    /// The sub command to run
    #[command(subcommand)]
    command: DbCreateCommands,
}

/// Enum supporting the parsing of "db create *" sub commands.
#[derive(Debug, Subcommand)]
enum DbCreateCommands {
    Variants(db::create::variants::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    tracing::subscriber::with_default(collector, || {
        tracing::info!("SweFreq {} startup", common::version());

        match &cli.command {
            Commands::Annotate(annotate) => match &annotate.command {
                AnnotateCommands::Seqvars(args) => annotate::seqvars::run(&cli.common, args)?,
            },
            Commands::Db(db) => match &db.command {
                DbCommands::Create(db_create) => match &db_create.command {
                    DbCreateCommands::Variants(args) => {
                        db::create::variants::run(&cli.common, args)?
                    }
                },
            },
        }

        tracing::info!("All done. Have a nice day!");

        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}

//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Agenda API - scheduling backend for service businesses
#[derive(Parser, Debug)]
#[command(name = "agenda-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage notification jobs
    Jobs(JobsArgs),
}

/// Arguments for the serve command; unset values come from `Config`
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Drop everything and re-run all migrations
    Fresh,
}

/// Arguments for the jobs command
#[derive(Parser, Debug)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub action: JobsAction,
}

/// Job management actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobsAction {
    /// Start the notification worker
    Work,
    /// Show job queue and notification outbox counts
    List,
    /// Clear failed jobs
    Clear,
    /// Deliver every due pending notification now
    Dispatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_overrides_are_optional() {
        let cli = Cli::try_parse_from(["agenda-api", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert!(args.host.is_none());
                assert!(args.port.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_serve_port_override() {
        let cli = Cli::try_parse_from(["agenda-api", "-v", "serve", "--port", "8080"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, Some(8080)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_jobs_dispatch() {
        let cli = Cli::try_parse_from(["agenda-api", "jobs", "dispatch"]).unwrap();
        match cli.command {
            Commands::Jobs(args) => assert_eq!(args.action, JobsAction::Dispatch),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_migrate_action_is_rejected() {
        assert!(Cli::try_parse_from(["agenda-api", "migrate", "sideways"]).is_err());
    }
}

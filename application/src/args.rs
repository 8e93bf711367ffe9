//! [`Args`] definitions.

use clap::{Parser, Subcommand};

/// Server of the vacation rental booking system.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    /// [`Command`] to run, [`Command::Serve`] by default.
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

/// Command to run.
#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Runs the HTTP server.
    Serve,

    /// Issues a bearer token for accessing the HTTP API.
    IssueToken {
        /// Name of the caller to issue the token to.
        #[arg(short, long)]
        subject: String,
    },
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::{Args, Command};

    #[test]
    fn serves_by_default() {
        let args = Args::try_parse_from(["application"]).unwrap();

        assert_eq!(args.config, "config.toml");
        assert!(args.command.is_none());
    }

    #[test]
    fn issues_token() {
        let args = Args::try_parse_from([
            "application",
            "issue-token",
            "--subject",
            "ops",
            "--config",
            "prod.toml",
        ])
        .unwrap();

        assert_eq!(args.config, "prod.toml");
        assert!(matches!(
            args.command,
            Some(Command::IssueToken { subject }) if subject == "ops",
        ));
    }
}

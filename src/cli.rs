// SPDX-License-Identifier: Apache-2.0

//! Command-line surface. `deploy` is the default when no subcommand is given.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sonarops", version, about = "Deploy SonarQube onto Kubernetes via ArgoCD")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run preflight checks, apply the namespace and Application, wait for
    /// convergence and print a status snapshot
    Deploy,
    /// Print a snapshot of the application, pods, services and volumes
    Status,
    /// Delete the Application and the target namespace
    Delete,
    /// Render the namespace and Application documents as YAML to stdout
    Manifest,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Deploy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_deploy() {
        let cli = Cli::try_parse_from(["sonarops"]).unwrap();
        assert_eq!(cli.command(), Command::Deploy);
    }

    #[test]
    fn test_status_subcommand() {
        let cli = Cli::try_parse_from(["sonarops", "status"]).unwrap();
        assert_eq!(cli.command(), Command::Status);
    }

    #[test]
    fn test_unrecognized_subcommand_is_a_parse_error() {
        assert!(Cli::try_parse_from(["sonarops", "bogus"]).is_err());
    }
}

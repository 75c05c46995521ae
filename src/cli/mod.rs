//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! sentry-provider binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Operator tooling for the Sentry provider core.
#[derive(Parser, Debug)]
#[command(name = "sentry-provider", about = "Sentry provider CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of plain text.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Configure a client and run the health check against the API.
    Check {
        /// Authentication token.
        #[arg(long, env = "SENTRY_AUTH_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// API root, e.g. https://sentry.example.com/api/.
        #[arg(long, env = "SENTRY_BASE_URL")]
        base_url: Option<String>,
    },

    /// List the resource type names.
    Resources,

    /// List the data-source type names.
    DataSources,

    /// Print the schema of a resource or data source.
    Schema {
        /// Full type name, e.g. sentry_project.
        type_name: String,

        /// Look the name up among data sources.
        #[arg(long)]
        data_source: bool,
    },

    /// Split a composite id into its named parts.
    SplitId {
        /// The id, e.g. my-org/my-project/12345.
        id: String,

        /// Names of the parts (two to four).
        #[arg(long, value_delimiter = ',', num_args = 2..=4, required = true)]
        parts: Vec<String>,
    },

    /// Compare two JSON files for semantic equality.
    DiffJson {
        /// The configured document.
        given: PathBuf,

        /// The document read back from the API.
        current: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_split_id() {
        let cli = Cli::try_parse_from([
            "sentry-provider",
            "split-id",
            "acme/web/42",
            "--parts",
            "organization,project-slug,id",
        ])
        .unwrap();
        match cli.command {
            Command::SplitId { id, parts } => {
                assert_eq!(id, "acme/web/42");
                assert_eq!(parts, vec!["organization", "project-slug", "id"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_split_id_needs_parts() {
        assert!(Cli::try_parse_from(["sentry-provider", "split-id", "acme/web"]).is_err());
    }

    #[test]
    fn test_json_flag_is_global() {
        let cli = Cli::try_parse_from(["sentry-provider", "resources", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Resources));
    }
}

//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::future::Future;
use std::path::PathBuf;

use anyhow::Context;
use apkup_core::{Apkup, AuthParams, EditParams, MutationResponse, PublishError};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{load_project_config, ConfigError, ProjectConfig};
use commands::{CompletionsCommand, PromoteCommand, ShareCommand, UploadCommand};

/// apkup - publish Android releases to Google Play
#[derive(Debug, Parser)]
#[command(name = "apkup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a JSON file that contains the private key and client email
    #[arg(short, long, env = "APKUP_KEY", global = true)]
    pub key: Option<PathBuf>,

    /// Name of the package (e.g. com.example.yourapp)
    #[arg(short, long, env = "APKUP_PACKAGE_NAME", global = true)]
    pub package_name: Option<String>,

    /// Path to an apkup.toml / apkup.yaml configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload a release and assign it to a track
    Upload(UploadCommand),

    /// Promote an uploaded version code to a track
    Promote(PromoteCommand),

    /// Share an APK or AAB through internal app sharing
    Share(ShareCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        if let Commands::Completions(ref cmd) = self.command {
            return cmd.execute(&self);
        }

        let cwd = std::env::current_dir()?;
        let project = load_project_config(self.config.as_deref(), &cwd)?;

        match self.command {
            Commands::Upload(ref cmd) => cmd.execute(&self, &project),
            Commands::Promote(ref cmd) => cmd.execute(&self, &project),
            Commands::Share(ref cmd) => cmd.execute(&self, &project),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }

    /// Package the command targets
    pub fn edit_params(&self, project: &ProjectConfig) -> anyhow::Result<EditParams> {
        let package_name = self
            .package_name
            .clone()
            .or_else(|| project.package_name.clone())
            .ok_or_else(|| PublishError::validation("Missing required argument: package-name"))?;

        let params = EditParams::new(package_name);
        params.validate()?;
        Ok(params)
    }

    /// Authenticated publisher built from the key file
    pub fn publisher(
        &self,
        project: &ProjectConfig,
        discard_failed_edits: bool,
    ) -> anyhow::Result<Apkup> {
        let key = self
            .key
            .clone()
            .or_else(|| project.key.clone())
            .ok_or_else(|| ConfigError::MissingField("key (--key or APKUP_KEY)".to_string()))?;

        info!(key = %key.display(), "loading service account key");
        let auth = AuthParams::from_json_file(&key)?;
        let apkup = Apkup::with_config(auth, project.publisher_config(discard_failed_edits))?;
        Ok(apkup)
    }

    /// Whether progress and summaries go to the terminal
    pub fn interactive(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }

    /// Print a mutation response; JSON is printed even when quiet
    pub fn emit(&self, response: &MutationResponse) -> anyhow::Result<()> {
        if self.quiet && self.format == OutputFormat::Text {
            return Ok(());
        }
        output::response(self.format, response)
    }

    /// Drive a publisher call to completion behind a spinner
    pub fn block_on<F: Future>(&self, message: &str, future: F) -> anyhow::Result<F::Output> {
        let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

        let spinner = self.interactive().then(|| output::spinner(message));
        let result = rt.block_on(future);
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "apkup",
            "promote",
            "--track",
            "beta",
            "--version-code",
            "137",
            "-p",
            "io.event1.shared",
            "-k",
            "auth.json",
        ])
        .unwrap();

        assert_eq!(cli.package_name.as_deref(), Some("io.event1.shared"));
        assert_eq!(cli.key, Some(PathBuf::from("auth.json")));
        assert!(matches!(cli.command, Commands::Promote(_)));
    }

    #[test]
    fn test_edit_params_falls_back_to_config() {
        let mut cli = Cli::try_parse_from(["apkup", "share", "-f", "app.apk"]).unwrap();
        // APKUP_PACKAGE_NAME may be set in the environment
        cli.package_name = None;
        let project = ProjectConfig {
            package_name: Some("com.example.app".to_string()),
            ..Default::default()
        };

        let params = cli.edit_params(&project).unwrap();
        assert_eq!(params.package_name, "com.example.app");

        cli.package_name = Some("com.example.flag".to_string());
        let params = cli.edit_params(&project).unwrap();
        assert_eq!(params.package_name, "com.example.flag");
    }

    #[test]
    fn test_missing_package_name_is_validation_error() {
        let mut cli = Cli::try_parse_from(["apkup", "share", "-f", "app.apk"]).unwrap();
        cli.package_name = None;

        let err = cli.edit_params(&ProjectConfig::default()).unwrap_err();
        let publish = err.downcast_ref::<PublishError>().unwrap();
        assert_eq!(publish.kind(), apkup_core::ErrorKind::Validation);
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let mut cli = Cli::try_parse_from(["apkup", "share", "-f", "app.apk"]).unwrap();
        // APKUP_KEY may be set in the environment
        cli.key = None;

        let err = cli.publisher(&ProjectConfig::default(), false).err().unwrap();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_interactive_depends_on_format_and_quiet() {
        let cli = Cli::try_parse_from(["apkup", "--format", "json", "share", "-f", "a.apk"]).unwrap();
        assert!(!cli.interactive());

        let cli = Cli::try_parse_from(["apkup", "-q", "share", "-f", "a.apk"]).unwrap();
        assert!(!cli.interactive());
    }
}

//! Promote command

use apkup_core::{Mutation, PromoteParams, TrackName};
use clap::Args;
use tracing::info;

use crate::cli::Cli;
use crate::config::ProjectConfig;

/// Promote an uploaded release to a track
#[derive(Debug, Args)]
pub struct PromoteCommand {
    /// Destination track
    #[arg(short, long, required = true)]
    pub track: String,

    /// Version code of the release to promote
    #[arg(long, required = true)]
    pub version_code: i64,

    /// Staged rollout fraction (0.0-1.0]
    #[arg(long)]
    pub rollout: Option<f64>,

    /// Delete the edit if the promotion fails instead of leaving it open
    #[arg(long)]
    pub discard_on_failure: bool,
}

impl PromoteCommand {
    fn params(&self) -> anyhow::Result<PromoteParams> {
        Ok(PromoteParams {
            track: self.track.parse::<TrackName>()?,
            version_code: self.version_code,
            rollout: self.rollout,
        })
    }

    pub fn execute(&self, cli: &Cli, project: &ProjectConfig) -> anyhow::Result<()> {
        let params = self.params()?;
        let edit_params = cli.edit_params(project)?;
        let apkup = cli.publisher(project, self.discard_on_failure)?;

        info!(
            package = %edit_params.package_name,
            track = %params.track,
            version_code = params.version_code,
            "executing promote command"
        );

        let response = cli.block_on(
            "Promoting release...",
            apkup.apply(Mutation::Promote(params), &edit_params),
        )??;

        cli.emit(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        promote: PromoteCommand,
    }

    #[test]
    fn test_params_from_args() {
        let cmd = Harness::try_parse_from(["promote", "--track", "alpha", "--version-code", "137"])
            .unwrap()
            .promote;
        let params = cmd.params().unwrap();
        assert_eq!(params.track, TrackName::Alpha);
        assert_eq!(params.version_code, 137);
        assert_eq!(params.rollout, None);
    }

    #[test]
    fn test_non_integer_version_code_is_rejected() {
        assert!(
            Harness::try_parse_from(["promote", "--track", "alpha", "--version-code", "1.2"])
                .is_err()
        );
    }
}

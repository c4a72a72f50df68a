//! Upload command

use std::path::PathBuf;

use apkup_core::files::split_file_list;
use apkup_core::{Mutation, PublishError, ReleaseNote, TrackName, UploadParams};
use clap::Args;
use tracing::info;

use crate::cli::Cli;
use crate::config::ProjectConfig;

/// Upload a release
#[derive(Debug, Args)]
pub struct UploadCommand {
    /// Path to an APK or AAB. OBBs and a deobfuscation mapping file can be
    /// included as a comma-separated list after the main file
    #[arg(short, long, required = true, num_args = 1..)]
    pub file: Vec<String>,

    /// Release track (internal, alpha, beta, production or a custom track)
    #[arg(short, long)]
    pub track: Option<String>,

    /// Release notes as LANG:TEXT, repeatable (e.g. "en-US:Bug fixes")
    #[arg(long = "release-notes", value_name = "LANG:TEXT")]
    pub release_notes: Vec<String>,

    /// Staged rollout fraction (0.0-1.0]
    #[arg(long)]
    pub rollout: Option<f64>,

    /// Delete the edit if the upload fails instead of leaving it open
    #[arg(long)]
    pub discard_on_failure: bool,
}

/// Parse `LANG:TEXT` pairs
fn parse_release_notes(raw: &[String]) -> Result<Vec<ReleaseNote>, PublishError> {
    raw.iter()
        .map(|pair| {
            let mut parts = pair.splitn(2, ':');
            match (parts.next(), parts.next()) {
                (Some(lang), Some(text)) if !lang.trim().is_empty() => {
                    Ok(ReleaseNote::new(lang.trim(), text.trim()))
                }
                _ => Err(PublishError::Validation(format!(
                    "Release notes must look like LANG:TEXT, got '{}'",
                    pair
                ))),
            }
        })
        .collect()
}

impl UploadCommand {
    fn params(&self, project: &ProjectConfig) -> anyhow::Result<UploadParams> {
        let files: Vec<PathBuf> = self.file.iter().flat_map(|list| split_file_list(list)).collect();

        let track: TrackName = self
            .track
            .as_deref()
            .or(project.track.as_deref())
            .unwrap_or("internal")
            .parse()?;

        let mut params = UploadParams::new(files, track);
        params.release_notes = parse_release_notes(&self.release_notes)?;
        params.rollout = self.rollout;
        Ok(params)
    }

    pub fn execute(&self, cli: &Cli, project: &ProjectConfig) -> anyhow::Result<()> {
        let params = self.params(project)?;
        let edit_params = cli.edit_params(project)?;
        let apkup = cli.publisher(project, self.discard_on_failure)?;

        info!(
            package = %edit_params.package_name,
            track = %params.track,
            files = params.files.len(),
            "executing upload command"
        );

        let response = cli.block_on(
            "Uploading release...",
            apkup.apply(Mutation::Upload(params), &edit_params),
        )??;

        cli.emit(&response)
    }
}

//! Share command

use std::path::PathBuf;

use apkup_core::files::split_file_list;
use apkup_core::{Mutation, PublishError, ShareParams};
use clap::Args;
use tracing::info;

use crate::cli::Cli;
use crate::config::ProjectConfig;

/// Share an APK or AAB through internal app sharing
#[derive(Debug, Args)]
pub struct ShareCommand {
    /// Path to an APK or AAB; anything after the first comma is ignored
    #[arg(short, long, required = true, num_args = 1..)]
    pub file: Vec<String>,
}

impl ShareCommand {
    /// The first file of the first list is the one shared
    fn params(&self) -> Result<ShareParams, PublishError> {
        let file: PathBuf = self
            .file
            .first()
            .and_then(|list| split_file_list(list).into_iter().next())
            .ok_or_else(|| PublishError::validation("One file is required"))?;

        Ok(ShareParams { file })
    }

    pub fn execute(&self, cli: &Cli, project: &ProjectConfig) -> anyhow::Result<()> {
        let params = self.params()?;
        let edit_params = cli.edit_params(project)?;
        let apkup = cli.publisher(project, false)?;

        info!(
            package = %edit_params.package_name,
            file = %params.file.display(),
            "executing share command"
        );

        let response = cli.block_on(
            "Sharing artifact...",
            apkup.apply(Mutation::Share(params), &edit_params),
        )??;

        cli.emit(&response)
    }
}

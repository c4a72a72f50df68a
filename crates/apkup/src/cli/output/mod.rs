//! Output formatting utilities

use std::time::Duration;

use apkup_core::{EditResponse, MutationResponse, PromoteResult, ShareResult, UploadResult};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::OutputFormat;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Spinner drawn on stderr while a remote call is in flight
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Print a mutation response in the requested format
pub fn response(format: OutputFormat, response: &MutationResponse) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
        OutputFormat::Text => match response {
            MutationResponse::Upload(upload) => upload_summary(upload),
            MutationResponse::Promote(promote) => promote_summary(promote),
            MutationResponse::Share(share) => share_summary(share),
        },
    }

    Ok(())
}

fn rollout_line(track: &apkup_core::Track) -> Option<String> {
    let fraction = track.releases.first()?.user_fraction?;
    Some(key_value("Rollout", &format!("{}%", (fraction * 100.0).round() as u32)))
}

fn upload_summary(response: &EditResponse<UploadResult>) {
    let result = &response.result;
    success("Upload successful!");
    println!(
        "{}",
        key_value("Version Code", &style(result.version_code).cyan().to_string())
    );
    if let Some(sha1) = result.binary.as_ref().and_then(|b| b.sha1.as_deref()) {
        println!("{}", key_value("SHA1", sha1));
    }
    println!("{}", key_value("Track", &result.track.track));
    if let Some(line) = rollout_line(&result.track) {
        println!("{}", line);
    }
    if !result.expansion_files.is_empty() {
        println!(
            "{}",
            key_value("Expansion files", &result.expansion_files.len().to_string())
        );
    }
    if result.deobfuscation_file.is_some() {
        println!("{}", key_value("Mapping", "uploaded"));
    }
    println!("{}", key_value("Edit", &style(&response.edit.id).dim().to_string()));
}

fn promote_summary(response: &EditResponse<PromoteResult>) {
    let result = &response.result;
    success("Promote successful!");
    println!(
        "{}",
        key_value("Version Code", &style(result.version_code).cyan().to_string())
    );
    println!("{}", key_value("Track", &result.track.track));
    if let Some(line) = rollout_line(&result.track) {
        println!("{}", line);
    }
    println!("{}", key_value("Edit", &style(&response.edit.id).dim().to_string()));
}

fn share_summary(result: &ShareResult) {
    success("Share successful!");
    println!("{}", key_value("Download URL", &style(result.download_url()).cyan().to_string()));
    if let Some(sha1) = result.sha1() {
        println!("{}", key_value("SHA1", sha1));
    }
    if let Some(fingerprint) = result.certificate_fingerprint() {
        println!("{}", key_value("Certificate", fingerprint));
    }
}

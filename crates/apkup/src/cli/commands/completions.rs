//! Shell completions

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use tracing::info;

use crate::cli::{output, Cli};

/// Generate shell completions
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    fn write_to(&self, writer: &mut dyn Write) {
        generate(self.shell, &mut Cli::command(), "apkup", writer);
    }

    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(shell = %self.shell, "generating completions");

        match &self.output {
            Some(path) => {
                let mut file = std::fs::File::create(path)?;
                self.write_to(&mut file);
                if !cli.quiet {
                    output::success(&format!("Completions written to {}", path.display()));
                }
            }
            None => self.write_to(&mut io::stdout()),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_completions_mention_subcommands() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("apkup.bash");
        let cmd = CompletionsCommand {
            shell: Shell::Bash,
            output: Some(path.clone()),
        };

        let cli = Cli::try_parse_from(["apkup", "-q", "completions", "bash"]).unwrap();
        cmd.execute(&cli).unwrap();

        let script = std::fs::read_to_string(path).unwrap();
        for sub in ["upload", "promote", "share"] {
            assert!(script.contains(sub), "missing {}", sub);
        }
    }

    #[test]
    fn test_unknown_shell_is_rejected() {
        assert!(Cli::try_parse_from(["apkup", "completions", "tcsh"]).is_err());
    }
}

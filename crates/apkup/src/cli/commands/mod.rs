//! CLI commands

mod completions;
mod promote;
mod share;
mod upload;

pub use completions::CompletionsCommand;
pub use promote::PromoteCommand;
pub use share::ShareCommand;
pub use upload::UploadCommand;

pub mod orchestrator;
pub mod profile;
pub mod prompt;

pub use orchestrator::SetupOrchestrator;
pub use profile::ShellProfile;
pub use prompt::ConsolePrompter;

pub mod client;
pub mod commit;
pub mod models;
pub mod workflow_parser;
pub mod workflow_template;

pub use client::GitHubClient;
pub use commit::{CommitError, CommitOutcome};
pub use models::RepoRef;
pub use workflow_parser::WorkflowParser;
pub use workflow_template::{WorkflowTemplate, WORKFLOW_PATH};

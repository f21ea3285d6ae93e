use std::fmt;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::client::GitHubClient;
use super::models::{RepoRef, TreeEntry};
use crate::error::ApiError;
use crate::http::HttpTransport;

// =============================================================================
// Commit chain
// =============================================================================
//
// ResolveBranch → ResolveBaseTree → CreateBlobs(×N) → CreateTree
//   → CreateCommit → UpdateRef → Done
//
// Each stage consumes the SHA produced by the previous one. Any failure moves
// the chain to Aborted. Nothing is retried and objects already created on the
// remote side are left dangling.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStage {
    ResolveBranch,
    ResolveBaseTree,
    CreateBlob,
    CreateTree,
    CreateCommit,
    UpdateRef,
}

impl fmt::Display for CommitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommitStage::ResolveBranch => "resolve default branch",
            CommitStage::ResolveBaseTree => "resolve base tree",
            CommitStage::CreateBlob => "create blob",
            CommitStage::CreateTree => "create tree",
            CommitStage::CreateCommit => "create commit",
            CommitStage::UpdateRef => "update reference",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("{stage} failed: {source}")]
    Aborted {
        stage: CommitStage,
        #[source]
        source: ApiError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("commit chain already finished")]
    Finished,
}

impl CommitError {
    #[cfg(test)]
    pub fn stage(&self) -> Option<CommitStage> {
        match self {
            CommitError::Aborted { stage, .. } => Some(*stage),
            CommitError::Io { .. } => Some(CommitStage::CreateBlob),
            CommitError::Finished => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub branch: String,
    pub tree_sha: String,
    pub commit_sha: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitState {
    ResolveBranch,
    ResolveBaseTree {
        branch: String,
    },
    CreateBlobs {
        branch: String,
        base_sha: String,
        entries: Vec<TreeEntry>,
    },
    CreateTree {
        branch: String,
        base_sha: String,
        entries: Vec<TreeEntry>,
    },
    CreateCommit {
        branch: String,
        base_sha: String,
        tree_sha: String,
        files: Vec<String>,
    },
    UpdateRef {
        branch: String,
        tree_sha: String,
        commit_sha: String,
        files: Vec<String>,
    },
    Done(CommitOutcome),
    Aborted,
}

impl CommitState {
    #[cfg(test)]
    pub fn is_terminal(&self) -> bool {
        matches!(self, CommitState::Done(_) | CommitState::Aborted)
    }
}

/// Commits a list of local files onto a repository's default branch
pub struct CommitChain<'a, T> {
    client: &'a GitHubClient<T>,
    repo: &'a RepoRef,
    work_dir: &'a Path,
    files: &'a [PathBuf],
    message: &'a str,
    state: CommitState,
}

impl<'a, T: HttpTransport> CommitChain<'a, T> {
    pub fn new(
        client: &'a GitHubClient<T>,
        repo: &'a RepoRef,
        work_dir: &'a Path,
        files: &'a [PathBuf],
        message: &'a str,
    ) -> Self {
        Self {
            client,
            repo,
            work_dir,
            files,
            message,
            state: CommitState::ResolveBranch,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &CommitState {
        &self.state
    }

    /// Drive the chain to a terminal state
    pub fn run(mut self) -> Result<CommitOutcome, CommitError> {
        loop {
            if let CommitState::Done(outcome) = self.step()? {
                let outcome = outcome.clone();
                info!("Commit created successfully: {}", outcome.commit_sha);
                return Ok(outcome);
            }
        }
    }

    /// Perform exactly one remote call (or one blob upload) and advance
    pub fn step(&mut self) -> Result<&CommitState, CommitError> {
        let current = std::mem::replace(&mut self.state, CommitState::Aborted);

        match self.advance(current) {
            Ok(next) => {
                self.state = next;
                Ok(&self.state)
            }
            Err(e) => Err(e),
        }
    }

    fn advance(&self, state: CommitState) -> Result<CommitState, CommitError> {
        match state {
            CommitState::ResolveBranch => {
                let repository = self
                    .client
                    .get_repository(self.repo)
                    .map_err(abort(CommitStage::ResolveBranch))?;
                Ok(CommitState::ResolveBaseTree {
                    branch: repository.default_branch,
                })
            }
            CommitState::ResolveBaseTree { branch } => {
                let git_ref = self
                    .client
                    .get_branch_ref(self.repo, &branch)
                    .map_err(abort(CommitStage::ResolveBaseTree))?;
                Ok(CommitState::CreateBlobs {
                    branch,
                    base_sha: git_ref.object.sha,
                    entries: Vec::with_capacity(self.files.len()),
                })
            }
            CommitState::CreateBlobs {
                branch,
                base_sha,
                mut entries,
            } => {
                if let Some(file) = self.files.get(entries.len()) {
                    let local = self.work_dir.join(file);
                    let content = std::fs::read(&local).map_err(|source| CommitError::Io {
                        path: local.clone(),
                        source,
                    })?;
                    let sha = self
                        .client
                        .create_blob(self.repo, &content)
                        .map_err(abort(CommitStage::CreateBlob))?;
                    entries.push(TreeEntry::file(repo_path(file, self.work_dir), sha));
                }

                if entries.len() < self.files.len() {
                    Ok(CommitState::CreateBlobs {
                        branch,
                        base_sha,
                        entries,
                    })
                } else {
                    Ok(CommitState::CreateTree {
                        branch,
                        base_sha,
                        entries,
                    })
                }
            }
            CommitState::CreateTree {
                branch,
                base_sha,
                entries,
            } => {
                let tree_sha = self
                    .client
                    .create_tree(self.repo, &base_sha, &entries)
                    .map_err(abort(CommitStage::CreateTree))?;
                Ok(CommitState::CreateCommit {
                    branch,
                    base_sha,
                    tree_sha,
                    files: entries.into_iter().map(|e| e.path).collect(),
                })
            }
            CommitState::CreateCommit {
                branch,
                base_sha,
                tree_sha,
                files,
            } => {
                let commit_sha = self
                    .client
                    .create_commit(self.repo, self.message, &tree_sha, &[base_sha])
                    .map_err(abort(CommitStage::CreateCommit))?;
                Ok(CommitState::UpdateRef {
                    branch,
                    tree_sha,
                    commit_sha,
                    files,
                })
            }
            CommitState::UpdateRef {
                branch,
                tree_sha,
                commit_sha,
                files,
            } => {
                self.client
                    .update_branch_ref(self.repo, &branch, &commit_sha)
                    .map_err(abort(CommitStage::UpdateRef))?;
                Ok(CommitState::Done(CommitOutcome {
                    branch,
                    tree_sha,
                    commit_sha,
                    files,
                }))
            }
            CommitState::Done(outcome) => Ok(CommitState::Done(outcome)),
            CommitState::Aborted => Err(CommitError::Finished),
        }
    }
}

fn abort(stage: CommitStage) -> impl FnOnce(ApiError) -> CommitError {
    move |source| CommitError::Aborted { stage, source }
}

/// Path of a local file inside the repository: relative to `work_dir`,
/// forward slashes, no `.` or `..` segments. A path that resolves outside
/// `work_dir` (absolute or through `..`) falls back to the file name.
pub fn repo_path(file: &Path, work_dir: &Path) -> String {
    let relative = match file.strip_prefix(work_dir) {
        Ok(rel) => rel,
        Err(_) if file.is_absolute() => return file_name(file),
        Err(_) => file,
    };

    let mut parts: Vec<String> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return file_name(file);
                }
            }
            _ => {}
        }
    }
    parts.join("/")
}

fn file_name(file: &Path) -> String {
    file.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

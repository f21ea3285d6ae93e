use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use super::commit::{CommitChain, CommitError, CommitOutcome};
use super::models::*;
use crate::error::ApiError;
use crate::http::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::infrastructure::logging::{BoundaryLogger, Timer};

/// Directory GitHub Actions loads workflow definitions from
pub const WORKFLOWS_DIR: &str = ".github/workflows/";

const README_PATH: &str = "README.md";
const README_MESSAGE: &str = "Initial commit with README";
const README_BODY: &str = "# Initial Commit\n\nThis is the initial commit with a README file.";

/// Thin blocking wrapper over the GitHub REST API.
///
/// Every call succeeds only on the exact status the endpoint documents
/// (200 or 201); anything else is returned as `ApiError::Status` with the raw body.
pub struct GitHubClient<T> {
    transport: T,
    base_url: String,
    token: String,
    logger: BoundaryLogger,
}

impl<T: HttpTransport> GitHubClient<T> {
    pub fn new(transport: T, base_url: impl Into<String>, token: impl Into<String>, logger: BoundaryLogger) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            logger,
        }
    }

    /// Get repository metadata
    pub fn get_repository(&self, repo: &RepoRef) -> Result<Repository, ApiError> {
        let request = self.request(Method::Get, &format!("/repos/{}", repo));
        let response = self.expect(request, 200)?;
        decode(&format!("GET /repos/{}", repo), &response)
    }

    /// Create a repository for the authenticated user, returning its `owner/name`
    pub fn create_repository(&self, name: &str, description: &str, private: bool) -> Result<RepoRef, ApiError> {
        let body = CreateRepositoryRequest {
            name: name.to_string(),
            description: description.to_string(),
            private,
        };
        let request = self.request_json(Method::Post, "/user/repos", &body)?;
        let response = self.expect(request, 201)?;

        let created: Repository = decode("POST /user/repos", &response)?;
        let repo = RepoRef::parse(&created.full_name).ok_or_else(|| ApiError::Decode {
            operation: "POST /user/repos".to_string(),
            source: <serde_json::Error as serde::de::Error>::custom(format!(
                "unexpected full_name '{}'",
                created.full_name
            )),
        })?;

        info!("Repository '{}' created successfully", repo);
        Ok(repo)
    }

    /// True iff GET on the README path answers 200. Any other status counts as absent.
    pub fn readme_exists(&self, repo: &RepoRef) -> Result<bool, ApiError> {
        let request = self.request(Method::Get, &format!("/repos/{}/contents/{}", repo, README_PATH));
        let response = self.send(request)?;

        let exists = response.status == 200;
        info!("README.md {} in {}", if exists { "exists" } else { "does not exist" }, repo);
        Ok(exists)
    }

    /// PUT a fixed README so the repository has a default branch to commit onto
    pub fn initialize_with_readme(&self, repo: &RepoRef) -> Result<(), ApiError> {
        let body = PutContentRequest {
            message: README_MESSAGE.to_string(),
            content: STANDARD.encode(README_BODY),
        };
        let request = self.request_json(Method::Put, &format!("/repos/{}/contents/{}", repo, README_PATH), &body)?;
        self.expect(request, 201)?;

        info!("Repository {} initialized with a README file", repo);
        Ok(())
    }

    /// Resolve `refs/heads/{branch}`
    pub fn get_branch_ref(&self, repo: &RepoRef, branch: &str) -> Result<GitRef, ApiError> {
        let path = format!("/repos/{}/git/refs/heads/{}", repo, branch);
        let response = self.expect(self.request(Method::Get, &path), 200)?;
        decode(&format!("GET {}", path), &response)
    }

    /// Upload file content as a blob, returning its SHA
    pub fn create_blob(&self, repo: &RepoRef, content: &[u8]) -> Result<String, ApiError> {
        let body = CreateBlobRequest {
            content: STANDARD.encode(content),
            encoding: "base64".to_string(),
        };
        let path = format!("/repos/{}/git/blobs", repo);
        let response = self.expect(self.request_json(Method::Post, &path, &body)?, 201)?;
        let created: CreatedObject = decode(&format!("POST {}", path), &response)?;
        Ok(created.sha)
    }

    pub fn create_tree(&self, repo: &RepoRef, base_tree: &str, entries: &[TreeEntry]) -> Result<String, ApiError> {
        let body = CreateTreeRequest {
            base_tree: base_tree.to_string(),
            tree: entries.to_vec(),
        };
        let path = format!("/repos/{}/git/trees", repo);
        let response = self.expect(self.request_json(Method::Post, &path, &body)?, 201)?;
        let created: CreatedObject = decode(&format!("POST {}", path), &response)?;
        Ok(created.sha)
    }

    pub fn create_commit(&self, repo: &RepoRef, message: &str, tree: &str, parents: &[String]) -> Result<String, ApiError> {
        let body = CreateCommitRequest {
            message: message.to_string(),
            tree: tree.to_string(),
            parents: parents.to_vec(),
        };
        let path = format!("/repos/{}/git/commits", repo);
        let response = self.expect(self.request_json(Method::Post, &path, &body)?, 201)?;
        let created: CreatedObject = decode(&format!("POST {}", path), &response)?;
        Ok(created.sha)
    }

    /// Move `refs/heads/{branch}` to `sha`
    pub fn update_branch_ref(&self, repo: &RepoRef, branch: &str, sha: &str) -> Result<(), ApiError> {
        let body = UpdateRefRequest { sha: sha.to_string() };
        let path = format!("/repos/{}/git/refs/heads/{}", repo, branch);
        self.expect(self.request_json(Method::Patch, &path, &body)?, 200)?;
        Ok(())
    }

    /// Commit local files onto the default branch in a single commit
    pub fn commit_files(
        &self,
        repo: &RepoRef,
        work_dir: &Path,
        files: &[PathBuf],
        message: &str,
    ) -> Result<CommitOutcome, CommitError> {
        CommitChain::new(self, repo, work_dir, files, message).run()
    }

    /// List the workflows GitHub Actions has registered for the repository
    pub fn list_workflows(&self, repo: &RepoRef) -> Result<WorkflowList, ApiError> {
        let path = format!("/repos/{}/actions/workflows", repo);
        let response = self.expect(self.request(Method::Get, &path), 200)?;
        decode(&format!("GET {}", path), &response)
    }

    /// True iff at least one registered workflow lives under `.github/workflows/`
    /// and is active. A non-200 listing is logged and counts as not registered.
    pub fn verify_workflow(&self, repo: &RepoRef) -> Result<bool, ApiError> {
        let list = match self.list_workflows(repo) {
            Ok(list) => list,
            Err(ApiError::Status { status, .. }) => {
                warn!("Failed to fetch workflows for {} (status {})", repo, status);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        match find_active_workflow(&list.workflows) {
            Some(workflow) => {
                info!("GitHub Actions workflow '{}' found and is active", workflow.name);
                Ok(true)
            }
            None => {
                info!("No active GitHub Actions workflows found in {}", repo);
                Ok(false)
            }
        }
    }

    // =========================================================================
    // Private helpers
    // =========================================================================

    fn request(&self, method: Method, path: &str) -> ApiRequest {
        ApiRequest::new(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
    }

    fn request_json<S: Serialize>(&self, method: Method, path: &str, body: &S) -> Result<ApiRequest, ApiError> {
        let body = serde_json::to_value(body).map_err(|source| ApiError::Encode {
            operation: format!("{} {}", method, path),
            source,
        })?;
        Ok(self.request(method, path).json(body))
    }

    fn operation(&self, request: &ApiRequest) -> String {
        let path = request.url.strip_prefix(&self.base_url).unwrap_or(&request.url);
        format!("{} {}", request.method, path)
    }

    fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let operation = self.operation(&request);
        let timer = Timer::start();
        self.logger.external_call("GitHubClient", "GitHub", &operation);

        match self.transport.send(&request) {
            Ok(response) => {
                self.logger
                    .external_done("GitHubClient", "GitHub", &operation, timer.elapsed_ms(), response.status);
                Ok(response)
            }
            Err(e) => {
                self.logger.external_error("GitHubClient", "GitHub", &operation, &e);
                Err(ApiError::Transport { operation, source: e })
            }
        }
    }

    fn expect(&self, request: ApiRequest, expected: u16) -> Result<ApiResponse, ApiError> {
        let operation = self.operation(&request);
        let response = self.send(request)?;

        if response.status != expected {
            self.logger
                .external_rejected("GitHubClient", "GitHub", &operation, response.status, &response.body);
            return Err(ApiError::Status {
                operation,
                status: response.status,
                body: response.body,
            });
        }

        Ok(response)
    }
}

/// First workflow under `.github/workflows/` whose state is "active"
pub fn find_active_workflow(workflows: &[Workflow]) -> Option<&Workflow> {
    workflows
        .iter()
        .find(|w| w.path.starts_with(WORKFLOWS_DIR) && w.state == "active")
}

fn decode<R: DeserializeOwned>(operation: &str, response: &ApiResponse) -> Result<R, ApiError> {
    response.json().map_err(|source| ApiError::Decode {
        operation: operation.to_string(),
        source,
    })
}

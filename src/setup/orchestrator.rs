use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::profile::ProfileWriter;
use super::prompt::Prompter;
use crate::config::SetupConfig;
use crate::error::SetupError;
use crate::github::commit::repo_path;
use crate::github::{CommitOutcome, GitHubClient, RepoRef, WorkflowParser, WorkflowTemplate, WORKFLOW_PATH};
use crate::http::HttpTransport;
use crate::infrastructure::logging::{BoundaryLogger, Timer};
use crate::postman::PostmanClient;

/// Where a collection fetched from Postman is written
pub const COLLECTION_OUTPUT: &str = "collection.json";
/// Where an environment fetched from Postman is written
pub const ENVIRONMENT_OUTPUT: &str = "environment.json";
pub const COMMIT_MESSAGE: &str = "Add GitHub Actions workflow and Postman collection";

pub const SUCCESS_LINE: &str = "GitHub Actions workflow was successfully created.";
pub const FAILURE_LINE: &str = "Failed to create GitHub Actions workflow.";

// =============================================================================
// Plan: 프롬프트로 수집한 입력
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionSource {
    /// Export from the Postman API by collection ID
    Postman {
        api_key: String,
        collection_id: String,
        environment_id: Option<String>,
    },
    /// Collection JSON already on disk. Not checked until it is committed.
    File { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryTarget {
    Existing(RepoRef),
    New { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupPlan {
    pub github_token: String,
    pub collection: CollectionSource,
    pub repository: RepositoryTarget,
}

#[derive(Debug, Clone)]
pub struct SetupReport {
    pub repository: RepoRef,
    pub commit: CommitOutcome,
    pub workflow_active: bool,
}

/// Local files produced by the collection step
#[derive(Debug, Clone)]
struct LocalFiles {
    collection: PathBuf,
    environment: Option<PathBuf>,
}

// =============================================================================
// SetupOrchestrator
// =============================================================================

/// SetupOrchestrator - Postman 컬렉션을 GitHub Actions 파이프라인으로 설치하는 대화형 드라이버
///
/// 책임:
/// - 프롬프트로 입력 수집 (토큰, 컬렉션 소스, 대상 저장소) → `SetupPlan`
/// - 단계 실행: 컬렉션 준비 → 저장소 준비 → 워크플로우 생성 → 커밋 → 검증
///
/// 어느 단계든 실패하면 나머지 단계는 실행하지 않습니다. 이미 GitHub에 적용된
/// 변경(생성된 저장소 등)은 되돌리지 않습니다.
pub struct SetupOrchestrator<T, P, W> {
    config: SetupConfig,
    transport: T,
    prompter: P,
    profile: W,
    logger: BoundaryLogger,
}

impl<T, P, W> SetupOrchestrator<T, P, W>
where
    T: HttpTransport,
    P: Prompter,
    W: ProfileWriter,
{
    pub fn new(config: SetupConfig, transport: T, prompter: P, profile: W, logger: BoundaryLogger) -> Self {
        Self {
            config,
            transport,
            prompter,
            profile,
            logger,
        }
    }

    #[cfg(test)]
    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// 전체 흐름 실행. 실패 시 진단 메시지를 콘솔에 출력하고 에러를 반환
    pub fn run(&mut self) -> Result<SetupReport, SetupError> {
        let result = match self.resolve_plan() {
            Ok(plan) => self.execute(&plan),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            self.prompter.say(&e.to_string());
        }
        result
    }

    /// 프롬프트 단계: 네트워크 호출 없이 입력만 수집
    pub fn resolve_plan(&mut self) -> Result<SetupPlan, SetupError> {
        let timer = Timer::start();
        self.logger.step_entry("resolve_plan", &());

        let result = self.collect_plan();
        match &result {
            Ok(plan) => {
                info!(
                    trace_id = %self.logger.trace_id(),
                    collection = ?plan.collection_kind(),
                    repository = ?plan.repository,
                    "Setup plan resolved"
                );
                self.logger.step_exit("resolve_plan", timer.elapsed_ms());
            }
            Err(e) => self.logger.step_error("resolve_plan", e),
        }
        result
    }

    /// 실행 단계: 계획을 순서대로 적용
    pub fn execute(&mut self, plan: &SetupPlan) -> Result<SetupReport, SetupError> {
        let Self {
            config,
            transport,
            prompter,
            logger,
            ..
        } = self;
        let config: &SetupConfig = config;
        let transport: &T = transport;
        let logger: &BoundaryLogger = logger;
        let work_dir = config.work_dir.as_path();

        // 1. 컬렉션 준비 (Postman export는 GitHub 호출보다 먼저)
        let local = step(logger, "prepare_collection", || {
            prepare_collection(config, transport, logger, prompter, &plan.collection)
        })?;

        let github = GitHubClient::new(
            transport,
            config.github_api_url.as_str(),
            plan.github_token.as_str(),
            logger.clone(),
        );

        // 2. 저장소 준비 (생성 / README 초기화)
        let repo = step(logger, "prepare_repository", || {
            prepare_repository(&github, prompter, &plan.repository)
        })?;

        // 3. 워크플로우 파일 생성
        let workflow = step(logger, "generate_workflow", || generate_workflow(work_dir, prompter, &local))?;

        // 4. 워크플로우 + 컬렉션 단일 커밋
        let commit = step(logger, "commit", || {
            let mut files = vec![PathBuf::from(WORKFLOW_PATH), local.collection.clone()];
            files.extend(local.environment.clone());

            let outcome = github.commit_files(&repo, work_dir, &files, COMMIT_MESSAGE)?;
            prompter.say(&format!("Commit created successfully: {}", outcome.commit_sha));

            if let Ok(false) = WorkflowParser::is_active_for_branch(&workflow, &outcome.branch) {
                warn!("Workflow triggers on 'main' but the default branch is '{}'", outcome.branch);
                prompter.say(&format!(
                    "Note: the workflow runs on pushes to 'main', but the default branch of {} is '{}'.",
                    repo, outcome.branch
                ));
            }
            Ok(outcome)
        })?;

        // 5. GitHub가 워크플로우를 인식할 때까지 대기 후 검증
        let workflow_active = step(logger, "verify_workflow", || verify_workflow(config, &github, &repo))?;

        prompter.say(if workflow_active { SUCCESS_LINE } else { FAILURE_LINE });

        Ok(SetupReport {
            repository: repo,
            commit,
            workflow_active,
        })
    }

    // =========================================================================
    // Private: 프롬프트
    // =========================================================================

    fn collect_plan(&mut self) -> Result<SetupPlan, SetupError> {
        let github_token = match self.config.credentials.github_token.clone() {
            Some(token) => token,
            None => {
                let token = self.ask("Enter your GitHub token:")?;
                self.persist("GITHUB_TOKEN", &token)?;
                self.config.credentials.github_token = Some(token.clone());
                token
            }
        };

        let answer = self.ask("Is the Postman collection from UID (1) or file (2)?")?;
        let collection = match answer.to_ascii_lowercase().as_str() {
            "1" | "uid" => {
                let api_key = match self.config.credentials.postman_api_key.clone() {
                    Some(key) => key,
                    None => {
                        let key = self.ask("Enter your Postman API key:")?;
                        self.persist("POSTMAN_API_KEY", &key)?;
                        self.config.credentials.postman_api_key = Some(key.clone());
                        key
                    }
                };
                let collection_id = self.ask("Enter the Postman collection ID:")?;
                let environment_id = self.ask("Enter the Postman environment ID (leave empty to skip):")?;

                CollectionSource::Postman {
                    api_key,
                    collection_id,
                    environment_id: Some(environment_id).filter(|id| !id.is_empty()),
                }
            }
            "2" | "file" | "filepath" => {
                let path = self.ask("Enter the path to the Postman collection JSON file:")?;
                CollectionSource::File { path: PathBuf::from(path) }
            }
            _ => {
                return Err(SetupError::InvalidOption {
                    prompt: "collection source",
                    answer,
                })
            }
        };

        let answer = self.ask("Is it an existing (1) or new (2) GitHub repo?")?;
        let repository = match answer.to_ascii_lowercase().as_str() {
            "1" | "existing" => {
                let full_name = self.ask("Enter the full repository name (e.g., username/repo):")?;
                let repo = RepoRef::parse(&full_name).ok_or(SetupError::InvalidRepository(full_name))?;
                RepositoryTarget::Existing(repo)
            }
            "2" | "new" => {
                let name = self.ask("Enter the repository name:")?;
                RepositoryTarget::New { name }
            }
            _ => {
                return Err(SetupError::InvalidOption {
                    prompt: "repository",
                    answer,
                })
            }
        };

        Ok(SetupPlan {
            github_token,
            collection,
            repository,
        })
    }

    fn ask(&mut self, question: &str) -> Result<String, SetupError> {
        self.prompter
            .ask(question)
            .map_err(|e| SetupError::io("Failed to read input", e))
    }

    fn persist(&self, name: &str, value: &str) -> Result<(), SetupError> {
        self.profile
            .persist(name, value)
            .map_err(|e| SetupError::io(format!("Failed to persist {} to shell profile", name), e))
    }
}

impl SetupPlan {
    fn collection_kind(&self) -> &'static str {
        match self.collection {
            CollectionSource::Postman { .. } => "postman",
            CollectionSource::File { .. } => "file",
        }
    }
}

// =============================================================================
// Private: 단계 구현
// =============================================================================

fn step<R>(
    logger: &BoundaryLogger,
    name: &str,
    f: impl FnOnce() -> Result<R, SetupError>,
) -> Result<R, SetupError> {
    let timer = Timer::start();
    logger.step_entry(name, &());

    match f() {
        Ok(value) => {
            logger.step_exit(name, timer.elapsed_ms());
            Ok(value)
        }
        Err(e) => {
            logger.step_error(name, &e);
            Err(e)
        }
    }
}

fn prepare_collection<T: HttpTransport, P: Prompter>(
    config: &SetupConfig,
    transport: &T,
    logger: &BoundaryLogger,
    prompter: &mut P,
    source: &CollectionSource,
) -> Result<LocalFiles, SetupError> {
    let (api_key, collection_id, environment_id) = match source {
        CollectionSource::File { path } => {
            return Ok(LocalFiles {
                collection: path.clone(),
                environment: None,
            })
        }
        CollectionSource::Postman {
            api_key,
            collection_id,
            environment_id,
        } => (api_key, collection_id, environment_id),
    };

    let postman = PostmanClient::new(transport, config.postman_api_url.as_str(), api_key.as_str(), logger.clone());

    postman
        .fetch_collection(collection_id, &config.work_dir.join(COLLECTION_OUTPUT))
        .map_err(|source| SetupError::Export {
            kind: "collection",
            source,
        })?;
    prompter.say(&format!("Postman collection exported successfully to {}", COLLECTION_OUTPUT));

    let environment = match environment_id {
        Some(id) => {
            postman
                .fetch_environment(id, &config.work_dir.join(ENVIRONMENT_OUTPUT))
                .map_err(|source| SetupError::Export {
                    kind: "environment",
                    source,
                })?;
            prompter.say(&format!("Postman environment exported successfully to {}", ENVIRONMENT_OUTPUT));
            Some(PathBuf::from(ENVIRONMENT_OUTPUT))
        }
        None => None,
    };

    Ok(LocalFiles {
        collection: PathBuf::from(COLLECTION_OUTPUT),
        environment,
    })
}

fn prepare_repository<T: HttpTransport, P: Prompter>(
    github: &GitHubClient<T>,
    prompter: &mut P,
    target: &RepositoryTarget,
) -> Result<RepoRef, SetupError> {
    match target {
        RepositoryTarget::Existing(repo) => {
            let has_readme = github.readme_exists(repo).map_err(SetupError::ReadmeProbe)?;
            if !has_readme {
                github
                    .initialize_with_readme(repo)
                    .map_err(SetupError::InitializeRepository)?;
                prompter.say("Repository initialized with a README file.");
            }
            Ok(repo.clone())
        }
        RepositoryTarget::New { name } => {
            let repo = github
                .create_repository(name, "", false)
                .map_err(SetupError::CreateRepository)?;
            prompter.say(&format!("Repository '{}' created successfully.", repo));

            github
                .initialize_with_readme(&repo)
                .map_err(SetupError::InitializeRepository)?;
            prompter.say("Repository initialized with a README file.");
            Ok(repo)
        }
    }
}

/// Write the workflow and check it actually runs the collection it was given
fn generate_workflow<P: Prompter>(
    work_dir: &Path,
    prompter: &mut P,
    local: &LocalFiles,
) -> Result<String, SetupError> {
    let collection = repo_path(&local.collection, work_dir);
    let environment = local.environment.as_ref().map(|p| repo_path(p, work_dir));
    let output = work_dir.join(WORKFLOW_PATH);

    let content = WorkflowTemplate::new(&collection)
        .with_environment(environment.as_deref())
        .generate(&output)
        .map_err(|e| SetupError::io(format!("Failed to write {}", output.display()), e))?;

    let runs_collection = WorkflowParser::parse(&content)
        .map(|info| info.runs_collection(&collection))
        .unwrap_or(false);
    if !runs_collection {
        return Err(SetupError::WorkflowInvariant { path: output, collection });
    }

    prompter.say(&format!("GitHub Actions YAML file has been generated at {}", WORKFLOW_PATH));
    Ok(content)
}

/// Bounded poll: `verify_attempts` listings, each after `verify_interval`
fn verify_workflow<T: HttpTransport>(
    config: &SetupConfig,
    github: &GitHubClient<T>,
    repo: &RepoRef,
) -> Result<bool, SetupError> {
    for attempt in 1..=config.verify_attempts {
        std::thread::sleep(config.verify_interval);

        let active = github.verify_workflow(repo).map_err(SetupError::Verify)?;
        info!(attempt, max_attempts = config.verify_attempts, active, "Workflow verification attempt");
        if active {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::http::testing::ScriptedTransport;
    use crate::http::Method;
    use crate::setup::profile::testing::RecordingProfile;
    use crate::setup::prompt::testing::ScriptedPrompter;
    use std::time::Duration;

    const GITHUB: &str = "https://api.github.test";
    const POSTMAN: &str = "https://api.postman.test";

    fn config(work_dir: &Path, token: Option<&str>, api_key: Option<&str>) -> SetupConfig {
        SetupConfig {
            credentials: Credentials {
                github_token: token.map(str::to_string),
                postman_api_key: api_key.map(str::to_string),
            },
            github_api_url: GITHUB.to_string(),
            postman_api_url: POSTMAN.to_string(),
            work_dir: work_dir.to_path_buf(),
            verify_attempts: 2,
            verify_interval: Duration::ZERO,
            http_timeout: Duration::from_secs(5),
        }
    }

    fn repo_url(path: &str) -> String {
        format!("{}/repos/alice/repo{}", GITHUB, path)
    }

    fn with_commit_chain(transport: ScriptedTransport) -> ScriptedTransport {
        transport
            .on(Method::Get, &repo_url(""), 200, r#"{"full_name":"alice/repo","default_branch":"main"}"#)
            .on(
                Method::Get,
                &repo_url("/git/refs/heads/main"),
                200,
                r#"{"ref":"refs/heads/main","object":{"sha":"base111","type":"commit"}}"#,
            )
            .on(Method::Post, &repo_url("/git/blobs"), 201, r#"{"sha":"blob1"}"#)
            .on(Method::Post, &repo_url("/git/blobs"), 201, r#"{"sha":"blob2"}"#)
            .on(Method::Post, &repo_url("/git/trees"), 201, r#"{"sha":"tree1"}"#)
            .on(Method::Post, &repo_url("/git/commits"), 201, r#"{"sha":"commit1"}"#)
            .on(Method::Patch, &repo_url("/git/refs/heads/main"), 200, r#"{"ref":"refs/heads/main"}"#)
    }

    fn active_workflows() -> String {
        serde_json::json!({
            "total_count": 1,
            "workflows": [{
                "id": 7,
                "name": "Run Postman Collection",
                "path": ".github/workflows/postman-tests.yml",
                "state": "active"
            }]
        })
        .to_string()
    }

    #[test]
    fn test_existing_repo_without_readme_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("collection.json"), r#"{"info":{"name":"Orders"}}"#).unwrap();

        let transport = with_commit_chain(
            ScriptedTransport::new()
                .on(Method::Get, &repo_url("/contents/README.md"), 404, r#"{"message":"Not Found"}"#)
                .on(Method::Put, &repo_url("/contents/README.md"), 201, r#"{"content":{}}"#),
        )
        .on(Method::Get, &repo_url("/actions/workflows"), 200, &active_workflows());

        let prompter = ScriptedPrompter::new(&["2", "collection.json", "1", "alice/repo"]);
        let mut orchestrator = SetupOrchestrator::new(
            config(dir.path(), Some("T"), None),
            &transport,
            prompter,
            RecordingProfile::default(),
            BoundaryLogger::new("test"),
        );

        let report = orchestrator.run().unwrap();

        assert!(report.workflow_active);
        assert_eq!(report.repository.to_string(), "alice/repo");
        assert_eq!(report.commit.files, vec![WORKFLOW_PATH, "collection.json"]);
        assert!(dir.path().join(WORKFLOW_PATH).exists());

        assert_eq!(
            transport.calls(),
            vec![
                format!("GET {}", repo_url("/contents/README.md")),
                format!("PUT {}", repo_url("/contents/README.md")),
                format!("GET {}", repo_url("")),
                format!("GET {}", repo_url("/git/refs/heads/main")),
                format!("POST {}", repo_url("/git/blobs")),
                format!("POST {}", repo_url("/git/blobs")),
                format!("POST {}", repo_url("/git/trees")),
                format!("POST {}", repo_url("/git/commits")),
                format!("PATCH {}", repo_url("/git/refs/heads/main")),
                format!("GET {}", repo_url("/actions/workflows")),
            ]
        );

        let lines = &orchestrator.prompter().lines;
        assert_eq!(lines.last().map(String::as_str), Some(SUCCESS_LINE));
        assert!(!lines.iter().any(|l| l == FAILURE_LINE));
    }

    #[test]
    fn test_existing_repo_with_readme_skips_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("collection.json"), "{}").unwrap();

        let transport = with_commit_chain(
            ScriptedTransport::new().on(Method::Get, &repo_url("/contents/README.md"), 200, r#"{"name":"README.md"}"#),
        )
        .on(Method::Get, &repo_url("/actions/workflows"), 200, &active_workflows());

        let mut orchestrator = SetupOrchestrator::new(
            config(dir.path(), Some("T"), None),
            &transport,
            ScriptedPrompter::new(&["file", "collection.json", "existing", "alice/repo"]),
            RecordingProfile::default(),
            BoundaryLogger::new("test"),
        );

        orchestrator.run().unwrap();

        assert_eq!(transport.count(Method::Put, &repo_url("/contents/README.md")), 0);
    }

    #[test]
    fn test_inactive_workflow_prints_failure_after_bounded_polling() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("collection.json"), "{}").unwrap();

        let transport = with_commit_chain(
            ScriptedTransport::new().on(Method::Get, &repo_url("/contents/README.md"), 200, "{}"),
        )
        .on(Method::Get, &repo_url("/actions/workflows"), 200, r#"{"total_count":0,"workflows":[]}"#);

        let mut orchestrator = SetupOrchestrator::new(
            config(dir.path(), Some("T"), None),
            &transport,
            ScriptedPrompter::new(&["2", "collection.json", "1", "alice/repo"]),
            RecordingProfile::default(),
            BoundaryLogger::new("test"),
        );

        let report = orchestrator.run().unwrap();

        assert!(!report.workflow_active);
        assert_eq!(transport.count(Method::Get, &repo_url("/actions/workflows")), 2);
        let lines = &orchestrator.prompter().lines;
        assert_eq!(lines.last().map(String::as_str), Some(FAILURE_LINE));
        assert!(!lines.iter().any(|l| l == SUCCESS_LINE));
    }

    #[test]
    fn test_collection_from_uid_is_exported_before_github_calls() {
        let dir = tempfile::tempdir().unwrap();
        let postman_body = r#"{"collection":{"info":{"name":"Orders API"},"item":[{"name":"List orders"}]}}"#;

        let transport = with_commit_chain(
            ScriptedTransport::new()
                .on(Method::Get, &format!("{}/collections/C123", POSTMAN), 200, postman_body)
                .on(Method::Get, &repo_url("/contents/README.md"), 200, "{}"),
        )
        .on(Method::Get, &repo_url("/actions/workflows"), 200, &active_workflows());

        let mut orchestrator = SetupOrchestrator::new(
            config(dir.path(), Some("T"), Some("K")),
            &transport,
            ScriptedPrompter::new(&["1", "C123", "", "1", "alice/repo"]),
            RecordingProfile::default(),
            BoundaryLogger::new("test"),
        );

        orchestrator.run().unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url, format!("{}/collections/C123", POSTMAN));
        assert_eq!(requests[0].header_value("x-api-key"), Some("K"));
        assert!(requests[1..].iter().all(|r| r.url.starts_with(GITHUB)));

        let expected = serde_json::to_string_pretty(&serde_json::from_str::<serde_json::Value>(postman_body).unwrap()).unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join(COLLECTION_OUTPUT)).unwrap(), expected);
    }

    #[test]
    fn test_environment_is_exported_and_committed() {
        let dir = tempfile::tempdir().unwrap();

        let transport = ScriptedTransport::new()
            .on(Method::Get, &format!("{}/collections/C123", POSTMAN), 200, r#"{"collection":{}}"#)
            .on(Method::Get, &format!("{}/environments/E9", POSTMAN), 200, r#"{"environment":{}}"#)
            .on(Method::Get, &repo_url("/contents/README.md"), 200, "{}")
            .on(Method::Get, &repo_url(""), 200, r#"{"full_name":"alice/repo","default_branch":"main"}"#)
            .on(
                Method::Get,
                &repo_url("/git/refs/heads/main"),
                200,
                r#"{"ref":"refs/heads/main","object":{"sha":"base111","type":"commit"}}"#,
            )
            .on(Method::Post, &repo_url("/git/blobs"), 201, r#"{"sha":"blob"}"#)
            .on(Method::Post, &repo_url("/git/trees"), 201, r#"{"sha":"tree1"}"#)
            .on(Method::Post, &repo_url("/git/commits"), 201, r#"{"sha":"commit1"}"#)
            .on(Method::Patch, &repo_url("/git/refs/heads/main"), 200, "{}")
            .on(Method::Get, &repo_url("/actions/workflows"), 200, &active_workflows());

        let mut orchestrator = SetupOrchestrator::new(
            config(dir.path(), Some("T"), Some("K")),
            &transport,
            ScriptedPrompter::new(&["UID", "C123", "E9", "1", "alice/repo"]),
            RecordingProfile::default(),
            BoundaryLogger::new("test"),
        );

        let report = orchestrator.run().unwrap();

        assert_eq!(report.commit.files, vec![WORKFLOW_PATH, COLLECTION_OUTPUT, ENVIRONMENT_OUTPUT]);
        assert_eq!(transport.count(Method::Post, &repo_url("/git/blobs")), 3);
        let workflow = std::fs::read_to_string(dir.path().join(WORKFLOW_PATH)).unwrap();
        assert!(workflow.contains("newman run collection.json -e environment.json"));
    }

    #[test]
    fn test_postman_failure_stops_before_github() {
        let dir = tempfile::tempdir().unwrap();
        let transport = ScriptedTransport::new().on(
            Method::Get,
            &format!("{}/collections/C123", POSTMAN),
            401,
            r#"{"error":{"name":"AuthenticationError"}}"#,
        );

        let mut orchestrator = SetupOrchestrator::new(
            config(dir.path(), Some("T"), Some("K")),
            &transport,
            ScriptedPrompter::new(&["1", "C123", "", "1", "alice/repo"]),
            RecordingProfile::default(),
            BoundaryLogger::new("test"),
        );

        let err = orchestrator.run().unwrap_err();

        assert!(matches!(err, SetupError::Export { kind: "collection", .. }));
        assert_eq!(transport.calls().len(), 1);
        assert!(!dir.path().join(COLLECTION_OUTPUT).exists());
    }

    #[test]
    fn test_missing_credentials_are_prompted_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let transport = ScriptedTransport::new();
        let profile = RecordingProfile::default();

        let mut orchestrator = SetupOrchestrator::new(
            config(dir.path(), None, None),
            &transport,
            ScriptedPrompter::new(&["T", "1", "K", "C123", "", "2", "api-tests"]),
            &profile,
            BoundaryLogger::new("test"),
        );

        let plan = orchestrator.resolve_plan().unwrap();

        assert_eq!(
            plan,
            SetupPlan {
                github_token: "T".to_string(),
                collection: CollectionSource::Postman {
                    api_key: "K".to_string(),
                    collection_id: "C123".to_string(),
                    environment_id: None,
                },
                repository: RepositoryTarget::New {
                    name: "api-tests".to_string(),
                },
            }
        );
        assert_eq!(
            *profile.entries.borrow(),
            vec![
                ("GITHUB_TOKEN".to_string(), "T".to_string()),
                ("POSTMAN_API_KEY".to_string(), "K".to_string()),
            ]
        );
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_invalid_option_aborts_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let transport = ScriptedTransport::new();

        let mut orchestrator = SetupOrchestrator::new(
            config(dir.path(), Some("T"), None),
            &transport,
            ScriptedPrompter::new(&["3"]),
            RecordingProfile::default(),
            BoundaryLogger::new("test"),
        );

        let err = orchestrator.run().unwrap_err();

        assert!(matches!(err, SetupError::InvalidOption { prompt: "collection source", .. }));
        assert_eq!(orchestrator.prompter().lines, vec!["Invalid option. Exiting.".to_string()]);
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_new_repository_is_created_then_bootstrapped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("collection.json"), "{}").unwrap();

        let transport = with_commit_chain(
            ScriptedTransport::new()
                .on(
                    Method::Post,
                    &format!("{}/user/repos", GITHUB),
                    201,
                    r#"{"full_name":"alice/repo","default_branch":"main","private":false}"#,
                )
                .on(Method::Put, &repo_url("/contents/README.md"), 201, "{}"),
        )
        .on(Method::Get, &repo_url("/actions/workflows"), 200, &active_workflows());

        let mut orchestrator = SetupOrchestrator::new(
            config(dir.path(), Some("T"), None),
            &transport,
            ScriptedPrompter::new(&["2", "collection.json", "2", "repo"]),
            RecordingProfile::default(),
            BoundaryLogger::new("test"),
        );

        orchestrator.run().unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0], format!("POST {}/user/repos", GITHUB));
        assert_eq!(calls[1], format!("PUT {}", repo_url("/contents/README.md")));
        assert_eq!(transport.count(Method::Get, &repo_url("/contents/README.md")), 0);
    }

    #[test]
    fn test_repository_creation_failure_halts_flow() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("collection.json"), "{}").unwrap();

        let transport = ScriptedTransport::new().on(
            Method::Post,
            &format!("{}/user/repos", GITHUB),
            422,
            r#"{"message":"Repository creation failed."}"#,
        );

        let mut orchestrator = SetupOrchestrator::new(
            config(dir.path(), Some("T"), None),
            &transport,
            ScriptedPrompter::new(&["2", "collection.json", "2", "repo"]),
            RecordingProfile::default(),
            BoundaryLogger::new("test"),
        );

        let err = orchestrator.run().unwrap_err();

        assert!(matches!(err, SetupError::CreateRepository(_)));
        assert_eq!(transport.calls().len(), 1);
        assert!(!dir.path().join(WORKFLOW_PATH).exists());
        let last = orchestrator.prompter().lines.last().cloned().unwrap();
        assert!(last.contains("Repository creation failed."));
    }

    #[test]
    fn test_commit_failure_skips_verification() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("collection.json"), "{}").unwrap();

        let transport = ScriptedTransport::new()
            .on(Method::Get, &repo_url("/contents/README.md"), 200, "{}")
            .on(Method::Get, &repo_url(""), 200, r#"{"full_name":"alice/repo","default_branch":"main"}"#)
            .on(
                Method::Get,
                &repo_url("/git/refs/heads/main"),
                200,
                r#"{"ref":"refs/heads/main","object":{"sha":"base111","type":"commit"}}"#,
            )
            .on(Method::Post, &repo_url("/git/blobs"), 201, r#"{"sha":"blob1"}"#)
            .on(Method::Post, &repo_url("/git/blobs"), 201, r#"{"sha":"blob2"}"#)
            .on(Method::Post, &repo_url("/git/trees"), 422, r#"{"message":"tree.sha is not a valid blob"}"#);

        let mut orchestrator = SetupOrchestrator::new(
            config(dir.path(), Some("T"), None),
            &transport,
            ScriptedPrompter::new(&["2", "collection.json", "1", "alice/repo"]),
            RecordingProfile::default(),
            BoundaryLogger::new("test"),
        );

        let err = orchestrator.run().unwrap_err();

        assert!(matches!(err, SetupError::Commit(_)));
        assert_eq!(transport.count(Method::Get, &repo_url("/actions/workflows")), 0);
        assert_eq!(transport.count(Method::Post, &repo_url("/git/commits")), 0);
    }

    #[test]
    fn test_collection_outside_work_dir_is_committed_at_repo_root() {
        let root = tempfile::tempdir().unwrap();
        let work_dir = root.path().join("project");
        std::fs::create_dir_all(&work_dir).unwrap();
        std::fs::create_dir_all(root.path().join("shared")).unwrap();
        std::fs::write(root.path().join("shared/c.json"), "{}").unwrap();

        let transport = with_commit_chain(
            ScriptedTransport::new().on(Method::Get, &repo_url("/contents/README.md"), 200, "{}"),
        )
        .on(Method::Get, &repo_url("/actions/workflows"), 200, &active_workflows());

        let mut orchestrator = SetupOrchestrator::new(
            config(&work_dir, Some("T"), None),
            &transport,
            ScriptedPrompter::new(&["2", "../shared/c.json", "1", "alice/repo"]),
            RecordingProfile::default(),
            BoundaryLogger::new("test"),
        );

        let report = orchestrator.run().unwrap();

        assert_eq!(report.commit.files, vec![WORKFLOW_PATH, "c.json"]);
        let workflow = std::fs::read_to_string(work_dir.join(WORKFLOW_PATH)).unwrap();
        assert!(workflow.contains("newman run c.json"));
        assert!(!workflow.contains(".."));

        let tree = transport
            .requests()
            .into_iter()
            .find(|r| r.url == repo_url("/git/trees"))
            .and_then(|r| r.body)
            .unwrap();
        assert_eq!(tree["tree"][1]["path"], "c.json");
    }

    #[test]
    fn test_missing_local_collection_fails_at_commit() {
        let dir = tempfile::tempdir().unwrap();

        let transport = with_commit_chain(
            ScriptedTransport::new().on(Method::Get, &repo_url("/contents/README.md"), 200, "{}"),
        );

        let mut orchestrator = SetupOrchestrator::new(
            config(dir.path(), Some("T"), None),
            &transport,
            ScriptedPrompter::new(&["2", "does-not-exist.json", "1", "alice/repo"]),
            RecordingProfile::default(),
            BoundaryLogger::new("test"),
        );

        let err = orchestrator.run().unwrap_err();

        assert!(matches!(err, SetupError::Commit(crate::github::CommitError::Io { .. })));
        // Workflow blob went up before the collection read failed
        assert_eq!(transport.count(Method::Post, &repo_url("/git/blobs")), 1);
        assert_eq!(transport.count(Method::Post, &repo_url("/git/trees")), 0);
    }
}

use serde::Deserialize;
use std::collections::HashMap;

// =============================================================================
// 1. 파싱 결과 데이터 구조 (출력)
// =============================================================================

/// GitHub Actions 워크플로우 파싱 결과
///
/// YAML 파일의 step 내용을 "있는 그대로" 담습니다.
#[derive(Debug, Clone, Default)]
pub struct WorkflowInfo {
    /// 워크플로우 이름 (name 필드)
    pub name: String,

    /// 모든 uses 액션들 (순서 보장)
    pub setup_actions: Vec<SetupAction>,

    /// 모든 run 커맨드들 (순서 보장)
    pub run_commands: Vec<RunCommand>,

    /// 워크플로우 트리거 정보
    pub triggers: Vec<String>,
}

/// Setup 액션 정보
#[derive(Debug, Clone)]
pub struct SetupAction {
    /// 스텝 이름 (예: "Install Node.js")
    pub step_name: Option<String>,

    /// 사용된 액션 (예: "actions/setup-node@v4")
    pub uses: String,

    /// with 파라미터들
    pub with: HashMap<String, String>,
}

/// Run 커맨드 정보
#[derive(Debug, Clone)]
pub struct RunCommand {
    /// 스텝 이름 (예: "Run Postman collection")
    pub step_name: Option<String>,

    /// 실행 커맨드 (멀티라인 가능)
    pub command: String,
}

impl WorkflowInfo {
    /// Newman이 정확히 이 컬렉션 경로로 실행되는지 확인
    pub fn runs_collection(&self, collection_path: &str) -> bool {
        let needle = format!("newman run {}", collection_path);
        self.run_commands.iter().any(|run| {
            run.command.match_indices(&needle).any(|(idx, _)| {
                run.command[idx + needle.len()..]
                    .chars()
                    .next()
                    .map_or(true, char::is_whitespace)
            })
        })
    }
}

// =============================================================================
// 2. YAML 구조 정의 (serde로 자동 파싱)
// =============================================================================

#[derive(Debug, Deserialize)]
struct GitHubWorkflow {
    #[serde(default)]
    name: String,

    #[serde(default)]
    on: WorkflowTrigger,

    #[serde(default)]
    jobs: HashMap<String, Job>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(untagged)]
enum WorkflowTrigger {
    #[default]
    None,
    Simple(String),
    Array(Vec<String>),
    Object(HashMap<String, serde_yaml::Value>),
}

#[derive(Debug, Deserialize)]
struct Job {
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    name: Option<String>,
    uses: Option<String>,
    run: Option<String>,

    #[serde(default)]
    with: HashMap<String, serde_yaml::Value>,
}

// =============================================================================
// 3. 파서 구현
// =============================================================================

pub struct WorkflowParser;

impl WorkflowParser {
    /// GitHub Actions 워크플로우 YAML을 파싱합니다.
    ///
    /// # 에러
    /// - YAML 문법 오류
    pub fn parse(content: &str) -> Result<WorkflowInfo, String> {
        let workflow: GitHubWorkflow = serde_yaml::from_str(content)
            .map_err(|e| format!("YAML 파싱 실패: {}", e))?;

        let mut info = WorkflowInfo {
            name: workflow.name,
            triggers: Self::extract_triggers(&workflow.on),
            ..Default::default()
        };

        // Jobs를 순회하며 steps 추출
        for (_job_name, job) in workflow.jobs {
            for step in job.steps {
                if let Some(uses) = step.uses {
                    info.setup_actions.push(SetupAction {
                        step_name: step.name.clone(),
                        uses,
                        with: Self::normalize_with_params(step.with),
                    });
                }

                if let Some(command) = step.run {
                    info.run_commands.push(RunCommand {
                        step_name: step.name,
                        command,
                    });
                }
            }
        }

        Ok(info)
    }

    /// 특정 브랜치에 push 했을 때 이 워크플로우가 실행되는지 확인
    pub fn is_active_for_branch(content: &str, branch: &str) -> Result<bool, String> {
        let workflow: GitHubWorkflow = serde_yaml::from_str(content)
            .map_err(|e| format!("YAML 파싱 실패: {}", e))?;

        match workflow.on {
            WorkflowTrigger::Simple(ref trigger) => {
                Ok(trigger == "push" || trigger == "pull_request" || trigger == "workflow_dispatch")
            }
            WorkflowTrigger::Array(ref triggers) => Ok(triggers
                .iter()
                .any(|t| t == "push" || t == "pull_request" || t == "workflow_dispatch")),
            WorkflowTrigger::Object(ref obj) => {
                if obj.contains_key("workflow_dispatch") {
                    return Ok(true);
                }

                if let Some(push) = obj.get("push") {
                    if let Some(branch_list) = push.get("branches").and_then(|b| b.as_sequence()) {
                        return Ok(branch_list.iter().any(|b| {
                            b.as_str()
                                .map_or(false, |b_str| b_str == branch || b_str == "**" || b_str == "*")
                        }));
                    }
                    return Ok(true);
                }

                Ok(obj.contains_key("pull_request"))
            }
            WorkflowTrigger::None => Ok(false),
        }
    }

    // =========================================================================
    // Private helpers
    // =========================================================================

    fn extract_triggers(trigger: &WorkflowTrigger) -> Vec<String> {
        match trigger {
            WorkflowTrigger::Simple(s) => vec![s.clone()],
            WorkflowTrigger::Array(arr) => arr.clone(),
            WorkflowTrigger::Object(obj) => obj.keys().cloned().collect(),
            WorkflowTrigger::None => vec![],
        }
    }

    fn normalize_with_params(params: HashMap<String, serde_yaml::Value>) -> HashMap<String, String> {
        params
            .into_iter()
            .filter_map(|(k, v)| {
                // Value를 String으로 변환
                let value_str = match v {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((k, value_str))
            })
            .collect()
    }
}

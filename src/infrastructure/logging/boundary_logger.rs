use std::time::Instant;
use tracing::{error, info, warn};

/// BoundaryLogger - 모듈 경계(단계, 외부 API)에서 로깅을 담당
///
/// 로깅 포맷: [trace_id] [호출자→피호출자] [작업] [상태] [duration]
#[derive(Clone)]
pub struct BoundaryLogger {
    trace_id: String,
}

impl BoundaryLogger {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// 오케스트레이션 단계 시작
    /// 예: [Setup→Step] resolve_repository [ENTRY] repo="alice/repo"
    pub fn step_entry<T: std::fmt::Debug>(&self, step: &str, params: &T) {
        info!(
            trace_id = %self.trace_id,
            step = %step,
            flow = "Setup→Step",
            stage = "ENTRY",
            params = ?params,
            "[{}] [Setup→Step] {} [ENTRY] params={:?}",
            self.trace_id, step, params
        );
    }

    /// 오케스트레이션 단계 완료
    pub fn step_exit(&self, step: &str, duration_ms: f64) {
        info!(
            trace_id = %self.trace_id,
            step = %step,
            flow = "Setup→Step",
            stage = "←DONE",
            duration_ms = %duration_ms,
            "[{}] [Setup→Step] {} [←DONE] {:.2}ms",
            self.trace_id, step, duration_ms
        );
    }

    /// 오케스트레이션 단계 실패 (이후 단계는 실행되지 않음)
    pub fn step_error<E: std::fmt::Display>(&self, step: &str, error: &E) {
        error!(
            trace_id = %self.trace_id,
            step = %step,
            flow = "Setup→Step",
            stage = "←FAIL",
            error = %error,
            "[{}] [Setup→Step] {} [←FAIL] error={}",
            self.trace_id, step, error
        );
    }

    /// 외부 시스템 호출 시작 (GitHub, Postman)
    /// 예: [GitHubClient→GitHub] POST /repos/alice/repo/git/blobs [EXT→]
    pub fn external_call(&self, from: &str, system: &str, operation: &str) {
        info!(
            trace_id = %self.trace_id,
            from = %from,
            system = %system,
            operation = %operation,
            flow = format!("{}→{}", from, system),
            stage = "EXT→",
            "[{}] [{}→{}] {} [EXT→]",
            self.trace_id, from, system, operation
        );
    }

    /// 외부 시스템 완료
    /// 예: [GitHubClient→GitHub] POST /repos/alice/repo/git/blobs [←DONE] 220ms status=201
    pub fn external_done(&self, from: &str, system: &str, operation: &str, duration_ms: f64, status: u16) {
        info!(
            trace_id = %self.trace_id,
            from = %from,
            system = %system,
            operation = %operation,
            flow = format!("{}→{}", from, system),
            stage = "←DONE",
            duration_ms = %duration_ms,
            status = %status,
            "[{}] [{}→{}] {} [←DONE] {:.2}ms status={}",
            self.trace_id, from, system, operation, duration_ms, status
        );
    }

    /// 외부 시스템이 예상하지 않은 상태 코드로 응답
    pub fn external_rejected(&self, from: &str, system: &str, operation: &str, status: u16, body: &str) {
        warn!(
            trace_id = %self.trace_id,
            from = %from,
            system = %system,
            operation = %operation,
            flow = format!("{}→{}", from, system),
            stage = "←REJECT",
            status = %status,
            body = %body,
            "[{}] [{}→{}] {} [←REJECT] status={} body={}",
            self.trace_id, from, system, operation, status, body
        );
    }

    /// 외부 시스템 에러 (전송 실패)
    pub fn external_error<E: std::fmt::Display>(&self, from: &str, system: &str, operation: &str, error: &E) {
        error!(
            trace_id = %self.trace_id,
            from = %from,
            system = %system,
            operation = %operation,
            flow = format!("{}→{}", from, system),
            stage = "←FAIL",
            error = %error,
            "[{}] [{}→{}] {} [←FAIL] error={}",
            self.trace_id, from, system, operation, error
        );
    }
}

/// 성능 측정용 타이머
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// 타이머 시작
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// 경과 시간 (밀리초)
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

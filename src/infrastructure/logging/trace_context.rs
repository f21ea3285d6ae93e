/// 실행 단위 Trace ID 생성을 담당
pub struct TraceContext;

impl TraceContext {
    /// 새 Trace ID 생성 (UUID v4)
    pub fn new_trace_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// 환경 변수에 지정된 Trace ID를 사용 (없으면 생성)
    ///
    /// SETUP_TRACE_ID 값이 비어 있으면 새로 생성
    pub fn from_env_or_generate() -> String {
        std::env::var("SETUP_TRACE_ID")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(Self::new_trace_id)
    }
}

//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! 레코더 설치는 애플리케이션의 몫입니다. 레코더가 없으면 매크로는 아무것도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `bright_`
//! - 모듈명: `http_`, `retry_`, `bus_`, `scan_`, `reporter_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(bright_core::metrics::BUS_EVENTS_PUBLISHED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// HTTP 메서드 레이블 키 (GET, POST, ...)
pub const LABEL_METHOD: &str = "method";

/// 결과 레이블 키 (success, failure, timeout)
pub const LABEL_RESULT: &str = "result";

/// 심각도 레이블 키 (low, medium, high, critical)
pub const LABEL_SEVERITY: &str = "severity";

/// 메시지 이름 레이블 키
pub const LABEL_MESSAGE_TYPE: &str = "message_type";

// ─── HTTP 메트릭 ───────────────────────────────────────────────────

/// HTTP: 전송된 요청 수 (counter, labels: method, result)
pub const HTTP_REQUESTS_TOTAL: &str = "bright_http_requests_total";

/// HTTP: 요청 소요 시간 (histogram, 초)
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "bright_http_request_duration_seconds";

/// HTTP: 레이트 리미터 때문에 대기한 횟수 (counter)
pub const HTTP_RATE_LIMITED_TOTAL: &str = "bright_http_rate_limited_total";

// ─── Retry 메트릭 ──────────────────────────────────────────────────

/// Retry: 재시도 횟수 (counter)
pub const RETRY_ATTEMPTS_TOTAL: &str = "bright_retry_attempts_total";

// ─── Bus 메트릭 ────────────────────────────────────────────────────

/// Bus: 발행된 이벤트 수 (counter, label: message_type)
pub const BUS_EVENTS_PUBLISHED_TOTAL: &str = "bright_bus_events_published_total";

/// Bus: 실행된 커맨드 수 (counter, labels: message_type, result)
pub const BUS_COMMANDS_TOTAL: &str = "bright_bus_commands_total";

/// Bus: 핸들러 실패 수 (counter, label: message_type)
pub const BUS_HANDLER_FAILURES_TOTAL: &str = "bright_bus_handler_failures_total";

// ─── Scan 메트릭 ───────────────────────────────────────────────────

/// Scan: 상태 폴링 횟수 (counter)
pub const SCAN_STATUS_POLLS_TOTAL: &str = "bright_scan_status_polls_total";

// ─── Reporter 메트릭 ───────────────────────────────────────────────

/// Reporter: 보고된 이슈 수 (counter, label: severity)
pub const REPORTER_ISSUES_REPORTED_TOTAL: &str = "bright_reporter_issues_reported_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    // HTTP
    describe_counter!(
        HTTP_REQUESTS_TOTAL,
        "Total number of HTTP requests sent to the Bright API"
    );
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "Time to complete a single HTTP request attempt in seconds"
    );
    describe_counter!(
        HTTP_RATE_LIMITED_TOTAL,
        "Total number of requests delayed by the client-side rate limiter"
    );

    // Retry
    describe_counter!(
        RETRY_ATTEMPTS_TOTAL,
        "Total number of retried operations"
    );

    // Bus
    describe_counter!(
        BUS_EVENTS_PUBLISHED_TOTAL,
        "Total number of events published on the in-process bus"
    );
    describe_counter!(
        BUS_COMMANDS_TOTAL,
        "Total number of commands executed on the in-process bus"
    );
    describe_counter!(
        BUS_HANDLER_FAILURES_TOTAL,
        "Total number of failed bus handler invocations"
    );

    // Scan
    describe_counter!(
        SCAN_STATUS_POLLS_TOTAL,
        "Total number of scan status polls"
    );

    // Reporter
    describe_counter!(
        REPORTER_ISSUES_REPORTED_TOTAL,
        "Total number of issues reported by severity"
    );
}

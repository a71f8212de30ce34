//! 로깅 초기화
//!
//! 로그는 표준 에러로만 출력됩니다. `RUST_LOG`가 설정되어 있으면 그 값을 우선합니다.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// CLI용 로거 초기화
pub fn init_cli_logger(verbose: bool) {
    let default_filter = if verbose {
        "tabjson=debug"
    } else {
        "tabjson=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // 테스트 등에서 이미 등록된 경우 무시
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}

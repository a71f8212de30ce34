//! 통계 및 유틸리티 모듈
//!
//! 변환 통계 수집 및 포맷팅을 담당합니다. 요약은 표준 에러로 출력하여
//! 표준 출력에는 완료 메시지만 남깁니다.

use colored::Colorize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::converter::ConvertOutcome;

/// 변환 통계 구조체
#[derive(Debug, Default)]
pub struct Statistics {
    /// 총 파일 수
    pub total_files: usize,
    /// 변환 성공 수
    pub converted: AtomicUsize,
    /// 변환 실패 수
    pub failed: AtomicUsize,
    /// 기록된 `data` 항목 수
    pub entries: AtomicUsize,
    /// 기록된 주석 수
    pub comments: AtomicUsize,
    /// 읽은 총 바이트
    pub total_bytes_read: AtomicU64,
    /// 쓴 총 바이트
    pub total_bytes_written: AtomicU64,
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 성공한 변환 결과 반영
    pub fn record_success(&self, outcome: &ConvertOutcome) {
        self.converted.fetch_add(1, Ordering::Relaxed);
        self.entries.fetch_add(outcome.entries, Ordering::Relaxed);
        self.comments.fetch_add(outcome.comments, Ordering::Relaxed);
        self.total_bytes_read
            .fetch_add(outcome.bytes_read, Ordering::Relaxed);
        self.total_bytes_written
            .fetch_add(outcome.bytes_written, Ordering::Relaxed);
    }

    /// 실패 카운트 증가
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_converted(&self) -> usize {
        self.converted.load(Ordering::Relaxed)
    }

    pub fn get_failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 변환 통계 요약 출력
    pub fn print_summary(&self) {
        let converted = self.get_converted();
        let failed = self.get_failed();

        eprintln!("\n{}", "═".repeat(50).bright_blue());
        eprintln!("{}", " 📊 변환 통계".bright_white().bold());
        eprintln!("{}", "═".repeat(50).bright_blue());

        eprintln!("  {} 전체 파일:    {}", "📁".bright_cyan(), self.total_files);
        eprintln!(
            "  {} 성공:         {}",
            "✅".bright_green(),
            converted.to_string().green()
        );

        if failed > 0 {
            eprintln!(
                "  {} 실패:         {}",
                "❌".bright_red(),
                failed.to_string().red()
            );
        } else {
            eprintln!("  {} 실패:         {}", "✅".bright_green(), "0".green());
        }

        eprintln!(
            "  {} 데이터 항목:  {}",
            "🔑".bright_yellow(),
            self.entries.load(Ordering::Relaxed)
        );
        eprintln!(
            "  {} 주석:         {}",
            "💬".bright_white(),
            self.comments.load(Ordering::Relaxed)
        );
        eprintln!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(self.total_bytes_read.load(Ordering::Relaxed))
        );
        eprintln!(
            "  {} 출력 용량:    {}",
            "📤".bright_magenta(),
            format_bytes(self.total_bytes_written.load(Ordering::Relaxed))
        );
        eprintln!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        eprintln!("{}", "═".repeat(50).bright_blue());
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use tabjson::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1536), "1.50 KB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 60 {
        format!("{}분 {}초", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

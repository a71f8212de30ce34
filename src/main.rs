//! tabjson - TAB TEXT TO JSON CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use tabjson::{
    cli::Args,
    converter::{
        convert_all, convert_each_observed, validate_file, ConvertObserver, ConvertOutcome, DONE,
    },
    error::ConvertError,
    logging,
    parser::ParseMode,
    pattern::PatternMatcher,
    stats::Statistics,
};

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_cli_logger(args.verbose);

    // 스레드 풀 설정
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| ConvertError::ThreadPoolError {
                reason: e.to_string(),
            })?;
    }

    let pattern_matcher = PatternMatcher::new(Some(args.pattern.as_str()))?;
    let inputs = collect_inputs(&args, &pattern_matcher)?;

    if inputs.is_empty() {
        return Err(ConvertError::NoInputFiles.into());
    }

    tracing::debug!(files = inputs.len(), "입력 파일 수집 완료");

    if args.validate_only {
        return run_validation_mode(&args, &inputs);
    }

    run_conversion_mode(&args, &inputs)
}

/// 입력 인자를 파일 목록으로 펼침
///
/// 파일 인자는 그대로 사용하고, 폴더 인자는 패턴과 일치하는 파일로 바꿉니다.
fn collect_inputs(args: &Args, pattern_matcher: &PatternMatcher) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    tracing::debug!(pattern = ?pattern_matcher.as_str(), "폴더 인자 펼치기");

    for input in &args.inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let walker = match args.max_depth {
            Some(max_depth) => WalkDir::new(input).max_depth(max_depth),
            None => WalkDir::new(input),
        };

        for entry in walker.sort_by_file_name() {
            let entry = entry.with_context(|| format!("폴더 탐색 실패: {:?}", input))?;
            let path = entry.path();
            if path.is_file() && pattern_matcher.matches_path(path) {
                files.push(path.to_path_buf());
            }
        }
    }

    Ok(files)
}

/// 변환 모드 실행
fn run_conversion_mode(args: &Args, inputs: &[PathBuf]) -> Result<()> {
    let options = args.convert_options();
    let observer = ProgressObserver::new(inputs.len());

    let mut outcomes: Vec<ConvertOutcome> = Vec::new();
    let mut errors: Vec<(PathBuf, ConvertError)> = Vec::new();

    if args.keep_going {
        for result in convert_each_observed(inputs, &options, &observer) {
            match (result.outcome, result.error) {
                (_, Some(e)) => errors.push((result.path, e)),
                (Some(outcome), None) => outcomes.push(outcome),
                (None, None) => {}
            }
        }
    } else {
        // 첫 번째 실패에서 나머지 작업 중단
        match convert_all(inputs, &options, &observer) {
            Ok(converted) => outcomes = converted,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                errors.push((path, e));
            }
        }
    }

    observer.finish();

    if args.dry_run {
        print_dry_run(&outcomes);
    } else if args.verbose {
        for outcome in &outcomes {
            eprintln!(
                "  {} {:?} → {:?}",
                "✓".green(),
                outcome.input,
                outcome.output
            );
        }
    }

    print_errors(&errors, args.verbose);

    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &errors)?;
    }

    if args.verbose {
        observer.stats.print_summary();
    }

    if !args.keep_going {
        if let Some((path, error)) = errors.into_iter().next() {
            return Err(anyhow::Error::new(error).context(format!("변환 실패: {:?}", path)));
        }
    } else if !errors.is_empty() {
        anyhow::bail!("{} 개의 파일 변환에 실패했습니다", errors.len());
    }

    if !args.dry_run {
        println!("{}", DONE);
    }

    Ok(())
}

/// 진행률 바와 통계를 갱신하는 관찰자
struct ProgressObserver {
    stats: Statistics,
    pb: ProgressBar,
}

impl ProgressObserver {
    fn new(total: usize) -> Self {
        Self {
            stats: Statistics::new(total),
            pb: create_progress_bar(total),
        }
    }

    fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl ConvertObserver for ProgressObserver {
    fn on_file_done(&self, path: &Path, result: &tabjson::Result<ConvertOutcome>) {
        self.pb.inc(1);

        match result {
            Ok(outcome) => self.stats.record_success(outcome),
            Err(e) => {
                self.stats.record_failure();
                tracing::warn!(file = %path.display(), error = %e, "변환 실패");
            }
        }
    }
}

/// 유효성 검사 모드 실행
fn run_validation_mode(args: &Args, inputs: &[PathBuf]) -> Result<()> {
    let pb = create_progress_bar(inputs.len());

    let results: Vec<(PathBuf, tabjson::Result<usize>)> = inputs
        .par_iter()
        .map(|path| {
            let result = validate_file(path, ParseMode::Strict).map(|record| record.data.len());
            pb.inc(1);
            (path.clone(), result)
        })
        .collect();

    pb.finish_and_clear();

    let mut errors = Vec::new();
    for (path, result) in results {
        match result {
            Ok(entries) => {
                if args.verbose {
                    eprintln!("  {} {:?} ({} 항목)", "✓".green(), path, entries);
                }
            }
            Err(e) => errors.push((path, e)),
        }
    }

    print_errors(&errors, true);

    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &errors)?;
    }

    if !errors.is_empty() {
        anyhow::bail!(
            "{} 개의 파일에 오류가 있습니다",
            errors.len().to_string().red()
        );
    }

    println!("{} 모든 파일이 유효합니다!", "✅".bright_green());
    Ok(())
}

/// 드라이런 출력
fn print_dry_run(outcomes: &[ConvertOutcome]) {
    println!("{}", "📋 생성 예정 파일 목록:".bright_cyan());
    for (i, outcome) in outcomes.iter().enumerate() {
        println!("  {}. {:?} → {:?}", i + 1, outcome.input, outcome.output);
    }
    println!(
        "{} 총 {} 개의 파일이 생성될 예정입니다.",
        "ℹ️".bright_blue(),
        outcomes.len().to_string().bright_green()
    );
}

/// 진행률 바 생성 (파일이 하나뿐이면 숨김)
fn create_progress_bar(total: usize) -> ProgressBar {
    if total <= 1 {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("█▓▒░"));
    }
    pb
}

/// 에러 목록 출력
fn print_errors(errors: &[(PathBuf, ConvertError)], verbose: bool) {
    if errors.is_empty() {
        return;
    }

    eprintln!("\n{}", "❌ 오류 발생 파일:".bright_red());
    for (path, error) in errors {
        eprintln!("  {} {:?}", "•".red(), path);
        if verbose {
            eprintln!("    {}", error.to_string().dimmed());
        }
    }
}

/// 에러 로그 파일 작성
fn write_error_log(log_path: &Path, errors: &[(PathBuf, ConvertError)]) -> Result<()> {
    let mut log_file = File::create(log_path)
        .with_context(|| format!("에러 로그 파일 생성 실패: {:?}", log_path))?;

    writeln!(log_file, "tabjson 에러 로그")?;
    writeln!(log_file, "생성 시간: {}", unix_now())?;
    writeln!(log_file, "총 에러 수: {}", errors.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for (path, error) in errors {
        writeln!(log_file, "\n파일: {:?}", path)?;
        writeln!(log_file, "에러: {}", error)?;
    }

    eprintln!("{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);

    Ok(())
}

/// 현재 시간 문자열 반환
fn unix_now() -> String {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}

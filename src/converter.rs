//! 파일 변환 모듈
//!
//! 개별 입력 파일의 읽기, 파싱, 직렬화, 출력 파일 쓰기를 담당합니다.

use memmap2::Mmap;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::parser::{parse_with_mode, split_lines, ParseMode, ParsedRecord};
use crate::serializer::{serialize_with_indent, DEFAULT_INDENT};

/// 모든 파일 변환이 끝났을 때 반환하는 문자열
pub const DONE: &str = "Done.";

/// 출력 파일 확장자
pub const OUTPUT_EXTENSION: &str = "json";

/// 변환 옵션
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// 파싱 모드
    pub mode: ParseMode,
    /// JSON 들여쓰기 폭
    pub indent: usize,
    /// 출력 파일을 쓰지 않음
    pub dry_run: bool,
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    pub mmap_threshold: u64,
}

impl ConvertOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            mmap_threshold: 10 * 1024 * 1024, // 10MB
            ..Default::default()
        }
    }

    /// 파싱 모드 설정
    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    /// 들여쓰기 폭 설정
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// 드라이런 설정
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 메모리 매핑 임계값 설정
    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }
}

/// 파일 하나의 변환 결과 요약
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOutcome {
    /// 입력 파일 경로
    pub input: PathBuf,
    /// 출력 파일 경로
    pub output: PathBuf,
    /// `data` 항목 수
    pub entries: usize,
    /// 주석 수
    pub comments: usize,
    /// 입력 파일 크기
    pub bytes_read: u64,
    /// 출력 JSON 크기 (드라이런이면 쓰지 않은 크기)
    pub bytes_written: u64,
}

/// 파일별 처리 결과 (`convert_each`용)
#[derive(Debug)]
pub struct ConvertResult {
    /// 처리된 파일 경로
    pub path: PathBuf,
    /// 변환 요약 (성공 시)
    pub outcome: Option<ConvertOutcome>,
    /// 에러 (실패 시)
    pub error: Option<ConvertError>,
}

impl ConvertResult {
    /// 성공 결과 생성
    pub fn success(path: PathBuf, outcome: ConvertOutcome) -> Self {
        Self {
            path,
            outcome: Some(outcome),
            error: None,
        }
    }

    /// 실패 결과 생성
    pub fn failure(path: PathBuf, error: ConvertError) -> Self {
        Self {
            path,
            outcome: None,
            error: Some(error),
        }
    }

    /// 변환 결과로부터 생성
    pub fn from_result(path: PathBuf, result: Result<ConvertOutcome>) -> Self {
        match result {
            Ok(outcome) => Self::success(path, outcome),
            Err(e) => Self::failure(path, e),
        }
    }

    /// 성공 여부
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// 입력 경로에서 출력 경로 도출
///
/// 마지막 확장자만 `.json`으로 바꾸며, 확장자가 없으면 `.json`을 붙입니다.
///
/// # Examples
/// ```
/// use std::path::{Path, PathBuf};
/// use tabjson::converter::output_path_for;
///
/// assert_eq!(output_path_for(Path::new("notes.txt")), PathBuf::from("notes.json"));
/// assert_eq!(output_path_for(Path::new("a.b.txt")), PathBuf::from("a.b.json"));
/// ```
pub fn output_path_for(input: &Path) -> PathBuf {
    input.with_extension(OUTPUT_EXTENSION)
}

/// 단일 파일 변환
///
/// 입력을 모두 읽은 뒤 파싱과 직렬화를 마치고 나서야 출력 파일을 엽니다.
/// 파일 핸들은 에러 경로를 포함한 모든 경우에 스코프를 벗어나며 닫힙니다.
pub fn convert_file(path: &Path, options: &ConvertOptions) -> Result<ConvertOutcome> {
    let output = output_path_for(path);
    if output == path {
        return Err(ConvertError::OutputIsInput {
            path: path.to_path_buf(),
        });
    }

    let (record, bytes_read) = read_record(path, options)?;
    let json = serialize_with_indent(&record, options.indent).map_err(|e| e.with_file(path))?;

    if options.dry_run {
        tracing::debug!(input = %path.display(), output = %output.display(), "드라이런: 쓰기 생략");
    } else {
        write_output(&output, &json)?;
        tracing::debug!(input = %path.display(), output = %output.display(), "변환 완료");
    }

    Ok(ConvertOutcome {
        input: path.to_path_buf(),
        output,
        entries: record.data.len(),
        comments: record.comments.len(),
        bytes_read,
        bytes_written: json.len() as u64,
    })
}

/// 출력 없이 파싱만 수행
pub fn validate_file(path: &Path, mode: ParseMode) -> Result<ParsedRecord> {
    let options = ConvertOptions::new().with_mode(mode);
    read_record(path, &options).map(|(record, _)| record)
}

/// 모든 파일을 기본 옵션으로 변환하고 `"Done."` 반환
///
/// 파일 사이에는 순서 의존성이 없으므로 병렬로 처리합니다. 첫 번째 실패에서
/// 남은 작업을 중단하고 그 에러를 반환합니다.
///
/// # Examples
/// ```no_run
/// let status = tabjson::convert_files(&["notes.txt", "words.txt"]).unwrap();
/// assert_eq!(status, "Done.");
/// ```
pub fn convert_files<P>(paths: &[P]) -> Result<&'static str>
where
    P: AsRef<Path> + Sync,
{
    convert_files_with(paths, &ConvertOptions::new())
}

/// 지정한 옵션으로 모든 파일 변환 (첫 실패에서 중단)
pub fn convert_files_with<P>(paths: &[P], options: &ConvertOptions) -> Result<&'static str>
where
    P: AsRef<Path> + Sync,
{
    convert_all(paths, options, &NoopObserver).map(|_| DONE)
}

/// 파일 하나의 변환이 끝날 때마다 알림을 받는 관찰자
///
/// 여러 스레드에서 동시에 호출됩니다.
pub trait ConvertObserver: Sync {
    fn on_file_done(&self, _path: &Path, _result: &Result<ConvertOutcome>) {}
}

/// 아무것도 하지 않는 관찰자
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ConvertObserver for NoopObserver {}

/// 모든 파일 변환 후 입력 순서대로 결과 반환 (첫 실패에서 중단)
///
/// 출력 경로가 겹치는 입력이 있으면 아무 파일도 쓰지 않고 실패합니다.
pub fn convert_all<P, O>(
    paths: &[P],
    options: &ConvertOptions,
    observer: &O,
) -> Result<Vec<ConvertOutcome>>
where
    P: AsRef<Path> + Sync,
    O: ConvertObserver + ?Sized,
{
    let conflicts = find_output_conflicts(paths);
    if let Some(index) = conflicts.keys().min() {
        let (output, first) = &conflicts[index];
        return Err(ConvertError::DuplicateOutput {
            output: output.clone(),
            first: first.clone(),
            second: paths[*index].as_ref().to_path_buf(),
        });
    }

    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            let result = convert_file(path, options);
            observer.on_file_done(path, &result);
            result
        })
        .collect()
}

/// 모든 파일을 각각 독립적으로 변환
///
/// 실패한 파일이 있어도 나머지 파일을 계속 처리하며, 결과는 입력 순서를 따릅니다.
pub fn convert_each<P>(paths: &[P], options: &ConvertOptions) -> Vec<ConvertResult>
where
    P: AsRef<Path> + Sync,
{
    convert_each_observed(paths, options, &NoopObserver)
}

/// `convert_each`와 같으며 파일마다 관찰자에게 알림
///
/// 앞선 입력과 출력 경로가 겹치는 입력은 변환하지 않고 실패로 기록합니다.
pub fn convert_each_observed<P, O>(
    paths: &[P],
    options: &ConvertOptions,
    observer: &O,
) -> Vec<ConvertResult>
where
    P: AsRef<Path> + Sync,
    O: ConvertObserver + ?Sized,
{
    let conflicts = find_output_conflicts(paths);

    paths
        .par_iter()
        .enumerate()
        .map(|(index, path)| {
            let path = path.as_ref();
            let result = match conflicts.get(&index) {
                Some((output, first)) => Err(ConvertError::DuplicateOutput {
                    output: output.clone(),
                    first: first.clone(),
                    second: path.to_path_buf(),
                }),
                None => convert_file(path, options),
            };
            observer.on_file_done(path, &result);
            ConvertResult::from_result(path.to_path_buf(), result)
        })
        .collect()
}

/// 앞선 입력과 같은 출력 경로를 갖는 입력 찾기
///
/// 반환값: 입력 위치 → (겹치는 출력 경로, 먼저 나온 입력)
fn find_output_conflicts<P>(paths: &[P]) -> HashMap<usize, (PathBuf, PathBuf)>
where
    P: AsRef<Path>,
{
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();
    let mut conflicts = HashMap::new();

    for (index, path) in paths.iter().enumerate() {
        let output = output_path_for(path.as_ref());
        match seen.get(&output) {
            Some(&first) => {
                let first = paths[first].as_ref().to_path_buf();
                conflicts.insert(index, (output, first));
            }
            None => {
                seen.insert(output, index);
            }
        }
    }

    conflicts
}

/// 입력 파일을 읽어 파싱
fn read_record(path: &Path, options: &ConvertOptions) -> Result<(ParsedRecord, u64)> {
    let (bytes, file_size) = read_input(path, options.mmap_threshold)?;
    let text = String::from_utf8_lossy(&bytes);
    let lines = split_lines(&text);

    let record = parse_with_mode(&lines, options.mode).map_err(|e| e.with_file(path))?;
    Ok((record, file_size))
}

/// 읽어 들인 입력 바이트
enum InputBytes {
    /// 메모리 매핑된 대용량 파일
    Mapped(Mmap),
    /// 버퍼로 읽은 일반 파일
    Buffered(Vec<u8>),
}

impl Deref for InputBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            InputBytes::Mapped(mmap) => &mmap[..],
            InputBytes::Buffered(buffer) => buffer,
        }
    }
}

/// 입력 파일 전체 읽기
fn read_input(path: &Path, mmap_threshold: u64) -> Result<(InputBytes, u64)> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let file_size = file
        .metadata()
        .map_err(|e| read_error(path, e))?
        .len();

    let bytes = if file_size > 0 && file_size >= mmap_threshold {
        // 대용량 파일: 메모리 매핑 사용
        let mmap = unsafe { Mmap::map(&file).map_err(|e| read_error(path, e))? };
        InputBytes::Mapped(mmap)
    } else {
        // 일반 파일: 버퍼 리더 사용
        let mut buffer = Vec::with_capacity(file_size as usize);
        BufReader::new(file)
            .read_to_end(&mut buffer)
            .map_err(|e| read_error(path, e))?;
        InputBytes::Buffered(buffer)
    };

    Ok((bytes, file_size))
}

/// 출력 파일 생성 (있으면 덮어쓰기) 후 쓰기
fn write_output(path: &Path, json: &str) -> Result<()> {
    let file = File::create(path).map_err(|e| write_error(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(json.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| write_error(path, e))
}

fn open_error(path: &Path, e: io::Error) -> ConvertError {
    if e.kind() == io::ErrorKind::NotFound {
        ConvertError::InputNotFound {
            path: path.to_path_buf(),
        }
    } else {
        ConvertError::FileOpenError {
            file: path.to_path_buf(),
            reason: e.to_string(),
        }
    }
}

fn read_error(path: &Path, e: io::Error) -> ConvertError {
    ConvertError::ReadError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn write_error(path: &Path, e: io::Error) -> ConvertError {
    ConvertError::WriteError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_input(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_output_path_for() {
        assert_eq!(output_path_for(Path::new("notes.txt")), PathBuf::from("notes.json"));
        assert_eq!(output_path_for(Path::new("a.b.txt")), PathBuf::from("a.b.json"));
        assert_eq!(output_path_for(Path::new("notes")), PathBuf::from("notes.json"));
        assert_eq!(
            output_path_for(Path::new("dir.v2/notes")),
            PathBuf::from("dir.v2/notes.json")
        );
    }

    #[test]
    fn test_convert_file_writes_sibling() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_input(temp_dir.path(), "a.txt", "#c\n\"k\"\t\"v\"\n");

        let outcome = convert_file(&path, &ConvertOptions::new()).unwrap();

        assert_eq!(outcome.output, temp_dir.path().join("a.json"));
        assert_eq!(outcome.entries, 1);
        assert_eq!(outcome.comments, 1);
        let written = fs::read_to_string(&outcome.output).unwrap();
        assert_eq!(written.len() as u64, outcome.bytes_written);
    }

    #[test]
    fn test_convert_file_overwrites_existing_output() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_input(temp_dir.path(), "a.txt", "");
        let stale = "x".repeat(500);
        fs::write(temp_dir.path().join("a.json"), &stale).unwrap();

        convert_file(&path, &ConvertOptions::new()).unwrap();

        let written = fs::read_to_string(temp_dir.path().join("a.json")).unwrap();
        assert_eq!(written, "{\n    \"data\": {},\n    \"comments\": []\n}");
    }

    #[test]
    fn test_dry_run_skips_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_input(temp_dir.path(), "a.txt", "#c\n");

        let options = ConvertOptions::new().with_dry_run(true);
        let outcome = convert_file(&path, &options).unwrap();

        assert!(!outcome.output.exists());
        assert!(outcome.bytes_written > 0);
    }

    #[test]
    fn test_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let err = convert_file(&temp_dir.path().join("nope.txt"), &ConvertOptions::new())
            .unwrap_err();
        assert!(matches!(err, ConvertError::InputNotFound { .. }));
    }

    #[test]
    fn test_refuses_to_overwrite_input() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_input(temp_dir.path(), "a.json", "#c\n");

        let err = convert_file(&path, &ConvertOptions::new()).unwrap_err();

        assert!(matches!(err, ConvertError::OutputIsInput { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "#c\n");
    }

    #[test]
    fn test_strict_error_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_input(temp_dir.path(), "bad.txt", "#ok\nbroken line\n");

        let options = ConvertOptions::new().with_mode(ParseMode::Strict);
        let err = convert_file(&path, &options).unwrap_err();

        match err {
            ConvertError::MalformedLine { file, line, .. } => {
                assert_eq!(file, path);
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!temp_dir.path().join("bad.json").exists());
    }

    #[test]
    fn test_read_input_maps_large_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_input(temp_dir.path(), "a.txt", "#c\n");
        let empty = create_input(temp_dir.path(), "empty.txt", "");

        let (mapped, size) = read_input(&path, 1).unwrap();
        assert!(matches!(mapped, InputBytes::Mapped(_)));
        assert_eq!(size, 3);
        assert_eq!(&mapped[..], b"#c\n");

        let (buffered, _) = read_input(&path, 1024).unwrap();
        assert!(matches!(buffered, InputBytes::Buffered(_)));

        // 빈 파일은 매핑하지 않음
        let (empty_bytes, _) = read_input(&empty, 0).unwrap();
        assert!(matches!(empty_bytes, InputBytes::Buffered(_)));
    }

    #[test]
    fn test_mmap_path_matches_buffered() {
        let temp_dir = TempDir::new().unwrap();
        // 잘못된 UTF-8 바이트는 두 경로 모두 대체 문자로 바뀌어야 함
        let content: &[u8] = b"#caf\xff\n\"k\"\t\"v\xfe\"\n";
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        fs::write(&a, content).unwrap();
        fs::write(&b, content).unwrap();

        convert_file(&a, &ConvertOptions::new()).unwrap();
        convert_file(&b, &ConvertOptions::new().with_mmap_threshold(1)).unwrap();

        let buffered = fs::read_to_string(temp_dir.path().join("a.json")).unwrap();
        let mapped = fs::read_to_string(temp_dir.path().join("b.json")).unwrap();
        assert_eq!(buffered, mapped);
        assert!(mapped.contains("\"caf\u{FFFD}\""));
        assert!(mapped.contains("\"k\": \"v\u{FFFD}\""));
    }

    #[test]
    fn test_find_output_conflicts() {
        let paths = ["a.tsv", "b.txt", "a.txt", "a.tsv"];
        let conflicts = find_output_conflicts(&paths);

        assert_eq!(conflicts.len(), 2);
        assert_eq!(
            conflicts[&2],
            (PathBuf::from("a.json"), PathBuf::from("a.tsv"))
        );
        assert_eq!(
            conflicts[&3],
            (PathBuf::from("a.json"), PathBuf::from("a.tsv"))
        );
    }

    #[test]
    fn test_convert_all_rejects_shared_output_before_writing() {
        let temp_dir = TempDir::new().unwrap();
        let tsv = create_input(temp_dir.path(), "a.tsv", "#tsv\n");
        let txt = create_input(temp_dir.path(), "a.txt", "#txt\n");

        let err = convert_all(&[tsv.clone(), txt.clone()], &ConvertOptions::new(), &NoopObserver)
            .unwrap_err();

        match err {
            ConvertError::DuplicateOutput { first, second, .. } => {
                assert_eq!(first, tsv);
                assert_eq!(second, txt);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!temp_dir.path().join("a.json").exists());
    }

    #[test]
    fn test_convert_each_keeps_first_of_shared_output() {
        let temp_dir = TempDir::new().unwrap();
        let tsv = create_input(temp_dir.path(), "a.tsv", "#tsv\n");
        let txt = create_input(temp_dir.path(), "a.txt", "#txt\n");

        let results = convert_each(&[tsv, txt], &ConvertOptions::new());

        assert!(results[0].is_success());
        assert!(matches!(
            results[1].error,
            Some(ConvertError::DuplicateOutput { .. })
        ));
        let written = fs::read_to_string(temp_dir.path().join("a.json")).unwrap();
        assert!(written.contains("\"tsv\""));
    }

    #[test]
    fn test_observer_sees_every_file() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[derive(Default)]
        struct Counter {
            ok: AtomicUsize,
            failed: AtomicUsize,
        }

        impl ConvertObserver for Counter {
            fn on_file_done(&self, _path: &Path, result: &Result<ConvertOutcome>) {
                let counter = if result.is_ok() { &self.ok } else { &self.failed };
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let good = create_input(temp_dir.path(), "good.txt", "#c\n");
        let missing = temp_dir.path().join("missing.txt");

        let counter = Counter::default();
        let results = convert_each_observed(&[good, missing], &ConvertOptions::new(), &counter);

        assert_eq!(results.len(), 2);
        assert_eq!(counter.ok.load(Ordering::Relaxed), 1);
        assert_eq!(counter.failed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_validate_file() {
        let temp_dir = TempDir::new().unwrap();
        let good = create_input(temp_dir.path(), "good.txt", "\"k\"\t\"v\"\n");
        let bad = create_input(temp_dir.path(), "bad.txt", "\"k\"\n");

        assert!(validate_file(&good, ParseMode::Strict).is_ok());
        assert!(validate_file(&bad, ParseMode::Strict).is_err());
        assert!(validate_file(&bad, ParseMode::Permissive).is_ok());
        assert!(!temp_dir.path().join("good.json").exists());
    }

    #[test]
    fn test_convert_each_isolates_failures() {
        let temp_dir = TempDir::new().unwrap();
        let good = create_input(temp_dir.path(), "good.txt", "#c\n");
        let missing = temp_dir.path().join("missing.txt");

        let results = convert_each(&[good.clone(), missing.clone()], &ConvertOptions::new());

        assert_eq!(results.len(), 2);
        assert!(results[0].is_success());
        assert_eq!(results[1].path, missing);
        assert!(!results[1].is_success());
        assert!(temp_dir.path().join("good.json").exists());
    }
}

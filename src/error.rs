//! 에러 타입 정의 모듈
//!
//! tabjson에서 발생할 수 있는 모든 에러 타입을 정의합니다.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// tabjson에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 입력 파일이 존재하지 않음
    #[error("입력 파일을 찾을 수 없습니다: {path}")]
    InputNotFound { path: PathBuf },

    /// 입력 파일 열기 실패
    #[error("파일을 열 수 없습니다 ({file}): {reason}")]
    FileOpenError { file: PathBuf, reason: String },

    /// 입력 파일 읽기 실패
    #[error("파일 읽기 실패 ({file}): {reason}")]
    ReadError { file: PathBuf, reason: String },

    /// 형식에 맞지 않는 데이터 라인 (strict 모드)
    #[error("잘못된 라인 ({file}:{line}): {reason}")]
    MalformedLine {
        file: PathBuf,
        line: usize,
        reason: String,
    },

    /// JSON 직렬화 실패
    #[error("JSON 직렬화 실패 ({file}): {reason}")]
    SerializeError { file: PathBuf, reason: String },

    /// 출력 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({file}): {reason}")]
    WriteError { file: PathBuf, reason: String },

    /// 출력 경로가 입력 경로와 같음
    #[error("출력 파일이 입력 파일과 같습니다: {path}")]
    OutputIsInput { path: PathBuf },

    /// 서로 다른 입력이 같은 출력 파일을 가리킴
    #[error("출력 파일이 겹칩니다 ({output}): {first} / {second}")]
    DuplicateOutput {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    /// 스레드 풀 초기화 실패
    #[error("스레드 풀 초기화 실패: {reason}")]
    ThreadPoolError { reason: String },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },

    /// 처리할 파일 없음
    #[error("처리할 입력 파일이 없습니다")]
    NoInputFiles,
}

impl ConvertError {
    /// 파일 경로가 아직 정해지지 않은 파서/직렬화 에러에 경로를 채워 넣음
    pub(crate) fn with_file(self, path: &Path) -> Self {
        match self {
            ConvertError::MalformedLine { line, reason, .. } => ConvertError::MalformedLine {
                file: path.to_path_buf(),
                line,
                reason,
            },
            ConvertError::SerializeError { reason, .. } => ConvertError::SerializeError {
                file: path.to_path_buf(),
                reason,
            },
            other => other,
        }
    }

    /// 에러와 관련된 파일 경로 (쓰기 에러는 출력 파일, 파일과 무관한 에러는 `None`)
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConvertError::InputNotFound { path } | ConvertError::OutputIsInput { path } => {
                Some(path.as_path())
            }
            ConvertError::FileOpenError { file, .. }
            | ConvertError::ReadError { file, .. }
            | ConvertError::MalformedLine { file, .. }
            | ConvertError::SerializeError { file, .. }
            | ConvertError::WriteError { file, .. } => Some(file.as_path()),
            ConvertError::DuplicateOutput { second, .. } => Some(second.as_path()),
            ConvertError::ThreadPoolError { .. }
            | ConvertError::InvalidPattern { .. }
            | ConvertError::NoInputFiles => None,
        }
    }
}

/// tabjson 결과 타입 별칭
pub type Result<T> = std::result::Result<T, ConvertError>;

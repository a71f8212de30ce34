//! 라인 파싱 모듈
//!
//! 탭 구분 텍스트의 각 라인을 주석 라인과 데이터 라인으로 분류하고
//! `ParsedRecord`로 모읍니다.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::error::{ConvertError, Result};

/// 주석 라인 표시 문자
pub const COMMENT_MARKER: char = '#';

/// 데이터 라인 필드 구분자
pub const FIELD_SEPARATOR: char = '\t';

/// 필드 인용 문자
pub const QUOTE: char = '"';

/// 파싱 결과
///
/// `data`는 키 삽입 순서를 유지하며, 같은 키가 다시 나오면 값만 갱신됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    /// 키/값 매핑
    pub data: Map<String, Value>,
    /// 주석 목록 (입력 순서 유지)
    pub comments: Vec<String>,
}

impl ParsedRecord {
    /// 빈 레코드 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 키에 해당하는 값 조회
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    fn insert(&mut self, key: &str, value: &str) {
        self.data
            .insert(key.to_string(), Value::String(value.to_string()));
    }

    fn push_comment(&mut self, comment: &str) {
        self.comments.push(comment.to_string());
    }
}

/// 파싱 모드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// 형식이 어긋난 라인도 에러 없이 처리
    #[default]
    Permissive,
    /// 형식이 어긋난 데이터 라인을 에러로 보고
    Strict,
}

/// 한 라인의 분류 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `#` 이후의 주석 텍스트
    Comment(&'a str),
    /// 인용 부호가 제거된 키와 값 (값 필드가 없으면 `None`)
    Data { key: &'a str, value: Option<&'a str> },
    /// 빈 라인
    Blank,
}

/// 라인 하나를 분류
///
/// # Examples
/// ```
/// use tabjson::parser::{classify_line, LineKind};
///
/// assert_eq!(classify_line("#note"), LineKind::Comment("note"));
/// assert_eq!(
///     classify_line("\"k\"\t\"v\""),
///     LineKind::Data { key: "k", value: Some("v") }
/// );
/// ```
pub fn classify_line(line: &str) -> LineKind<'_> {
    if let Some(comment) = line.strip_prefix(COMMENT_MARKER) {
        return LineKind::Comment(comment);
    }
    if line.is_empty() {
        return LineKind::Blank;
    }

    let mut fields = line.split(FIELD_SEPARATOR);
    let key = strip_quotes(fields.next().unwrap_or_default());
    let value = fields.next().map(strip_quotes);

    LineKind::Data { key, value }
}

/// 필드의 첫 글자와 마지막 글자를 제거
///
/// 두 글자보다 짧은 필드는 그대로 반환합니다. 실제 문자가 인용 부호인지는
/// 확인하지 않습니다.
pub fn strip_quotes(field: &str) -> &str {
    let mut chars = field.chars();
    if chars.next().is_none() || chars.next_back().is_none() {
        return field;
    }
    chars.as_str()
}

/// 텍스트를 라인 단위로 분리
///
/// `\n`과 `\r\n`을 모두 라인 끝으로 인식하며, 마지막 줄바꿈 뒤의 빈 라인은
/// 만들지 않습니다. `\n` 앞에 오지 않은 `\r`은 라인의 일부로 남습니다.
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }

    let (body, terminated) = match text.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (text, false),
    };

    let mut lines: Vec<&str> = body.split('\n').collect();
    let last = lines.len() - 1;
    for (index, line) in lines.iter_mut().enumerate() {
        if index < last || terminated {
            let current: &str = *line;
            *line = current.strip_suffix('\r').unwrap_or(current);
        }
    }

    lines
}

/// 라인 목록을 관대한 모드로 파싱
///
/// 에러를 반환하지 않습니다. 값 필드가 없는 데이터 라인은 `data`에
/// 아무것도 남기지 않고, 세 개 이상의 필드는 앞의 두 개만 사용합니다.
pub fn parse<S: AsRef<str>>(lines: &[S]) -> ParsedRecord {
    let mut record = ParsedRecord::new();

    for line in lines {
        match classify_line(line.as_ref()) {
            LineKind::Comment(comment) => record.push_comment(comment),
            LineKind::Data {
                key,
                value: Some(value),
            } => record.insert(key, value),
            LineKind::Data { key, value: None } => {
                tracing::debug!(key, "값 필드가 없는 데이터 라인 무시");
            }
            LineKind::Blank => {}
        }
    }

    record
}

/// 지정한 모드로 라인 목록 파싱
///
/// `ParseMode::Strict`에서는 빈 라인과 주석을 제외한 모든 라인이
/// `"키"<TAB>"값"` 형식이어야 합니다.
pub fn parse_with_mode<S: AsRef<str>>(lines: &[S], mode: ParseMode) -> Result<ParsedRecord> {
    if mode == ParseMode::Permissive {
        return Ok(parse(lines));
    }

    let mut record = ParsedRecord::new();

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        match classify_line(line) {
            LineKind::Comment(comment) => record.push_comment(comment),
            LineKind::Blank => {}
            LineKind::Data { .. } => {
                let (key, value) =
                    check_data_line(line).map_err(|reason| ConvertError::MalformedLine {
                        file: PathBuf::new(),
                        line: index + 1,
                        reason,
                    })?;
                record.insert(key, value);
            }
        }
    }

    Ok(record)
}

/// 데이터 라인 형식 검사 후 인용 부호가 제거된 키와 값 반환
fn check_data_line(line: &str) -> std::result::Result<(&str, &str), String> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() != 2 {
        return Err(format!(
            "탭으로 구분된 필드가 2개여야 합니다 (실제: {}개)",
            fields.len()
        ));
    }

    let key = unquote(fields[0])
        .ok_or_else(|| format!("키가 인용 부호로 감싸져 있지 않습니다: {}", fields[0]))?;
    let value = unquote(fields[1])
        .ok_or_else(|| format!("값이 인용 부호로 감싸져 있지 않습니다: {}", fields[1]))?;

    Ok((key, value))
}

fn unquote(field: &str) -> Option<&str> {
    field.strip_prefix(QUOTE)?.strip_suffix(QUOTE)
}

//! JSON 직렬화 모듈

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::PathBuf;

use crate::error::{ConvertError, Result};
use crate::parser::ParsedRecord;

/// 기본 들여쓰기 폭
pub const DEFAULT_INDENT: usize = 4;

/// 레코드를 4칸 들여쓰기 JSON 문자열로 변환
///
/// # Examples
/// ```
/// use tabjson::parser::parse;
/// use tabjson::serializer::serialize;
///
/// let json = serialize(&parse(&["#hi"])).unwrap();
/// assert_eq!(json, "{\n    \"data\": {},\n    \"comments\": [\n        \"hi\"\n    ]\n}");
/// ```
pub fn serialize(record: &ParsedRecord) -> Result<String> {
    serialize_with_indent(record, DEFAULT_INDENT)
}

/// 지정한 폭으로 들여쓰기한 JSON 문자열로 변환
pub fn serialize_with_indent(record: &ParsedRecord, width: usize) -> Result<String> {
    let indent = " ".repeat(width);
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());

    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    record
        .serialize(&mut serializer)
        .map_err(|e| ConvertError::SerializeError {
            file: PathBuf::new(),
            reason: e.to_string(),
        })?;

    String::from_utf8(buffer).map_err(|e| ConvertError::SerializeError {
        file: PathBuf::new(),
        reason: e.to_string(),
    })
}

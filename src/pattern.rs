//! 입력 파일 필터링 모듈
//!
//! 폴더 인자를 펼칠 때 glob 패턴으로 파일 이름을 거릅니다.

use glob::Pattern;
use std::path::Path;

use crate::error::{ConvertError, Result};

/// 폴더 인자에 적용하는 기본 패턴
pub const DEFAULT_PATTERN: &str = "*.txt";

/// 컴파일된 파일 이름 매처
#[derive(Debug, Default)]
pub struct PatternMatcher {
    pattern: Option<Pattern>,
}

impl PatternMatcher {
    /// 새 매처 생성 (`None`이면 모든 파일 허용)
    ///
    /// # Examples
    /// ```
    /// use tabjson::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new(Some("*.tsv")).unwrap();
    /// assert!(matcher.matches("words.tsv"));
    /// assert!(!matcher.matches("words.txt"));
    /// ```
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern
            .map(|p| {
                Pattern::new(p).map_err(|_| ConvertError::InvalidPattern {
                    pattern: p.to_string(),
                })
            })
            .transpose()?;

        Ok(Self { pattern })
    }

    /// 파일 이름이 패턴과 일치하는지 확인
    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern
            .as_ref()
            .map_or(true, |p| p.matches(file_name))
    }

    /// 경로의 파일 이름 부분으로 일치 여부 확인
    pub fn matches_path(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|s| s.to_str())
            .map(|name| self.matches(name))
            .unwrap_or(false)
    }

    /// 설정된 패턴 문자열
    pub fn as_str(&self) -> Option<&str> {
        self.pattern.as_ref().map(Pattern::as_str)
    }
}

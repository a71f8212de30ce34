//! tabjson - TAB TEXT TO JSON CONVERTER
//!
//! 탭으로 구분된 주석 포함 텍스트 파일을 JSON 문서로 변환합니다.
//! 입력 파일마다 확장자만 `.json`으로 바꾼 파일이 같은 위치에 생성됩니다.
//!
//! # 입력 형식
//!
//! ```text
//! #header comment
//! "name"	"Ada"
//! "role"	"Engineer"
//! ```
//!
//! # 출력 형식
//!
//! ```json
//! {
//!     "data": {
//!         "name": "Ada",
//!         "role": "Engineer"
//!     },
//!     "comments": [
//!         "header comment"
//!     ]
//! }
//! ```
//!
//! # 주요 기능
//!
//! - 🚀 **병렬 처리**: Rayon으로 여러 파일을 동시에 변환
//! - 🧪 **strict 모드**: 형식이 어긋난 데이터 라인을 라인 번호와 함께 보고
//! - 🔁 **keep-going 모드**: 실패한 파일을 건너뛰고 나머지 계속 변환
//! - 🔍 **폴더 입력**: glob 패턴으로 폴더 안의 입력 파일 선택
//! - 📈 **상세 통계**: 항목/주석 수, 입출력 용량 표시
//!
//! # 예제
//!
//! ```bash
//! tabjson notes.txt words.txt
//! tabjson ./data --pattern "*.tsv" --keep-going
//! ```

pub mod cli;
pub mod converter;
pub mod error;
pub mod logging;
pub mod parser;
pub mod pattern;
pub mod serializer;
pub mod stats;

// Re-exports for convenient access
pub use cli::Args;
pub use converter::{
    convert_all, convert_each, convert_each_observed, convert_file, convert_files,
    convert_files_with, output_path_for, validate_file, ConvertObserver, ConvertOptions,
    ConvertOutcome, ConvertResult, NoopObserver, DONE,
};
pub use error::{ConvertError, Result};
pub use parser::{parse, parse_with_mode, ParseMode, ParsedRecord};
pub use pattern::PatternMatcher;
pub use serializer::serialize;
pub use stats::{format_bytes, Statistics};

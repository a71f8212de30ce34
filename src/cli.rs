//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::Parser;
use std::path::PathBuf;

use crate::converter::ConvertOptions;
use crate::parser::ParseMode;
use crate::pattern::DEFAULT_PATTERN;
use crate::serializer::DEFAULT_INDENT;

/// tabjson CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "tabjson",
    author = "YourName <your@email.com>",
    version,
    about = "TAB TEXT TO JSON CONVERTER - 탭 구분 주석 텍스트 파일을 JSON으로 변환하는 CLI 도구",
    long_about = r#"
TAB TEXT TO JSON CONVERTER
==========================

각 입력 파일을 읽어 같은 위치에 확장자만 .json으로 바꾼 파일을 만듭니다.

입력 형식:
  #주석 텍스트
  "키"<TAB>"값"

출력 형식:
  { "data": { "키": "값" }, "comments": ["주석 텍스트"] }

예제:
  tabjson notes.txt words.txt
  tabjson --strict notes.txt
  tabjson ./data --pattern "*.tsv" --keep-going
  tabjson ./data --validate-only
"#
)]
pub struct Args {
    /// 변환할 입력 파일 (폴더를 지정하면 패턴과 일치하는 파일로 펼침)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// 형식이 어긋난 데이터 라인을 에러로 처리
    #[arg(long)]
    pub strict: bool,

    /// 실패한 파일이 있어도 나머지 파일을 계속 변환
    #[arg(short, long)]
    pub keep_going: bool,

    /// 폴더 인자에 적용할 파일 이름 패턴 (glob 형식)
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// 최대 폴더 탐색 깊이
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// 실제 변환 없이 입력/출력 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 형식 검사만 수행 (출력 파일 없음, strict 규칙 적용)
    #[arg(long)]
    pub validate_only: bool,

    /// 병렬 처리 스레드 수 (기본값: CPU 코어 수)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// JSON 들여쓰기 폭
    #[arg(long, default_value_t = DEFAULT_INDENT)]
    pub indent: usize,

    /// 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 파싱 모드 반환
    pub fn parse_mode(&self) -> ParseMode {
        if self.strict || self.validate_only {
            ParseMode::Strict
        } else {
            ParseMode::Permissive
        }
    }

    /// 인자로부터 변환 옵션 생성
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions::new()
            .with_mode(self.parse_mode())
            .with_indent(self.indent)
            .with_dry_run(self.dry_run)
    }
}

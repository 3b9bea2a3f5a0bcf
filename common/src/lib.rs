//! Chat Score Common Library
//!
//! 採点パイプラインとエクスポートで共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod prompts;
pub mod parser;
pub mod export;

pub use types::{ChatRecord, ScoredPosition, SheetBundle, SourceMeta};
pub use error::{Error, Result};
pub use prompts::{render_system_prompt, PERSON_PLACEHOLDER};
pub use parser::{answer_content, extract_json_object, parse_score_content};
pub use export::table::{build_export_tables, flatten_sub_scores, ExportTable, ExportTables};

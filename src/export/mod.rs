pub mod excel;

use crate::error::Result;
use crate::results::ResultLog;
use chat_score_common::{build_export_tables, ScoredPosition};
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_FILE: &str = "results.xlsx";

/// 出力したシートの概要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub position: ScoredPosition,
    pub rows: usize,
    pub sub_columns: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// 書き出したファイル（出力対象の行がなければ None）
    pub output: Option<PathBuf>,
    pub sheets: Vec<SheetSummary>,
    /// 職種不明で除外した行数
    pub dropped: usize,
}

/// 結果ログを職種別シートのExcelに変換
///
/// ログがない・空の場合は EmptyLog を返し、何も書き出さない
pub fn export_log(log: &ResultLog, output: &Path) -> Result<ExportReport> {
    let records = log.read_records()?;
    let total = records.len();
    let tables = build_export_tables(records);

    if tables.dropped > 0 {
        tracing::warn!(
            "scored_position が guihua / xingzheng 以外の {}件を除外しました",
            tables.dropped
        );
    }

    let sheets: Vec<SheetSummary> = tables
        .tables
        .iter()
        .map(|t| SheetSummary {
            position: t.position,
            rows: t.rows.len(),
            sub_columns: t.sub_column_count(),
        })
        .collect();

    if tables.is_empty() {
        tracing::warn!("出力対象の行がありません（{}件すべて除外）", total);
        return Ok(ExportReport {
            output: None,
            sheets,
            dropped: tables.dropped,
        });
    }

    excel::write_results_excel(&tables.tables, output)?;

    Ok(ExportReport {
        output: Some(output.to_path_buf()),
        sheets,
        dropped: tables.dropped,
    })
}

//! チャットログExcelの読み込み
//!
//! 各シートの1行目をヘッダとして扱い、Type == 1 の行から
//! Remark / StrContent / StrTime を取り出す。
//! 条件を満たさないシートは警告を出してスキップする。

pub mod cell;

use crate::error::{ScoreError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use cell::{cell_to_string, is_message_type};
use chat_score_common::{ChatRecord, SheetBundle};
use std::path::Path;

/// 行種別の列
pub const TYPE_COLUMN: &str = "Type";

/// 取り出す列（この順で ChatRecord に対応）
pub const RECORD_COLUMNS: [&str; 3] = ["Remark", "StrContent", "StrTime"];

/// ワークブックの全シートを読み込む
///
/// 返り値はワークブックのシート順。スキップしたシートは含まない。
pub fn extract_sheets(path: &Path) -> Result<Vec<SheetBundle>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ScoreError::Workbook(format!("{}: {}", path.display(), e)))?;

    let mut bundles = Vec::new();

    for sheet_name in workbook.sheet_names() {
        let range = match workbook.worksheet_range(&sheet_name) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!("シート {} を読み込めません、スキップ: {}", sheet_name, e);
                continue;
            }
        };

        match extract_range(&sheet_name, &range) {
            Ok(bundle) => {
                tracing::debug!("シート {}: {}件のメッセージ", sheet_name, bundle.data.len());
                bundles.push(bundle);
            }
            Err(e) => tracing::warn!("{}、スキップ", e),
        }
    }

    Ok(bundles)
}

/// 1シート分のセル範囲から SheetBundle を作る
///
/// Type 列がない・Type == 1 の行がない・必要な列がない場合は InputShape エラー
pub fn extract_range(sheet_name: &str, range: &Range<Data>) -> Result<SheetBundle> {
    let mut rows = range.rows();

    let header: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_to_string).collect())
        .unwrap_or_default();
    let column_index = |name: &str| header.iter().position(|h| h == name);

    let type_idx = column_index(TYPE_COLUMN).ok_or_else(|| {
        ScoreError::InputShape(format!("シート {} に {} 列がありません", sheet_name, TYPE_COLUMN))
    })?;

    let message_rows: Vec<&[Data]> = rows
        .filter(|row| row.get(type_idx).map(is_message_type).unwrap_or(false))
        .collect();

    if message_rows.is_empty() {
        return Err(ScoreError::InputShape(format!(
            "シート {} に {} が 1 の行がありません",
            sheet_name, TYPE_COLUMN
        )));
    }

    let mut indices = [0usize; 3];
    for (slot, name) in indices.iter_mut().zip(RECORD_COLUMNS) {
        *slot = column_index(name).ok_or_else(|| {
            ScoreError::InputShape(format!("シート {} に {} 列がありません", sheet_name, name))
        })?;
    }
    let [remark_idx, content_idx, time_idx] = indices;

    let value = |row: &[Data], idx: usize| row.get(idx).map(cell_to_string).unwrap_or_default();

    let data = message_rows
        .into_iter()
        .map(|row| ChatRecord {
            remark: value(row, remark_idx),
            str_content: value(row, content_idx),
            str_time: value(row, time_idx),
        })
        .collect();

    Ok(SheetBundle {
        sheet_name: sheet_name.to_string(),
        data,
    })
}

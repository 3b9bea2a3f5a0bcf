//! Excel生成（CLI版）
//!
//! 共通ライブラリでバッファを生成し、一時ファイル経由で置き換える

use crate::error::{ScoreError, Result};
use chat_score_common::export::excel_core::generate_results_buffer;
use chat_score_common::ExportTable;
use std::path::{Path, PathBuf};

/// 同じフォルダの一時ファイル
fn temp_path_for(output_path: &Path) -> PathBuf {
    let file_name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "results.xlsx".into());
    output_path.with_file_name(format!(".{}.tmp", file_name))
}

/// 職種別シートのExcelを書き出す
///
/// 全シートをメモリ上で生成してから書き込むため、途中で失敗しても
/// 既存の出力ファイルは壊れない
pub fn write_results_excel(tables: &[ExportTable], output_path: &Path) -> Result<()> {
    let buffer = generate_results_buffer(tables).map_err(ScoreError::ExcelGeneration)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = temp_path_for(output_path);
    std::fs::write(&temp_path, &buffer)
        .map_err(|e| ScoreError::ExcelGeneration(format!("一時ファイル書き込みエラー: {}", e)))?;

    if let Err(e) = std::fs::rename(&temp_path, output_path) {
        std::fs::remove_file(&temp_path).ok();
        return Err(ScoreError::ExcelGeneration(format!(
            "{} への保存に失敗: {}",
            output_path.display(),
            e
        )));
    }

    Ok(())
}

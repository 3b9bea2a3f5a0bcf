//! Excel生成（共通ライブラリ）
//!
//! table.rs の ExportTable を職種ごとのシートとして書き出す

use crate::export::table::ExportTable;
use rust_xlsxwriter::*;
use serde_json::Value;

/// 列幅（文字数）
const DEFAULT_COL_WIDTH: f64 = 14.0;
const COMMENT_COL_WIDTH: f64 = 60.0;

/// Excelの1セルあたりの最大文字数
pub const MAX_CELL_CHARS: usize = 32_767;

/// セル上限を超える文字列を切り詰める
///
/// UTF-16 単位で数える（サロゲートペアは2文字扱い）
pub fn fit_cell_text(text: &str) -> &str {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > MAX_CELL_CHARS {
            return &text[..idx];
        }
    }
    text
}

fn write_text(worksheet: &mut Worksheet, row: u32, col: u16, text: &str) -> Result<(), XlsxError> {
    let fitted = fit_cell_text(text);
    if fitted.len() < text.len() {
        tracing::warn!(
            "{}行{}列目の文字列がセル上限 {} 文字を超えたため切り詰めました",
            row + 1,
            col + 1,
            MAX_CELL_CHARS
        );
    }
    worksheet.write_string(row, col, fitted)?;
    Ok(())
}

/// セル値を書き込む（欠損・nullは空セルのまま）
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
) -> Result<(), XlsxError> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                worksheet.write_number(row, col, f)?;
            }
            None => {
                worksheet.write_string(row, col, n.to_string())?;
            }
        },
        Value::String(s) => write_text(worksheet, row, col, s)?,
        nested => write_text(worksheet, row, col, &nested.to_string())?,
    }
    Ok(())
}

/// 採点結果Excelをバッファに生成
///
/// 表ごとに1シート（シート名は職種タグ）。1行目がヘッダ、インデックス列なし。
pub fn generate_results_buffer(tables: &[ExportTable]) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    for table in tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(table.sheet_name())
            .map_err(|e| format!("シート名設定エラー: {}", e))?;

        for (col, name) in table.columns.iter().enumerate() {
            let col = col as u16;
            worksheet.write_string_with_format(0, col, fit_cell_text(name), &header_format)
                .map_err(|e| format!("ヘッダ書き込みエラー: {}", e))?;

            let width = if name == "comment" { COMMENT_COL_WIDTH } else { DEFAULT_COL_WIDTH };
            worksheet.set_column_width(col, width)
                .map_err(|e| format!("列幅設定エラー: {}", e))?;
        }

        for (row_idx, cells) in table.rows.iter().enumerate() {
            let row = row_idx as u32 + 1;
            for (col, cell) in cells.iter().enumerate() {
                if let Some(value) = cell {
                    write_cell(worksheet, row, col as u16, value)
                        .map_err(|e| format!("セル書き込みエラー: {}", e))?;
                }
            }
        }
    }

    workbook.save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

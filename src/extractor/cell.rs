//! セル値の文字列化

use calamine::{Data, DataType};
use chrono::NaiveDateTime;

/// 日時セルの出力形式
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// メッセージ行を示す Type 値
pub const MESSAGE_TYPE: i64 = 1;

/// セル値を文字列に変換
///
/// - 空セル・エラーセル → 空文字
/// - 日時 → `YYYY-MM-DD HH:MM:SS`
/// - 整数値の浮動小数 → 整数表記（`12.0` ではなく `12`）
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(format_datetime)
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Type 列の値がメッセージ行か（数値の 1 のみ）
pub fn is_message_type(cell: &Data) -> bool {
    match cell {
        Data::Int(i) => *i == MESSAGE_TYPE,
        Data::Float(f) => *f == MESSAGE_TYPE as f64,
        _ => false,
    }
}

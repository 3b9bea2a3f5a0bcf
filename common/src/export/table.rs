//! 採点結果の表形式変換
//!
//! 結果ログの各レコードを平坦化し、職種ごとの表に分割する。
//! - `sub_scores` の各キーを `sub_` 付きの列に展開
//! - `scored_position` で guihua / xingzheng に振り分け（それ以外は除外）
//! - 職種ごとに値が1つもない `sub_` 列を除去

use crate::types::ScoredPosition;
use serde_json::{Map, Value};

/// サブスコア列の接頭辞
pub const SUB_PREFIX: &str = "sub_";

/// サブスコアのネストしたフィールド
pub const SUB_SCORES_FIELD: &str = "sub_scores";

/// 基本列（この順で出力）
pub const BASE_COLUMNS: [&str; 6] = [
    "file",
    "sheet_name",
    "scored_position",
    "scored_person",
    "total_score",
    "comment",
];

/// 職種ごとの出力表
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub position: ScoredPosition,
    pub columns: Vec<String>,
    /// 列に対応するセル値（`None` は欠損）
    pub rows: Vec<Vec<Option<Value>>>,
}

impl ExportTable {
    /// シート名（職種タグ）
    pub fn sheet_name(&self) -> &'static str {
        self.position.as_str()
    }

    pub fn sub_column_count(&self) -> usize {
        self.columns.iter().filter(|c| c.starts_with(SUB_PREFIX)).count()
    }
}

/// 変換結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportTables {
    /// 行のある職種の表（ScoredPosition::ALL の順）
    pub tables: Vec<ExportTable>,
    /// 職種が guihua / xingzheng 以外で除外された行数
    pub dropped: usize,
}

impl ExportTables {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// `sub_scores` を `sub_<key>` 列に展開
///
/// ネストしたオブジェクトは `.` で連結する（`sub_a.x`）。
/// `sub_scores` がオブジェクトでない場合は列を作らずに取り除く。
/// 同名の列がレコードに既にある場合はそちらを残す。
pub fn flatten_sub_scores(mut record: Map<String, Value>) -> Map<String, Value> {
    let Some(sub_scores) = record.shift_remove(SUB_SCORES_FIELD) else {
        return record;
    };

    if let Value::Object(map) = sub_scores {
        for (key, value) in map {
            flatten_into(&mut record, format!("{}{}", SUB_PREFIX, key), value);
        }
    }

    record
}

fn flatten_into(out: &mut Map<String, Value>, name: String, value: Value) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, inner) in map {
                flatten_into(out, format!("{}.{}", name, key), inner);
            }
        }
        other => {
            // 既存の列は上書きしない
            if out.contains_key(&name) {
                tracing::warn!("{} が既に存在するため sub_scores 側の値を無視します", name);
                return;
            }
            out.insert(name, other);
        }
    }
}

fn is_present(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

fn position_of(record: &Map<String, Value>) -> Option<ScoredPosition> {
    record
        .get("scored_position")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}

/// 結果ログのレコード群を職種ごとの表に変換
pub fn build_export_tables(records: Vec<Map<String, Value>>) -> ExportTables {
    let records: Vec<Map<String, Value>> = records.into_iter().map(flatten_sub_scores).collect();

    // 全レコードを通した列の出現順
    let mut all_columns: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !all_columns.iter().any(|c| c == key) {
                all_columns.push(key.clone());
            }
        }
    }

    let mut buckets: Vec<(ScoredPosition, Vec<&Map<String, Value>>)> = ScoredPosition::ALL
        .iter()
        .map(|p| (*p, Vec::new()))
        .collect();
    let mut dropped = 0;

    for record in &records {
        match position_of(record) {
            Some(position) => {
                if let Some((_, rows)) = buckets.iter_mut().find(|(p, _)| *p == position) {
                    rows.push(record);
                }
            }
            None => dropped += 1,
        }
    }

    let tables = buckets
        .into_iter()
        .filter(|(_, rows)| !rows.is_empty())
        .map(|(position, rows)| {
            let mut columns: Vec<String> = BASE_COLUMNS
                .iter()
                .filter(|base| all_columns.iter().any(|c| c == *base))
                .map(|base| base.to_string())
                .collect();

            columns.extend(
                all_columns
                    .iter()
                    .filter(|c| c.starts_with(SUB_PREFIX))
                    .filter(|c| rows.iter().any(|r| is_present(r.get(c.as_str()))))
                    .cloned(),
            );

            let table_rows = rows
                .iter()
                .map(|r| {
                    columns
                        .iter()
                        .map(|c| r.get(c.as_str()).filter(|v| !v.is_null()).cloned())
                        .collect()
                })
                .collect();

            ExportTable { position, columns, rows: table_rows }
        })
        .collect();

    ExportTables { tables, dropped }
}

//! 採点結果の永続化
//!
//! - 結果ログ（JSONL）: 1レコード1行の追記専用ファイル。エクスポートとの唯一の受け渡し口
//! - 生レスポンス: シートごとのAPIレスポンスJSON（監査用）

use crate::error::{ScoreError, Result};
use serde_json::{Map, Value};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_FILE: &str = "results.jsonl";

/// 追記専用の結果ログ
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 1レコードを1行で追記
    ///
    /// 改行込みの1行を1回の write_all で書き込む。既存の行には触れない。
    pub fn append(&self, record: &Map<String, Value>) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// 全レコードを読み込む
    ///
    /// ファイルがない・有効な行がない場合は EmptyLog。
    /// JSONオブジェクトとして読めない行は警告を出して読み飛ばす。
    pub fn read_records(&self) -> Result<Vec<Map<String, Value>>> {
        if !self.path.exists() {
            return Err(ScoreError::EmptyLog(format!(
                "{} が存在しません。先に `chat-score score` で採点してください",
                self.path.display()
            )));
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut records = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(line) {
                Ok(Value::Object(map)) => records.push(map),
                Ok(_) => tracing::warn!(
                    "{}:{} はJSONオブジェクトではありません、スキップ",
                    self.path.display(),
                    line_no + 1
                ),
                Err(e) => tracing::warn!(
                    "{}:{} のJSON解析に失敗、スキップ: {}",
                    self.path.display(),
                    line_no + 1,
                    e
                ),
            }
        }

        if records.is_empty() {
            return Err(ScoreError::EmptyLog(format!(
                "{} にデータがありません。先に `chat-score score` で採点してください",
                self.path.display()
            )));
        }

        Ok(records)
    }
}

/// 生レスポンスの保存先 `{dir}/{stem}_{sheet_name}.json`
pub fn artifact_path(dir: &Path, stem: &str, sheet_name: &str) -> PathBuf {
    dir.join(format!("{}_{}.json", stem, sheet_name))
}

/// APIレスポンスを整形JSONで保存
pub fn write_artifact(dir: &Path, stem: &str, sheet_name: &str, response: &Value) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = artifact_path(dir, stem, sheet_name);
    let json = serde_json::to_string_pretty(response)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

//! 採点データの型定義
//!
//! 採点パイプラインとエクスポートで共有される型:
//! - ChatRecord: チャットログ1行（Type == 1 の行を射影したもの）
//! - SheetBundle: 1シート分のChatRecord（1回のAPIリクエストに対応）
//! - ScoredPosition: 評価対象の職種（ルーブリックを決定）
//! - SourceMeta: 採点結果に埋め込む出典情報

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// チャットログ1行
///
/// JSONキーはエクスポート元の列名（Remark, StrContent, StrTime）のまま
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChatRecord {
    pub remark: String,       // 送信者の表示名
    pub str_content: String,  // メッセージ本文
    pub str_time: String,     // 送信日時（YYYY-MM-DD HH:MM:SS または空）
}

/// 1シート分のチャットログ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetBundle {
    pub sheet_name: String,
    pub data: Vec<ChatRecord>,
}

/// 評価対象の職種
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoredPosition {
    /// 規劃（企画職）
    Guihua,
    /// 行政（事務職）
    Xingzheng,
}

impl ScoredPosition {
    /// エクスポート時のシート順
    pub const ALL: [ScoredPosition; 2] = [ScoredPosition::Guihua, ScoredPosition::Xingzheng];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoredPosition::Guihua => "guihua",
            ScoredPosition::Xingzheng => "xingzheng",
        }
    }

    /// ルーブリックテンプレートのファイル名
    pub fn template_file_name(&self) -> &'static str {
        match self {
            ScoredPosition::Guihua => "system_prompt_guihua.txt",
            ScoredPosition::Xingzheng => "system_prompt_xingzheng.txt",
        }
    }
}

impl FromStr for ScoredPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guihua" => Ok(ScoredPosition::Guihua),
            "xingzheng" => Ok(ScoredPosition::Xingzheng),
            _ => Err(Error::UnknownPosition(s.to_string())),
        }
    }
}

impl fmt::Display for ScoredPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 採点結果に埋め込む出典情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMeta {
    /// 入力ワークブックのファイル名（拡張子なし）
    pub file: String,
    pub sheet_name: String,
    pub scored_position: ScoredPosition,
    pub scored_person: String,
}

impl SourceMeta {
    /// モデルの回答に出典情報を付与
    ///
    /// 回答側のキー順は維持し、出典フィールドは末尾に追加する。
    /// 同名キーが既にあれば位置を変えずに値を上書きする。
    pub fn stamp(&self, mut content: Map<String, Value>) -> Map<String, Value> {
        content.insert("file".into(), Value::String(self.file.clone()));
        content.insert("sheet_name".into(), Value::String(self.sheet_name.clone()));
        content.insert(
            "scored_position".into(),
            Value::String(self.scored_position.as_str().to_string()),
        );
        content.insert("scored_person".into(), Value::String(self.scored_person.clone()));
        content
    }
}

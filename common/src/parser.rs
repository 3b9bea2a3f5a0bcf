//! APIレスポンスパーサー
//!
//! chat completions レスポンスから回答テキストを取り出し、
//! 採点結果のJSONオブジェクトとしてパースする

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// chat completions レスポンスから回答テキストを取得
///
/// `choices[0].message.content` が文字列でなければ `None`
pub fn answer_content(response: &Value) -> Option<&str> {
    response
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}

/// 回答テキストからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 最初の `{` から最後の `}` まで
/// 3. エラー
///
/// # Examples
/// ```
/// use chat_score_common::extract_json_object;
///
/// let response = "評価結果: {\"total_score\": 80}";
/// let json = extract_json_object(response).unwrap();
/// assert_eq!(json, "{\"total_score\": 80}");
/// ```
pub fn extract_json_object(response: &str) -> Result<&str> {
    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    // 生の {...} を探す
    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 回答テキストを採点結果としてパース
///
/// まず回答全体をJSONとして読み、失敗した場合のみ
/// コードブロックや前後の説明文を除いて再試行する。
/// トップレベルがオブジェクトでなければエラー。
pub fn parse_score_content(content: &str) -> Result<Map<String, Value>> {
    let value: Value = match serde_json::from_str(content.trim()) {
        Ok(value) => value,
        Err(direct_err) => {
            let json_str = extract_json_object(content)
                .map_err(|_| Error::Parse(format!("回答JSONパースエラー: {}", direct_err)))?;
            serde_json::from_str(json_str)
                .map_err(|e| Error::Parse(format!("回答JSONパースエラー: {}", e)))?
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::Parse(format!(
            "回答がJSONオブジェクトではありません: {}",
            other
        ))),
    }
}

//! chat completions API による採点
//!
//! 1シート = 1リクエスト。リトライはしない。

mod http;

pub use http::{build_request_body, HttpChatClient};

use crate::error::Result;
use chat_score_common::ChatRecord;
use serde_json::Value;

/// ユーザーメッセージ
#[derive(Debug, Clone, Copy)]
pub enum UserMessage<'a> {
    /// シートのチャットログ（JSON配列として送信）
    Records(&'a [ChatRecord]),
    /// そのまま送信するテキスト
    Text(&'a str),
}

impl UserMessage<'_> {
    /// 送信する本文
    ///
    /// レコードはキー順固定・非ASCII文字はエスケープせずに整形出力
    pub fn to_content(&self) -> Result<String> {
        match self {
            UserMessage::Records(records) => Ok(serde_json::to_string_pretty(records)?),
            UserMessage::Text(text) => Ok(text.to_string()),
        }
    }
}

/// chat completions の呼び出し口
///
/// 通信失敗時はログを出して `None` を返す。成功時はレスポンスJSONをそのまま返す。
#[allow(async_fn_in_trait)]
pub trait ChatCompletion {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: UserMessage<'_>,
        model: Option<&str>,
    ) -> Option<Value>;
}

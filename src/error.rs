use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。.env に API_KEY を記載するか `chat-score config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("ワークブック読み込みエラー: {0}")]
    Workbook(String),

    #[error("シート形式エラー: {0}")]
    InputShape(String),

    #[error("API呼び出しエラー: {0}")]
    Transport(String),

    #[error("APIレスポンスの形式が不正: {0}")]
    ResponseShape(String),

    #[error("回答のJSONパースに失敗: {0}")]
    ContentParse(String),

    #[error("結果ログが空です: {0}")]
    EmptyLog(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] chat_score_common::Error),
}

impl ScoreError {
    /// シート単位でスキップして処理を続けるエラーか
    pub fn is_sheet_skip(&self) -> bool {
        matches!(
            self,
            ScoreError::Transport(_)
                | ScoreError::ResponseShape(_)
                | ScoreError::ContentParse(_)
                | ScoreError::InputShape(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScoreError>;

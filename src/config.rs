use crate::error::{ScoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// APIのベースURL
pub const ENV_BASE_URL: &str = "API_URL";
/// APIキー（必須）
pub const ENV_API_KEY: &str = "API_KEY";
/// モデル名
pub const ENV_MODEL: &str = "MODEL";

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Config {
    /// 設定ファイル → .env → 環境変数 の順に読み込む（後勝ち）
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;

        // .env は既存の環境変数を上書きしない
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(".env の読み込みに失敗: {}", e);
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// 設定ファイルの値のみ（.env・環境変数は反映しない）
    ///
    /// ホームディレクトリが見つからない場合はデフォルト値
    pub fn load_file() -> Result<Self> {
        Self::load_file_or_default(Self::config_path().ok().as_deref())
    }

    fn load_file_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                tracing::warn!("ホームディレクトリが見つからないため設定ファイルを読みません");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// 環境変数で上書き（空文字は未設定扱い）
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.model = model;
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 設定ファイルだけを読み込んで編集・保存
    ///
    /// .env や環境変数の値はファイルに書き込まれない
    pub fn update_file<F>(edit: F) -> Result<Self>
    where
        F: FnOnce(&mut Config),
    {
        Self::update_file_at(&Self::config_path()?, edit)
    }

    pub fn update_file_at<F>(path: &Path, edit: F) -> Result<Self>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = Self::load_from(path)?;
        edit(&mut config);
        config.save_to(path)?;
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ScoreError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("chat-score").join("config.json"))
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ScoreError::MissingApiKey)
    }

    /// `{base_url}/v1/chat/completions`
    pub fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// 表示用（先頭4文字以外を伏せる）
    pub fn masked_api_key(&self) -> String {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => {
                let head: String = key.chars().take(4).collect();
                format!("{}****", head)
            }
            _ => "未設定".into(),
        }
    }
}

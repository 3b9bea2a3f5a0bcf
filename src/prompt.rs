//! ルーブリックテンプレートの読み込み
//!
//! 職種ごとのテンプレートファイルを読み込み、評価対象者名を埋め込む

use crate::error::{ScoreError, Result};
use chat_score_common::{render_system_prompt, ScoredPosition};
use std::path::{Path, PathBuf};

pub fn template_path(prompt_dir: &Path, position: ScoredPosition) -> PathBuf {
    prompt_dir.join(position.template_file_name())
}

/// システムプロンプトを生成
///
/// テンプレートがない場合は実行を継続できないためエラー
pub fn load_system_prompt(
    prompt_dir: &Path,
    position: ScoredPosition,
    scored_person: &str,
) -> Result<String> {
    let path = template_path(prompt_dir, position);
    if !path.exists() {
        return Err(ScoreError::FileNotFound(path.display().to_string()));
    }

    let template = std::fs::read_to_string(&path)?;
    Ok(render_system_prompt(&template, scored_person))
}

//! 採点パイプライン
//!
//! ワークブック → シート → APIリクエスト → 結果ログ追記 を1件ずつ順番に実行する。
//! シート単位の失敗（通信・レスポンス形式・回答JSON）はログを出してスキップし、
//! 次のシートへ進む。スキップしたシートは結果ログに何も書かない。

use crate::error::{ScoreError, Result};
use crate::extractor;
use crate::results::{write_artifact, ResultLog};
use crate::scanner::WorkbookInfo;
use crate::scorer::{ChatCompletion, UserMessage};
use chat_score_common::{answer_content, parse_score_content, ScoredPosition, SheetBundle, SourceMeta};
use std::path::PathBuf;

/// 採点オプション
#[derive(Debug, Clone)]
pub struct ScoreOptions {
    pub position: ScoredPosition,
    pub person: String,
    /// 生レスポンスの保存先（None ならワークブックと同じフォルダ）
    pub artifact_dir: Option<PathBuf>,
    pub model: Option<String>,
    /// ワークブックごとの採点シート数上限
    pub max_sheets: Option<usize>,
}

/// 採点結果の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreSummary {
    pub workbooks: usize,
    pub failed_workbooks: usize,
    pub sheets: usize,
    pub scored: usize,
    pub skipped: usize,
}

impl ScoreSummary {
    fn merge(&mut self, other: ScoreSummary) {
        self.workbooks += other.workbooks;
        self.failed_workbooks += other.failed_workbooks;
        self.sheets += other.sheets;
        self.scored += other.scored;
        self.skipped += other.skipped;
    }
}

/// 全ワークブックを順番に採点
///
/// 開けないワークブックはスキップする。結果ログへの書き込み失敗のみ中断。
pub async fn score_workbooks<C: ChatCompletion>(
    client: &C,
    workbooks: &[WorkbookInfo],
    system_prompt: &str,
    options: &ScoreOptions,
    log: &ResultLog,
) -> Result<ScoreSummary> {
    let mut summary = ScoreSummary::default();

    for (idx, workbook) in workbooks.iter().enumerate() {
        println!("[{}/{}] {}", idx + 1, workbooks.len(), workbook.file_name);

        match score_workbook(client, workbook, system_prompt, options, log).await {
            Ok(result) => summary.merge(result),
            Err(e @ ScoreError::Workbook(_)) => {
                tracing::error!("{}", e);
                summary.workbooks += 1;
                summary.failed_workbooks += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

/// 1ワークブックを採点
pub async fn score_workbook<C: ChatCompletion>(
    client: &C,
    workbook: &WorkbookInfo,
    system_prompt: &str,
    options: &ScoreOptions,
    log: &ResultLog,
) -> Result<ScoreSummary> {
    let bundles = extractor::extract_sheets(&workbook.path)?;
    let limit = options.max_sheets.unwrap_or(usize::MAX);

    let mut summary = ScoreSummary {
        workbooks: 1,
        ..Default::default()
    };

    for (idx, bundle) in bundles.iter().take(limit).enumerate() {
        summary.sheets += 1;
        let label = format!("{} - 第{}シート - {}", workbook.stem, idx + 1, bundle.sheet_name);
        println!("  {} ({}件)", label, bundle.data.len());

        match score_sheet(client, workbook, bundle, system_prompt, options, log).await {
            Ok(()) => {
                summary.scored += 1;
                println!("  ✔ {} - 完了", label);
            }
            Err(e) if e.is_sheet_skip() => {
                match &e {
                    // 通信エラーの詳細はクライアント側で出力済み
                    ScoreError::Transport(_) => tracing::warn!("{}: リクエスト失敗、スキップ", label),
                    _ => tracing::warn!("{}: {}、スキップ", label, e),
                }
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if bundles.len() > limit {
        tracing::info!(
            "{}: 上限 {} シートに達したため残り {} シートを処理しません",
            workbook.file_name,
            limit,
            bundles.len() - limit
        );
    }

    Ok(summary)
}

/// 1シートを採点して結果ログに追記
async fn score_sheet<C: ChatCompletion>(
    client: &C,
    workbook: &WorkbookInfo,
    bundle: &SheetBundle,
    system_prompt: &str,
    options: &ScoreOptions,
    log: &ResultLog,
) -> Result<()> {
    let response = client
        .complete(system_prompt, UserMessage::Records(&bundle.data), options.model.as_deref())
        .await
        .ok_or_else(|| ScoreError::Transport("レスポンスなし".into()))?;

    let artifact_dir = options
        .artifact_dir
        .clone()
        .or_else(|| workbook.path.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    match write_artifact(&artifact_dir, &workbook.stem, &bundle.sheet_name, &response) {
        Ok(path) => tracing::debug!("生レスポンスを保存: {}", path.display()),
        Err(e) => tracing::warn!("生レスポンスの保存に失敗: {}", e),
    }

    let content = answer_content(&response).ok_or_else(|| {
        tracing::debug!("生レスポンス: {}", response);
        ScoreError::ResponseShape("choices[0].message.content がありません".into())
    })?;

    let parsed = parse_score_content(content).map_err(|e| {
        tracing::debug!("回答テキスト: {}", content);
        ScoreError::ContentParse(e.to_string())
    })?;

    let meta = SourceMeta {
        file: workbook.stem.clone(),
        sheet_name: bundle.sheet_name.clone(),
        scored_position: options.position,
        scored_person: options.person.clone(),
    };

    log.append(&meta.stamp(parsed))
}

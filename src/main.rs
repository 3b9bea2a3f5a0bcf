use anyhow::Context;
use clap::Parser;
use chat_score::{cli, config, error, export, pipeline, prompt, results, scanner, scorer};
use cli::{Cli, Commands, ScoreArgs};
use config::Config;
use error::ScoreError;
use pipeline::{ScoreOptions, ScoreSummary};
use results::ResultLog;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Score { input, scoring } => {
            println!("📝 chat-score - 採点\n");
            let config = Config::load()?;
            run_score(&config, &input, &scoring).await?;
            println!("\n✅ 採点完了");
        }

        Commands::Export { log, output } => {
            println!("📄 chat-score - エクスポート\n");
            run_export(&log, &output)?;
        }

        Commands::Run { input, scoring, output } => {
            println!("🚀 chat-score - 一括処理\n");
            let config = Config::load()?;
            run_score(&config, &input, &scoring).await?;
            println!();
            run_export(&scoring.log, &output)?;
            println!("\n✅ 完了");
        }

        Commands::Config { set_api_key, set_base_url, set_model, show } => {
            let changes = [
                (set_api_key.is_some(), "APIキー"),
                (set_base_url.is_some(), "ベースURL"),
                (set_model.is_some(), "モデル"),
            ];

            // 保存するのは設定ファイルの値のみ
            if changes.iter().any(|(changed, _)| *changed) {
                Config::update_file(|config| {
                    if let Some(key) = set_api_key {
                        config.api_key = Some(key);
                    }
                    if let Some(url) = set_base_url {
                        config.base_url = url;
                    }
                    if let Some(model) = set_model {
                        config.model = model;
                    }
                })?;

                for (_, label) in changes.iter().filter(|(changed, _)| *changed) {
                    println!("✔ {}を設定しました", label);
                }
            }

            if show {
                let config = Config::load()?;
                let config_file = Config::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "（ホームディレクトリなし）".into());

                println!("設定:");
                println!("  ベースURL: {}", config.base_url);
                println!("  モデル: {}", config.model);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  APIキー: {}", config.masked_api_key());
                println!("  設定ファイル: {}", config_file);
            }
        }
    }

    Ok(())
}

async fn run_score(config: &Config, input: &Path, scoring: &ScoreArgs) -> anyhow::Result<ScoreSummary> {
    // APIキーがなければ何も読まずに終了
    let client = scorer::HttpChatClient::new(config)?;

    let person = match &scoring.person {
        Some(person) => person.clone(),
        None => dialoguer::Input::<String>::new()
            .with_prompt("評価対象者の名前")
            .interact_text()
            .context("評価対象者の名前を取得できません")?,
    };

    println!("[1/3] ルーブリックを読み込み中... ({})", scoring.position);
    let system_prompt = prompt::load_system_prompt(&scoring.prompt_dir, scoring.position, &person)?;
    println!("✔ 評価対象者: {}\n", person);

    println!("[2/3] ワークブックを検索中...");
    let workbooks = scanner::scan_inputs(input)?;
    println!("✔ {}件のワークブックを検出\n", workbooks.len());

    if workbooks.is_empty() {
        return Err(ScoreError::FileNotFound(format!(
            "{} にワークブックがありません",
            input.display()
        ))
        .into());
    }

    println!("[3/3] 採点中...");
    let options = ScoreOptions {
        position: scoring.position,
        person,
        artifact_dir: scoring.artifact_dir.clone(),
        model: scoring.model.clone(),
        max_sheets: scoring.max_sheets,
    };
    let log = ResultLog::new(&scoring.log);
    let summary = pipeline::score_workbooks(&client, &workbooks, &system_prompt, &options, &log)
        .await
        .with_context(|| format!("結果ログ {} への書き込みに失敗", scoring.log.display()))?;

    println!(
        "\n✔ {}シート中 {}シートを採点（スキップ {}、読み込み失敗ワークブック {}）",
        summary.sheets, summary.scored, summary.skipped, summary.failed_workbooks
    );
    println!("✔ 結果ログ: {}", log.path().display());

    Ok(summary)
}

fn run_export(log_path: &Path, output: &Path) -> anyhow::Result<()> {
    let log = ResultLog::new(log_path);

    let report = match export::export_log(&log, output) {
        Ok(report) => report,
        Err(ScoreError::EmptyLog(msg)) => {
            println!("⚠ {}", msg);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for sheet in &report.sheets {
        println!(
            "- {}シート: {}行, {}個のsub列",
            sheet.position, sheet.rows, sheet.sub_columns
        );
    }

    match report.output {
        Some(path) => println!("✔ Excel出力: {}", path.display()),
        None => println!("⚠ 出力対象の行がないためExcelを作成しませんでした"),
    }

    Ok(())
}

use clap::{Args, Parser, Subcommand};
use chat_score_common::ScoredPosition;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chat-score")]
#[command(about = "チャットログAI採点・結果集計ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// 採点オプション（score / run 共通）
#[derive(Args, Clone, Debug)]
pub struct ScoreArgs {
    /// 評価対象の職種 (guihua/xingzheng)
    #[arg(short, long)]
    pub position: ScoredPosition,

    /// 評価対象者の名前（省略時は対話入力）
    #[arg(long)]
    pub person: Option<String>,

    /// 結果ログ（JSONL、追記）
    #[arg(short, long, default_value = "results.jsonl")]
    pub log: PathBuf,

    /// ルーブリックテンプレートのフォルダ
    #[arg(long, default_value = "prompts")]
    pub prompt_dir: PathBuf,

    /// 生レスポンスJSONの保存先（デフォルト: 入力ワークブックと同じフォルダ）
    #[arg(long)]
    pub artifact_dir: Option<PathBuf>,

    /// 使用モデル（省略時は設定値）
    #[arg(short, long)]
    pub model: Option<String>,

    /// ワークブックごとに採点するシート数の上限
    #[arg(long)]
    pub max_sheets: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// チャットログExcelを採点して結果ログに追記
    Score {
        /// ワークブック、またはワークブックを含むフォルダ
        #[arg(required = true)]
        input: PathBuf,

        #[command(flatten)]
        scoring: ScoreArgs,
    },

    /// 結果ログを職種別のExcelに変換
    Export {
        /// 結果ログ（JSONL）
        #[arg(short, long, default_value = "results.jsonl")]
        log: PathBuf,

        /// 出力Excelファイル
        #[arg(short, long, default_value = "results.xlsx")]
        output: PathBuf,
    },

    /// 採点からExcel出力まで一括実行
    Run {
        /// ワークブック、またはワークブックを含むフォルダ
        #[arg(required = true)]
        input: PathBuf,

        #[command(flatten)]
        scoring: ScoreArgs,

        /// 出力Excelファイル
        #[arg(short, long, default_value = "results.xlsx")]
        output: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// APIのベースURLを設定
        #[arg(long)]
        set_base_url: Option<String>,

        /// 既定モデルを設定
        #[arg(long)]
        set_model: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

//! 採点パイプラインの統合テスト
//!
//! API呼び出しは FakeClient で置き換え、ワークブック読み込みから
//! 結果ログ追記・Excel出力までを検証

use calamine::{open_workbook, Data, Reader, Xlsx};
use chat_score::export::export_log;
use chat_score::pipeline::{score_workbooks, ScoreOptions, ScoreSummary};
use chat_score::results::ResultLog;
use chat_score::scanner::WorkbookInfo;
use chat_score::scorer::{ChatCompletion, UserMessage};
use chat_score_common::ScoredPosition;
use rust_xlsxwriter::Workbook;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use tempfile::tempdir;

const SYSTEM_PROMPT: &str = "请评价董晗的表现";

/// 記録付きの偽クライアント
struct FakeClient {
    responses: Mutex<VecDeque<Option<Value>>>,
    calls: Mutex<Vec<(String, String, Option<String>)>>,
}

impl FakeClient {
    fn new(responses: Vec<Option<Value>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ChatCompletion for FakeClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: UserMessage<'_>,
        model: Option<&str>,
    ) -> Option<Value> {
        self.calls.lock().unwrap().push((
            system_prompt.to_string(),
            user_message.to_content().unwrap(),
            model.map(String::from),
        ));
        self.responses.lock().unwrap().pop_front().flatten()
    }
}

fn chat_response(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

const SCORE_85: &str = r#"{"total_score":85,"comment":"ok","sub_scores":{"a":10,"b":20}}"#;

/// sheet_rows: シートごとの Type == 1 の行数
fn create_workbook(path: &Path, sheet_rows: &[(&str, usize)]) {
    let mut workbook = Workbook::new();

    for (name, rows) in sheet_rows {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).unwrap();
        for (col, header) in ["Type", "Remark", "StrContent", "StrTime"].iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        for i in 0..*rows {
            let row = i as u32 + 1;
            sheet.write_number(row, 0, 1).unwrap();
            sheet.write_string(row, 1, "董晗").unwrap();
            sheet.write_string(row, 2, format!("第{}条消息", i + 1)).unwrap();
            sheet.write_string(row, 3, "2024-05-01 09:00:00").unwrap();
        }
        // メッセージ以外の行
        let row = *rows as u32 + 1;
        sheet.write_number(row, 0, 10000).unwrap();
        sheet.write_string(row, 2, "系统消息").unwrap();
    }

    workbook.save(path).unwrap();
}

fn options(artifact_dir: &Path) -> ScoreOptions {
    ScoreOptions {
        position: ScoredPosition::Guihua,
        person: "董晗".to_string(),
        artifact_dir: Some(artifact_dir.to_path_buf()),
        model: None,
        max_sheets: None,
    }
}

fn log_lines(log: &ResultLog) -> Vec<Value> {
    std::fs::read_to_string(log.path())
        .unwrap_or_default()
        .lines()
        .map(|l| serde_json::from_str(l).expect("log line must be valid JSON"))
        .collect()
}

#[tokio::test]
async fn test_end_to_end_single_sheet() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("蒋博文_25申请.xlsx");
    create_workbook(&input, &[("Sheet1", 3)]);
    let workbooks = vec![WorkbookInfo::from_path(&input)];
    let log = ResultLog::new(dir.path().join("results.jsonl"));
    let artifacts = dir.path().join("raw");

    let client = FakeClient::new(vec![Some(chat_response(SCORE_85))]);
    let summary = score_workbooks(&client, &workbooks, SYSTEM_PROMPT, &options(&artifacts), &log)
        .await
        .unwrap();

    assert_eq!(
        summary,
        ScoreSummary { workbooks: 1, failed_workbooks: 0, sheets: 1, scored: 1, skipped: 0 }
    );

    // 送信内容: Type == 1 の3行のみ、非ASCIIはそのまま
    let calls = client.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, SYSTEM_PROMPT);
    let sent: Vec<Value> = serde_json::from_str(&calls[0].1).unwrap();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0]["Remark"], "董晗");
    assert!(calls[0].1.contains("第1条消息"));
    assert_eq!(calls[0].2, None);

    // 結果ログ: 1行、出典情報付き
    let lines = log_lines(&log);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["total_score"], 85);
    assert_eq!(lines[0]["file"], "蒋博文_25申请");
    assert_eq!(lines[0]["sheet_name"], "Sheet1");
    assert_eq!(lines[0]["scored_position"], "guihua");
    assert_eq!(lines[0]["scored_person"], "董晗");

    // 生レスポンス
    let artifact = artifacts.join("蒋博文_25申请_Sheet1.json");
    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&artifact).unwrap()).unwrap();
    assert_eq!(saved, chat_response(SCORE_85));

    // Excel出力
    let output = dir.path().join("results.xlsx");
    let report = export_log(&log, &output).unwrap();
    assert_eq!(report.output.as_deref(), Some(output.as_path()));

    let mut workbook: Xlsx<_> = open_workbook(&output).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["guihua".to_string()]);

    let range = workbook.worksheet_range("guihua").unwrap();
    let header: Vec<String> = range.rows().next().unwrap().iter().map(|c| c.to_string()).collect();
    assert_eq!(
        header,
        vec![
            "file", "sheet_name", "scored_position", "scored_person",
            "total_score", "comment", "sub_a", "sub_b"
        ]
    );
    assert_eq!(range.height(), 2);

    let row = range.rows().nth(1).unwrap();
    assert_eq!(row[0], Data::String("蒋博文_25申请".into()));
    assert_eq!(row[4], Data::Float(85.0));
    assert_eq!(row[6], Data::Float(10.0));
    assert_eq!(row[7], Data::Float(20.0));
}

#[tokio::test]
async fn test_transport_failure_skips_sheet_and_continues() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("chat.xlsx");
    create_workbook(&input, &[("A", 2), ("B", 1)]);
    let workbooks = vec![WorkbookInfo::from_path(&input)];

    let log_path = dir.path().join("results.jsonl");
    std::fs::write(&log_path, "{\"total_score\":70,\"scored_position\":\"xingzheng\"}\n").unwrap();
    let log = ResultLog::new(&log_path);

    let client = FakeClient::new(vec![None, Some(chat_response(SCORE_85))]);
    let summary = score_workbooks(&client, &workbooks, SYSTEM_PROMPT, &options(dir.path()), &log)
        .await
        .unwrap();

    assert_eq!(client.call_count(), 2);
    assert_eq!(summary.scored, 1);
    assert_eq!(summary.skipped, 1);

    let content = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "{\"total_score\":70,\"scored_position\":\"xingzheng\"}");
    let second: Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["sheet_name"], "B");

    // 失敗したシートの生レスポンスは残らない
    assert!(!dir.path().join("chat_A.json").exists());
    assert!(dir.path().join("chat_B.json").exists());
}

#[tokio::test]
async fn test_response_without_content_is_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("chat.xlsx");
    create_workbook(&input, &[("A", 1), ("B", 1)]);
    let workbooks = vec![WorkbookInfo::from_path(&input)];
    let log = ResultLog::new(dir.path().join("results.jsonl"));

    let client = FakeClient::new(vec![
        Some(json!({"error": {"message": "rate limited"}})),
        Some(chat_response(SCORE_85)),
    ]);
    let summary = score_workbooks(&client, &workbooks, SYSTEM_PROMPT, &options(dir.path()), &log)
        .await
        .unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.scored, 1);
    let lines = log_lines(&log);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["sheet_name"], "B");

    // 形式不正でも生レスポンスは監査用に保存される
    assert!(dir.path().join("chat_A.json").exists());
}

#[tokio::test]
async fn test_non_json_answer_is_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("chat.xlsx");
    create_workbook(&input, &[("A", 1), ("B", 1), ("C", 1)]);
    let workbooks = vec![WorkbookInfo::from_path(&input)];
    let log = ResultLog::new(dir.path().join("results.jsonl"));

    let client = FakeClient::new(vec![
        Some(chat_response("抱歉，我无法完成评分。")),
        Some(chat_response("[1, 2, 3]")),
        Some(chat_response("```json\n{\"total_score\": 60, \"comment\": \"一般\"}\n```")),
    ]);
    let summary = score_workbooks(&client, &workbooks, SYSTEM_PROMPT, &options(dir.path()), &log)
        .await
        .unwrap();

    assert_eq!(summary.sheets, 3);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.scored, 1);
    let lines = log_lines(&log);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["sheet_name"], "C");
    assert_eq!(lines[0]["total_score"], 60);
}

#[tokio::test]
async fn test_max_sheets_limits_requests() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("chat.xlsx");
    create_workbook(&input, &[("A", 1), ("B", 1), ("C", 1)]);
    let workbooks = vec![WorkbookInfo::from_path(&input)];
    let log = ResultLog::new(dir.path().join("results.jsonl"));

    let mut opts = options(dir.path());
    opts.max_sheets = Some(1);
    opts.model = Some("deepseek-chat".to_string());

    let client = FakeClient::new(vec![Some(chat_response(SCORE_85)); 3]);
    let summary = score_workbooks(&client, &workbooks, SYSTEM_PROMPT, &opts, &log)
        .await
        .unwrap();

    assert_eq!(client.call_count(), 1);
    assert_eq!(summary.sheets, 1);
    assert_eq!(client.calls.lock().unwrap()[0].2.as_deref(), Some("deepseek-chat"));
}

#[tokio::test]
async fn test_unreadable_workbook_does_not_stop_run() {
    let dir = tempdir().expect("Failed to create temp dir");
    let broken = dir.path().join("a_broken.xlsx");
    std::fs::write(&broken, "not a workbook").unwrap();
    let input = dir.path().join("b_chat.xlsx");
    create_workbook(&input, &[("Sheet1", 2)]);

    let workbooks = vec![WorkbookInfo::from_path(&broken), WorkbookInfo::from_path(&input)];
    let log = ResultLog::new(dir.path().join("results.jsonl"));

    let client = FakeClient::new(vec![Some(chat_response(SCORE_85))]);
    let summary = score_workbooks(&client, &workbooks, SYSTEM_PROMPT, &options(dir.path()), &log)
        .await
        .unwrap();

    assert_eq!(summary.workbooks, 2);
    assert_eq!(summary.failed_workbooks, 1);
    assert_eq!(summary.scored, 1);
    assert_eq!(log_lines(&log)[0]["file"], "b_chat");
}

#[tokio::test]
async fn test_sheet_without_messages_sends_nothing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("chat.xlsx");
    create_workbook(&input, &[("Empty", 0)]);
    let workbooks = vec![WorkbookInfo::from_path(&input)];
    let log = ResultLog::new(dir.path().join("results.jsonl"));

    let client = FakeClient::new(vec![]);
    let summary = score_workbooks(&client, &workbooks, SYSTEM_PROMPT, &options(dir.path()), &log)
        .await
        .unwrap();

    assert_eq!(client.call_count(), 0);
    assert_eq!(summary.sheets, 0);
    assert!(!log.path().exists());
}

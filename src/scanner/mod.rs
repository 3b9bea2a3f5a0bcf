use crate::error::{ScoreError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct WorkbookInfo {
    pub path: PathBuf,
    pub file_name: String,
    /// 拡張子を除いたファイル名（採点結果の `file` 列）
    pub stem: String,
}

impl WorkbookInfo {
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            file_name,
            stem,
        }
    }
}

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Excelの一時ロックファイル
const LOCK_FILE_PREFIX: &str = "~$";

fn is_workbook_extension(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    WORKBOOK_EXTENSIONS.contains(&ext.as_str())
}

/// 入力パスからワークブック一覧を取得
///
/// ファイルならそのまま、フォルダなら直下のワークブックをファイル名順で返す
pub fn scan_inputs(input: &Path) -> Result<Vec<WorkbookInfo>> {
    if !input.exists() {
        return Err(ScoreError::FileNotFound(input.display().to_string()));
    }

    if input.is_file() {
        return Ok(vec![WorkbookInfo::from_path(input)]);
    }

    let mut workbooks = Vec::new();

    for entry in WalkDir::new(input)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let info = WorkbookInfo::from_path(path);
        if info.file_name.starts_with(LOCK_FILE_PREFIX) {
            continue;
        }

        if let Some(ext) = path.extension() {
            if is_workbook_extension(&ext.to_string_lossy()) {
                workbooks.push(info);
            }
        }
    }

    // ファイル名でソート
    workbooks.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(workbooks)
}

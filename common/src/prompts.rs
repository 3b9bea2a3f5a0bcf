//! プロンプト生成モジュール
//!
//! ルーブリックテンプレートに評価対象者の名前を埋め込む。
//! テンプレートの読み込み（ファイルI/O）は呼び出し側で行う。

/// 評価対象者名のプレースホルダ
pub const PERSON_PLACEHOLDER: &str = "{scored_person}";

/// システムプロンプト生成
///
/// テンプレート中の全てのプレースホルダを評価対象者名に置換する。
/// それ以外の部分はテンプレートのまま変更しない。
pub fn render_system_prompt(template: &str, scored_person: &str) -> String {
    template.replace(PERSON_PLACEHOLDER, scored_person)
}

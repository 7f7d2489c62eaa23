//! Display Format Module
//!
//! セルの数値書式を、Excelが表示するテキストへ描画します。
//!
//! - `tokens`: 書式コードの字句（日付・時刻の要素、桁プレースホルダー、リテラル）
//! - `sections`: `;`で区切られた正数・負数・ゼロ・テキストのセクション
//! - `parser`: 書式コードの解析と、日付システムを考慮した描画
//!
//! 日付書式のセルは、この描画結果同士で比較されます。

mod parser;
mod sections;
mod tokens;

pub(crate) use parser::FormatParser;

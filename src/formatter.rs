//! Formatter Module
//!
//! セル値の表示テキストを生成するモジュール。
//! 日付書式の判定と、数値書式に従った表示文字列の生成を提供します。

use crate::format::FormatParser;
use crate::types::{Cell, CellValue, DateSystem};

/// 日付として型付けされたが書式情報を持たないセルに使用する書式
pub(crate) const FALLBACK_DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// セルフォーマッター
///
/// セル値のフォーマット処理のファサードとして機能します。
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CellFormatter;

impl CellFormatter {
    /// 数値書式が日付・時刻書式かどうかを判定
    ///
    /// # 引数
    ///
    /// * `format_id` - 数値書式ID
    /// * `format_code` - 書式文字列
    ///
    /// # 戻り値
    ///
    /// ビルトインの日付書式ID（14-22, 45-47）であるか、
    /// 書式文字列の最初のセクションが日付・時刻トークンを含む場合は`true`
    pub fn is_date_format(format_id: u32, format_code: &str) -> bool {
        if matches!(format_id, 14..=22 | 45..=47) {
            return true;
        }
        FormatParser::parse(format_code).is_datetime()
    }

    /// セルの表示テキストを生成
    ///
    /// 数値セルは自身の数値書式と、所属するワークブックの日付システムで描画されます。
    /// 書式を適用できない場合（日付の範囲外など）は生の値の文字列になります。
    ///
    /// # 引数
    ///
    /// * `cell` - 対象のセル
    /// * `date_system` - セルが所属するワークブックの日付システム
    pub fn display_text(cell: &Cell, date_system: DateSystem) -> String {
        let value = match cell.value() {
            CellValue::Number(n) => *n,
            other => return other.as_raw_string(),
        };

        let code = match cell.number_format() {
            Some(format) => format.code.as_str(),
            None if cell.is_date_formatted() => FALLBACK_DATE_FORMAT,
            None => return FormatParser::format_general(value),
        };

        match FormatParser::parse(code).format_number(value, date_system) {
            Ok(text) => text,
            Err(e) => {
                log::debug!("{}; using raw value for format '{}'", e, code);
                cell.value().as_raw_string()
            }
        }
    }

    /// ビルトイン数値書式IDに対応する書式文字列を取得
    ///
    /// # 戻り値
    ///
    /// * `Some(&str)` - 既知のビルトインID（0-22, 37-49）の場合
    /// * `None` - それ以外（ロケール依存のID、カスタム書式IDなど）
    pub fn builtin_format_code(id: u32) -> Option<&'static str> {
        let code = match id {
            0 => "General",
            1 => "0",
            2 => "0.00",
            3 => "#,##0",
            4 => "#,##0.00",
            5 => "$#,##0_);($#,##0)",
            6 => "$#,##0_);[Red]($#,##0)",
            7 => "$#,##0.00_);($#,##0.00)",
            8 => "$#,##0.00_);[Red]($#,##0.00)",
            9 => "0%",
            10 => "0.00%",
            11 => "0.00E+00",
            12 => "# ?/?",
            13 => "# ??/??",
            14 => "mm-dd-yy",
            15 => "d-mmm-yy",
            16 => "d-mmm",
            17 => "mmm-yy",
            18 => "h:mm AM/PM",
            19 => "h:mm:ss AM/PM",
            20 => "h:mm",
            21 => "h:mm:ss",
            22 => "m/d/yy h:mm",
            37 => "#,##0_);(#,##0)",
            38 => "#,##0_);[Red](#,##0)",
            39 => "#,##0.00_);(#,##0.00)",
            40 => "#,##0.00_);[Red](#,##0.00)",
            41 => "_(* #,##0_);_(* (#,##0);_(* \"-\"_);_(@_)",
            42 => "_($* #,##0_);_($* (#,##0);_($* \"-\"_);_(@_)",
            43 => "_(* #,##0.00_);_(* (#,##0.00);_(* \"-\"??_);_(@_)",
            44 => "_($* #,##0.00_);_($* (#,##0.00);_($* \"-\"??_);_(@_)",
            45 => "mm:ss",
            46 => "[h]:mm:ss",
            47 => "mm:ss.0",
            48 => "##0.0E+0",
            49 => "@",
            _ => return None,
        };
        Some(code)
    }
}

//! FormatToken Module
//!
//! Excel Number Format Stringのトークン定義を提供します。

/// フォーマットトークン
///
/// Excel Number Format Stringを解析した際に生成されるトークンです。
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FormatToken {
    /// 年（"yy" -> 2桁, "yyyy" -> 4桁）
    Year(usize),

    /// 月（"m", "mm", "mmm" -> 略称, "mmmm" -> 正式名, "mmmmm" -> 頭文字）
    Month(usize),

    /// 日（"d", "dd", "ddd" -> 曜日略称, "dddd" -> 曜日名）
    Day(usize),

    /// 時（"h", "hh"）
    Hour(usize),

    /// 分（"m", "mm"）
    /// 注意: 直前が時、または直後が秒の場合のみ"m"は分として解釈される
    Minute(usize),

    /// 秒（"s", "ss"）
    Second(usize),

    /// 秒の小数部（"ss.000" -> 3桁）
    SubSecond(usize),

    /// 経過時間（"[h]"）
    ElapsedHours(usize),

    /// 経過分（"[mm]"）
    ElapsedMinutes(usize),

    /// 経過秒（"[ss]"）
    ElapsedSeconds(usize),

    /// 午前・午後（"AM/PM" -> true, "A/P" -> false）
    AmPm(bool),

    /// 整数部のゼロパディング（例: "0" -> 1桁, "00" -> 2桁）
    IntegerZero(usize),

    /// 整数部の任意桁（例: "#"）
    IntegerHash,

    /// 小数点
    DecimalPoint,

    /// 小数部のゼロパディング（例: "0" -> 1桁, "00" -> 2桁）
    DecimalZero(usize),

    /// 小数部の任意桁（例: "#"）
    DecimalHash,

    /// 空白パディングの桁（例: "?"）
    DigitSpace,

    /// 指数表記（例: "E+"）
    Exponent,

    /// 千の位区切り
    ThousandSeparator,

    /// パーセント記号
    Percent,

    /// リテラル文字列（例: "$", "-", " "）
    Literal(String),

    /// 色指定（例: "[Red]", "[Blue]"）。表示には影響しない
    Color(String),

    /// テキストプレースホルダー（例: "@"）
    TextPlaceholder,

    /// "General"
    General,
}

impl FormatToken {
    /// トークンが日付・時刻関連かどうかを判定
    pub fn is_datetime(&self) -> bool {
        matches!(
            self,
            FormatToken::Year(_)
                | FormatToken::Month(_)
                | FormatToken::Day(_)
                | FormatToken::Hour(_)
                | FormatToken::Minute(_)
                | FormatToken::Second(_)
                | FormatToken::SubSecond(_)
                | FormatToken::ElapsedHours(_)
                | FormatToken::ElapsedMinutes(_)
                | FormatToken::ElapsedSeconds(_)
                | FormatToken::AmPm(_)
        )
    }

    /// 整数部の桁プレースホルダーかどうか
    pub fn is_integer_digit(&self) -> bool {
        matches!(self, FormatToken::IntegerZero(_) | FormatToken::IntegerHash)
    }
}

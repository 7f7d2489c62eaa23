//! FormatParser Module
//!
//! Excel Number Format Stringの構文解析と適用を提供します。

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::FormatError;
use crate::types::DateSystem;

use super::sections::{FormatSection, SectionKind};
use super::tokens::FormatToken;

const MS_PER_DAY: i64 = 86_400_000;

/// 9999-12-31の翌日（1900年システム）
const MAX_SERIAL: f64 = 2_958_466.0;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Number Format Stringパーサー
///
/// Excel Number Format Stringを解析し、数値をフォーマットします。
#[derive(Debug, Clone)]
pub(crate) struct FormatParser {
    /// パースされたセクション（常に1つ以上）
    sections: Vec<FormatSection>,
}

impl FormatParser {
    /// フォーマット文字列をパース
    ///
    /// 解釈できない文字はリテラルとして扱われるため、パースは失敗しません。
    /// 空の書式は"General"として扱われます。
    ///
    /// # 引数
    ///
    /// * `format_string` - Excel Number Format String
    pub fn parse(format_string: &str) -> Self {
        let mut sections: Vec<FormatSection> = Self::split_sections(format_string)
            .iter()
            .enumerate()
            .map_while(|(idx, s)| SectionKind::from_index(idx).map(|kind| Self::parse_section(s, kind)))
            .collect();

        if sections.is_empty() || (sections.len() == 1 && sections[0].tokens.is_empty()) {
            let mut section = FormatSection::new(SectionKind::Positive);
            section.tokens.push(FormatToken::General);
            sections = vec![section];
        }

        Self { sections }
    }

    /// 最初のセクションが日付・時刻書式かどうか
    pub fn is_datetime(&self) -> bool {
        self.sections.first().is_some_and(|s| s.is_datetime())
    }

    /// セクションに分割
    ///
    /// Excel Number Format Stringは';'でセクションに分割されます。
    /// ただし、'['と']'で囲まれた部分、引用符内、エスケープされた文字は除外します。
    fn split_sections(format_string: &str) -> Vec<String> {
        let mut sections = Vec::new();
        let mut current = String::new();
        let mut in_brackets = false;
        let mut in_quotes = false;
        let mut escaped = false;

        for ch in format_string.chars() {
            if escaped {
                escaped = false;
                current.push(ch);
                continue;
            }
            match ch {
                '\\' if !in_quotes => {
                    escaped = true;
                    current.push(ch);
                }
                '"' => {
                    in_quotes = !in_quotes;
                    current.push(ch);
                }
                '[' if !in_quotes => {
                    in_brackets = true;
                    current.push(ch);
                }
                ']' if !in_quotes => {
                    in_brackets = false;
                    current.push(ch);
                }
                ';' if !in_brackets && !in_quotes => {
                    sections.push(std::mem::take(&mut current));
                }
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            sections.push(current);
        }

        sections
    }

    /// セクションをパース
    fn parse_section(section_str: &str, kind: SectionKind) -> FormatSection {
        let chars: Vec<char> = section_str.chars().collect();
        let mut section = FormatSection::new(kind);
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            i += 1;

            match ch {
                '"' => {
                    let start = i;
                    while i < chars.len() && chars[i] != '"' {
                        i += 1;
                    }
                    let literal: String = chars[start..i].iter().collect();
                    i += 1;
                    Self::push_literal(&mut section, &literal);
                }
                '\\' => {
                    if let Some(next) = chars.get(i) {
                        Self::push_literal(&mut section, &next.to_string());
                        i += 1;
                    }
                }
                '_' => {
                    // 次の文字の幅の空白
                    i += 1;
                    Self::push_literal(&mut section, " ");
                }
                '*' => {
                    // 繰り返し文字は無視
                    i += 1;
                }
                '[' => {
                    let start = i;
                    while i < chars.len() && chars[i] != ']' {
                        i += 1;
                    }
                    let content: String = chars[start..i].iter().collect();
                    i += 1;
                    Self::parse_bracket(&mut section, &content);
                }
                '@' => section.tokens.push(FormatToken::TextPlaceholder),
                '0' => {
                    let count = 1 + Self::count_run(&chars, &mut i, '0');
                    if section.tokens.contains(&FormatToken::DecimalPoint) {
                        section.tokens.push(FormatToken::DecimalZero(count));
                    } else {
                        section.tokens.push(FormatToken::IntegerZero(count));
                    }
                }
                '#' => {
                    if section.tokens.contains(&FormatToken::DecimalPoint) {
                        section.tokens.push(FormatToken::DecimalHash);
                    } else {
                        section.tokens.push(FormatToken::IntegerHash);
                    }
                }
                '?' => section.tokens.push(FormatToken::DigitSpace),
                '.' => {
                    if chars.get(i) == Some(&'0') && Self::follows_seconds(&section) {
                        let count = Self::count_run(&chars, &mut i, '0');
                        section.tokens.push(FormatToken::SubSecond(count));
                    } else if section.is_datetime() {
                        Self::push_literal(&mut section, ".");
                    } else {
                        section.tokens.push(FormatToken::DecimalPoint);
                    }
                }
                ',' => {
                    if section.is_datetime() {
                        Self::push_literal(&mut section, ",");
                    } else {
                        section.tokens.push(FormatToken::ThousandSeparator);
                    }
                }
                '%' => section.tokens.push(FormatToken::Percent),
                'E' | 'e' if matches!(chars.get(i), Some('+') | Some('-')) => {
                    i += 1;
                    section.tokens.push(FormatToken::Exponent);
                }
                'G' | 'g' if Self::starts_with_ignore_case(&chars, i - 1, "general") => {
                    i += "general".len() - 1;
                    section.tokens.push(FormatToken::General);
                }
                'A' | 'a' if Self::starts_with_ignore_case(&chars, i - 1, "am/pm") => {
                    i += "am/pm".len() - 1;
                    section.tokens.push(FormatToken::AmPm(true));
                }
                'A' | 'a' if Self::starts_with_ignore_case(&chars, i - 1, "a/p") => {
                    i += "a/p".len() - 1;
                    section.tokens.push(FormatToken::AmPm(false));
                }
                'y' | 'Y' => {
                    let count = 1 + Self::count_run(&chars, &mut i, 'y');
                    section.tokens.push(FormatToken::Year(count));
                }
                'm' | 'M' => {
                    let count = 1 + Self::count_run(&chars, &mut i, 'm');
                    if count <= 2 && Self::is_minute_context(&section, &chars, i) {
                        section.tokens.push(FormatToken::Minute(count));
                    } else {
                        section.tokens.push(FormatToken::Month(count));
                    }
                }
                'd' | 'D' => {
                    let count = 1 + Self::count_run(&chars, &mut i, 'd');
                    section.tokens.push(FormatToken::Day(count));
                }
                'h' | 'H' => {
                    let count = 1 + Self::count_run(&chars, &mut i, 'h');
                    section.tokens.push(FormatToken::Hour(count));
                }
                's' | 'S' => {
                    let count = 1 + Self::count_run(&chars, &mut i, 's');
                    section.tokens.push(FormatToken::Second(count));
                }
                _ => Self::push_literal(&mut section, &ch.to_string()),
            }
        }

        section
    }

    /// ブラケット内の内容を解析
    ///
    /// `[$€-407]`のような通貨・ロケール指定は通貨記号のみを残し、
    /// `[h]`、`[mm]`、`[ss]`は経過時間として扱います。条件（例: `[>100]`）は無視します。
    fn parse_bracket(section: &mut FormatSection, content: &str) {
        if content.is_empty() {
            return;
        }

        let lower = content.to_ascii_lowercase();
        let all = |c: char| lower.chars().all(|x| x == c);

        if let Some(locale) = content.strip_prefix('$') {
            let symbol = locale.split('-').next().unwrap_or("");
            if !symbol.is_empty() {
                Self::push_literal(section, symbol);
            }
        } else if all('h') {
            section.tokens.push(FormatToken::ElapsedHours(lower.len()));
        } else if all('m') {
            section.tokens.push(FormatToken::ElapsedMinutes(lower.len()));
        } else if all('s') {
            section.tokens.push(FormatToken::ElapsedSeconds(lower.len()));
        } else if content.starts_with(['<', '>', '=']) {
            // 条件は無視
        } else {
            section.tokens.push(FormatToken::Color(content.to_string()));
        }
    }

    /// リテラルを追加（直前がリテラルなら連結する）
    fn push_literal(section: &mut FormatSection, text: &str) {
        if let Some(FormatToken::Literal(last)) = section.tokens.last_mut() {
            last.push_str(text);
        } else {
            section.tokens.push(FormatToken::Literal(text.to_string()));
        }
    }

    /// "m"が分を表す文脈かどうか
    ///
    /// 直前の日付・時刻トークンが時である場合、または次に現れる英字が"s"である場合に分となります。
    fn is_minute_context(section: &FormatSection, chars: &[char], next: usize) -> bool {
        let after_hour = section
            .tokens
            .iter()
            .rev()
            .find(|t| t.is_datetime() && !matches!(t, FormatToken::AmPm(_)))
            .is_some_and(|t| matches!(t, FormatToken::Hour(_) | FormatToken::ElapsedHours(_)));

        let before_second = chars[next..]
            .iter()
            .find(|c| c.is_ascii_alphabetic())
            .is_some_and(|c| c.eq_ignore_ascii_case(&'s'));

        after_hour || before_second
    }

    /// 直前の日付・時刻トークンが秒かどうか
    fn follows_seconds(section: &FormatSection) -> bool {
        section
            .tokens
            .iter()
            .rev()
            .find(|t| t.is_datetime())
            .is_some_and(|t| matches!(t, FormatToken::Second(_) | FormatToken::ElapsedSeconds(_)))
    }

    /// 連続する同じ文字をカウント（大文字小文字を区別しない）
    fn count_run(chars: &[char], i: &mut usize, target: char) -> usize {
        let mut count = 0;
        while *i < chars.len() && chars[*i].eq_ignore_ascii_case(&target) {
            *i += 1;
            count += 1;
        }
        count
    }

    fn starts_with_ignore_case(chars: &[char], start: usize, word: &str) -> bool {
        let word: Vec<char> = word.chars().collect();
        chars.len() >= start + word.len()
            && chars[start..start + word.len()]
                .iter()
                .zip(&word)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// 数値をフォーマット
    ///
    /// # 引数
    ///
    /// * `value` - フォーマットする数値
    /// * `date_system` - シリアル日付値の解釈に使用する日付システム
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - フォーマット済み文字列
    /// * `Err(FormatError)` - 日付として表現できない値の場合
    pub fn format_number(&self, value: f64, date_system: DateSystem) -> Result<String, FormatError> {
        let (section, auto_sign) = self.select_section(value);

        if section.is_datetime() {
            return Self::format_datetime(value, section, date_system);
        }

        if !value.is_finite() {
            return Ok(value.to_string());
        }

        let body = Self::format_numeric(value.abs(), section);
        if auto_sign && value < 0.0 {
            Ok(format!("-{}", body))
        } else {
            Ok(body)
        }
    }

    /// 指定した種類のセクションを取得
    fn section(&self, kind: SectionKind) -> Option<&FormatSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// 値の符号に応じたセクションを選択
    ///
    /// 負数・ゼロ用のセクションが無い場合は正数用セクションを使います。
    /// テキスト用セクションは数値には使われません。
    ///
    /// # 戻り値
    ///
    /// 選択されたセクションと、符号を自動で付与するかどうか。
    /// セクションが複数ある場合、符号はセクション内のリテラルに委ねられます。
    fn select_section(&self, value: f64) -> (&FormatSection, bool) {
        let kind = if value < 0.0 {
            SectionKind::Negative
        } else if value == 0.0 {
            SectionKind::Zero
        } else {
            SectionKind::Positive
        };
        let section = self
            .section(kind)
            .or_else(|| self.section(SectionKind::Positive))
            .unwrap_or(&self.sections[0]);
        (section, self.sections.len() == 1)
    }

    /// シリアル値を日付に変換
    fn serial_to_date(days: i64, date_system: DateSystem) -> Option<NaiveDate> {
        let base = match date_system {
            // 1900年システムはシリアル値60を1900-02-29（存在しない日）として扱う
            DateSystem::V1900 if days < 61 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
            DateSystem::V1900 => NaiveDate::from_ymd_opt(1899, 12, 30)?,
            DateSystem::V1904 => NaiveDate::from_ymd_opt(1904, 1, 1)?,
        };
        base.checked_add_signed(Duration::days(days))
            .filter(|d| d.year() <= 9999)
    }

    /// 日付・時刻をフォーマット
    ///
    /// 時刻は表示される最小単位（秒、または秒の小数部）で丸められ、
    /// 繰り上がりは日付まで伝播します。
    fn format_datetime(
        value: f64,
        section: &FormatSection,
        date_system: DateSystem,
    ) -> Result<String, FormatError> {
        if !value.is_finite() || !(0.0..MAX_SERIAL).contains(&value) {
            return Err(FormatError::DateOutOfRange(value));
        }

        let granularity = 10i64.pow(3 - section.sub_second_digits() as u32);
        let total_ms =
            (value * MS_PER_DAY as f64 / granularity as f64).round() as i64 * granularity;
        let days = total_ms / MS_PER_DAY;
        let ms_of_day = total_ms % MS_PER_DAY;

        let date = Self::serial_to_date(days, date_system)
            .ok_or(FormatError::DateOutOfRange(value))?;
        let millis = (ms_of_day % 1000) as u32;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(
            (ms_of_day / 1000) as u32,
            millis * 1_000_000,
        )
        .ok_or(FormatError::DateOutOfRange(value))?;
        let datetime = NaiveDateTime::new(date, time);
        let total_seconds = total_ms / 1000;
        let twelve_hour = section.has_am_pm();

        let mut result = String::new();
        for token in &section.tokens {
            match token {
                FormatToken::Year(count) => {
                    if *count <= 2 {
                        result.push_str(&format!("{:02}", datetime.year() % 100));
                    } else {
                        result.push_str(&format!("{:04}", datetime.year()));
                    }
                }
                FormatToken::Month(count) => {
                    let name = MONTH_NAMES[datetime.month0() as usize];
                    match count {
                        1 | 2 => result.push_str(&Self::pad(datetime.month() as i64, *count)),
                        3 => result.push_str(&name[..3]),
                        5 => result.push_str(&name[..1]),
                        _ => result.push_str(name),
                    }
                }
                FormatToken::Day(count) => {
                    let name = WEEKDAY_NAMES[datetime.weekday().num_days_from_monday() as usize];
                    match count {
                        1 | 2 => result.push_str(&Self::pad(datetime.day() as i64, *count)),
                        3 => result.push_str(&name[..3]),
                        _ => result.push_str(name),
                    }
                }
                FormatToken::Hour(count) => {
                    let hour = if twelve_hour {
                        match datetime.hour() % 12 {
                            0 => 12,
                            h => h,
                        }
                    } else {
                        datetime.hour()
                    };
                    result.push_str(&Self::pad(hour as i64, *count));
                }
                FormatToken::Minute(count) => {
                    result.push_str(&Self::pad(datetime.minute() as i64, *count))
                }
                FormatToken::Second(count) => {
                    result.push_str(&Self::pad(datetime.second() as i64, *count))
                }
                FormatToken::SubSecond(count) => {
                    let digits = format!("{:03}", millis);
                    result.push('.');
                    result.push_str(&digits[..(*count).min(3)]);
                }
                FormatToken::ElapsedHours(count) => {
                    result.push_str(&Self::pad(total_seconds / 3600, *count))
                }
                FormatToken::ElapsedMinutes(count) => {
                    result.push_str(&Self::pad(total_seconds / 60, *count))
                }
                FormatToken::ElapsedSeconds(count) => {
                    result.push_str(&Self::pad(total_seconds, *count))
                }
                FormatToken::AmPm(full) => {
                    let pm = datetime.hour() >= 12;
                    result.push_str(match (full, pm) {
                        (true, false) => "AM",
                        (true, true) => "PM",
                        (false, false) => "A",
                        (false, true) => "P",
                    });
                }
                FormatToken::Literal(s) => result.push_str(s),
                _ => {}
            }
        }

        Ok(result)
    }

    fn pad(value: i64, width: usize) -> String {
        if width >= 2 {
            format!("{:02}", value)
        } else {
            value.to_string()
        }
    }

    /// 数値をフォーマット（符号なし）
    ///
    /// 整数部は最初の整数プレースホルダーの位置にまとめて出力されます。
    /// 最小桁数は"0"プレースホルダーの数で決まります。
    fn format_numeric(value: f64, section: &FormatSection) -> String {
        let tokens = &section.tokens;

        // 指数表記と分数は"General"で表示する
        if tokens
            .iter()
            .any(|t| matches!(t, FormatToken::Exponent | FormatToken::DigitSpace))
        {
            return Self::format_general(value);
        }

        let last_integer = tokens.iter().rposition(|t| t.is_integer_digit());
        let (grouping, scale_commas) = match last_integer {
            Some(last) => (
                tokens[..last].contains(&FormatToken::ThousandSeparator),
                tokens[last + 1..]
                    .iter()
                    .take_while(|t| **t == FormatToken::ThousandSeparator)
                    .count(),
            ),
            None => (false, 0),
        };

        let percents = tokens.iter().filter(|t| **t == FormatToken::Percent).count();
        let scaled = value * 100f64.powi(percents as i32) / 1000f64.powi(scale_commas as i32);

        let min_decimals: usize = tokens
            .iter()
            .filter_map(|t| match t {
                FormatToken::DecimalZero(n) => Some(*n),
                _ => None,
            })
            .sum();
        let max_decimals =
            min_decimals + tokens.iter().filter(|t| **t == FormatToken::DecimalHash).count();
        let min_integer: usize = tokens
            .iter()
            .filter_map(|t| match t {
                FormatToken::IntegerZero(n) => Some(*n),
                _ => None,
            })
            .sum();

        let rendered = format!("{:.*}", max_decimals, scaled);
        let (int_digits, mut frac) = match rendered.split_once('.') {
            Some((i, f)) => (i.to_string(), f.to_string()),
            None => (rendered.clone(), String::new()),
        };

        while frac.len() > min_decimals && frac.ends_with('0') {
            frac.pop();
        }

        let mut int = if int_digits == "0" && min_integer == 0 {
            String::new()
        } else {
            int_digits
        };
        if int.len() < min_integer {
            int = format!("{}{}", "0".repeat(min_integer - int.len()), int);
        }
        if grouping {
            int = Self::add_thousand_separators(&int);
        }

        let mut result = String::new();
        let mut int_emitted = false;
        for token in tokens {
            match token {
                FormatToken::IntegerZero(_) | FormatToken::IntegerHash => {
                    if !int_emitted {
                        result.push_str(&int);
                        int_emitted = true;
                    }
                }
                FormatToken::DecimalPoint => {
                    if !int_emitted {
                        result.push_str(&int);
                        int_emitted = true;
                    }
                    result.push('.');
                    result.push_str(&frac);
                }
                FormatToken::Percent => result.push('%'),
                FormatToken::Literal(s) => result.push_str(s),
                FormatToken::General | FormatToken::TextPlaceholder => {
                    result.push_str(&Self::format_general(value))
                }
                _ => {}
            }
        }

        result
    }

    /// "General"書式で数値を表示
    ///
    /// 有効数字は最大10桁。1e11以上、または1e-9未満の値は指数表記になります。
    pub fn format_general(value: f64) -> String {
        if value == 0.0 {
            return "0".to_string();
        }
        if !value.is_finite() {
            return value.to_string();
        }

        let abs = value.abs();
        if (1e-9..1e11).contains(&abs) {
            let int_digits = (abs.log10().floor() as i32 + 1).max(1);
            let decimals = (10 - int_digits).max(0) as usize;
            Self::trim_fraction(format!("{:.*}", decimals, value))
        } else {
            let rendered = format!("{:.5E}", value);
            match rendered.split_once('E') {
                Some((mantissa, exponent)) => {
                    let exponent: i32 = exponent.parse().unwrap_or(0);
                    let sign = if exponent < 0 { '-' } else { '+' };
                    format!(
                        "{}E{}{:02}",
                        Self::trim_fraction(mantissa.to_string()),
                        sign,
                        exponent.abs()
                    )
                }
                None => rendered.clone(),
            }
        }
    }

    fn trim_fraction(s: String) -> String {
        if s.contains('.') {
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            s
        }
    }

    /// 千の位区切りを追加
    fn add_thousand_separators(s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let len = chars.len();
        let mut result = String::with_capacity(len + len / 3);

        for (i, ch) in chars.iter().enumerate() {
            result.push(*ch);
            let remaining = len - i - 1;
            if remaining > 0 && remaining % 3 == 0 {
                result.push(',');
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(code: &str, value: f64) -> String {
        FormatParser::parse(code)
            .format_number(value, DateSystem::V1900)
            .unwrap()
    }

    #[test]
    fn test_split_sections() {
        let sections = FormatParser::split_sections("0;0;0;@");
        assert_eq!(sections, vec!["0", "0", "0", "@"]);

        let sections2 = FormatParser::split_sections("0.00");
        assert_eq!(sections2, vec!["0.00"]);

        let quoted = FormatParser::split_sections("0;\"a;b\"");
        assert_eq!(quoted, vec!["0", "\"a;b\""]);

        let escaped = FormatParser::split_sections("0\\;0");
        assert_eq!(escaped.len(), 1);
    }

    #[test]
    fn test_parse_simple_number() {
        let parser = FormatParser::parse("0");
        assert_eq!(parser.sections.len(), 1);
        assert_eq!(parser.sections[0].tokens, vec![FormatToken::IntegerZero(1)]);
    }

    #[test]
    fn test_parse_decimal() {
        let parser = FormatParser::parse("0.0#");
        assert_eq!(
            parser.sections[0].tokens,
            vec![
                FormatToken::IntegerZero(1),
                FormatToken::DecimalPoint,
                FormatToken::DecimalZero(1),
                FormatToken::DecimalHash,
            ]
        );
    }

    #[test]
    fn test_parse_month_or_minute() {
        let date = FormatParser::parse("mm/dd");
        assert_eq!(date.sections[0].tokens[0], FormatToken::Month(2));

        let time = FormatParser::parse("hh:mm");
        assert_eq!(time.sections[0].tokens[2], FormatToken::Minute(2));

        let min_sec = FormatParser::parse("mm:ss");
        assert_eq!(min_sec.sections[0].tokens[0], FormatToken::Minute(2));

        let full = FormatParser::parse("yyyy-mm-dd hh:mm:ss");
        let tokens = &full.sections[0].tokens;
        assert_eq!(tokens[2], FormatToken::Month(2));
        assert_eq!(tokens[8], FormatToken::Minute(2));
    }

    #[test]
    fn test_parse_bracket_variants() {
        let elapsed = FormatParser::parse("[h]:mm:ss");
        assert_eq!(elapsed.sections[0].tokens[0], FormatToken::ElapsedHours(1));
        assert_eq!(elapsed.sections[0].tokens[2], FormatToken::Minute(2));

        let color = FormatParser::parse("[Red]0");
        assert_eq!(
            color.sections[0].tokens[0],
            FormatToken::Color("Red".to_string())
        );

        let locale = FormatParser::parse("[$-409]yyyy");
        assert_eq!(locale.sections[0].tokens, vec![FormatToken::Year(4)]);
    }

    #[test]
    fn test_is_datetime() {
        assert!(FormatParser::parse("yyyy-mm-dd").is_datetime());
        assert!(FormatParser::parse("h:mm AM/PM").is_datetime());
        assert!(FormatParser::parse("[h]:mm").is_datetime());
        assert!(!FormatParser::parse("0.00").is_datetime());
        assert!(!FormatParser::parse("General").is_datetime());
        assert!(!FormatParser::parse("\"Day\" 0").is_datetime());
        assert!(!FormatParser::parse("[Red]#,##0").is_datetime());
    }

    // 数値書式のテスト
    #[test]
    fn test_format_number_integer() {
        assert_eq!(fmt("0", 123.0), "123");
        assert_eq!(fmt("0", 0.0), "0");
        assert_eq!(fmt("0", 999999999.0), "999999999");
        assert_eq!(fmt("0000", 123.0), "0123");
    }

    #[test]
    fn test_format_number_decimal() {
        assert_eq!(fmt("0.00", 123.456), "123.46");
        assert_eq!(fmt("0.00", 0.1), "0.10");
        assert_eq!(fmt("0.00", 999.999), "1000.00");
        assert_eq!(fmt("0.000", 123.456), "123.456");
        assert_eq!(fmt("0.0#", 1.5), "1.5");
        assert_eq!(fmt("0.0#", 1.25), "1.25");
        assert_eq!(fmt("#.##", 0.5), ".5");
    }

    #[test]
    fn test_format_number_percent() {
        assert_eq!(fmt("0.00%", 0.1234), "12.34%");
        assert_eq!(fmt("0%", 0.5), "50%");
        assert_eq!(fmt("0.00%", -0.1234), "-12.34%");
    }

    #[test]
    fn test_format_number_thousand_separator() {
        assert_eq!(fmt("#,##0", 1234.0), "1,234");
        assert_eq!(fmt("#,##0", 1234567.0), "1,234,567");
        assert_eq!(fmt("#,##0", 0.0), "0");
        assert_eq!(fmt("#,##0.00", 1234.5), "1,234.50");
        assert_eq!(fmt("#,##0,", 1234567.0), "1,235");
    }

    #[test]
    fn test_format_number_currency_and_literals() {
        assert_eq!(fmt("\"$\"#,##0.00", 1234.56), "$1,234.56");
        assert_eq!(fmt("[$€-407]#,##0.00", 1234.5), "€1,234.50");
        assert_eq!(fmt("0.00\" kg\"", 123.45), "123.45 kg");
        assert_eq!(fmt("0\\ \\k\\g", 5.0), "5 kg");
    }

    #[test]
    fn test_format_number_sections() {
        assert_eq!(fmt("0", -123.0), "-123");
        assert_eq!(fmt("0;-0", 123.0), "123");
        assert_eq!(fmt("0;-0", -123.0), "-123");
        assert_eq!(fmt("0;(0)", -5.0), "(5)");
        assert_eq!(fmt("0_);(0)", 5.0), "5 ");
        assert_eq!(fmt("0;0;\"-\"", 0.0), "-");
        assert_eq!(fmt("0;0;\"-\"", 7.0), "7");
    }

    #[test]
    fn test_select_section_by_sign() {
        let parser = FormatParser::parse("0;(0);\"zero\";@");
        assert_eq!(parser.select_section(5.0).0.kind, SectionKind::Positive);
        assert_eq!(parser.select_section(-5.0).0.kind, SectionKind::Negative);
        assert_eq!(parser.select_section(0.0).0.kind, SectionKind::Zero);
        assert!(!parser.select_section(-5.0).1);

        // ゼロ用セクションが無ければ正数用を使う
        let two = FormatParser::parse("0.0;(0.0)");
        assert_eq!(two.select_section(0.0).0.kind, SectionKind::Positive);

        let single = FormatParser::parse("0");
        let (section, auto_sign) = single.select_section(-1.0);
        assert_eq!(section.kind, SectionKind::Positive);
        assert!(auto_sign);
    }

    #[test]
    fn test_format_color_ignored() {
        assert_eq!(fmt("[Red]0", 123.0), "123");
        assert_eq!(fmt("0;[Red]-0", -4.0), "-4");
    }

    #[test]
    fn test_format_general() {
        assert_eq!(fmt("", 123.45), "123.45");
        assert_eq!(fmt("General", 123.45), "123.45");
        assert_eq!(fmt("General", 0.1), "0.1");
        assert_eq!(fmt("General", 45306.0), "45306");
        assert_eq!(fmt("General", 1e12), "1E+12");
        assert_eq!(fmt("@", 123.0), "123");
        assert_eq!(fmt("0.00E+00", 5.0), "5");
    }

    // 日付書式のテスト
    #[test]
    fn test_format_date_yyyy_mm_dd() {
        assert_eq!(fmt("yyyy-mm-dd", 45306.0), "2024-01-15");
        assert_eq!(fmt("yyyy-mm-dd", 45306.25), "2024-01-15");
        assert_eq!(fmt("yyyy-mm-dd", 45658.0), "2025-01-01");
    }

    #[test]
    fn test_format_date_1900_leap_bug() {
        assert_eq!(fmt("mm/dd/yyyy", 1.0), "01/01/1900");
        assert_eq!(fmt("yyyy-mm-dd", 59.0), "1900-02-28");
        assert_eq!(fmt("yyyy-mm-dd", 61.0), "1900-03-01");
    }

    #[test]
    fn test_format_date_names() {
        assert_eq!(fmt("d-mmm-yy", 45306.0), "15-Jan-24");
        assert_eq!(
            fmt("dddd, mmmm d, yyyy", 45306.0),
            "Monday, January 15, 2024"
        );
        assert_eq!(fmt("ddd mmmmm", 45306.0), "Mon J");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(fmt("hh:mm:ss", 0.5), "12:00:00");
        assert_eq!(fmt("h:mm AM/PM", 0.75), "6:00 PM");
        assert_eq!(fmt("h:mm AM/PM", 0.0), "12:00 AM");
        assert_eq!(fmt("h:mm A/P", 0.25), "6:00 A");
        assert_eq!(fmt("[h]:mm:ss", 1.5), "36:00:00");
        assert_eq!(fmt("mm:ss.0", 75.2 / 86400.0), "01:15.2");
    }

    #[test]
    fn test_format_datetime_rounding_carries_into_date() {
        assert_eq!(
            fmt("yyyy-mm-dd hh:mm:ss", 45306.99999999),
            "2024-01-16 00:00:00"
        );
        assert_eq!(fmt("yyyy-mm-dd hh:mm:ss", 45306.5), "2024-01-15 12:00:00");
    }

    #[test]
    fn test_format_date_1904_system() {
        let parser = FormatParser::parse("yyyy-mm-dd");
        assert_eq!(
            parser.format_number(43844.0, DateSystem::V1904).unwrap(),
            "2024-01-15"
        );
        assert_eq!(
            parser.format_number(0.0, DateSystem::V1904).unwrap(),
            "1904-01-01"
        );
    }

    #[test]
    fn test_format_date_out_of_range() {
        let parser = FormatParser::parse("yyyy-mm-dd");
        assert!(matches!(
            parser.format_number(-1.0, DateSystem::V1900),
            Err(FormatError::DateOutOfRange(_))
        ));
        assert!(parser.format_number(1e9, DateSystem::V1900).is_err());
        assert!(parser.format_number(f64::NAN, DateSystem::V1900).is_err());
    }

    #[test]
    fn test_add_thousand_separators() {
        assert_eq!(FormatParser::add_thousand_separators("1"), "1");
        assert_eq!(FormatParser::add_thousand_separators("123"), "123");
        assert_eq!(FormatParser::add_thousand_separators("1234"), "1,234");
        assert_eq!(FormatParser::add_thousand_separators("123456"), "123,456");
    }
}

//! FormatSection Module
//!
//! Excel Number Format Stringのセクション定義を提供します。

use super::tokens::FormatToken;

/// セクションの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionKind {
    /// 正数
    Positive,
    /// 負数
    Negative,
    /// ゼロ
    Zero,
    /// テキスト
    Text,
}

impl SectionKind {
    /// セクションの位置から種類を決定
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(SectionKind::Positive),
            1 => Some(SectionKind::Negative),
            2 => Some(SectionKind::Zero),
            3 => Some(SectionKind::Text),
            _ => None,
        }
    }
}

/// フォーマットのセクション（正数、負数、ゼロ、テキスト）
///
/// Excel Number Format Stringは最大4つのセクションに分割されます:
/// 1. 正数
/// 2. 負数
/// 3. ゼロ
/// 4. テキスト
///
/// 条件付きセクション（例: `[>100]`）の条件は解析時に読み捨てられ、
/// セクションは位置から決まる`kind`と値の符号で選択されます。
#[derive(Debug, Clone)]
pub(crate) struct FormatSection {
    /// セクションの種類
    pub kind: SectionKind,

    /// フォーマットトークン
    pub tokens: Vec<FormatToken>,
}

impl FormatSection {
    /// 新しいセクションを生成
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            tokens: Vec::new(),
        }
    }

    /// セクションが日付・時刻書式かどうかを判定
    pub fn is_datetime(&self) -> bool {
        self.tokens.iter().any(|t| t.is_datetime())
    }

    /// 12時間表記かどうか
    pub fn has_am_pm(&self) -> bool {
        self.tokens.iter().any(|t| matches!(t, FormatToken::AmPm(_)))
    }

    /// 秒の小数部の桁数（最大3桁）
    pub fn sub_second_digits(&self) -> usize {
        self.tokens
            .iter()
            .find_map(|t| match t {
                FormatToken::SubSecond(n) => Some((*n).min(3)),
                _ => None,
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_new() {
        let section = FormatSection::new(SectionKind::Positive);
        assert_eq!(section.kind, SectionKind::Positive);
        assert!(section.tokens.is_empty());
    }

    #[test]
    fn test_from_index() {
        assert_eq!(SectionKind::from_index(0), Some(SectionKind::Positive));
        assert_eq!(SectionKind::from_index(3), Some(SectionKind::Text));
        assert_eq!(SectionKind::from_index(4), None);
    }

    #[test]
    fn test_is_datetime() {
        let mut section = FormatSection::new(SectionKind::Positive);
        section.tokens.push(FormatToken::Year(4));
        section.tokens.push(FormatToken::Month(2));
        section.tokens.push(FormatToken::Day(2));
        assert!(section.is_datetime());
        assert!(!section.has_am_pm());

        let mut section2 = FormatSection::new(SectionKind::Positive);
        section2.tokens.push(FormatToken::IntegerZero(1));
        assert!(!section2.is_datetime());
    }

    #[test]
    fn test_sub_second_digits() {
        let mut section = FormatSection::new(SectionKind::Positive);
        section.tokens.push(FormatToken::Second(2));
        assert_eq!(section.sub_second_digits(), 0);
        section.tokens.push(FormatToken::SubSecond(5));
        assert_eq!(section.sub_second_digits(), 3);
    }
}

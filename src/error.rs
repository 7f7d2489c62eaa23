//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! ドキュメント読み込みの失敗（`LoadError`）と内容の不一致（`Mismatch`）は
//! 別のエラークラスとして扱い、読み込み失敗が不一致として解釈されることはありません。

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::api::{DocumentRole, MismatchKind, Stage};
use crate::types::CellCoord;

/// ドキュメント読み込み時のエラー
///
/// 比較処理が始まる前に、Document Loaderから即座に返されるエラーです。
#[derive(Error, Debug)]
pub enum LoadError {
    /// I/O操作中に発生したエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// スプレッドシートの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// 数値の解析エラー
    #[error("Number parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// XMLの解析エラー
    #[error("XML parse error: {0}")]
    Xml(String),

    /// 同名のシートが複数存在する
    #[error("Duplicate sheet name in document: {0}")]
    DuplicateSheet(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb攻撃、パストラバーサル攻撃、入力サイズ制限などの
    /// セキュリティ制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl From<zip::result::ZipError> for LoadError {
    fn from(e: zip::result::ZipError) -> Self {
        LoadError::Zip(e.to_string())
    }
}

impl From<quick_xml::Error> for LoadError {
    fn from(e: quick_xml::Error) -> Self {
        LoadError::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for LoadError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        LoadError::Xml(format!("attribute error: {}", e))
    }
}

/// 数値書式の適用に失敗したエラー
///
/// 比較処理の内部でのみ使用され、利用者には公開されません。
/// 失敗した場合、比較器は生の値の文字列表現にフォールバックします。
#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum FormatError {
    /// シリアル値が日付として表現できない範囲にある
    #[error("Serial value {0} is outside the supported date range")]
    DateOutOfRange(f64),
}

/// xlsxcompareクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `DocumentLoad`: どちらかのドキュメントの読み込みに失敗した
/// - `Config`: 設定の検証に失敗した
/// - `DuplicateSheet`: メモリ上のワークブックに同名シートを追加しようとした
/// - `Mismatch`: 最初に検出された不一致（fail-fastモード）
/// - `Mismatches`: 検出されたすべての不一致（collect-allモード）
///
/// # 使用例
///
/// ```rust,no_run
/// use std::fs::File;
/// use xlsxcompare::{compare_workbooks, XlsxCompareError};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let actual = File::open("actual.xlsx")?;
/// let expected = File::open("expected.xlsx")?;
///
/// match compare_workbooks(actual, expected) {
///     Ok(()) => println!("equivalent"),
///     Err(XlsxCompareError::Mismatch(m)) => println!("{} at {:?}", m.kind, m.cell_ref()),
///     Err(e) => return Err(e.into()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Error, Debug)]
pub enum XlsxCompareError {
    /// ドキュメントの読み込みに失敗したエラー
    ///
    /// `role`は、失敗したのが実際の出力（actual）と期待値（expected）の
    /// どちらのドキュメントかを示します。
    #[error("Failed to load {role} workbook: {source}")]
    DocumentLoad {
        /// 読み込みに失敗したドキュメント
        role: DocumentRole,
        /// 元のエラー
        #[source]
        source: LoadError,
    },

    /// 設定の検証に失敗したエラー
    ///
    /// `ComparatorBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 同じ名前のシートが既に存在する
    #[error("Duplicate sheet name: '{0}'")]
    DuplicateSheet(String),

    /// 最初に検出された不一致
    #[error("{0}")]
    Mismatch(Box<Mismatch>),

    /// 検出されたすべての不一致
    #[error("{} mismatches found, first: {}", .0.len(), first_or_none(.0))]
    Mismatches(Vec<Mismatch>),
}

fn first_or_none(mismatches: &[Mismatch]) -> String {
    mismatches
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl XlsxCompareError {
    /// 内容の不一致によるエラーかどうかを判定
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            XlsxCompareError::Mismatch(_) | XlsxCompareError::Mismatches(_)
        )
    }

    /// 報告された不一致のリストを取得（不一致以外のエラーでは空）
    pub fn mismatches(&self) -> Vec<&Mismatch> {
        match self {
            XlsxCompareError::Mismatch(m) => vec![m.as_ref()],
            XlsxCompareError::Mismatches(list) => list.iter().collect(),
            _ => Vec::new(),
        }
    }
}

/// 不一致の記述子
///
/// 比較の各段階で検出された不一致を、段階・位置・期待値・実際の値とともに保持します。
/// 位置情報は該当する段階でのみ設定されます（例: シート数の不一致では`sheet_index`は`None`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// 不一致の種類
    pub kind: MismatchKind,
    /// シートのインデックス（0始まり、位置ベース）
    pub sheet_index: Option<usize>,
    /// actual側のシート名
    pub sheet_name: Option<String>,
    /// 行インデックス（0始まり）
    pub row: Option<u32>,
    /// 列インデックス（0始まり）
    pub col: Option<u32>,
    /// actual側の値
    pub actual: String,
    /// expected側の値
    pub expected: String,
    /// 説明メッセージ
    pub message: String,
}

impl Mismatch {
    pub(crate) fn new(
        kind: MismatchKind,
        actual: impl Into<String>,
        expected: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            sheet_index: None,
            sheet_name: None,
            row: None,
            col: None,
            actual: actual.into(),
            expected: expected.into(),
            message: message.into(),
        }
    }

    pub(crate) fn in_sheet(mut self, index: usize, name: &str) -> Self {
        self.sheet_index = Some(index);
        self.sheet_name = Some(name.to_string());
        self
    }

    pub(crate) fn at_row(mut self, row: u32) -> Self {
        self.row = Some(row);
        self
    }

    pub(crate) fn at_cell(mut self, row: u32, col: u32) -> Self {
        self.row = Some(row);
        self.col = Some(col);
        self
    }

    /// 不一致が検出された比較段階
    pub fn stage(&self) -> Stage {
        self.kind.stage()
    }

    /// セル位置のA1形式表記（例: "B3"）。セル単位の不一致でない場合は`None`
    pub fn cell_ref(&self) -> Option<String> {
        match (self.row, self.col) {
            (Some(row), Some(col)) => Some(CellCoord::new(row, col).to_a1_notation()),
            _ => None,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(index) = self.sheet_index {
            write!(f, " (sheet {}", index)?;
            if let Some(ref name) = self.sheet_name {
                write!(f, " '{}'", name)?;
            }
            if let Some(cell) = self.cell_ref() {
                write!(f, ", cell {}", cell)?;
            } else if let Some(row) = self.row {
                write!(f, ", row {}", row)?;
            }
            write!(f, ")")?;
        }
        write!(f, ": actual <{}>, expected <{}>", self.actual, self.expected)
    }
}

/// 比較結果のレポート
///
/// `Comparator::report`が返す、シリアライズ可能な比較結果です。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    /// 2つのドキュメントが等価かどうか
    pub equivalent: bool,
    /// 検出された不一致（fail-fastモードでは最大1件）
    pub mismatches: Vec<Mismatch>,
}

impl ComparisonReport {
    pub(crate) fn from_mismatches(mismatches: Vec<Mismatch>) -> Self {
        Self {
            equivalent: mismatches.is_empty(),
            mismatches,
        }
    }

    /// レポートをJSON文字列に変換
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// レポートを`Result`に変換
    ///
    /// 不一致が1件の場合は`Mismatch`、複数件の場合は`Mismatches`を返します。
    pub fn into_result(self) -> Result<(), XlsxCompareError> {
        let mut mismatches = self.mismatches;
        match mismatches.len() {
            0 => Ok(()),
            1 => Err(XlsxCompareError::Mismatch(Box::new(mismatches.remove(0)))),
            _ => Err(XlsxCompareError::Mismatches(mismatches)),
        }
    }
}

//! Builder Module
//!
//! Fluent Builder APIを提供し、`Comparator`インスタンスを段階的に構築する。

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::api::{DocumentRole, FailureMode};
use crate::compare::{self, CompareOptions};
use crate::error::{ComparisonReport, LoadError, XlsxCompareError};
use crate::parser::WorkbookLoader;
use crate::security::SecurityConfig;
use crate::types::Workbook;

/// 比較処理の設定を保持する内部構造体
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ComparisonConfig {
    /// 不一致検出時の動作
    pub failure_mode: FailureMode,

    /// 日付書式でない数値の絶対許容誤差（None: 完全一致）
    pub numeric_tolerance: Option<f64>,

    /// 読み込み時のセキュリティ制限
    pub security: SecurityConfig,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            failure_mode: FailureMode::FailFast,
            numeric_tolerance: None,
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Comparator`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxcompare::{ComparatorBuilder, FailureMode};
///
/// # fn main() -> Result<(), xlsxcompare::XlsxCompareError> {
/// let comparator = ComparatorBuilder::new()
///     .with_failure_mode(FailureMode::CollectAll)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ComparatorBuilder {
    /// 内部設定（構築中）
    config: ComparisonConfig,
}

impl ComparatorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 不一致検出時の動作: 最初の不一致で中断
    /// - 数値比較: 完全一致（許容誤差なし）
    /// - 入力サイズの上限: 2GB
    pub fn new() -> Self {
        Self::default()
    }

    /// 不一致検出時の動作を指定する
    ///
    /// ```rust,no_run
    /// use xlsxcompare::{ComparatorBuilder, FailureMode};
    ///
    /// let builder = ComparatorBuilder::new().with_failure_mode(FailureMode::CollectAll);
    /// ```
    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.config.failure_mode = mode;
        self
    }

    /// 日付書式でない数値の比較に絶対許容誤差を設定する
    ///
    /// 日付書式を持つセルは常に表示テキストで比較され、許容誤差は適用されません。
    ///
    /// # 引数
    ///
    /// * `tolerance` - 許容誤差（0以上の有限値）
    pub fn with_numeric_tolerance(mut self, tolerance: f64) -> Self {
        self.config.numeric_tolerance = Some(tolerance);
        self
    }

    /// 入力ドキュメントの最大サイズ（バイト）を指定する
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_size = bytes;
        self
    }

    /// 設定を検証して`Comparator`を構築する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Comparator)` - 設定が有効な場合
    /// * `Err(XlsxCompareError::Config)` - 以下の場合
    ///   * 許容誤差が負の値、またはNaN・無限大
    ///   * 入力サイズの上限が0
    pub fn build(self) -> Result<Comparator, XlsxCompareError> {
        if let Some(tolerance) = self.config.numeric_tolerance {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(XlsxCompareError::Config(format!(
                    "Numeric tolerance must be a finite non-negative number, got {}",
                    tolerance
                )));
            }
        }

        if self.config.security.max_input_size == 0 {
            return Err(XlsxCompareError::Config(
                "Maximum input size must be greater than zero".to_string(),
            ));
        }

        Ok(Comparator::new(self.config))
    }
}

/// 比較処理のファサード
///
/// `actual`（テスト対象が生成したドキュメント）と`expected`（参照ドキュメント）を
/// 読み込み、シートセット → 形状 → セルの順に比較します。
/// 構築後は不変で、スレッド間で共有できます。
///
/// # 使用例
///
/// ```rust,no_run
/// use std::fs::File;
/// use xlsxcompare::ComparatorBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let comparator = ComparatorBuilder::new().build()?;
/// comparator.compare(File::open("actual.xlsx")?, File::open("expected.xlsx")?)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Comparator {
    config: ComparisonConfig,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(ComparisonConfig::default())
    }
}

impl Comparator {
    pub(crate) fn new(config: ComparisonConfig) -> Self {
        Self { config }
    }

    /// 2つのドキュメントを読み込んで比較する
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - ドキュメントが等価な場合
    /// * `Err(XlsxCompareError::DocumentLoad)` - どちらかの読み込みに失敗した場合
    /// * `Err(XlsxCompareError::Mismatch)` / `Err(XlsxCompareError::Mismatches)` - 不一致がある場合
    pub fn compare<A, E>(&self, actual: A, expected: E) -> Result<(), XlsxCompareError>
    where
        A: Read + Seek,
        E: Read + Seek,
    {
        self.report(actual, expected)?.into_result()
    }

    /// 2つのドキュメントを読み込んで比較し、レポートを返す
    ///
    /// 不一致はエラーではなくレポートとして返されます。
    /// 読み込みの失敗のみがエラーになります。
    pub fn report<A, E>(&self, actual: A, expected: E) -> Result<ComparisonReport, XlsxCompareError>
    where
        A: Read + Seek,
        E: Read + Seek,
    {
        let loader = WorkbookLoader::new(&self.config.security);
        let actual = loader
            .load(actual)
            .map_err(|source| load_error(DocumentRole::Actual, source))?;
        let expected = loader
            .load(expected)
            .map_err(|source| load_error(DocumentRole::Expected, source))?;

        Ok(self.report_loaded(&actual, &expected))
    }

    /// 2つのファイルを比較する
    pub fn compare_files<P, Q>(&self, actual: P, expected: Q) -> Result<(), XlsxCompareError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let actual = open(actual.as_ref(), DocumentRole::Actual)?;
        let expected = open(expected.as_ref(), DocumentRole::Expected)?;
        self.compare(actual, expected)
    }

    /// 読み込み済みのワークブックを比較する
    pub fn compare_loaded(
        &self,
        actual: &Workbook,
        expected: &Workbook,
    ) -> Result<(), XlsxCompareError> {
        self.report_loaded(actual, expected).into_result()
    }

    /// 読み込み済みのワークブックを比較し、レポートを返す
    pub fn report_loaded(&self, actual: &Workbook, expected: &Workbook) -> ComparisonReport {
        let options = CompareOptions {
            failure_mode: self.config.failure_mode,
            numeric_tolerance: self.config.numeric_tolerance,
        };
        ComparisonReport::from_mismatches(compare::compare(actual, expected, options))
    }
}

fn load_error(role: DocumentRole, source: LoadError) -> XlsxCompareError {
    log::debug!("Failed to load {} document: {}", role, source);
    XlsxCompareError::DocumentLoad { role, source }
}

fn open(path: &Path, role: DocumentRole) -> Result<BufReader<File>, XlsxCompareError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| load_error(role, LoadError::Io(e)))
}

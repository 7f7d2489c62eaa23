//! xlsxcompare - Pure-Rust spreadsheet equivalence checker for test suites
//!
//! This crate decides whether two spreadsheet documents are equivalent: an
//! `actual` document produced by the code under test and an `expected`
//! reference document. Documents are compared in three ordered stages
//! (sheet set, shape, cells), and any difference is reported as a structured
//! `Mismatch` that names the stage, location, and both values.
//!
//! Numeric cells carrying a date/time number format are compared by the text
//! they display, so two timestamps on the same day are equal under a
//! `yyyy-mm-dd` format. All other values are compared exactly.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let actual = File::open("actual.xlsx")?;
//!     let expected = File::open("expected.xlsx")?;
//!
//!     xlsxcompare::compare_workbooks(actual, expected)?;
//!     Ok(())
//! }
//! ```
//!
//! In a test, the assertion helper panics with the first mismatch:
//!
//! ```rust,no_run
//! xlsxcompare::assert_workbooks_equivalent("target/report.xlsx", "tests/data/report.xlsx");
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use xlsxcompare::{ComparatorBuilder, FailureMode};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let comparator = ComparatorBuilder::new()
//!         .with_failure_mode(FailureMode::CollectAll)
//!         .with_numeric_tolerance(1e-9)
//!         .build()?;
//!
//!     let actual: Vec<u8> = vec![]; // bytes written by the code under test
//!     let expected = std::fs::read("expected.xlsx")?;
//!
//!     let report = comparator.report(Cursor::new(actual), Cursor::new(expected))?;
//!     if !report.equivalent {
//!         println!("{}", report.to_json()?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # In-Memory Workbooks
//!
//! ```rust
//! use xlsxcompare::{Cell, Comparator, Sheet, Workbook};
//!
//! let mut actual = Workbook::new();
//! actual
//!     .push_sheet(Sheet::new("Data").with_cell(0, 0, Cell::date(45306.25, "yyyy-mm-dd")))
//!     .unwrap();
//!
//! let mut expected = Workbook::new();
//! expected
//!     .push_sheet(Sheet::new("Data").with_cell(0, 0, Cell::date(45306.0, "yyyy-mm-dd")))
//!     .unwrap();
//!
//! assert!(Comparator::default().compare_loaded(&actual, &expected).is_ok());
//! ```

mod api;
mod builder;
mod compare;
mod error;
mod format;
mod formatter;
mod parser;
mod security;
mod types;

use std::io::{Read, Seek};
use std::path::Path;

// 公開API
pub use api::{DocumentRole, FailureMode, MismatchKind, Stage};
pub use builder::{Comparator, ComparatorBuilder};
pub use error::{ComparisonReport, LoadError, Mismatch, XlsxCompareError};
pub use types::{Cell, CellType, CellValue, DateSystem, NumberFormat, Row, Sheet, Workbook};

/// 2つのドキュメントをデフォルト設定で比較する
///
/// 最初の不一致で比較を中断します。
///
/// # 戻り値
///
/// * `Ok(())` - ドキュメントが等価な場合
/// * `Err(XlsxCompareError)` - 読み込みに失敗した場合、または不一致がある場合
pub fn compare_workbooks<A, E>(actual: A, expected: E) -> Result<(), XlsxCompareError>
where
    A: Read + Seek,
    E: Read + Seek,
{
    Comparator::default().compare(actual, expected)
}

/// 2つのファイルをデフォルト設定で比較する
pub fn compare_files<P, Q>(actual: P, expected: Q) -> Result<(), XlsxCompareError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    Comparator::default().compare_files(actual, expected)
}

/// 2つのファイルが等価であることを検証する
///
/// # パニック
///
/// 読み込みに失敗した場合、または不一致がある場合にパニックします。
/// パニックメッセージには不一致の段階・位置・両方の値が含まれます。
#[track_caller]
pub fn assert_workbooks_equivalent<P, Q>(actual: P, expected: Q)
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (actual, expected) = (actual.as_ref(), expected.as_ref());
    if let Err(e) = compare_files(actual, expected) {
        panic!(
            "workbooks are not equivalent\n  actual:   {}\n  expected: {}\n  {}",
            actual.display(),
            expected.display(),
            e
        );
    }
}

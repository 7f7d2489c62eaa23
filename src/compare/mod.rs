//! Compare Module
//!
//! 2つのワークブックの等価性を3段階（シートセット → 形状 → セル）で検査します。
//! 各段階は前の段階が不一致なく完了した場合にのみ実行されます。

mod cell;
mod shape;
mod sheet_set;

pub(crate) use cell::CellComparator;
pub(crate) use shape::compare_shapes;
pub(crate) use sheet_set::compare_sheet_sets;

use crate::api::{FailureMode, Stage};
use crate::error::Mismatch;
use crate::types::Workbook;

/// 比較の中断を表すマーカー
///
/// `FailureMode::FailFast`で不一致が記録されると返され、`?`で呼び出し元まで伝播します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Halt;

/// 不一致の収集器
#[derive(Debug)]
pub(crate) struct MismatchCollector {
    mode: FailureMode,
    mismatches: Vec<Mismatch>,
}

impl MismatchCollector {
    pub fn new(mode: FailureMode) -> Self {
        Self {
            mode,
            mismatches: Vec::new(),
        }
    }

    /// 不一致を記録
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 比較を継続する場合（`CollectAll`）
    /// * `Err(Halt)` - 比較を中断する場合（`FailFast`）
    pub fn record(&mut self, mismatch: Mismatch) -> Result<(), Halt> {
        log::debug!("{}", mismatch);
        self.mismatches.push(mismatch);
        match self.mode {
            FailureMode::FailFast => Err(Halt),
            FailureMode::CollectAll => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn into_mismatches(self) -> Vec<Mismatch> {
        self.mismatches
    }
}

/// 比較の設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CompareOptions {
    pub failure_mode: FailureMode,
    pub numeric_tolerance: Option<f64>,
}

/// 3段階の比較を順に実行し、検出された不一致を返す
///
/// 空のベクターはワークブックが等価であることを意味します。
pub(crate) fn compare(actual: &Workbook, expected: &Workbook, options: CompareOptions) -> Vec<Mismatch> {
    let mut collector = MismatchCollector::new(options.failure_mode);
    if run_stages(actual, expected, options, &mut collector).is_err() {
        log::debug!("Comparison halted at first mismatch");
    }
    collector.into_mismatches()
}

fn run_stages(
    actual: &Workbook,
    expected: &Workbook,
    options: CompareOptions,
    collector: &mut MismatchCollector,
) -> Result<(), Halt> {
    log::debug!("Stage {}: {} vs {} sheets", Stage::SheetSet, actual.sheet_count(), expected.sheet_count());
    compare_sheet_sets(actual, expected, collector)?;
    if !collector.is_empty() {
        return Ok(());
    }

    log::debug!("Stage {}", Stage::Shape);
    compare_shapes(actual, expected, collector)?;
    if !collector.is_empty() {
        return Ok(());
    }

    log::debug!("Stage {}", Stage::Cell);
    let comparator = CellComparator::new(
        options.numeric_tolerance,
        actual.date_system(),
        expected.date_system(),
    );
    comparator.compare_workbooks(actual, expected, collector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MismatchKind;
    use crate::types::{Cell, Sheet};

    fn workbook(sheets: Vec<Sheet>) -> Workbook {
        let mut workbook = Workbook::new();
        for sheet in sheets {
            workbook.push_sheet(sheet).unwrap();
        }
        workbook
    }

    fn options(failure_mode: FailureMode) -> CompareOptions {
        CompareOptions {
            failure_mode,
            numeric_tolerance: None,
        }
    }

    #[test]
    fn test_collector_fail_fast_halts() {
        let mut collector = MismatchCollector::new(FailureMode::FailFast);
        let mismatch = Mismatch::new(MismatchKind::SheetCountMismatch, "1", "2", "count");
        assert_eq!(collector.record(mismatch), Err(Halt));
        assert!(!collector.is_empty());
    }

    #[test]
    fn test_collector_collect_all_continues() {
        let mut collector = MismatchCollector::new(FailureMode::CollectAll);
        for _ in 0..3 {
            let mismatch = Mismatch::new(MismatchKind::CellValueMismatch, "a", "b", "value");
            assert_eq!(collector.record(mismatch), Ok(()));
        }
        assert_eq!(collector.into_mismatches().len(), 3);
    }

    #[test]
    fn test_identical_workbooks() {
        let a = workbook(vec![Sheet::new("S").with_cell(0, 0, Cell::string("x"))]);
        let b = a.clone();
        assert!(compare(&a, &b, options(FailureMode::FailFast)).is_empty());
    }

    #[test]
    fn test_empty_workbooks_are_equivalent() {
        assert!(compare(&Workbook::new(), &Workbook::new(), options(FailureMode::FailFast)).is_empty());
    }

    #[test]
    fn test_later_stages_skipped_after_failure() {
        let a = workbook(vec![
            Sheet::new("A").with_cell(0, 0, Cell::string("x")),
            Sheet::new("B"),
        ]);
        let b = workbook(vec![
            Sheet::new("A").with_cell(0, 0, Cell::string("y")),
            Sheet::new("C"),
        ]);

        let mismatches = compare(&a, &b, options(FailureMode::CollectAll));
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].kind, MismatchKind::SheetNameSetMismatch);
    }

    #[test]
    fn test_sheet_order_pairs_content_by_position() {
        let a = workbook(vec![
            Sheet::new("A").with_cell(0, 0, Cell::string("x")),
            Sheet::new("B").with_cell(0, 0, Cell::string("y")),
        ]);
        let b = workbook(vec![
            Sheet::new("B").with_cell(0, 0, Cell::string("y")),
            Sheet::new("A").with_cell(0, 0, Cell::string("x")),
        ]);

        let mismatches = compare(&a, &b, options(FailureMode::FailFast));
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].kind, MismatchKind::CellValueMismatch);
        assert_eq!(mismatches[0].sheet_index, Some(0));
        assert_eq!(mismatches[0].actual, "x");
        assert_eq!(mismatches[0].expected, "y");
    }

    #[test]
    fn test_shape_failure_skips_cell_stage() {
        let a = workbook(vec![Sheet::new("S")
            .with_cell(0, 0, Cell::string("x"))
            .with_cell(1, 0, Cell::string("y"))]);
        let b = workbook(vec![Sheet::new("S").with_cell(0, 0, Cell::string("different"))]);

        let mismatches = compare(&a, &b, options(FailureMode::CollectAll));
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].kind, MismatchKind::RowCountMismatch);
    }
}

//! Cell Comparator
//!
//! 同じ位置のセル同士の型と値を比較します。
//!
//! 数値セルのどちらかが日付書式を持つ場合、両方をそれぞれの書式で描画した
//! 表示テキストで比較します。それ以外の数値は生の値で比較します。

use super::{Halt, MismatchCollector};
use crate::api::MismatchKind;
use crate::error::Mismatch;
use crate::formatter::CellFormatter;
use crate::types::{Cell, CellValue, DateSystem, Workbook};

/// セルの位置（シートは位置インデックスで識別）
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellPosition<'a> {
    pub sheet_index: usize,
    pub sheet_name: &'a str,
    pub row: u32,
    pub col: u32,
}

impl CellPosition<'_> {
    fn mismatch(&self, kind: MismatchKind, actual: String, expected: String, detail: &str) -> Mismatch {
        Mismatch::new(
            kind,
            actual,
            expected,
            format!(
                "Sheet {}, Row {}, Cell {}: {}",
                self.sheet_index, self.row, self.col, detail
            ),
        )
        .in_sheet(self.sheet_index, self.sheet_name)
        .at_cell(self.row, self.col)
    }
}

/// セル比較器
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellComparator {
    /// 日付書式でない数値に適用する絶対許容誤差
    tolerance: Option<f64>,
    actual_dates: DateSystem,
    expected_dates: DateSystem,
}

impl CellComparator {
    pub fn new(tolerance: Option<f64>, actual_dates: DateSystem, expected_dates: DateSystem) -> Self {
        Self {
            tolerance,
            actual_dates,
            expected_dates,
        }
    }

    /// すべてのシート・行・セルを位置順に比較
    ///
    /// 形状の比較が通過していることを前提とします。
    pub fn compare_workbooks(
        &self,
        actual: &Workbook,
        expected: &Workbook,
        collector: &mut MismatchCollector,
    ) -> Result<(), Halt> {
        for (index, (actual_sheet, expected_sheet)) in
            actual.sheets().iter().zip(expected.sheets()).enumerate()
        {
            for (actual_row, expected_row) in actual_sheet.rows().zip(expected_sheet.rows()) {
                for ((col, actual_cell), (_, expected_cell)) in
                    actual_row.cells().zip(expected_row.cells())
                {
                    let position = CellPosition {
                        sheet_index: index,
                        sheet_name: actual_sheet.name(),
                        row: actual_row.index(),
                        col,
                    };
                    match self.compare(actual_cell, expected_cell, &position) {
                        Some(mismatch) => collector.record(mismatch)?,
                        None => log::trace!(
                            "Sheet {}, Row {}, Cell {}: match",
                            index,
                            position.row,
                            col
                        ),
                    }
                }
            }
        }
        Ok(())
    }

    /// 2つのセルを比較
    ///
    /// # 戻り値
    ///
    /// * `None` - セルが等価な場合
    /// * `Some(Mismatch)` - 型（`CellTypeMismatch`）または値（`CellValueMismatch`）が異なる場合
    pub fn compare(
        &self,
        actual: &Cell,
        expected: &Cell,
        position: &CellPosition<'_>,
    ) -> Option<Mismatch> {
        let (actual_type, expected_type) = (actual.cell_type(), expected.cell_type());
        if actual_type != expected_type {
            return Some(position.mismatch(
                MismatchKind::CellTypeMismatch,
                actual_type.to_string(),
                expected_type.to_string(),
                "Non matching cell type",
            ));
        }

        let value_mismatch = |a: String, e: String| {
            position.mismatch(MismatchKind::CellValueMismatch, a, e, "values are different")
        };

        match (actual.value(), expected.value()) {
            (CellValue::Number(_), CellValue::Number(_))
                if actual.is_date_formatted() || expected.is_date_formatted() =>
            {
                let actual_text = CellFormatter::display_text(actual, self.actual_dates);
                let expected_text = CellFormatter::display_text(expected, self.expected_dates);
                (actual_text != expected_text).then(|| value_mismatch(actual_text, expected_text))
            }
            (CellValue::Number(a), CellValue::Number(e)) => {
                (!self.numbers_equal(*a, *e)).then(|| value_mismatch(a.to_string(), e.to_string()))
            }
            (a, e) => (a != e).then(|| value_mismatch(a.as_raw_string(), e.as_raw_string())),
        }
    }

    /// 数値の等価判定
    ///
    /// 許容誤差がない場合はビット単位で一致する必要があります（NaN同士は等価）。
    fn numbers_equal(&self, actual: f64, expected: f64) -> bool {
        if actual.to_bits() == expected.to_bits() || (actual.is_nan() && expected.is_nan()) {
            return true;
        }
        match self.tolerance {
            Some(tolerance) => (actual - expected).abs() <= tolerance,
            None => false,
        }
    }
}

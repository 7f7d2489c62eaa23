//! Shape Comparator
//!
//! 同じ位置のシート同士で、値を持つ行の数、行ごとのセル数、値の位置を比較します。
//! 行は行インデックスの昇順（存在する行のみ）で先頭から対応付けられます。

use super::{Halt, MismatchCollector};
use crate::api::MismatchKind;
use crate::error::Mismatch;
use crate::types::{CellCoord, Row, Workbook};

/// シートの形状を比較
///
/// シート数が等しいことを前提とし、シートは位置で対応付けられます。
pub(crate) fn compare_shapes(
    actual: &Workbook,
    expected: &Workbook,
    collector: &mut MismatchCollector,
) -> Result<(), Halt> {
    for (index, (actual_sheet, expected_sheet)) in
        actual.sheets().iter().zip(expected.sheets()).enumerate()
    {
        log::debug!(
            "Sheet {} '{}': actual {} rows, expected {} rows",
            index,
            actual_sheet.name(),
            actual_sheet.row_count(),
            expected_sheet.row_count()
        );

        if actual_sheet.row_count() != expected_sheet.row_count() {
            collector.record(
                Mismatch::new(
                    MismatchKind::RowCountMismatch,
                    actual_sheet.row_count().to_string(),
                    expected_sheet.row_count().to_string(),
                    format!("Sheet {}: Sheets have different count of rows", index),
                )
                .in_sheet(index, actual_sheet.name()),
            )?;
            continue;
        }

        for (actual_row, expected_row) in actual_sheet.rows().zip(expected_sheet.rows()) {
            if actual_row.cell_count() != expected_row.cell_count() {
                collector.record(
                    Mismatch::new(
                        MismatchKind::ColumnCountMismatch,
                        actual_row.cell_count().to_string(),
                        expected_row.cell_count().to_string(),
                        format!(
                            "Sheet {}, Row {}: Sheets have different count of columns",
                            index,
                            actual_row.index()
                        ),
                    )
                    .in_sheet(index, actual_sheet.name())
                    .at_row(actual_row.index()),
                )?;
                continue;
            }

            let actual_positions = describe_positions(actual_row);
            let expected_positions = describe_positions(expected_row);
            if actual_positions != expected_positions {
                collector.record(
                    Mismatch::new(
                        MismatchKind::CellPositionMismatch,
                        actual_positions,
                        expected_positions,
                        format!(
                            "Sheet {}, Row {}: Rows have values at different positions",
                            index,
                            actual_row.index()
                        ),
                    )
                    .in_sheet(index, actual_sheet.name())
                    .at_row(actual_row.index()),
                )?;
            }
        }
    }

    Ok(())
}

/// 行内の値を持つセルの位置をA1形式で列挙（例: "A1, F1"）
fn describe_positions(row: &Row) -> String {
    row.cells()
        .map(|(col, _)| CellCoord::new(row.index(), col).to_a1_notation())
        .collect::<Vec<_>>()
        .join(", ")
}

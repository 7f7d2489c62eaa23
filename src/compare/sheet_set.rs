//! Sheet-Set Comparator
//!
//! シート数と、順序を問わないシート名の集合を比較します。

use super::{Halt, MismatchCollector};
use crate::api::MismatchKind;
use crate::error::Mismatch;
use crate::types::Workbook;

/// シート数とシート名の集合を比較
///
/// シート数が異なる場合、名前の比較は行いません。
pub(crate) fn compare_sheet_sets(
    actual: &Workbook,
    expected: &Workbook,
    collector: &mut MismatchCollector,
) -> Result<(), Halt> {
    if actual.sheet_count() != expected.sheet_count() {
        return collector.record(Mismatch::new(
            MismatchKind::SheetCountMismatch,
            actual.sheet_count().to_string(),
            expected.sheet_count().to_string(),
            "Workbooks have different number of sheets",
        ));
    }

    let mut actual_names = actual.sheet_names();
    let mut expected_names = expected.sheet_names();
    actual_names.sort_unstable();
    expected_names.sort_unstable();
    log::debug!(
        "Sorted sheet names: actual {:?}, expected {:?}",
        actual_names,
        expected_names
    );

    if actual_names != expected_names {
        collector.record(Mismatch::new(
            MismatchKind::SheetNameSetMismatch,
            actual_names.join(", "),
            expected_names.join(", "),
            "Workbooks have different sheet names",
        ))?;
    }

    Ok(())
}

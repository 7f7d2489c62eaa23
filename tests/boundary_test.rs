//! Boundary Tests for xlsxcompare
//!
//! 空のシート、シート端のセル、長い文字列、日付の境界値などの比較を検証します。

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::io::Cursor;
use xlsxcompare::{compare_workbooks, MismatchKind, XlsxCompareError};

// Excel maximum rows and columns (0-indexed)
const MAX_ROW: u32 = 1_048_575;
const MAX_COL: u16 = 16_383;

/// Build a single-sheet workbook populated by `fill`
fn generate<F>(fill: F) -> Result<Vec<u8>, XlsxError>
where
    F: FnOnce(&mut Worksheet) -> Result<(), XlsxError>,
{
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    fill(worksheet)?;
    Ok(workbook.save_to_buffer()?)
}

fn compare<F, G>(actual: F, expected: G) -> Result<(), XlsxCompareError>
where
    F: FnOnce(&mut Worksheet) -> Result<(), XlsxError>,
    G: FnOnce(&mut Worksheet) -> Result<(), XlsxError>,
{
    compare_workbooks(
        Cursor::new(generate(actual).unwrap()),
        Cursor::new(generate(expected).unwrap()),
    )
}

fn first_kind(result: Result<(), XlsxCompareError>) -> MismatchKind {
    match result {
        Err(e) if e.is_mismatch() => e.mismatches()[0].kind,
        other => panic!("Expected a mismatch, got {:?}", other),
    }
}

#[test]
fn test_empty_sheets_are_equivalent() {
    assert!(compare(|_| Ok(()), |_| Ok(())).is_ok());
}

#[test]
fn test_empty_sheet_versus_populated_sheet() {
    let result = compare(
        |_| Ok(()),
        |ws| {
            ws.write_string(0, 0, "data")?;
            Ok(())
        },
    );
    assert_eq!(first_kind(result), MismatchKind::RowCountMismatch);
}

#[test]
fn test_formatted_blank_cell_is_ignored() {
    let result = compare(
        |ws| {
            ws.write_string(0, 0, "a")?;
            Ok(())
        },
        |ws| {
            ws.write_string(0, 0, "a")?;
            ws.write_blank(0, 1, &Format::new().set_bold())?;
            Ok(())
        },
    );
    // 書式のみの空セルは値を持たないため無視される
    assert!(result.is_ok());
}

#[test]
fn test_cells_at_sheet_limits() {
    let fill = |ws: &mut Worksheet| -> Result<(), XlsxError> {
        ws.write_string(MAX_ROW, MAX_COL - 1, "BeforeLast")?;
        ws.write_string(MAX_ROW, MAX_COL, "LastCell")?;
        Ok(())
    };
    assert!(compare(fill, fill).is_ok());
}

#[test]
fn test_value_at_sheet_limit_differs() {
    let result = compare(
        |ws| {
            ws.write_string(MAX_ROW, MAX_COL, "last")?;
            Ok(())
        },
        |ws| {
            ws.write_string(MAX_ROW, MAX_COL, "LAST")?;
            Ok(())
        },
    );
    match result {
        Err(XlsxCompareError::Mismatch(mismatch)) => {
            assert_eq!(mismatch.kind, MismatchKind::CellValueMismatch);
            assert_eq!(mismatch.cell_ref().as_deref(), Some("XFD1048576"));
        }
        other => panic!("Expected a single mismatch, got {:?}", other),
    }
}

#[test]
fn test_same_count_different_columns() {
    let result = compare(
        |ws| {
            ws.write_string(0, 0, "a")?;
            ws.write_string(0, 5, "b")?;
            Ok(())
        },
        |ws| {
            ws.write_string(0, 0, "a")?;
            ws.write_string(0, 4, "b")?;
            Ok(())
        },
    );
    assert_eq!(first_kind(result), MismatchKind::CellPositionMismatch);
}

#[test]
fn test_very_long_cell_content() {
    // Excel maximum cell content: 32,767 characters
    let long = "A".repeat(32_767);
    let mut changed = long.clone();
    changed.replace_range(32_766.., "B");

    let same = compare(
        |ws| {
            ws.write_string(0, 0, &long)?;
            Ok(())
        },
        |ws| {
            ws.write_string(0, 0, &long)?;
            Ok(())
        },
    );
    assert!(same.is_ok());

    let different = compare(
        |ws| {
            ws.write_string(0, 0, &long)?;
            Ok(())
        },
        |ws| {
            ws.write_string(0, 0, &changed)?;
            Ok(())
        },
    );
    assert_eq!(first_kind(different), MismatchKind::CellValueMismatch);
}

#[test]
fn test_date_epoch_boundary() {
    let date = Format::new().set_num_format("yyyy-mm-dd");

    // 1900年システムのシリアル値1は1900-01-01
    let result = compare(
        |ws| {
            ws.write_number_with_format(0, 0, 1.0, &date)?;
            ws.write_number_with_format(1, 0, 73050.0, &date)?;
            Ok(())
        },
        |ws| {
            ws.write_number_with_format(0, 0, 1.0, &date)?;
            ws.write_number_with_format(1, 0, 73051.0, &date)?;
            Ok(())
        },
    );
    match result {
        Err(XlsxCompareError::Mismatch(mismatch)) => {
            assert_eq!(mismatch.row, Some(1));
            assert_eq!(mismatch.actual, "2099-12-31");
            assert_eq!(mismatch.expected, "2100-01-01");
        }
        other => panic!("Expected a single mismatch, got {:?}", other),
    }
}

#[test]
fn test_date_format_versus_plain_number() {
    let date = Format::new().set_num_format("yyyy-mm-dd");
    let result = compare(
        |ws| {
            ws.write_number_with_format(0, 0, 45306.0, &date)?;
            Ok(())
        },
        |ws| {
            ws.write_number(0, 0, 45306.0)?;
            Ok(())
        },
    );
    match result {
        Err(XlsxCompareError::Mismatch(mismatch)) => {
            assert_eq!(mismatch.kind, MismatchKind::CellValueMismatch);
            assert_eq!(mismatch.actual, "2024-01-15");
            assert_eq!(mismatch.expected, "45306");
        }
        other => panic!("Expected a single mismatch, got {:?}", other),
    }
}

#[test]
fn test_boolean_versus_string() {
    let result = compare(
        |ws| {
            ws.write_boolean(0, 0, true)?;
            Ok(())
        },
        |ws| {
            ws.write_string(0, 0, "TRUE")?;
            Ok(())
        },
    );
    match result {
        Err(XlsxCompareError::Mismatch(mismatch)) => {
            assert_eq!(mismatch.kind, MismatchKind::CellTypeMismatch);
            assert_eq!(mismatch.actual, "BOOLEAN");
            assert_eq!(mismatch.expected, "STRING");
        }
        other => panic!("Expected a single mismatch, got {:?}", other),
    }
}

#[test]
fn test_corrupted_zip_header() {
    let mut invalid = vec![0x50, 0x4B, 0x03, 0x04];
    invalid.extend_from_slice(b"INVALID_CONTENT");

    let result = compare_workbooks(Cursor::new(invalid), Cursor::new(generate(|_| Ok(())).unwrap()));
    match result {
        Err(e @ XlsxCompareError::DocumentLoad { .. }) => assert!(!e.is_mismatch()),
        other => panic!("Expected DocumentLoad error, got {:?}", other),
    }
}

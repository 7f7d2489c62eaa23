//! Security Tests
//!
//! 読み込み時のセキュリティ制限を検証します。
//! 制限違反は、どちらのドキュメントで発生したかを示す読み込みエラーとして報告されます。

use std::io::{Cursor, Write};
use xlsxcompare::{ComparatorBuilder, DocumentRole, LoadError, XlsxCompareError};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// 指定したエントリを持つZIPアーカイブを作成
fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip_data = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut zip_data));
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }
    zip_data
}

fn valid_workbook() -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    workbook
        .add_worksheet()
        .write_string(0, 0, "valid")
        .unwrap();
    workbook.save_to_buffer().unwrap()
}

/// actual側に不正なドキュメントを渡し、セキュリティ違反のメッセージを取得
fn security_violation(actual: Vec<u8>) -> String {
    let comparator = ComparatorBuilder::new().build().unwrap();
    match comparator.compare(Cursor::new(actual), Cursor::new(valid_workbook())) {
        Err(XlsxCompareError::DocumentLoad {
            role: DocumentRole::Actual,
            source: LoadError::SecurityViolation(msg),
        }) => msg,
        other => panic!("Expected SecurityViolation for actual, got {:?}", other),
    }
}

/// ZIP bomb攻撃のテスト: 大量のファイルを含むZIPアーカイブ
#[test]
fn test_zip_bomb_too_many_files() {
    // 10,001個のファイルを含むZIPアーカイブを作成（上限: 10,000）
    let names: Vec<String> = (0..10_001).map(|i| format!("xl/file{}.xml", i)).collect();
    let entries: Vec<(&str, &[u8])> = names.iter().map(|n| (n.as_str(), &b"test"[..])).collect();

    let msg = security_violation(build_archive(&entries));
    assert!(msg.contains("too many entries"));
}

/// ZIP bomb攻撃のテスト: 単一エントリの展開後サイズが大きすぎる
#[test]
#[ignore] // 大きなデータを作成するため、通常のテストではスキップ
fn test_zip_bomb_large_entry() {
    // 100MB + 1バイト
    let large_data = vec![0u8; 104_857_601];
    let msg = security_violation(build_archive(&[("xl/large_file.xml", large_data.as_slice())]));
    assert!(msg.contains("exceeds maximum size"));
}

/// パストラバーサル攻撃のテスト: `..`を含むパス
#[test]
fn test_path_traversal_dotdot() {
    let msg = security_violation(build_archive(&[("../etc/passwd", &b"test"[..])]));
    assert!(msg.contains("Invalid archive path"));
}

/// パストラバーサル攻撃のテスト: 絶対パス
#[test]
fn test_path_traversal_absolute_path() {
    let msg = security_violation(build_archive(&[("/etc/passwd", &b"test"[..])]));
    assert!(msg.contains("Invalid archive path"));
}

/// パストラバーサル攻撃のテスト: Windows形式の絶対パス
#[test]
fn test_path_traversal_windows_absolute_path() {
    let msg = security_violation(build_archive(&[("C:\\Windows\\system32", &b"test"[..])]));
    assert!(msg.contains("Invalid archive path"));
}

/// 入力サイズ制限のテスト
#[test]
fn test_input_size_limit() {
    let comparator = ComparatorBuilder::new()
        .with_max_input_size(64)
        .build()
        .unwrap();
    let result = comparator.compare(Cursor::new(valid_workbook()), Cursor::new(valid_workbook()));

    match result {
        Err(XlsxCompareError::DocumentLoad {
            role: DocumentRole::Actual,
            source: LoadError::SecurityViolation(msg),
        }) => assert!(msg.contains("exceeds maximum")),
        other => panic!("Expected SecurityViolation, got {:?}", other),
    }
}

/// expected側の違反もexpectedとして報告されることを確認
#[test]
fn test_violation_in_expected_document() {
    let comparator = ComparatorBuilder::new().build().unwrap();
    let result = comparator.compare(
        Cursor::new(valid_workbook()),
        Cursor::new(build_archive(&[("../evil.xml", &b"test"[..])])),
    );
    assert!(matches!(
        result,
        Err(XlsxCompareError::DocumentLoad {
            role: DocumentRole::Expected,
            source: LoadError::SecurityViolation(_),
        })
    ));
}

/// 正常な構造のアーカイブではセキュリティ違反にならないことを確認
#[test]
fn test_valid_archive_is_not_a_violation() {
    // 最小限のXLSX構造（不完全なため解析エラーになり得る）
    let archive = build_archive(&[
        ("xl/workbook.xml", &b"<?xml version=\"1.0\"?><workbook/>"[..]),
        ("xl/worksheets/sheet1.xml", &b"<?xml version=\"1.0\"?><worksheet/>"[..]),
    ]);

    let comparator = ComparatorBuilder::new().build().unwrap();
    let result = comparator.compare(Cursor::new(archive), Cursor::new(valid_workbook()));
    if let Err(XlsxCompareError::DocumentLoad {
        source: LoadError::SecurityViolation(msg),
        ..
    }) = result
    {
        panic!("Should not trigger security violation for valid structure: {}", msg);
    }
}

//! Parser Module
//!
//! ドキュメントの読み込みを担当するモジュール。
//! セル値はcalamine、数値書式と日付システムはZIP内のXMLから取得します。

mod metadata;
mod workbook;

pub(crate) use metadata::XlsxMetadata;
pub(crate) use workbook::WorkbookLoader;

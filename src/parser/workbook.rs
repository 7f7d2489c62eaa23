//! Workbook Loader Module
//!
//! calamineを使用してドキュメントを読み込み、比較用のメモリ上の`Workbook`に変換します。

use std::io::{Cursor, Read, Seek};

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use zip::ZipArchive;

use crate::error::{LoadError, XlsxCompareError};
use crate::parser::XlsxMetadata;
use crate::security::SecurityConfig;
use crate::types::{Cell, Sheet, Workbook};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// 1900年システムと1904年システムのシリアル値の差（日数）
const DAYS_1900_TO_1904: f64 = 1462.0;

/// ドキュメントローダー
///
/// calamineが開ける形式（xlsx, xlsm, xlsb, xls, ods）を受け付けます。
/// 数値書式と日付システムはOOXML形式の場合のみXMLメタデータから取得します。
pub(crate) struct WorkbookLoader<'a> {
    security: &'a SecurityConfig,
}

impl<'a> WorkbookLoader<'a> {
    pub fn new(security: &'a SecurityConfig) -> Self {
        Self { security }
    }

    /// ドキュメントを読み込む
    ///
    /// # 引数
    ///
    /// * `reader` - ドキュメントのリーダー（Read + Seekトレイトを実装）
    ///
    /// # 戻り値
    ///
    /// * `Ok(Workbook)` - 読み込みに成功した場合
    /// * `Err(LoadError)` - I/Oエラー、形式エラー、セキュリティ制限違反の場合
    pub fn load<R: Read + Seek>(&self, mut reader: R) -> Result<Workbook, LoadError> {
        // 上限を1バイト超えるまで読み込み、超過を検出する
        let mut buffer = Vec::new();
        reader
            .by_ref()
            .take(self.security.max_input_size.saturating_add(1))
            .read_to_end(&mut buffer)?;
        self.security.check_input_size(buffer.len() as u64)?;

        // OOXML/ODSはZIPアーカイブのため、calamineが展開する前に制限を検査する
        let mut archive = if buffer.starts_with(ZIP_MAGIC) {
            let mut archive = ZipArchive::new(Cursor::new(buffer.as_slice()))?;
            self.security.check_archive(&mut archive)?;
            Some(archive)
        } else {
            None
        };

        let mut sheets = open_workbook_auto_from_rs(Cursor::new(buffer.as_slice()))?;

        // OOXML以外は日付システムをメタデータから得られないため、日時を1900年システムに揃える
        let (metadata, normalize_dates) = match (&sheets, archive.as_mut()) {
            (Sheets::Xlsx(_), Some(archive)) => (XlsxMetadata::parse(archive)?, false),
            _ => (XlsxMetadata::default(), true),
        };

        let mut workbook = Workbook::new().with_date_system(metadata.date_system());
        for name in sheets.sheet_names() {
            let range = sheets.worksheet_range(&name)?;
            let sheet = Self::convert_sheet(&name, &range, &metadata, normalize_dates);
            log::debug!(
                "Loaded sheet '{}' with {} populated rows",
                name,
                sheet.row_count()
            );
            workbook.push_sheet(sheet).map_err(|e| match e {
                XlsxCompareError::DuplicateSheet(name) => LoadError::DuplicateSheet(name),
                other => LoadError::Xml(other.to_string()),
            })?;
        }

        Ok(workbook)
    }

    /// calamineのRangeをシートに変換
    ///
    /// Rangeの座標は開始位置からの相対値のため、開始位置を加算して絶対座標に戻します。
    fn convert_sheet(
        name: &str,
        range: &Range<Data>,
        metadata: &XlsxMetadata,
        normalize_dates: bool,
    ) -> Sheet {
        let mut sheet = Sheet::new(name);
        let (start_row, start_col) = range.start().unwrap_or((0, 0));

        for (r, c, data) in range.used_cells() {
            let row = start_row + r as u32;
            let col = start_col + c as u32;
            let Some(mut cell) = Self::convert_data(data, normalize_dates) else {
                continue;
            };
            if let Some(format) = metadata.number_format(name, row, col) {
                cell = cell.with_number_format(format);
            }
            sheet.set_cell(row, col, cell);
        }

        sheet
    }

    /// calamineのセル値を変換（空セルは`None`）
    ///
    /// `normalize_dates`が真の場合、日時は1900年システムのシリアル値に変換します。
    fn convert_data(data: &Data, normalize_dates: bool) -> Option<Cell> {
        let cell = match data {
            Data::Int(i) => Cell::number(*i as f64),
            Data::Float(f) => Cell::number(*f),
            Data::String(s) => Cell::string(s.clone()),
            Data::Bool(b) => Cell::boolean(*b),
            Data::DateTime(dt) if normalize_dates => {
                Cell::number(datetime_to_1900_serial(dt)).with_date_flag()
            }
            Data::DateTime(dt) => Cell::number(dt.as_f64()).with_date_flag(),
            Data::DateTimeIso(s) => match iso_to_serial(s) {
                Some(serial) => Cell::number(serial).with_date_flag(),
                None => Cell::string(s.clone()),
            },
            Data::DurationIso(s) => Cell::string(s.clone()),
            Data::Error(e) => Cell::error(e.to_string()),
            Data::Empty => return None,
        };
        Some(cell)
    }
}

/// calamineの日時を1900年システムのシリアル値に変換
///
/// calamineは1904年フラグを公開しないため、`as_datetime`との差から判定します。
/// 1900年システムでは差は0または1日（1900年2月29日の扱い）、1904年システムでは1462日になります。
fn datetime_to_1900_serial(dt: &ExcelDateTime) -> f64 {
    let value = dt.as_f64();
    match dt.as_datetime().and_then(naive_to_serial) {
        Some(serial) if serial - value > DAYS_1900_TO_1904 - 1.0 => value + DAYS_1900_TO_1904,
        _ => value,
    }
}

/// 日時を1900年システムのシリアル値に変換（基準日は1899-12-30）
fn naive_to_serial(datetime: NaiveDateTime) -> Option<f64> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (datetime - epoch).num_milliseconds();
    Some(millis as f64 / 86_400_000.0)
}

/// ISO 8601形式の日時を1900年システムのシリアル値に変換
fn iso_to_serial(s: &str) -> Option<f64> {
    let datetime = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    naive_to_serial(datetime)
}

//! XML Metadata Parser Module
//!
//! XLSX内部のXMLファイルから、calamineで取得できない情報を抽出するモジュール。
//! セルごとの数値書式と、ワークブックの日付システムを提供します。

use std::collections::HashMap;
use std::io::{Read, Seek};

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::LoadError;
use crate::formatter::CellFormatter;
use crate::security::validate_zip_path;
use crate::types::{CellCoord, DateSystem, NumberFormat};

/// XLSXメタデータ
///
/// XLSXファイル（ZIPアーカイブ）からXMLを直接解析した結果です。
/// OOXML以外の形式では空のメタデータ（`Default`）が使用されます。
#[derive(Debug, Clone, Default)]
pub(crate) struct XlsxMetadata {
    /// ワークブックの日付システム
    date_system: DateSystem,
    /// numFmtId -> formatCode のマッピング（numFmts要素で定義されたもの）
    num_formats: HashMap<u32, String>,
    /// cellXfsのインデックス -> numFmtId
    xf_num_fmt_ids: Vec<u32>,
    /// シート名 -> (行, 列) -> スタイルインデックス
    cell_styles: HashMap<String, HashMap<(u32, u32), u32>>,
}

impl XlsxMetadata {
    /// XLSXアーカイブからメタデータを解析
    ///
    /// アーカイブ全体のセキュリティ検査は呼び出し側（`WorkbookLoader`）で済んでいる前提です。
    /// 読み込むエントリのパスはここでも検証します。
    ///
    /// # 引数
    ///
    /// * `archive` - 検査済みのXLSXアーカイブ
    ///
    /// # 戻り値
    ///
    /// * `Ok(XlsxMetadata)` - 解析に成功した場合
    /// * `Err(LoadError)` - XMLが不正な場合
    pub fn parse<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Self, LoadError> {
        let mut metadata = Self::default();

        let workbook_xml = match read_entry(archive, "xl/workbook.xml")? {
            Some(xml) => xml,
            None => {
                log::warn!("xl/workbook.xml not found; number formats are unavailable");
                return Ok(metadata);
            }
        };
        let (sheets, date_system) = parse_workbook(&workbook_xml)?;
        metadata.date_system = date_system;

        let targets = match read_entry(archive, "xl/_rels/workbook.xml.rels")? {
            Some(xml) => parse_relationships(&xml)?,
            None => HashMap::new(),
        };

        if let Some(xml) = read_entry(archive, "xl/styles.xml")? {
            let (num_formats, xf_num_fmt_ids) = parse_styles(&xml)?;
            metadata.num_formats = num_formats;
            metadata.xf_num_fmt_ids = xf_num_fmt_ids;
        }

        for (name, rel_id) in sheets {
            let Some(path) = targets.get(&rel_id).map(|t| resolve_target(t)) else {
                log::warn!("Sheet '{}' has no relationship target for '{}'", name, rel_id);
                continue;
            };
            match read_entry(archive, &path)? {
                Some(xml) => {
                    metadata.cell_styles.insert(name, parse_cell_styles(&xml)?);
                }
                None => log::warn!("Worksheet part '{}' for sheet '{}' not found", path, name),
            }
        }

        log::debug!(
            "Parsed metadata: {:?}, {} custom formats, {} cell styles, {} sheets",
            metadata.date_system,
            metadata.num_formats.len(),
            metadata.xf_num_fmt_ids.len(),
            metadata.cell_styles.len()
        );

        Ok(metadata)
    }

    /// ワークブックの日付システムを取得
    pub fn date_system(&self) -> DateSystem {
        self.date_system
    }

    /// セルの数値書式を取得
    ///
    /// # 引数
    ///
    /// * `sheet` - シート名
    /// * `row` - 行インデックス（0始まり）
    /// * `col` - 列インデックス（0始まり）
    ///
    /// # 戻り値
    ///
    /// * `Some(NumberFormat)` - セルに"General"以外の数値書式が設定されている場合
    /// * `None` - 書式がない、または書式IDが解決できない場合
    pub fn number_format(&self, sheet: &str, row: u32, col: u32) -> Option<NumberFormat> {
        let style = self
            .cell_styles
            .get(sheet)
            .and_then(|styles| styles.get(&(row, col)))
            .copied()
            .unwrap_or(0);
        let id = *self.xf_num_fmt_ids.get(style as usize)?;

        if let Some(code) = self.num_formats.get(&id) {
            return Some(NumberFormat::new(id, code.clone()));
        }
        if id == 0 {
            return None;
        }
        match CellFormatter::builtin_format_code(id) {
            Some(code) => Some(NumberFormat::new(id, code)),
            None => {
                log::warn!("Unknown number format id {} at {}!{}", id, sheet, CellCoord::new(row, col).to_a1_notation());
                None
            }
        }
    }
}

/// アーカイブのエントリを読み込む（存在しない場合は`None`）
fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Option<Vec<u8>>, LoadError> {
    validate_zip_path(path)
        .map_err(|e| LoadError::SecurityViolation(format!("Invalid archive path: {}", e)))?;

    let mut entry = match archive.by_name(path) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = Vec::new();
    entry.read_to_end(&mut content)?;
    Ok(Some(content))
}

/// 要素の属性値をローカル名で取得（名前空間プレフィックスは無視）
fn attr_value(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, LoadError> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            let raw = std::str::from_utf8(&attr.value)?;
            let value = unescape(raw).map_err(|e| LoadError::Xml(format!("escape error: {}", e)))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// リレーションシップのターゲットをアーカイブ内パスに変換
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

/// xl/workbook.xml の解析
///
/// 位置順の(シート名, リレーションシップID)と日付システムを返します。
fn parse_workbook(xml: &[u8]) -> Result<(Vec<(String, String)>, DateSystem), LoadError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    let mut date_system = DateSystem::V1900;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"workbookPr" => {
                    if let Some(value) = attr_value(&e, b"date1904")? {
                        if value == "1" || value.eq_ignore_ascii_case("true") {
                            date_system = DateSystem::V1904;
                        }
                    }
                }
                b"sheet" => {
                    if let (Some(name), Some(rel_id)) =
                        (attr_value(&e, b"name")?, attr_value(&e, b"id")?)
                    {
                        sheets.push((name, rel_id));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((sheets, date_system))
}

/// xl/_rels/workbook.xml.rels の解析（Id -> Target）
fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>, LoadError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut targets = HashMap::new();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr_value(&e, b"Id")?, attr_value(&e, b"Target")?) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(targets)
}

/// xl/styles.xml の解析
///
/// numFmts要素の書式定義と、cellXfs要素の各xfが参照するnumFmtIdを返します。
fn parse_styles(xml: &[u8]) -> Result<(HashMap<u32, String>, Vec<u32>), LoadError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut num_formats = HashMap::new();
    let mut xf_num_fmt_ids = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = true,
            Event::End(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = false,
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"numFmt" => {
                    if let (Some(id), Some(code)) =
                        (attr_value(&e, b"numFmtId")?, attr_value(&e, b"formatCode")?)
                    {
                        num_formats.insert(id.parse()?, code);
                    }
                }
                // cellStyleXfs内のxfは対象外
                b"xf" if in_cell_xfs => {
                    let id = attr_value(&e, b"numFmtId")?
                        .map(|v| v.parse::<u32>())
                        .transpose()?
                        .unwrap_or(0);
                    xf_num_fmt_ids.push(id);
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((num_formats, xf_num_fmt_ids))
}

/// ワークシートXMLからセルのスタイルインデックスを解析
///
/// `r`属性が省略された行・セルは直前の位置の次として扱います。
fn parse_cell_styles(xml: &[u8]) -> Result<HashMap<(u32, u32), u32>, LoadError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut styles = HashMap::new();
    let mut row: u32 = 0;
    let mut next_row: u32 = 0;
    let mut next_col: u32 = 0;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    row = match attr_value(&e, b"r")? {
                        Some(r) => r.parse::<u32>()?.saturating_sub(1),
                        None => next_row,
                    };
                    next_row = row.saturating_add(1);
                    next_col = 0;
                }
                b"c" => {
                    let coord = attr_value(&e, b"r")?
                        .as_deref()
                        .and_then(CellCoord::from_a1_notation)
                        .unwrap_or(CellCoord::new(row, next_col));
                    next_col = coord.col.saturating_add(1);
                    if let Some(style) = attr_value(&e, b"s")? {
                        styles.insert((coord.row, coord.col), style.parse()?);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(styles)
}

//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//!
//! ワークブックは疎な表現で保持されます。行は1つ以上のセルを持つ場合にのみ存在し、
//! セルは値を持つ場合にのみ存在します。列0と列5だけに値を持つ行のセル数は2です。

use std::collections::BTreeMap;
use std::fmt;

use crate::error::XlsxCompareError;
use crate::formatter::CellFormatter;

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 文字列
    String(String),

    /// 数値（f64）。日付もシリアル値として格納される
    Number(f64),

    /// 論理値
    Bool(bool),

    /// エラー値（例: #DIV/0!）
    Error(String),
}

impl CellValue {
    /// 値の型を取得
    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::String(_) => CellType::String,
            CellValue::Number(_) => CellType::Numeric,
            CellValue::Bool(_) => CellType::Boolean,
            CellValue::Error(_) => CellType::Error,
        }
    }

    /// 値を文字列として取得（書式適用前）
    pub fn as_raw_string(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }
}

/// セルの型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    String,
    Numeric,
    Boolean,
    Error,
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellType::String => f.write_str("STRING"),
            CellType::Numeric => f.write_str("NUMERIC"),
            CellType::Boolean => f.write_str("BOOLEAN"),
            CellType::Error => f.write_str("ERROR"),
        }
    }
}

/// ワークブックの日付システム
///
/// - 1900年システム（デフォルト）: シリアル値1 = 1900年1月1日（うるう年バグあり）
/// - 1904年システム: シリアル値0 = 1904年1月1日（旧Mac版Excel）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSystem {
    #[default]
    V1900,
    V1904,
}

/// 数値書式（書式IDと書式文字列）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    /// 書式ID（0-163はビルトイン、164以上はカスタム）
    pub id: u32,
    /// 書式文字列（例: "yyyy-mm-dd"）
    pub code: String,
}

impl NumberFormat {
    pub fn new(id: u32, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
        }
    }
}

/// セル
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    value: CellValue,
    number_format: Option<NumberFormat>,
    date_formatted: bool,
}

impl Cell {
    /// 値から書式なしのセルを生成
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            number_format: None,
            date_formatted: false,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(CellValue::String(value.into()))
    }

    pub fn number(value: f64) -> Self {
        Self::new(CellValue::Number(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(CellValue::Bool(value))
    }

    pub fn error(code: impl Into<String>) -> Self {
        Self::new(CellValue::Error(code.into()))
    }

    /// 日付書式付きの数値セルを生成
    ///
    /// # 引数
    ///
    /// * `serial` - Excelのシリアル日付値
    /// * `format_code` - 表示書式（例: "yyyy-mm-dd"）
    pub fn date(serial: f64, format_code: &str) -> Self {
        Self::number(serial)
            .with_number_format(NumberFormat::new(164, format_code))
            .with_date_flag()
    }

    /// 数値書式を設定し、書式から日付フラグを導出する
    ///
    /// 既に立っている日付フラグは書式によって取り消されません。
    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.date_formatted =
            self.date_formatted || CellFormatter::is_date_format(format.id, &format.code);
        self.number_format = Some(format);
        self
    }

    /// 日付フラグを立てる
    ///
    /// 読み込み側が値を日付・時刻として型付けした場合に使用します。
    pub(crate) fn with_date_flag(mut self) -> Self {
        self.date_formatted = true;
        self
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    pub fn cell_type(&self) -> CellType {
        self.value.cell_type()
    }

    pub fn number_format(&self) -> Option<&NumberFormat> {
        self.number_format.as_ref()
    }

    /// 数値書式が日付・時刻を表すかどうか（値ではなく書式から導出される）
    pub fn is_date_formatted(&self) -> bool {
        self.date_formatted && matches!(self.value, CellValue::Number(_))
    }
}

/// 値を持つセルの集合としての行
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    index: u32,
    cells: BTreeMap<u32, Cell>,
}

impl Row {
    fn new(index: u32) -> Self {
        Self {
            index,
            cells: BTreeMap::new(),
        }
    }

    /// 行インデックス（0始まり）
    pub fn index(&self) -> u32 {
        self.index
    }

    /// 値を持つセルの数
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// 列インデックスの昇順でセルを列挙
    pub fn cells(&self) -> impl Iterator<Item = (u32, &Cell)> + '_ {
        self.cells.iter().map(|(col, cell)| (*col, cell))
    }

    pub fn cell(&self, col: u32) -> Option<&Cell> {
        self.cells.get(&col)
    }
}

/// シート（疎な2次元グリッド）
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: BTreeMap<u32, Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// セルを設定（既存のセルは置き換えられる）
    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.rows
            .entry(row)
            .or_insert_with(|| Row::new(row))
            .cells
            .insert(col, cell);
    }

    /// セルを設定してシートを返す（ビルダー形式）
    pub fn with_cell(mut self, row: u32, col: u32, cell: Cell) -> Self {
        self.set_cell(row, col, cell);
        self
    }

    /// 値を持つ行の数
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 行インデックスの昇順で行を列挙
    pub fn rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.rows.values()
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.rows.get(&row).and_then(|r| r.cell(col))
    }
}

/// ワークブック（順序付きのシートの列）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    date_system: DateSystem,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_system(mut self, date_system: DateSystem) -> Self {
        self.date_system = date_system;
        self
    }

    /// シートを末尾に追加
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 追加に成功した場合
    /// * `Err(XlsxCompareError::DuplicateSheet)` - 同名のシートが既に存在する場合
    pub fn push_sheet(&mut self, sheet: Sheet) -> Result<(), XlsxCompareError> {
        if self.sheets.iter().any(|s| s.name == sheet.name) {
            return Err(XlsxCompareError::DuplicateSheet(sheet.name));
        }
        self.sheets.push(sheet);
        Ok(())
    }

    pub fn date_system(&self) -> DateSystem {
        self.date_system
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// 位置順のシート名
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        let mut letters = Vec::new();
        let mut col = self.col;
        loop {
            letters.push((b'A' + (col % 26) as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        let col_str: String = letters.into_iter().rev().collect();
        format!("{}{}", col_str, self.row + 1)
    }

    /// A1形式の文字列から座標を生成（例: "B3" -> (2, 1)）
    ///
    /// `$`による絶対参照記号は無視されます。形式が不正な場合は`None`を返します。
    pub fn from_a1_notation(reference: &str) -> Option<Self> {
        let reference = reference.replace('$', "");
        let split = reference.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = reference.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let mut col: u32 = 0;
        for ch in letters.chars() {
            let val = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
            col = col.checked_mul(26)?.checked_add(val)?;
        }

        let row: u32 = digits.parse().ok()?;
        if row == 0 {
            return None;
        }

        Some(Self::new(row - 1, col - 1))
    }
}

//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use serde::Serialize;
use std::fmt;

/// 不一致検出時の動作
///
/// 比較処理が不一致を検出したときに、処理を中断するか継続するかを指定します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum FailureMode {
    /// 最初の不一致で比較を中断する（デフォルト）
    ///
    /// テストのアサーションとして使用する場合の標準動作です。
    /// 報告される不一致は常に1件です。
    #[default]
    FailFast,

    /// 同じ段階内のすべての不一致を収集する
    ///
    /// 段階の順序（シートセット → 形状 → セル）は維持され、ある段階で不一致が
    /// 見つかった場合、後続の段階は実行されません。
    CollectAll,
}

/// 比較対象のドキュメントの役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentRole {
    /// テスト対象が生成した実際のドキュメント
    Actual,
    /// 期待値として用意された参照ドキュメント
    Expected,
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentRole::Actual => f.write_str("actual"),
            DocumentRole::Expected => f.write_str("expected"),
        }
    }
}

/// 比較の段階
///
/// 段階は常にこの順序で実行されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Stage {
    /// シート数とシート名の集合の比較
    SheetSet,
    /// 行数・列数・セル位置の比較
    Shape,
    /// セル単位の型と値の比較
    Cell,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::SheetSet => f.write_str("sheet-set"),
            Stage::Shape => f.write_str("shape"),
            Stage::Cell => f.write_str("cell"),
        }
    }
}

/// 不一致の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MismatchKind {
    /// シート数が異なる
    SheetCountMismatch,
    /// シート名の集合が異なる（順序は問わない）
    SheetNameSetMismatch,
    /// 同じ位置のシートで、値を持つ行の数が異なる
    RowCountMismatch,
    /// 対応する行で、値を持つセルの数が異なる
    ColumnCountMismatch,
    /// 行数・セル数は一致するが、値を持つ行・列の位置が異なる
    CellPositionMismatch,
    /// 同じ位置のセルの型が異なる
    CellTypeMismatch,
    /// 同じ位置・同じ型のセルの値が異なる
    CellValueMismatch,
}

impl MismatchKind {
    /// この種類の不一致を検出する段階
    pub fn stage(self) -> Stage {
        match self {
            MismatchKind::SheetCountMismatch | MismatchKind::SheetNameSetMismatch => {
                Stage::SheetSet
            }
            MismatchKind::RowCountMismatch
            | MismatchKind::ColumnCountMismatch
            | MismatchKind::CellPositionMismatch => Stage::Shape,
            MismatchKind::CellTypeMismatch | MismatchKind::CellValueMismatch => Stage::Cell,
        }
    }
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

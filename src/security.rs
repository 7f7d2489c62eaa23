//! Security Module
//!
//! 入力ドキュメントの読み込み時に適用する制限を実装するモジュール。
//! 巨大な入力、ZIP bomb、パストラバーサルを含むアーカイブを拒否します。

use std::io::{Read, Seek};

use zip::ZipArchive;

use crate::error::LoadError;

/// セキュリティ設定
///
/// ドキュメント読み込み時のセキュリティ制限を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SecurityConfig {
    /// 入力ドキュメントの最大サイズ（バイト）
    /// デフォルト: 2GB
    pub max_input_size: u64,
    /// アーカイブ内の最大エントリ数
    /// デフォルト: 10000
    pub max_archive_entries: usize,
    /// 単一エントリの展開後の最大サイズ（バイト）
    /// デフォルト: 100MB
    pub max_entry_size: u64,
    /// 全エントリの展開後の合計最大サイズ（バイト）
    /// デフォルト: 1GB
    pub max_decompressed_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_size: 2_147_483_648,
            max_archive_entries: 10_000,
            max_entry_size: 104_857_600,
            max_decompressed_size: 1_073_741_824,
        }
    }
}

impl SecurityConfig {
    /// 入力サイズを検証
    pub fn check_input_size(&self, size: u64) -> Result<(), LoadError> {
        if size > self.max_input_size {
            return Err(LoadError::SecurityViolation(format!(
                "Input size {} bytes exceeds maximum: {} bytes",
                size, self.max_input_size
            )));
        }
        Ok(())
    }

    /// ZIPアーカイブ全体を検証
    ///
    /// エントリ数、各エントリのパスと展開後サイズ、展開後の合計サイズを検査します。
    /// 展開は行わず、セントラルディレクトリの情報のみを使用します。
    pub fn check_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<(), LoadError> {
        if archive.len() > self.max_archive_entries {
            return Err(LoadError::SecurityViolation(format!(
                "Archive contains too many entries: {} (max: {})",
                archive.len(),
                self.max_archive_entries
            )));
        }

        let mut total: u64 = 0;
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            let name = entry.name();

            validate_zip_path(name).map_err(|e| {
                LoadError::SecurityViolation(format!("Invalid archive path: {}", e))
            })?;

            let size = entry.size();
            if size > self.max_entry_size {
                return Err(LoadError::SecurityViolation(format!(
                    "Entry '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    name, size, self.max_entry_size
                )));
            }

            total = total.checked_add(size).ok_or_else(|| {
                LoadError::SecurityViolation("Decompressed size overflow".to_string())
            })?;
            if total > self.max_decompressed_size {
                return Err(LoadError::SecurityViolation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total, self.max_decompressed_size
                )));
            }
        }

        Ok(())
    }
}

/// アーカイブ内パスの検証
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - 空のパス、絶対パス、`..`、バックスラッシュを含む場合
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    let bytes = path.as_bytes();
    let drive_letter = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with('/') || drive_letter {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}

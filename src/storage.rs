// ==========================================
// 客户管线管理系统 - 上传文件存储
// ==========================================
// 职责: 上传字节流的落地与执行时的读回
// 红线: 存储路径由本层生成，调用方只持有返回的相对路径
// ==========================================

use crate::importer::error::ImportError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

// ==========================================
// FileStore Trait
// ==========================================
// 实现者: LocalFileStore
pub trait FileStore: Send + Sync {
    /// 落地上传文件，返回存储路径（后续 load 的 key）
    fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, ImportError>;

    /// 按存储路径读回文件内容
    fn load(&self, path: &str) -> Result<Vec<u8>, ImportError>;
}

// ==========================================
// LocalFileStore - 本地磁盘实现
// ==========================================
pub struct LocalFileStore {
    base_dir: PathBuf,
}

impl LocalFileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl FileStore for LocalFileStore {
    fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, ImportError> {
        fs::create_dir_all(&self.base_dir)?;

        // 文件名带 uuid 前缀，同名上传互不覆盖
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let key = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.base_dir.join(&key);

        fs::write(&path, bytes)?;
        debug!("上传文件已落地: {} ({} 字节)", key, bytes.len());
        Ok(key)
    }

    fn load(&self, path: &str) -> Result<Vec<u8>, ImportError> {
        let full = self.base_dir.join(path);
        fs::read(&full).map_err(|e| ImportError::FileReadError(format!("{}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(dir.path());

        let key = store.store("customers.csv", b"Name\nAcme\n").unwrap();
        assert!(key.ends_with(".csv"));

        let loaded = store.load(&key).unwrap();
        assert_eq!(loaded, b"Name\nAcme\n");
    }

    #[test]
    fn test_same_name_uploads_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(dir.path());

        let first = store.store("a.csv", b"1").unwrap();
        let second = store.store("a.csv", b"2").unwrap();

        assert_ne!(first, second);
        assert_eq!(store.load(&first).unwrap(), b"1");
        assert_eq!(store.load(&second).unwrap(), b"2");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(dir.path());

        let err = store.load("ghost.csv").unwrap_err();
        assert!(matches!(err, ImportError::FileReadError(_)));
    }
}

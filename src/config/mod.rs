// ==========================================
// 客户管线管理系统 - 配置层
// ==========================================
// 职责: 导入限额配置（上传上限/批次大小/会话保留期）
// ==========================================

use serde::{Deserialize, Serialize};

/// 上传文件大小上限（字节）
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// 执行阶段批次大小（行）
pub const DEFAULT_EXECUTE_BATCH_SIZE: usize = 50;

/// 会话保留期（天）
pub const DEFAULT_SESSION_RETENTION_DAYS: i64 = 7;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入管道读取限额的接口（测试中注入缩小值）
pub trait ImportConfigReader: Send + Sync {
    /// 上传文件大小上限（字节）
    fn max_file_size_bytes(&self) -> u64;

    /// 执行阶段批次大小（行）
    fn execute_batch_size(&self) -> usize;

    /// 会话保留期（天）
    fn session_retention_days(&self) -> i64;
}

// ==========================================
// ImportConfig - 静态配置实现
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    pub max_file_size_bytes: u64,
    pub execute_batch_size: usize,
    pub session_retention_days: i64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            execute_batch_size: DEFAULT_EXECUTE_BATCH_SIZE,
            session_retention_days: DEFAULT_SESSION_RETENTION_DAYS,
        }
    }
}

impl ImportConfigReader for ImportConfig {
    fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_bytes
    }

    fn execute_batch_size(&self) -> usize {
        self.execute_batch_size
    }

    fn session_retention_days(&self) -> i64 {
        self.session_retention_days
    }
}

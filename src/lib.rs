// ==========================================
// 客户管线管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 批量客户导入管道（文件解析 → 字段映射 → 校验 → 查重 → 落库）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与目标字段目录
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 导入管道
pub mod importer;

// 配置层 - 导入限额配置
pub mod config;

// 文件存储 - 上传文件的落地与读回
pub mod storage;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 边界接口（上传/模板/查重/执行）
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::schema::{CanonicalField, FieldKind, CANONICAL_FIELDS, PRIMARY_FIELD_KEY};
pub use domain::{
    ColumnMapping, ConflictPolicy, Customer, CustomerDraft, CustomerSummary, DuplicateMatch,
    ImportResult, ImportSession, ParsedFile, RawRow, RowError, SessionStatus, ValidationError,
    ValidationLevel,
};

// 导入管道
pub use importer::{
    CsvIngestor, CustomerImporter, DuplicateResolver, DuplicateResolverImpl, ExcelIngestor,
    FieldMapper, FieldMapperImpl, FileIngestor, ImportError, ImportExecutorImpl, RowValidator,
    RowValidatorImpl, UniversalFileIngestor,
};

// API
pub use api::ImportApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "客户管线管理系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

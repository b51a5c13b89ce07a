// ==========================================
// 客户管线管理系统 - 领域层
// ==========================================
// 职责: 实体定义与目标字段目录（不包含管道逻辑）
// ==========================================

// 模块声明
pub mod customer;
pub mod import;
pub mod schema;

// 重导出核心类型
pub use customer::{Customer, CustomerDraft, CustomerSummary};
pub use import::{
    ColumnMapping, ConflictPolicy, DuplicateMatch, ImportResult, ImportSession, ParsedFile,
    RawRow, RowError, SessionStatus, ValidationError, ValidationLevel,
};
pub use schema::{CanonicalField, FieldKind};

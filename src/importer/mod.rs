// ==========================================
// 客户管线管理系统 - 导入层
// ==========================================
// 职责: 批量客户导入管道（解析 → 映射 → 校验 → 查重 → 执行）
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod duplicate_resolver;
pub mod error;
pub mod field_mapper;
pub mod file_ingestor;
pub mod import_executor;
pub mod pipeline_trait;
pub mod row_validator;

// 重导出核心类型
pub use duplicate_resolver::DuplicateResolver as DuplicateResolverImpl;
pub use error::ImportError;
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_ingestor::{CsvIngestor, ExcelIngestor, UniversalFileIngestor};
pub use import_executor::ImportExecutorImpl;
pub use row_validator::RowValidator as RowValidatorImpl;

// 重导出 Trait 接口
pub use pipeline_trait::{
    CustomerImporter, DuplicateResolver, FieldMapper, FileIngestor, RowValidator,
};

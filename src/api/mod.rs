// ==========================================
// 客户管线管理系统 - API 层
// ==========================================
// 职责: 导入子系统的边界接口（上传/模板/查重/执行）
// ==========================================

// 模块声明
pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{DuplicateCheckReport, DuplicateSummary, ImportApi, UploadResponse};

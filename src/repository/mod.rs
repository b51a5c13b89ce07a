// ==========================================
// 客户管线管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

// 模块声明
pub mod customer_repo;
pub mod customer_repo_impl;
pub mod error;
pub mod import_session_repo;

// 重导出核心类型
pub use customer_repo::CustomerRepository;
pub use customer_repo_impl::CustomerRepositoryImpl;
pub use error::{RepositoryError, RepositoryResult};
pub use import_session_repo::{ImportSessionRepository, ImportSessionRepositoryImpl};

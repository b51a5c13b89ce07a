// ==========================================
// 客户管线管理系统 - 客户仓储 Trait
// ==========================================
// 职责: 定义客户表数据访问接口（不包含实现）
// ==========================================

use crate::domain::customer::{CustomerDraft, CustomerSummary};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CustomerRepository Trait
// ==========================================
// 用途: 导入执行与查重的数据访问接口
// 实现者: CustomerRepositoryImpl
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// 按归一化主标识（TRIM + 小写）查询已有客户
    ///
    /// # 返回
    /// - Ok(Some): 命中的 {id, name_en} 投影
    /// - Ok(None): 无同名客户
    async fn find_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> RepositoryResult<Option<CustomerSummary>>;

    /// 全表 {id, name_en} 投影（跨库查重用，单次读取）
    async fn list_name_index(&self) -> RepositoryResult<Vec<CustomerSummary>>;

    /// 插入新客户，返回新记录 id
    ///
    /// # 说明
    /// - deal_probability 由草稿的商机阶段派生后写入
    /// - created_at/updated_at 取当前时间
    async fn insert_customer(&self, draft: &CustomerDraft) -> RepositoryResult<i64>;

    /// 按 id 覆盖更新已有客户（updated_at 刷新，created_at 保留）
    async fn update_customer(&self, id: i64, draft: &CustomerDraft) -> RepositoryResult<()>;

    /// 客户总数（测试与诊断用）
    async fn count_customers(&self) -> RepositoryResult<usize>;
}

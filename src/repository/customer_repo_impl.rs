// ==========================================
// 客户管线管理系统 - 客户仓储实现
// ==========================================
// 红线: Repository 不含业务逻辑（概率派生由草稿自身提供）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::customer::{CustomerDraft, CustomerSummary};
use crate::repository::customer_repo::CustomerRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// CustomerRepositoryImpl
// ==========================================
#[derive(Clone)]
pub struct CustomerRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CustomerRepositoryImpl {
    /// 创建新的仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl CustomerRepository for CustomerRepositoryImpl {
    async fn find_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> RepositoryResult<Option<CustomerSummary>> {
        let conn = self.get_conn()?;

        // name_norm 由写入侧按 Rust 的 Unicode 归一化口径维护，SQL 侧只做等值比较
        let summary = conn
            .query_row(
                "SELECT id, name_en FROM customers WHERE name_norm = ?1 LIMIT 1",
                params![normalized_name],
                |row| {
                    Ok(CustomerSummary {
                        id: row.get(0)?,
                        name_en: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(summary)
    }

    async fn list_name_index(&self) -> RepositoryResult<Vec<CustomerSummary>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare("SELECT id, name_en FROM customers ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(CustomerSummary {
                id: row.get(0)?,
                name_en: row.get(1)?,
            })
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        Ok(summaries)
    }

    async fn insert_customer(&self, draft: &CustomerDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO customers (
                name_en, name_norm, name_jp, company_site, tier, cloud_usage, priority,
                ripple_customer, archera_customer, pic, exec, alphaus_rep, alphaus_exec,
                deal_stage, deal_probability, deal_value_usd, deal_value_jpy,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18, ?19
            )
            "#,
            params![
                draft.name_en.trim(),
                draft.normalized_name(),
                draft.name_jp,
                draft.company_site,
                draft.tier,
                draft.cloud_usage,
                draft.priority,
                draft.ripple_customer,
                draft.archera_customer,
                draft.pic,
                draft.exec,
                draft.alphaus_rep,
                draft.alphaus_exec,
                draft.effective_deal_stage(),
                draft.effective_deal_probability(),
                draft.deal_value_usd,
                draft.deal_value_jpy,
                now,
                now,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn update_customer(&self, id: i64, draft: &CustomerDraft) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();

        let affected = conn.execute(
            r#"
            UPDATE customers SET
                name_en = ?1, name_norm = ?2, name_jp = ?3, company_site = ?4, tier = ?5,
                cloud_usage = ?6, priority = ?7, ripple_customer = ?8,
                archera_customer = ?9, pic = ?10, exec = ?11,
                alphaus_rep = ?12, alphaus_exec = ?13, deal_stage = ?14,
                deal_probability = ?15, deal_value_usd = ?16, deal_value_jpy = ?17,
                updated_at = ?18
            WHERE id = ?19
            "#,
            params![
                draft.name_en.trim(),
                draft.normalized_name(),
                draft.name_jp,
                draft.company_site,
                draft.tier,
                draft.cloud_usage,
                draft.priority,
                draft.ripple_customer,
                draft.archera_customer,
                draft.pic,
                draft.exec,
                draft.alphaus_rep,
                draft.alphaus_exec,
                draft.effective_deal_stage(),
                draft.effective_deal_probability(),
                draft.deal_value_usd,
                draft.deal_value_jpy,
                now,
                id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "customer".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn count_customers(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

// ==========================================
// 客户管线管理系统 - 导入会话仓储
// ==========================================
// 职责: import_sessions 表的创建/查询/收尾/过期清理
// 红线: Repository 不含业务逻辑（过期判定口径在领域层）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::import::{ImportSession, SessionStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ImportSessionRepository Trait
// ==========================================
// 实现者: ImportSessionRepositoryImpl
#[async_trait]
pub trait ImportSessionRepository: Send + Sync {
    /// 插入新会话（上传成功时调用）
    async fn insert_session(&self, session: &ImportSession) -> RepositoryResult<()>;

    /// 按 id 查询会话
    async fn get_session(&self, id: &str) -> RepositoryResult<Option<ImportSession>>;

    /// 执行收尾: 写入终态、总行数与结果 JSON
    async fn finalize_session(
        &self,
        id: &str,
        status: SessionStatus,
        total_rows: usize,
        results_json: &str,
        completed_at: DateTime<Utc>,
    ) -> RepositoryResult<()>;

    /// 删除 expires_at 早于 now 的会话，返回删除条数
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> RepositoryResult<usize>;
}

// ==========================================
// ImportSessionRepositoryImpl
// ==========================================
#[derive(Clone)]
pub struct ImportSessionRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ImportSessionRepositoryImpl {
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

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 行 → ImportSession（时间戳按 RFC 3339 存取）
    fn row_to_session(row: &Row<'_>) -> rusqlite::Result<ImportSession> {
        let status_raw: String = row.get(5)?;
        let created_at: String = row.get(7)?;
        let completed_at: Option<String> = row.get(8)?;
        let expires_at: String = row.get(9)?;

        Ok(ImportSession {
            id: row.get(0)?,
            file_name: row.get(1)?,
            file_size: row.get::<_, i64>(2)? as u64,
            file_path: row.get(3)?,
            total_rows: row.get::<_, i64>(4)? as usize,
            status: SessionStatus::parse(&status_raw).unwrap_or(SessionStatus::Uploaded),
            results_json: row.get(6)?,
            created_at: parse_rfc3339(&created_at),
            completed_at: completed_at.as_deref().map(parse_rfc3339),
            expires_at: parse_rfc3339(&expires_at),
        })
    }
}

/// RFC 3339 解析（历史数据损坏时回落 Unix 纪元，不让读路径报错）
fn parse_rfc3339(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[async_trait]
impl ImportSessionRepository for ImportSessionRepositoryImpl {
    async fn insert_session(&self, session: &ImportSession) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO import_sessions (
                id, file_name, file_size, file_path, total_rows,
                status, results_json, created_at, completed_at, expires_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                session.id,
                session.file_name,
                session.file_size as i64,
                session.file_path,
                session.total_rows as i64,
                session.status.as_str(),
                session.results_json,
                session.created_at.to_rfc3339(),
                session.completed_at.map(|t| t.to_rfc3339()),
                session.expires_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn get_session(&self, id: &str) -> RepositoryResult<Option<ImportSession>> {
        let conn = self.get_conn()?;

        let session = conn
            .query_row(
                r#"
                SELECT id, file_name, file_size, file_path, total_rows,
                       status, results_json, created_at, completed_at, expires_at
                FROM import_sessions
                WHERE id = ?1
                "#,
                params![id],
                Self::row_to_session,
            )
            .optional()?;

        Ok(session)
    }

    async fn finalize_session(
        &self,
        id: &str,
        status: SessionStatus,
        total_rows: usize,
        results_json: &str,
        completed_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            r#"
            UPDATE import_sessions
            SET status = ?1, total_rows = ?2, results_json = ?3, completed_at = ?4
            WHERE id = ?5
            "#,
            params![
                status.as_str(),
                total_rows as i64,
                results_json,
                completed_at.to_rfc3339(),
                id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "import_session".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        let deleted = conn.execute(
            "DELETE FROM import_sessions WHERE expires_at < ?1",
            params![now.to_rfc3339()],
        )?;
        Ok(deleted)
    }
}

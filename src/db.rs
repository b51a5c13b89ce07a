// ==========================================
// 客户管线管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化导入子系统所需的表结构
///
/// 说明：
/// - customers 为目标客户表（导入的落库目的地）
/// - name_norm 为归一化英文名（TRIM + Unicode 小写），由仓储写入，同名查询按此列命中
/// - import_sessions 为导入会话表（上传时创建，执行完成时收尾）
/// - 宿主进程负责在启动时调用一次；测试通过 test_helpers 复用
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name_en TEXT NOT NULL,
            name_norm TEXT NOT NULL,
            name_jp TEXT,
            company_site TEXT,
            tier TEXT,
            cloud_usage TEXT,
            priority TEXT,
            ripple_customer TEXT,
            archera_customer TEXT,
            pic TEXT,
            exec TEXT,
            alphaus_rep TEXT,
            alphaus_exec TEXT,
            deal_stage TEXT NOT NULL DEFAULT 'Lead',
            deal_probability INTEGER NOT NULL DEFAULT 10,
            deal_value_usd REAL NOT NULL DEFAULT 0,
            deal_value_jpy REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_customers_name_norm
            ON customers (name_norm);

        CREATE TABLE IF NOT EXISTS import_sessions (
            id TEXT PRIMARY KEY,
            file_name TEXT NOT NULL,
            file_size INTEGER NOT NULL,
            file_path TEXT NOT NULL,
            total_rows INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'UPLOADED',
            results_json TEXT,
            created_at TEXT NOT NULL,
            completed_at TEXT,
            expires_at TEXT NOT NULL
        );
        "#,
    )
}

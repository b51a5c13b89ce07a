// ==========================================
// 客户管线管理系统 - 导入领域模型
// ==========================================
// 职责: 导入管道各阶段共用的数据结构
// 生命周期: 除 ImportSession 外均为请求内临时产物（不落库）
// ==========================================

use crate::domain::schema::PRIMARY_FIELD_KEY;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// RawRow - 原始行
// ==========================================
// 用途: 文件解析产物；列集合运行时才确定，保持有序键值对
// 红线: 解析后不可变；row_number 在各阶段必须保持稳定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// 1-based 行号，按“保留行”（剔除空行后）计数，与文件格式无关
    pub row_number: usize,
    /// (源列名, 原始值)，顺序即源文件列顺序；物化时后写覆盖先写
    pub cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(row_number: usize, cells: Vec<(String, String)>) -> Self {
        Self { row_number, cells }
    }

    /// 取某源列的值（同名列取最后一个，与物化的后写覆盖策略一致）
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .rev()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// 所有单元格去除首尾空白后是否全空
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }
}

// ==========================================
// ParsedFile - 文件解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFile {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ==========================================
// ColumnMapping - 列映射
// ==========================================
// 用途: 源列名 → 目标字段 key；未收录的源列视为忽略
// 红线: 校验开始前冻结；执行前 name_en 必须且只能映射一个源列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    map: HashMap<String, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置一条映射（覆盖同源列的旧映射）
    pub fn set(&mut self, source_column: impl Into<String>, field_key: impl Into<String>) {
        self.map.insert(source_column.into(), field_key.into());
    }

    /// 取消某源列的映射（等价于忽略该列）
    pub fn unset(&mut self, source_column: &str) {
        self.map.remove(source_column);
    }

    /// 源列映射到的目标字段 key
    pub fn target_of(&self, source_column: &str) -> Option<&str> {
        self.map.get(source_column).map(String::as_str)
    }

    /// 映射到某目标字段的源列数量
    pub fn columns_mapped_to(&self, field_key: &str) -> usize {
        self.map.values().filter(|k| *k == field_key).count()
    }

    /// 主标识字段是否已映射
    pub fn has_primary(&self) -> bool {
        self.columns_mapped_to(PRIMARY_FIELD_KEY) > 0
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(s, k)| (s.as_str(), k.as_str()))
    }
}

// ==========================================
// ValidationError - 行校验诊断
// ==========================================
// 用途: 校验结果作为数据返回（非异常）；error 级别阻断提交
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub row: usize,
    pub field: String,
    pub message: String,
    pub level: ValidationLevel,
}

/// 诊断级别：error 阻断，warning 仅提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    Error,
    Warning,
}

// ==========================================
// DuplicateMatch - 跨库重复匹配
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    /// 命中行的 row_number（与 RawRow 同一口径）
    pub row_index: usize,
    /// 库内已有记录 id
    pub matched_record_id: i64,
    /// 库内已有记录显示名（name_en 原值）
    pub matched_display_name: String,
}

// ==========================================
// ConflictPolicy - 冲突策略
// ==========================================
// skip: 已存在则跳过 / update: 覆盖已有记录 / create: 总是新建（允许重复）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    Skip,
    Update,
    Create,
}

// ==========================================
// ImportResult - 执行结果汇总
// ==========================================
// 用途: 纯计算产物；完成时序列化进 ImportSession，不独立落库
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
}

/// 行级错误（可下载错误报告的单条目）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

// ==========================================
// SessionStatus - 会话状态机
// ==========================================
// uploaded → previewed（dry run 终态）| completed（正式执行终态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Uploaded,
    Previewed,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Uploaded => "UPLOADED",
            SessionStatus::Previewed => "PREVIEWED",
            SessionStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "UPLOADED" => Some(SessionStatus::Uploaded),
            "PREVIEWED" => Some(SessionStatus::Previewed),
            "COMPLETED" => Some(SessionStatus::Completed),
            _ => None,
        }
    }
}

// ==========================================
// ImportSession - 导入会话
// ==========================================
// 用途: 上传文件与处理运行的关联记录；本子系统内唯一持久化实体
// 红线: 超过保留期（7 天）的会话视为失效，不得恢复执行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSession {
    pub id: String,
    pub file_name: String,
    pub file_size: u64,
    /// 文件存储后端内的路径（上传时由 FileStore 返回）
    pub file_path: String,
    pub total_rows: usize,
    pub status: SessionStatus,
    /// 完成时写入的 ImportResult JSON
    pub results_json: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

impl ImportSession {
    /// 会话是否已过期（过期会话不得执行）
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

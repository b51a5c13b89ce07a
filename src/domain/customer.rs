// ==========================================
// 客户管线管理系统 - 客户领域模型
// ==========================================
// 职责: 目标客户表实体与导入物化记录
// 对齐: db::init_schema customers 表
// ==========================================

use crate::domain::schema::{stage_probability, DEFAULT_DEAL_STAGE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Customer - 客户主数据
// ==========================================
// 用途: 导入层写入；CRUD 表面（本子系统外）读写
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    // ===== 主键 =====
    pub id: i64,

    // ===== 名称 =====
    pub name_en: String,         // 英文名（主标识，自然键）
    pub name_jp: Option<String>, // 日文名

    // ===== 公司信息 =====
    pub company_site: Option<String>, // 公司网站
    pub tier: Option<String>,         // AWS 等级
    pub cloud_usage: Option<String>,  // 云用量描述
    pub priority: Option<String>,     // 优先级

    // ===== 合作标记 =====
    pub ripple_customer: Option<String>,
    pub archera_customer: Option<String>,

    // ===== 负责人 =====
    pub pic: Option<String>,
    pub exec: Option<String>,
    pub alphaus_rep: Option<String>,
    pub alphaus_exec: Option<String>,

    // ===== 商机 =====
    pub deal_stage: String,     // 商机阶段（缺省 Lead）
    pub deal_probability: i64,  // 成交概率（由阶段派生）
    pub deal_value_usd: f64,    // 商机金额 USD
    pub deal_value_jpy: f64,    // 商机金额 JPY

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// CustomerSummary - 查重投影
// ==========================================
// 用途: 跨库查重时整表投影 {id, name_en}，内存内比较
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: i64,
    pub name_en: String,
}

// ==========================================
// CustomerDraft - 导入物化记录
// ==========================================
// 用途: 列映射应用到原始行后的静态类型产物（仅在导入流程内存活）
// 红线: 除 name_en 外全部可空；金额字段解析失败回落 0
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDraft {
    pub name_en: String,
    pub name_jp: Option<String>,
    pub company_site: Option<String>,
    pub tier: Option<String>,
    pub cloud_usage: Option<String>,
    pub priority: Option<String>,
    pub ripple_customer: Option<String>,
    pub archera_customer: Option<String>,
    pub pic: Option<String>,
    pub exec: Option<String>,
    pub alphaus_rep: Option<String>,
    pub alphaus_exec: Option<String>,
    pub deal_stage: Option<String>,
    pub deal_value_usd: f64,
    pub deal_value_jpy: f64,
}

impl CustomerDraft {
    /// 落库用商机阶段（为空时回落缺省值）
    pub fn effective_deal_stage(&self) -> &str {
        self.deal_stage.as_deref().unwrap_or(DEFAULT_DEAL_STAGE)
    }

    /// 成交概率（由落库阶段派生）
    pub fn effective_deal_probability(&self) -> i64 {
        stage_probability(self.effective_deal_stage())
    }

    /// 查重/落库用归一化主标识（TRIM + 小写）
    pub fn normalized_name(&self) -> String {
        self.name_en.trim().to_lowercase()
    }
}

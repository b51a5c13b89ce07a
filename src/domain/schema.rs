// ==========================================
// 客户管线管理系统 - 目标字段目录
// ==========================================
// 职责: 定义导入目标 schema 的固定字段目录（只读配置，非运行时状态）
// 用途: 字段映射、行校验、模板生成共用同一份目录
// ==========================================

use serde::{Deserialize, Serialize};

/// 主标识字段 key（每次导入必须且只能映射一个源列）
pub const PRIMARY_FIELD_KEY: &str = "name_en";

/// 商机阶段缺省值（源值为空或非法枚举时回落）
pub const DEFAULT_DEAL_STAGE: &str = "Lead";

/// 商机阶段合法值（闭集，区分大小写）
pub const DEAL_STAGES: &[&str] = &[
    "Lead",
    "Qualified",
    "Meeting Scheduled",
    "Demo Completed",
    "Proposal Sent",
    "Negotiation",
    "Closed Won",
    "Closed Lost",
];

/// AWS 等级合法值
pub const TIER_OPTIONS: &[&str] = &["Premier", "Advanced", "Selected", "-"];

/// 优先级合法值
pub const PRIORITY_OPTIONS: &[&str] = &["High", "Mid", "Low"];

/// 勾选类字段合法值（✓ / -）
pub const CHECK_OPTIONS: &[&str] = &["✓", "-"];

// ==========================================
// FieldKind - 字段值类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Url,
    Enum,
}

// ==========================================
// CanonicalField - 目标字段描述符
// ==========================================
// 用途: key/显示名/必填标记/值类型/枚举合法值
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CanonicalField {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub kind: FieldKind,
    /// 仅 Enum 类型使用；其余类型为空集
    pub options: &'static [&'static str],
}

/// 目标字段目录（顺序即模板列顺序）
pub static CANONICAL_FIELDS: &[CanonicalField] = &[
    CanonicalField {
        key: "name_en",
        label: "English Name",
        required: true,
        kind: FieldKind::Text,
        options: &[],
    },
    CanonicalField {
        key: "name_jp",
        label: "Japanese Name",
        required: false,
        kind: FieldKind::Text,
        options: &[],
    },
    CanonicalField {
        key: "company_site",
        label: "Company Site",
        required: false,
        kind: FieldKind::Url,
        options: &[],
    },
    CanonicalField {
        key: "tier",
        label: "AWS Tier",
        required: false,
        kind: FieldKind::Enum,
        options: TIER_OPTIONS,
    },
    CanonicalField {
        key: "cloud_usage",
        label: "Cloud Usage",
        required: false,
        kind: FieldKind::Text,
        options: &[],
    },
    CanonicalField {
        key: "priority",
        label: "Priority",
        required: false,
        kind: FieldKind::Enum,
        options: PRIORITY_OPTIONS,
    },
    CanonicalField {
        key: "ripple_customer",
        label: "Ripple Customer",
        required: false,
        kind: FieldKind::Enum,
        options: CHECK_OPTIONS,
    },
    CanonicalField {
        key: "archera_customer",
        label: "Archera Customer",
        required: false,
        kind: FieldKind::Enum,
        options: CHECK_OPTIONS,
    },
    CanonicalField {
        key: "pic",
        label: "PIC",
        required: false,
        kind: FieldKind::Text,
        options: &[],
    },
    CanonicalField {
        key: "exec",
        label: "Exec",
        required: false,
        kind: FieldKind::Text,
        options: &[],
    },
    CanonicalField {
        key: "alphaus_rep",
        label: "Alphaus Rep",
        required: false,
        kind: FieldKind::Text,
        options: &[],
    },
    CanonicalField {
        key: "alphaus_exec",
        label: "Alphaus Exec",
        required: false,
        kind: FieldKind::Text,
        options: &[],
    },
    CanonicalField {
        key: "deal_stage",
        label: "Deal Stage",
        required: false,
        kind: FieldKind::Enum,
        options: DEAL_STAGES,
    },
    CanonicalField {
        key: "deal_value_usd",
        label: "Deal Value USD",
        required: false,
        kind: FieldKind::Number,
        options: &[],
    },
    CanonicalField {
        key: "deal_value_jpy",
        label: "Deal Value JPY",
        required: false,
        kind: FieldKind::Number,
        options: &[],
    },
];

/// 按 key 查找目标字段
pub fn find_field(key: &str) -> Option<&'static CanonicalField> {
    CANONICAL_FIELDS.iter().find(|f| f.key == key)
}

/// 商机阶段 → 成交概率（固定映射表，未知阶段回落 10）
pub fn stage_probability(stage: &str) -> i64 {
    match stage {
        "Lead" => 10,
        "Qualified" => 25,
        "Meeting Scheduled" => 40,
        "Demo Completed" => 50,
        "Proposal Sent" => 60,
        "Negotiation" => 75,
        "Closed Won" => 100,
        "Closed Lost" => 0,
        _ => 10,
    }
}

mod context;
mod error;
mod snapshot;
mod value;

pub use context::*;
pub use error::*;
pub use snapshot::*;
pub use value::*;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// 触发时机标签
///
/// 具体取值由调用方约定,引擎只做相等比较。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trigger(String);

impl Trigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// 记录创建时
    pub fn on_create() -> Self {
        Self::new("on-create")
    }

    /// 记录更新时
    pub fn on_update() -> Self {
        Self::new("on-update")
    }

    /// 记录状态变化时
    pub fn on_status_change() -> Self {
        Self::new("on-status-change")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Trigger {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// 条件操作符
///
/// 未识别的操作符在反序列化时保留为 `Unknown`,到求值时才报错,
/// 这样一条写错的规则不会让整个规则列表加载失败。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionOperator {
    /// 字段存在且不是空串
    Exists,
    /// 字段不存在、为空值或为空串
    NotExists,
    /// 严格相等
    Equals,
    /// 严格不等
    NotEquals,
    /// 列表包含或字符串子串
    Contains,
    /// 无法识别的操作符
    Unknown(String),
}

impl ConditionOperator {
    pub fn as_str(&self) -> &str {
        match self {
            ConditionOperator::Exists => "exists",
            ConditionOperator::NotExists => "not_exists",
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "not_equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::Unknown(op) => op,
        }
    }

    /// 是否需要比较值
    pub fn requires_value(&self) -> bool {
        matches!(
            self,
            ConditionOperator::Equals | ConditionOperator::NotEquals | ConditionOperator::Contains
        )
    }
}

impl From<String> for ConditionOperator {
    fn from(op: String) -> Self {
        match op.as_str() {
            "exists" => ConditionOperator::Exists,
            "not_exists" => ConditionOperator::NotExists,
            "equals" => ConditionOperator::Equals,
            "not_equals" => ConditionOperator::NotEquals,
            "contains" => ConditionOperator::Contains,
            _ => ConditionOperator::Unknown(op),
        }
    }
}

impl From<ConditionOperator> for String {
    fn from(op: ConditionOperator) -> Self {
        match op {
            ConditionOperator::Unknown(op) => op,
            known => known.as_str().to_string(),
        }
    }
}

impl Default for ConditionOperator {
    /// 配置中缺少操作符
    fn default() -> Self {
        ConditionOperator::Unknown(String::new())
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个条件谓词
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    /// 上下文中的字段名
    pub field: String,
    /// 操作符,缺失或不是字符串时记为 `Unknown`
    #[serde(default, deserialize_with = "lenient_operator")]
    pub operator: ConditionOperator,
    /// 比较值, `exists`/`not_exists` 忽略此项
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<FieldValue>,
}

fn lenient_operator<'de, D>(deserializer: D) -> Result<ConditionOperator, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(op) => ConditionOperator::from(op),
        other => ConditionOperator::Unknown(other.to_string()),
    })
}

// 显式写出的 null 是一个比较值,与缺省区分开
fn present_value<'de, D>(deserializer: D) -> Result<Option<FieldValue>, D::Error>
where
    D: Deserializer<'de>,
{
    FieldValue::deserialize(deserializer).map(Some)
}

impl RuleCondition {
    pub fn new(
        field: impl Into<String>,
        operator: ConditionOperator,
        value: Option<FieldValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::new(field, ConditionOperator::Exists, None)
    }

    pub fn not_exists(field: impl Into<String>) -> Self {
        Self::new(field, ConditionOperator::NotExists, None)
    }

    pub fn equals(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, ConditionOperator::Equals, Some(value.into()))
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, ConditionOperator::NotEquals, Some(value.into()))
    }

    pub fn contains(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, ConditionOperator::Contains, Some(value.into()))
    }
}

/// 规则命中后执行的字段赋值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    /// 要设置的字段
    pub field: String,
    /// 常量值
    pub value: FieldValue,
}

impl RuleAction {
    pub fn set(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// 用户定义的规则
///
/// 规则在列表中的位置决定动作冲突时的先后,列表顺序由调用方控制。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// 规则唯一标识
    pub id: String,
    /// 规则名称,仅用于诊断
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 规则描述,仅用于诊断
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 触发时机
    pub trigger: Trigger,
    /// 条件列表,全部满足才命中;为空时总是命中
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
    /// 命中后的动作列表
    #[serde(default)]
    pub actions: Vec<RuleAction>,
    /// 是否启用
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 加载时发现的结构错误,存在时该规则每次求值都按失败处理
    #[serde(skip)]
    pub(crate) defect: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Rule {
    /// 创建一条启用的空规则,自动生成 id
    pub fn new(trigger: impl Into<Trigger>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: None,
            description: None,
            trigger: trigger.into(),
            conditions: Vec::new(),
            actions: Vec::new(),
            enabled: true,
            defect: None,
        }
    }

    /// 为无法完整解析的配置项创建占位规则
    ///
    /// 占位规则保留 id、触发时机和启用状态,求值时返回 `MalformedRule`。
    pub(crate) fn malformed(
        id: impl Into<String>,
        trigger: Trigger,
        enabled: bool,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            enabled,
            defect: Some(reason.into()),
            ..Self::new(trigger).with_id(id)
        }
    }

    /// 加载时发现的结构错误
    pub fn defect(&self) -> Option<&str> {
        self.defect.as_deref()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 追加一个条件
    pub fn when(mut self, condition: RuleCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// 追加一个动作
    pub fn then(mut self, action: RuleAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// 诊断输出用的标签: 优先名称,否则 id
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

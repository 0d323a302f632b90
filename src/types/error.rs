use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    /// 条件无法求值: 未知操作符或缺少比较值
    #[error("条件格式错误 [{field}]: {reason}")]
    MalformedCondition { field: String, reason: String },

    /// 规则配置项结构不完整,只影响这一条规则
    #[error("规则格式错误 [{rule_id}]: {reason}")]
    MalformedRule { rule_id: String, reason: String },

    /// 规则列表本身不可用,整个分发调用失败
    #[error("规则集无效: {0}")]
    InvalidRuleSet(String),

    #[error("不支持的字段值: {0}")]
    UnsupportedValue(String),

    #[error("读取规则配置失败: {0}")]
    Io(#[from] std::io::Error),
}

impl RuleError {
    pub(crate) fn malformed(field: &str, reason: impl Into<String>) -> Self {
        RuleError::MalformedCondition {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

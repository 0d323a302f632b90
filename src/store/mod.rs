mod file;
mod memory;

pub use file::FileRuleStore;
pub use memory::MemoryRuleStore;

use crate::types::{Rule, RuleError, RuleSnapshot, Trigger};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// 规则存储特征,对接外部的设置存储
///
/// 每次调用返回一份不可变快照,分发期间规则列表不会变化。
#[async_trait]
pub trait RuleStore: Send + Sync + std::fmt::Debug {
    /// 获取当前规则快照
    async fn snapshot(&self) -> Result<RuleSnapshot, RuleError>;
}

/// 解析规则配置文档
///
/// 接受 `{"rules": [...]}` 或裸数组两种形式。
///
/// # Returns
/// * `Result<Vec<Rule>, RuleError>` - 文档不是合法 JSON 或规则列表不是数组时
///   返回 `InvalidRuleSet`;单条规则的结构错误不会让整个列表失败
pub fn parse_rule_document(content: &str) -> Result<Vec<Rule>, RuleError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| RuleError::InvalidRuleSet(format!("配置文档解析失败: {}", e)))?;
    parse_rule_set(value)
}

/// 从 JSON 值解析有序规则列表
///
/// 结构不完整的规则项不会中断解析: 能读出 `trigger` 的保留为占位规则,
/// 求值时报 `MalformedRule`;连 `trigger` 都没有的直接跳过。
pub fn parse_rule_set(value: Value) -> Result<Vec<Rule>, RuleError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("rules") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(RuleError::InvalidRuleSet(
                    "rules 字段必须是数组".to_string(),
                ))
            }
            None => return Err(RuleError::InvalidRuleSet("缺少 rules 字段".to_string())),
        },
        _ => {
            return Err(RuleError::InvalidRuleSet(
                "规则列表必须是数组".to_string(),
            ))
        }
    };

    Ok(items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| parse_rule_entry(index, item))
        .collect())
}

fn parse_rule_entry(index: usize, item: &Value) -> Option<Rule> {
    let reason = match Rule::deserialize(item) {
        Ok(rule) => return Some(rule),
        Err(e) => e.to_string(),
    };

    let trigger = match item.get("trigger").and_then(Value::as_str) {
        Some(trigger) => Trigger::new(trigger),
        None => {
            warn!("第 {} 条规则缺少触发时机,已跳过: {}", index, reason);
            return None;
        }
    };
    let id = item
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", index));
    let enabled = item.get("enabled").and_then(Value::as_bool).unwrap_or(true);

    warn!("规则 {} 格式错误,按失败处理: {}", id, reason);
    Some(Rule::malformed(id, trigger, enabled, reason))
}

use super::condition::evaluate_condition;
use crate::types::{FieldMap, Rule, RuleAction, RuleError};

/// 单条规则的求值结果,用于诊断
#[derive(Debug)]
pub enum RuleOutcome {
    /// 规则被禁用,未求值
    Disabled,
    /// 所有条件满足
    Matched,
    /// 第 `condition` 个条件(从 0 开始)不满足
    Unmatched { condition: usize },
    /// 条件求值出错或规则格式错误,按未命中处理
    Failed(RuleError),
}

impl RuleOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, RuleOutcome::Matched)
    }
}

/// 对规则求值
///
/// # Arguments
/// * `rule` - 规则
/// * `context` - 求值上下文
///
/// # Returns
/// * `Ok(Some(actions))` - 规则命中,返回其动作列表
/// * `Ok(None)` - 规则被禁用或条件不满足
/// * `Err(RuleError)` - 条件或规则格式错误
pub fn evaluate_rule<'r>(
    rule: &'r Rule,
    context: &FieldMap,
) -> Result<Option<&'r [RuleAction]>, RuleError> {
    if !rule.enabled {
        return Ok(None);
    }

    match first_failing_condition(rule, context)? {
        None => Ok(Some(&rule.actions)),
        Some(_) => Ok(None),
    }
}

/// 对规则求值并说明结果
pub fn explain_rule(rule: &Rule, context: &FieldMap) -> RuleOutcome {
    if !rule.enabled {
        return RuleOutcome::Disabled;
    }

    match first_failing_condition(rule, context) {
        Ok(None) => RuleOutcome::Matched,
        Ok(Some(condition)) => RuleOutcome::Unmatched { condition },
        Err(e) => RuleOutcome::Failed(e),
    }
}

// 按声明顺序求值,遇到第一个不满足的条件即停止
fn first_failing_condition(rule: &Rule, context: &FieldMap) -> Result<Option<usize>, RuleError> {
    if let Some(reason) = rule.defect() {
        return Err(RuleError::MalformedRule {
            rule_id: rule.id.clone(),
            reason: reason.to_string(),
        });
    }
    for (index, condition) in rule.conditions.iter().enumerate() {
        if !evaluate_condition(condition, context)? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

use crate::types::{ConditionOperator, FieldMap, FieldValue, RuleCondition, RuleError};

/// 对单个条件求值
///
/// # Arguments
/// * `condition` - 条件
/// * `context` - 求值上下文
///
/// # Returns
/// * `Result<bool, RuleError>` - 未知操作符或缺少比较值时返回 `MalformedCondition`
pub fn evaluate_condition(condition: &RuleCondition, context: &FieldMap) -> Result<bool, RuleError> {
    let actual = context.get(&condition.field);

    match &condition.operator {
        ConditionOperator::Exists => Ok(is_present(actual)),
        ConditionOperator::NotExists => Ok(!is_present(actual)),
        ConditionOperator::Equals => Ok(actual == Some(operand(condition)?)),
        ConditionOperator::NotEquals => Ok(actual != Some(operand(condition)?)),
        ConditionOperator::Contains => {
            let expected = operand(condition)?;
            Ok(match actual {
                Some(FieldValue::List(items)) => items.contains(expected),
                Some(FieldValue::String(text)) => text.contains(expected.to_string().as_str()),
                _ => false,
            })
        }
        ConditionOperator::Unknown(op) if op.is_empty() => {
            Err(RuleError::malformed(&condition.field, "缺少操作符"))
        }
        ConditionOperator::Unknown(op) => Err(RuleError::malformed(
            &condition.field,
            format!("未知的操作符: {}", op),
        )),
    }
}

// 缺失、空值和空串都视为不存在
fn is_present(actual: Option<&FieldValue>) -> bool {
    match actual {
        None | Some(FieldValue::Null) => false,
        Some(FieldValue::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn operand(condition: &RuleCondition) -> Result<&FieldValue, RuleError> {
    condition.value.as_ref().ok_or_else(|| {
        RuleError::malformed(
            &condition.field,
            format!("操作符 {} 缺少比较值", condition.operator),
        )
    })
}

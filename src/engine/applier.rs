use crate::types::{FieldMap, RuleAction};

/// 将动作依次应用到记录的副本上
///
/// 同一字段被多次赋值时,列表中最后一个动作生效。
/// 不校验字段类型,原记录保持不变。
///
/// # Arguments
/// * `actions` - 分发得到的动作列表
/// * `base` - 原始记录
///
/// # Returns
/// * `FieldMap` - 修改后的新记录
pub fn apply_actions(actions: &[RuleAction], base: &FieldMap) -> FieldMap {
    let mut mutated = base.clone();
    for action in actions {
        mutated.insert(action.field.clone(), action.value.clone());
    }
    mutated
}

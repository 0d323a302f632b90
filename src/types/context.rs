use super::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 字段映射,既用作规则求值上下文,也用作被修改的记录
///
/// 按键有序存储,序列化和遍历结果在多次运行之间保持一致。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    fields: BTreeMap<String, FieldValue>,
}

/// 规则求值上下文
pub type Context = FieldMap;

/// 被规则修改的记录
pub type Record = FieldMap;

/// 单个字段在两次状态之间的变化
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    /// 字段名
    pub field: String,
    /// 修改前的值,字段原本不存在时为 None
    pub before: Option<FieldValue>,
    /// 修改后的值,字段被移除时为 None
    pub after: Option<FieldValue>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式设置字段,便于构造上下文
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// 设置字段,返回被覆盖的旧值
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.remove(field)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// 合并另一组字段,同名字段以 `other` 为准
    ///
    /// 调用方用它把触发器附加属性注入到记录的字段之上。
    pub fn merged(&self, other: &FieldMap) -> FieldMap {
        let mut merged = self.clone();
        for (field, value) in other.iter() {
            merged.insert(field.clone(), value.clone());
        }
        merged
    }

    /// 从 JSON 对象构造
    ///
    /// # Arguments
    /// * `value` - 必须是 JSON 对象,值只能是基本类型或基本类型列表
    ///
    /// # Returns
    /// * `Result<FieldMap, RuleError>` - 非对象或含嵌套对象时返回 `UnsupportedValue`
    pub fn from_json(value: serde_json::Value) -> Result<Self, RuleError> {
        let serde_json::Value::Object(object) = value else {
            return Err(RuleError::UnsupportedValue("<root>".to_string()));
        };

        object
            .into_iter()
            .map(|(field, value)| -> Result<(String, FieldValue), RuleError> {
                let value = FieldValue::from_json(&field, value)?;
                Ok((field, value))
            })
            .collect()
    }

    /// 对比两份字段映射,按字段名顺序列出所有变化
    ///
    /// # Arguments
    /// * `updated` - 新状态
    pub fn diff(&self, updated: &FieldMap) -> Vec<FieldChange> {
        let mut changes = Vec::new();

        for (field, before) in &self.fields {
            match updated.get(field) {
                Some(after) if after == before => {}
                after => changes.push(FieldChange {
                    field: field.clone(),
                    before: Some(before.clone()),
                    after: after.cloned(),
                }),
            }
        }

        for (field, after) in &updated.fields {
            if !self.fields.contains_key(field) {
                changes.push(FieldChange {
                    field: field.clone(),
                    before: None,
                    after: Some(after.clone()),
                });
            }
        }

        changes.sort_by(|a, b| a.field.cmp(&b.field));
        changes
    }
}

impl FromIterator<(String, FieldValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

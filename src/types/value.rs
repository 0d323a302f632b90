use crate::types::RuleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 上下文与记录中的字段值
///
/// 只覆盖基本类型和基本类型列表,嵌套对象不在规则的可见范围内。
/// 序列化形式就是普通 JSON 值。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// 空值
    #[default]
    Null,
    /// 布尔值
    Bool(bool),
    /// 数值
    Number(f64),
    /// 字符串
    String(String),
    /// 有序列表
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// 从 JSON 值转换
    ///
    /// # Arguments
    /// * `field` - 字段名,仅用于错误信息
    /// * `value` - 待转换的 JSON 值
    ///
    /// # Returns
    /// * `Result<FieldValue, RuleError>` - 对象类型返回 `UnsupportedValue`
    pub fn from_json(field: &str, value: serde_json::Value) -> Result<Self, RuleError> {
        match value {
            serde_json::Value::Null => Ok(FieldValue::Null),
            serde_json::Value::Bool(b) => Ok(FieldValue::Bool(b)),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(FieldValue::Number)
                .ok_or_else(|| RuleError::UnsupportedValue(field.to_string())),
            serde_json::Value::String(s) => Ok(FieldValue::String(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| FieldValue::from_json(field, item))
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::List),
            serde_json::Value::Object(_) => Err(RuleError::UnsupportedValue(field.to_string())),
        }
    }
}

// 字符串化规则与 contains 的子串匹配保持一致:
// 整数不带小数点, 列表以逗号拼接, 列表中的空值输出为空串
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => {
                if n.is_nan() {
                    f.write_str("NaN")
                } else if n.is_infinite() {
                    f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
                } else if *n == 0.0 {
                    f.write_str("0")
                } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
                    write_exponent(f, *n)
                } else {
                    write!(f, "{}", n)
                }
            }
            FieldValue::String(s) => f.write_str(s),
            FieldValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if !item.is_null() {
                        write!(f, "{}", item)?;
                    }
                }
                Ok(())
            }
        }
    }
}

// 极大或极小的数用指数形式, 正指数带 `+`, 如 `1e+21`、`1.5e-7`
fn write_exponent(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    let formatted = format!("{:e}", n);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            write!(f, "{}e+{}", mantissa, exponent)
        }
        _ => f.write_str(&formatted),
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

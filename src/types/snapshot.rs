use super::Rule;
use std::fmt;
use std::sync::Arc;

/// 某一时刻的规则列表快照
///
/// 规则以有序切片保存,快照创建后不可变,一次分发只会看到同一份列表。
#[derive(Clone)]
pub struct RuleSnapshot {
    /// 版本号, 0 表示尚未加载任何规则
    pub version: u64,
    /// 快照生成时间戳(毫秒)
    pub updated_at: i64,
    rules: Arc<[Rule]>,
    fingerprint: blake3::Hash,
}

impl RuleSnapshot {
    pub fn new(version: u64, updated_at: i64, rules: Vec<Rule>) -> Self {
        let fingerprint = compute_fingerprint(&rules);
        Self {
            version,
            updated_at,
            rules: rules.into(),
            fingerprint,
        }
    }

    pub fn empty() -> Self {
        Self::new(0, 0, Vec::new())
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// 规则内容的 BLAKE3 指纹,内容相同则指纹相同
    pub fn fingerprint(&self) -> &[u8; 32] {
        self.fingerprint.as_bytes()
    }

    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint.to_hex().to_string()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for RuleSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSnapshot")
            .field("version", &self.version)
            .field("updated_at", &self.updated_at)
            .field("rules", &self.rules.len())
            .field("fingerprint", &self.fingerprint_hex())
            .finish()
    }
}

/// 按列表顺序对规则的 JSON 形式求哈希
pub fn compute_fingerprint(rules: &[Rule]) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    for rule in rules {
        // 规则只含有序结构,序列化结果是确定的
        let bytes = serde_json::to_vec(rule).unwrap_or_default();
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
        // 占位规则的错误原因不参与序列化,单独计入
        let defect = rule.defect().unwrap_or_default().as_bytes();
        hasher.update(&(defect.len() as u64).to_le_bytes());
        hasher.update(defect);
    }
    hasher.finalize()
}

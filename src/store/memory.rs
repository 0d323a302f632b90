use super::{parse_rule_document, RuleStore};
use crate::engine::VersionManager;
use crate::types::{Rule, RuleError, RuleSnapshot};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

/// 内存规则存储
///
/// 替换规则时生成新版本的快照,已经交出去的快照不受影响。
#[derive(Debug)]
pub struct MemoryRuleStore {
    current: RwLock<RuleSnapshot>,
    version_manager: VersionManager,
}

impl MemoryRuleStore {
    /// 创建空存储,初始快照版本为 0
    pub fn new() -> Self {
        Self {
            current: RwLock::new(RuleSnapshot::empty()),
            version_manager: VersionManager::new(),
        }
    }

    /// 以给定规则创建存储
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        let version_manager = VersionManager::new();
        let snapshot = version_manager.create_snapshot(rules);
        Self {
            current: RwLock::new(snapshot),
            version_manager,
        }
    }

    /// 替换全部规则
    ///
    /// # Returns
    /// * `u64` - 新快照的版本号
    pub async fn replace_rules(&self, rules: Vec<Rule>) -> u64 {
        // 持有写锁期间分配版本号,保证当前快照总是最新版本
        let mut current = self.current.write().await;
        *current = self.version_manager.create_snapshot(rules);
        info!(
            "规则快照已更新, 版本: {}, 规则数: {}",
            current.version,
            current.len()
        );
        current.version
    }

    /// 从 JSON 配置文档加载规则
    pub async fn load_json(&self, content: &str) -> Result<u64, RuleError> {
        let rules = parse_rule_document(content)?;
        Ok(self.replace_rules(rules).await)
    }

    pub fn get_current_version(&self) -> u64 {
        self.version_manager.get_current_version()
    }
}

impl Default for MemoryRuleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn snapshot(&self) -> Result<RuleSnapshot, RuleError> {
        Ok(self.current.read().await.clone())
    }
}

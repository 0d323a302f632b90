use super::{parse_rule_document, RuleStore};
use crate::engine::VersionManager;
use crate::types::{RuleError, RuleSnapshot};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// 文件规则存储
///
/// 每次取快照都重新读取配置文件;内容哈希不变时复用上一次的快照,
/// 内容变化时解析并生成新版本。
#[derive(Debug)]
pub struct FileRuleStore {
    path: PathBuf,
    version_manager: VersionManager,
    cached: Mutex<Option<(blake3::Hash, RuleSnapshot)>>,
}

impl FileRuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version_manager: VersionManager::new(),
            cached: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RuleStore for FileRuleStore {
    async fn snapshot(&self) -> Result<RuleSnapshot, RuleError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let hash = blake3::hash(content.as_bytes());

        let mut cached = self.cached.lock().await;
        if let Some((last_hash, snapshot)) = cached.as_ref() {
            if *last_hash == hash {
                debug!("规则文件 {} 未变化, 复用版本 {}", self.path.display(), snapshot.version);
                return Ok(snapshot.clone());
            }
        }

        let rules = parse_rule_document(&content)?;
        let snapshot = self.version_manager.create_snapshot(rules);
        info!(
            "从 {} 加载规则 {} 条, 版本: {}",
            self.path.display(),
            snapshot.len(),
            snapshot.version
        );
        *cached = Some((hash, snapshot.clone()));
        Ok(snapshot)
    }
}

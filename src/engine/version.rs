use crate::types::{Rule, RuleSnapshot};
use std::sync::atomic::{AtomicU64, Ordering};

/// 规则快照版本管理器
#[derive(Debug, Default)]
pub struct VersionManager {
    current_version: AtomicU64,
}

pub struct Version {
    pub version: u64,
    pub timestamp: i64,
}

impl VersionManager {
    pub fn new() -> Self {
        Self {
            current_version: AtomicU64::new(0),
        }
    }

    /// 分配下一个版本号
    pub fn create_version(&self) -> Version {
        let version = self.current_version.fetch_add(1, Ordering::SeqCst) + 1;
        Version {
            version,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// 用新版本号包装规则列表
    pub fn create_snapshot(&self, rules: Vec<Rule>) -> RuleSnapshot {
        let version = self.create_version();
        RuleSnapshot::new(version.version, version.timestamp, rules)
    }

    /// 最近一次分配的版本号, 0 表示尚未分配
    pub fn get_current_version(&self) -> u64 {
        self.current_version.load(Ordering::SeqCst)
    }
}

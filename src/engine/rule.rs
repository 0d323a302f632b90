use super::applier::apply_actions;
use super::dispatcher::{dispatch_report, DispatchReport};
use crate::aop::{InterceptorManager, RuleInterceptor};
use crate::store::{MemoryRuleStore, RuleStore};
use crate::types::{FieldMap, Rule, RuleAction, RuleError, RuleSnapshot, Trigger};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type DynRuleEngine = Arc<dyn RuleEngineTrait + Send + Sync>;

/// 规则引擎对外接口
///
/// 规则求值本身是同步的纯计算,异步只来自规则存储的读取。
#[async_trait]
pub trait RuleEngineTrait: Debug + Send + Sync {
    /// 计算触发器在给定上下文下的全部动作
    ///
    /// # Arguments
    /// * `trigger` - 触发时机
    /// * `context` - 求值上下文
    async fn get_applied_actions(
        &self,
        trigger: &Trigger,
        context: &FieldMap,
    ) -> Result<Vec<RuleAction>, RuleError>;

    /// 计算动作并应用到记录上,返回新记录
    ///
    /// # Arguments
    /// * `trigger` - 触发时机
    /// * `context` - 求值上下文
    /// * `data` - 原始记录,不会被修改
    async fn apply_rules(
        &self,
        trigger: &Trigger,
        context: &FieldMap,
        data: &FieldMap,
    ) -> Result<FieldMap, RuleError>;

    /// 分发并返回每条规则的求值记录
    async fn explain(&self, trigger: &Trigger, context: &FieldMap)
        -> Result<DispatchReport, RuleError>;

    /// 当前规则快照
    async fn snapshot(&self) -> Result<RuleSnapshot, RuleError>;

    /// 注册拦截器
    async fn add_interceptor(&self, interceptor: Arc<dyn RuleInterceptor>);
}

#[derive(Debug, Clone)]
pub struct RuleEngine {
    store: Arc<dyn RuleStore>,
    interceptor_manager: Arc<RwLock<InterceptorManager>>,
}

impl RuleEngine {
    /// 以给定规则存储创建引擎,默认注册日志拦截器
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self {
            store,
            interceptor_manager: Arc::new(RwLock::new(InterceptorManager::default())),
        }
    }

    /// 以内存中的规则列表创建引擎
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self::new(Arc::new(MemoryRuleStore::with_rules(rules)))
    }

    pub fn store(&self) -> &Arc<dyn RuleStore> {
        &self.store
    }
}

#[async_trait]
impl RuleEngineTrait for RuleEngine {
    async fn get_applied_actions(
        &self,
        trigger: &Trigger,
        context: &FieldMap,
    ) -> Result<Vec<RuleAction>, RuleError> {
        Ok(self.explain(trigger, context).await?.actions)
    }

    async fn apply_rules(
        &self,
        trigger: &Trigger,
        context: &FieldMap,
        data: &FieldMap,
    ) -> Result<FieldMap, RuleError> {
        let actions = self.get_applied_actions(trigger, context).await?;
        Ok(apply_actions(&actions, data))
    }

    async fn explain(
        &self,
        trigger: &Trigger,
        context: &FieldMap,
    ) -> Result<DispatchReport, RuleError> {
        let snapshot = self.store.snapshot().await?;
        let manager = self.interceptor_manager.read().await;
        Ok(dispatch_report(trigger, context, snapshot.rules(), &manager))
    }

    async fn snapshot(&self) -> Result<RuleSnapshot, RuleError> {
        self.store.snapshot().await
    }

    async fn add_interceptor(&self, interceptor: Arc<dyn RuleInterceptor>) {
        self.interceptor_manager.write().await.register(interceptor);
    }
}

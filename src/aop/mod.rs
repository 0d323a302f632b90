use crate::engine::RuleOutcome;
use crate::types::{FieldMap, Rule, RuleAction, RuleError, Trigger};
use std::sync::Arc;
use tracing::{debug, warn};

/// 规则拦截器特征,在一次分发的各个阶段得到通知
///
/// 拦截器只能观察,不能改变分发结果。所有方法都有空的默认实现。
pub trait RuleInterceptor: Send + Sync + std::fmt::Debug {
    /// 分发开始前
    ///
    /// # Arguments
    /// * `trigger` - 触发时机
    /// * `context` - 求值上下文
    /// * `candidates` - 触发时机匹配的规则数量
    fn before_dispatch(&self, _trigger: &Trigger, _context: &FieldMap, _candidates: usize) {}

    /// 规则命中
    fn on_match(&self, _rule: &Rule, _actions: &[RuleAction]) {}

    /// 规则被禁用或条件不满足
    fn on_skip(&self, _rule: &Rule, _outcome: &RuleOutcome) {}

    /// 规则求值出错,该规则按未命中处理
    fn on_error(&self, _rule: &Rule, _error: &RuleError) {}

    /// 分发结束后
    fn after_dispatch(&self, _trigger: &Trigger, _actions: &[RuleAction]) {}
}

/// 拦截器管理器,按注册顺序通知所有拦截器
#[derive(Debug, Clone)]
pub struct InterceptorManager {
    interceptors: Vec<Arc<dyn RuleInterceptor>>,
}

impl InterceptorManager {
    /// 创建空的拦截器管理器
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    /// 注册拦截器
    pub fn register(&mut self, interceptor: Arc<dyn RuleInterceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn before_dispatch(&self, trigger: &Trigger, context: &FieldMap, candidates: usize) {
        for interceptor in &self.interceptors {
            interceptor.before_dispatch(trigger, context, candidates);
        }
    }

    pub fn on_match(&self, rule: &Rule, actions: &[RuleAction]) {
        for interceptor in &self.interceptors {
            interceptor.on_match(rule, actions);
        }
    }

    pub fn on_skip(&self, rule: &Rule, outcome: &RuleOutcome) {
        for interceptor in &self.interceptors {
            interceptor.on_skip(rule, outcome);
        }
    }

    pub fn on_error(&self, rule: &Rule, error: &RuleError) {
        for interceptor in &self.interceptors {
            interceptor.on_error(rule, error);
        }
    }

    pub fn after_dispatch(&self, trigger: &Trigger, actions: &[RuleAction]) {
        for interceptor in &self.interceptors {
            interceptor.after_dispatch(trigger, actions);
        }
    }
}

impl Default for InterceptorManager {
    /// 默认注册日志拦截器
    fn default() -> Self {
        let mut manager = Self::new();
        manager.register(Arc::new(LoggingInterceptor));
        manager
    }
}

/// 日志拦截器,记录每条规则的求值结果
#[derive(Debug)]
pub struct LoggingInterceptor;

impl RuleInterceptor for LoggingInterceptor {
    fn before_dispatch(&self, trigger: &Trigger, _context: &FieldMap, candidates: usize) {
        debug!("开始分发触发器 [{}], 候选规则 {} 条", trigger, candidates);
    }

    fn on_match(&self, rule: &Rule, actions: &[RuleAction]) {
        debug!(
            "规则 [{}] ({}) 命中, 动作 {} 个",
            rule.id,
            rule.label(),
            actions.len()
        );
    }

    fn on_skip(&self, rule: &Rule, outcome: &RuleOutcome) {
        match outcome {
            RuleOutcome::Unmatched { condition } => {
                debug!("规则 [{}] 未命中, 第 {} 个条件不满足", rule.id, condition)
            }
            _ => debug!("规则 [{}] 已跳过: {:?}", rule.id, outcome),
        }
    }

    fn on_error(&self, rule: &Rule, error: &RuleError) {
        warn!(
            rule_id = %rule.id,
            "规则 [{}] 求值失败, 按未命中处理: {}",
            rule.label(),
            error
        );
    }

    fn after_dispatch(&self, trigger: &Trigger, actions: &[RuleAction]) {
        debug!("触发器 [{}] 分发完成, 共 {} 个动作", trigger, actions.len());
    }
}

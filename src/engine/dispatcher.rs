use super::evaluator::{explain_rule, RuleOutcome};
use crate::aop::InterceptorManager;
use crate::types::{FieldMap, Rule, RuleAction, Trigger};
use lazy_static::lazy_static;

lazy_static! {
    static ref DEFAULT_INTERCEPTORS: InterceptorManager = InterceptorManager::default();
}

/// 单条候选规则的分发记录
#[derive(Debug)]
pub struct RuleReport {
    /// 规则 id
    pub rule_id: String,
    /// 求值结果
    pub outcome: RuleOutcome,
}

/// 一次分发的完整结果
#[derive(Debug)]
pub struct DispatchReport {
    /// 触发时机
    pub trigger: Trigger,
    /// 所有命中规则的动作,按规则列表顺序拼接
    pub actions: Vec<RuleAction>,
    /// 每条触发时机匹配的规则的求值记录,顺序与规则列表一致
    pub rules: Vec<RuleReport>,
}

impl DispatchReport {
    /// 命中规则的 id
    pub fn matched(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|r| r.outcome.is_matched())
            .map(|r| r.rule_id.as_str())
    }

    /// 求值出错的规则
    pub fn failed(&self) -> impl Iterator<Item = &RuleReport> {
        self.rules
            .iter()
            .filter(|r| matches!(r.outcome, RuleOutcome::Failed(_)))
    }
}

/// 分发触发器,收集所有命中规则的动作
///
/// 求值出错的规则会记录日志并按未命中处理,不影响其他规则。
///
/// # Arguments
/// * `trigger` - 触发时机
/// * `context` - 求值上下文
/// * `rules` - 有序规则列表,顺序决定动作冲突时的先后
pub fn dispatch(trigger: &Trigger, context: &FieldMap, rules: &[Rule]) -> Vec<RuleAction> {
    dispatch_with(trigger, context, rules, &DEFAULT_INTERCEPTORS)
}

/// 与 [`dispatch`] 相同,但通知给定的拦截器
pub fn dispatch_with(
    trigger: &Trigger,
    context: &FieldMap,
    rules: &[Rule],
    interceptors: &InterceptorManager,
) -> Vec<RuleAction> {
    dispatch_report(trigger, context, rules, interceptors).actions
}

/// 分发并返回每条候选规则的求值记录
pub fn dispatch_report(
    trigger: &Trigger,
    context: &FieldMap,
    rules: &[Rule],
    interceptors: &InterceptorManager,
) -> DispatchReport {
    let candidates: Vec<&Rule> = rules.iter().filter(|r| &r.trigger == trigger).collect();
    interceptors.before_dispatch(trigger, context, candidates.len());

    let mut actions = Vec::new();
    let mut reports = Vec::with_capacity(candidates.len());

    for rule in candidates {
        let outcome = explain_rule(rule, context);
        match &outcome {
            RuleOutcome::Matched => {
                interceptors.on_match(rule, &rule.actions);
                actions.extend(rule.actions.iter().cloned());
            }
            RuleOutcome::Failed(e) => interceptors.on_error(rule, e),
            RuleOutcome::Disabled | RuleOutcome::Unmatched { .. } => {
                interceptors.on_skip(rule, &outcome)
            }
        }
        reports.push(RuleReport {
            rule_id: rule.id.clone(),
            outcome,
        });
    }

    interceptors.after_dispatch(trigger, &actions);

    DispatchReport {
        trigger: trigger.clone(),
        actions,
        rules: reports,
    }
}

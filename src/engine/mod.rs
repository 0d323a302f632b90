mod applier;
mod condition;
mod dispatcher;
mod evaluator;
pub mod rule;
mod version;

pub use applier::apply_actions;
pub use condition::evaluate_condition;
pub use dispatcher::{dispatch, dispatch_report, dispatch_with, DispatchReport, RuleReport};
pub use evaluator::{evaluate_rule, explain_rule, RuleOutcome};
pub use rule::{DynRuleEngine, RuleEngine, RuleEngineTrait};
pub use version::*;

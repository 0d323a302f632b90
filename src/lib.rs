pub mod aop;
pub mod engine;
pub mod store;
pub mod types;
pub mod utils;

pub use engine::{apply_actions, dispatch, RuleEngine, RuleEngineTrait};
pub use store::{FileRuleStore, MemoryRuleStore, RuleStore};
pub use types::*;

use lifeplan_rules::utils::init_tracing;
use lifeplan_rules::{FieldMap, MemoryRuleStore, RuleEngine, RuleEngineTrait, Trigger};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const RULE_SETTINGS: &str = r#"{
    "rules": [
        {
            "id": "3f2504e0-4f89-11d3-9a0c-0305e82c3301",
            "name": "Bugs go first",
            "trigger": "on-create",
            "conditions": [
                { "field": "type", "operator": "equals", "value": "Bug" }
            ],
            "actions": [
                { "field": "priority", "value": "Q1" }
            ]
        },
        {
            "id": "3f2504e0-4f89-11d3-9a0c-0305e82c3302",
            "name": "Unassigned goes to me",
            "trigger": "on-create",
            "conditions": [
                { "field": "assignee", "operator": "not_exists" }
            ],
            "actions": [
                { "field": "assignee", "value": "me" }
            ]
        },
        {
            "id": "3f2504e0-4f89-11d3-9a0c-0305e82c3303",
            "name": "Typo in operator",
            "trigger": "on-create",
            "conditions": [
                { "field": "labels", "operator": "has", "value": "home" }
            ],
            "actions": [
                { "field": "area", "value": "home" }
            ]
        },
        {
            "id": "3f2504e0-4f89-11d3-9a0c-0305e82c3304",
            "name": "Urgent label",
            "trigger": "on-create",
            "conditions": [
                { "field": "labels", "operator": "contains", "value": "urgent" }
            ],
            "actions": [
                { "field": "priority", "value": "Q0" },
                { "field": "pinned", "value": true }
            ]
        }
    ]
}"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let store = Arc::new(MemoryRuleStore::new());
    let version = store.load_json(RULE_SETTINGS).await?;
    info!("规则加载成功, 版本: {}", version);

    let engine = RuleEngine::new(store);

    let story = FieldMap::from_json(json!({
        "title": "Leaking kitchen tap",
        "type": "Bug",
        "labels": ["urgent", "home"]
    }))?;

    let report = engine.explain(&Trigger::on_create(), &story).await?;
    for entry in &report.rules {
        info!("规则 {}: {:?}", entry.rule_id, entry.outcome);
    }

    let updated = engine
        .apply_rules(&Trigger::on_create(), &story, &story)
        .await?;
    for change in story.diff(&updated) {
        info!("{}: {:?} -> {:?}", change.field, change.before, change.after);
    }

    info!("处理结果: {}", serde_json::to_string_pretty(&updated)?);
    Ok(())
}

use lifeplan_rules::aop::RuleInterceptor;
use lifeplan_rules::engine::RuleOutcome;
use lifeplan_rules::{
    FieldMap, FieldValue, FileRuleStore, MemoryRuleStore, Rule, RuleAction, RuleCondition, RuleEngine,
    RuleEngineTrait, RuleError, RuleStore, Trigger,
};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const SETTINGS: &str = r#"{
    "rules": [
        {
            "id": "bug-priority",
            "name": "Bugs go first",
            "trigger": "on-create",
            "conditions": [{ "field": "type", "operator": "equals", "value": "Bug" }],
            "actions": [{ "field": "priority", "value": "Q1" }]
        },
        {
            "id": "done-archive",
            "trigger": "on-status-change",
            "conditions": [{ "field": "status", "operator": "equals", "value": "Done" }],
            "actions": [{ "field": "archived", "value": true }]
        }
    ]
}"#;

#[derive(Debug, Default)]
struct MatchCounter {
    matches: AtomicUsize,
}

impl RuleInterceptor for MatchCounter {
    fn on_match(&self, _rule: &Rule, _actions: &[RuleAction]) {
        self.matches.fetch_add(1, Ordering::SeqCst);
    }
}

#[test_log::test(tokio::test)]
async fn applies_rules_from_memory_store() -> anyhow::Result<()> {
    let store = Arc::new(MemoryRuleStore::new());
    store.load_json(SETTINGS).await?;
    let engine = RuleEngine::new(store);

    let story = FieldMap::new().with("title", "Login fails").with("type", "Bug");
    let updated = engine
        .apply_rules(&Trigger::on_create(), &story, &story)
        .await?;

    assert_eq!(updated.get("priority"), Some(&FieldValue::from("Q1")));
    assert_eq!(story.get("priority"), None);
    assert_eq!(story.diff(&updated).len(), 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn trigger_context_can_differ_from_record() -> anyhow::Result<()> {
    let engine = RuleEngine::with_rules(vec![Rule::new(Trigger::on_status_change())
        .when(RuleCondition::equals("previous_status", "Doing"))
        .when(RuleCondition::equals("status", "Done"))
        .then(RuleAction::set("celebrate", true))]);

    let record = FieldMap::new().with("status", "Done");
    let context = record.merged(&FieldMap::new().with("previous_status", "Doing"));

    let updated = engine
        .apply_rules(&Trigger::on_status_change(), &context, &record)
        .await?;
    assert_eq!(updated.get("celebrate"), Some(&FieldValue::Bool(true)));
    assert!(!updated.contains_key("previous_status"));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn replacing_rules_changes_later_dispatches_only() -> anyhow::Result<()> {
    let store = Arc::new(MemoryRuleStore::with_rules(vec![Rule::new(
        Trigger::on_create(),
    )
    .then(RuleAction::set("priority", "Q2"))]));
    let engine = RuleEngine::new(store.clone());

    let before = engine.snapshot().await?;
    store
        .replace_rules(vec![Rule::new(Trigger::on_create()).then(RuleAction::set("priority", "Q3"))])
        .await;

    let actions = engine
        .get_applied_actions(&Trigger::on_create(), &FieldMap::new())
        .await?;
    assert_eq!(actions, vec![RuleAction::set("priority", "Q3")]);
    assert_eq!(before.rules()[0].actions, vec![RuleAction::set("priority", "Q2")]);
    assert_eq!(engine.snapshot().await?.version, before.version + 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn explain_reports_each_candidate() -> anyhow::Result<()> {
    let engine = RuleEngine::with_rules(vec![
        Rule::new(Trigger::on_create())
            .with_id("needs-title")
            .when(RuleCondition::exists("title"))
            .when(RuleCondition::equals("type", "Goal")),
        Rule::new(Trigger::on_create()).with_id("off").disabled(),
        Rule::new(Trigger::on_create())
            .with_id("always")
            .then(RuleAction::set("seen", true)),
    ]);

    let report = engine
        .explain(&Trigger::on_create(), &FieldMap::new().with("title", "Run 10k"))
        .await?;

    assert_eq!(report.rules.len(), 3);
    assert!(matches!(
        report.rules[0].outcome,
        RuleOutcome::Unmatched { condition: 1 }
    ));
    assert!(matches!(report.rules[1].outcome, RuleOutcome::Disabled));
    assert_eq!(report.matched().collect::<Vec<_>>(), vec!["always"]);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn interceptors_observe_matches() -> anyhow::Result<()> {
    let engine = RuleEngine::with_rules(vec![
        Rule::new(Trigger::on_update()).then(RuleAction::set("a", 1)),
        Rule::new(Trigger::on_update()).then(RuleAction::set("b", 2)),
    ]);
    let counter = Arc::new(MatchCounter::default());
    engine.add_interceptor(counter.clone()).await;

    engine
        .get_applied_actions(&Trigger::on_update(), &FieldMap::new())
        .await?;
    assert_eq!(counter.matches.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn file_store_reloads_only_on_change() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(SETTINGS.as_bytes())?;
    file.flush()?;

    let store = Arc::new(FileRuleStore::new(file.path()));
    let engine = RuleEngine::new(store.clone());

    let first = store.snapshot().await?;
    let second = store.snapshot().await?;
    assert_eq!(first.version, 1);
    assert_eq!(second.version, 1);
    assert_eq!(first.len(), 2);

    let updated = engine
        .apply_rules(
            &Trigger::on_status_change(),
            &FieldMap::new().with("status", "Done"),
            &FieldMap::new().with("status", "Done"),
        )
        .await?;
    assert_eq!(updated.get("archived"), Some(&FieldValue::Bool(true)));

    std::fs::write(file.path(), r#"[{ "id": "only", "trigger": "on-create" }]"#)?;
    let third = store.snapshot().await?;
    assert_eq!(third.version, 2);
    assert_eq!(third.rules()[0].id, "only");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn invalid_rule_set_fails_the_call() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(br#"{ "rules": { "bug-priority": {} } }"#)?;
    file.flush()?;

    let engine = RuleEngine::new(Arc::new(FileRuleStore::new(file.path())));
    let result = engine
        .apply_rules(&Trigger::on_create(), &FieldMap::new(), &FieldMap::new())
        .await;

    assert!(matches!(result, Err(RuleError::InvalidRuleSet(_))));
    Ok(())
}

const PARTLY_BROKEN_SETTINGS: &str = r#"{
    "rules": [
        {
            "id": "no-operator",
            "trigger": "on-create",
            "conditions": [{ "field": "type", "value": "Bug" }],
            "actions": [{ "field": "priority", "value": "Q0" }]
        },
        {
            "id": "numeric-operator",
            "trigger": "on-create",
            "conditions": [{ "field": "type", "operator": 7, "value": "Bug" }],
            "actions": [{ "field": "priority", "value": "Q0" }]
        },
        {
            "id": "object-value",
            "trigger": "on-update",
            "enabled": false,
            "actions": [{ "field": "meta", "value": { "a": 1 } }]
        },
        {
            "id": "bug-priority",
            "trigger": "on-create",
            "conditions": [{ "field": "type", "operator": "equals", "value": "Bug" }],
            "actions": [{ "field": "priority", "value": "Q1" }]
        }
    ]
}"#;

#[test_log::test(tokio::test)]
async fn broken_rules_fail_alone() -> anyhow::Result<()> {
    let store = Arc::new(MemoryRuleStore::new());
    store.load_json(PARTLY_BROKEN_SETTINGS).await?;
    let engine = RuleEngine::new(store);

    let story = FieldMap::new().with("type", "Bug");
    let updated = engine
        .apply_rules(&Trigger::on_create(), &story, &story)
        .await?;
    assert_eq!(updated.get("priority"), Some(&FieldValue::from("Q1")));

    let report = engine.explain(&Trigger::on_create(), &story).await?;
    assert_eq!(report.matched().collect::<Vec<_>>(), vec!["bug-priority"]);
    assert_eq!(
        report.failed().map(|r| r.rule_id.as_str()).collect::<Vec<_>>(),
        vec!["no-operator", "numeric-operator"]
    );

    let actions = engine
        .get_applied_actions(&Trigger::on_update(), &FieldMap::new())
        .await?;
    assert!(actions.is_empty());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn malformed_entry_in_settings_file_keeps_the_rest() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(
        br#"[
            { "id": "broken", "trigger": "on-create", "conditions": "type == Bug" },
            { "id": "always", "trigger": "on-create",
              "actions": [{ "field": "seen", "value": true }] }
        ]"#,
    )?;
    file.flush()?;

    let engine = RuleEngine::new(Arc::new(FileRuleStore::new(file.path())));
    let actions = engine
        .get_applied_actions(&Trigger::on_create(), &FieldMap::new())
        .await?;

    assert_eq!(actions, vec![RuleAction::set("seen", true)]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_replacements_keep_the_newest_snapshot() -> anyhow::Result<()> {
    let store = Arc::new(MemoryRuleStore::new());

    for _ in 0..50 {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .replace_rules(vec![Rule::new(Trigger::on_create()).with_id(format!("r{}", i))])
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await?;
        }

        assert_eq!(store.snapshot().await?.version, store.get_current_version());
    }
    assert_eq!(store.get_current_version(), 400);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn missing_settings_file_is_an_io_error() {
    let engine = RuleEngine::new(Arc::new(FileRuleStore::new("/nonexistent/rules.json")));
    let result = engine
        .get_applied_actions(&Trigger::on_create(), &FieldMap::new())
        .await;
    assert!(matches!(result, Err(RuleError::Io(_))));
}

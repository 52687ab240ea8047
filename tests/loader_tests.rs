// tests/loader_tests.rs

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tick_lang::cli::execute_load;
use tick_lang::load::{
    Action, ClientCall, LoadConfig, LoadError, LoadService, Loaded, MemoryClient, Resource,
    TaskClient, TaskStatus, HANDLERS_DIR, TASKS_DIR, TEMPLATES_DIR,
};
use tick_lang::{Dbrp, TaskType};

const CPU_TASK: &str = r#"dbrp "telegraf"."autogen"

stream
    |from()
        .measurement('cpu')
    |alert()
        .crit(lambda: "usage_idle" < 10)
"#;

const CPU_TEMPLATE: &str = r#"dbrp "telegraf"."autogen"

var measurement string
var crit lambda

stream
    |from()
        .measurement(measurement)
    |alert()
        .crit(crit)
"#;

const SLACK_HANDLER: &str = "topic: cpu\nid: slack\nkind: slack\noptions:\n  channel: '#alerts'\n";

fn load_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(TASKS_DIR)).unwrap();
    fs::create_dir(dir.path().join(HANDLERS_DIR)).unwrap();
    dir
}

fn write(dir: &Path, subdir: &str, name: &str, contents: &str) {
    let subdir = dir.join(subdir);
    fs::create_dir_all(&subdir).unwrap();
    fs::write(subdir.join(name), contents).unwrap();
}

fn update(id: &str, status: Option<TaskStatus>) -> ClientCall {
    ClientCall::UpdateTask {
        id: id.to_string(),
        status,
    }
}

// ============================================================================
// Tasks
// ============================================================================

#[test]
fn test_creates_task() {
    let dir = load_dir();
    write(dir.path(), TASKS_DIR, "cpu.tick", CPU_TASK);

    let mut client = MemoryClient::new();
    let report = LoadService::new(LoadConfig::new(dir.path()), &mut client)
        .load()
        .unwrap();

    assert!(report.is_success());
    assert_eq!(
        report.loaded,
        vec![Loaded {
            resource: Resource::Task,
            id: "cpu".to_string(),
            action: Action::Created,
        }]
    );

    let task = client.task("cpu").unwrap().expect("task stored");
    assert_eq!(task.task_type, Some(TaskType::Stream));
    assert_eq!(task.dbrps, vec![Dbrp::new("telegraf", "autogen")]);
    assert_eq!(task.status, TaskStatus::Enabled);
    assert_eq!(task.tickscript.as_deref(), Some(CPU_TASK));
}

#[test]
fn test_existing_task_is_updated_and_reloaded() {
    let dir = load_dir();
    write(dir.path(), TASKS_DIR, "cpu.tick", CPU_TASK);

    let mut client = MemoryClient::new();
    let config = LoadConfig::new(dir.path());
    LoadService::new(config.clone(), &mut client).load().unwrap();
    let report = LoadService::new(config, &mut client).load().unwrap();

    assert_eq!(report.loaded[0].action, Action::Updated);
    assert_eq!(
        client.calls(),
        &[
            ClientCall::CreateTask {
                id: "cpu".to_string()
            },
            update("cpu", None),
            update("cpu", Some(TaskStatus::Disabled)),
            update("cpu", Some(TaskStatus::Enabled)),
        ]
    );
}

#[test]
fn test_failed_file_does_not_stop_the_rest() {
    let dir = load_dir();
    write(dir.path(), TASKS_DIR, "a_broken.tick", "stream|from(");
    write(dir.path(), TASKS_DIR, "b_number.tick", "var x = 0x04\nstream|from()");
    write(dir.path(), TASKS_DIR, "c_cpu.tick", CPU_TASK);

    let mut service = LoadService::new(LoadConfig::new(dir.path()), MemoryClient::new());
    let report = service.load().unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 2);
    assert!(report.failed[0].0.ends_with("a_broken.tick"));
    assert!(matches!(report.failed[0].1, LoadError::Parse { .. }));
    assert!(matches!(report.failed[1].1, LoadError::Parse { .. }));

    assert_eq!(report.loaded.len(), 1);
    assert_eq!(report.loaded[0].id, "c_cpu");
    assert_eq!(service.client().tasks().count(), 1);
}

#[test]
fn test_invalid_task_type_is_rejected() {
    let dir = load_dir();
    write(
        dir.path(),
        TASKS_DIR,
        "mixed.tick",
        "var a = stream|from()\nvar b = batch|query('SELECT 1')\n",
    );
    write(dir.path(), TASKS_DIR, "nosource.tick", "var period = 10s\n");

    let report = LoadService::new(LoadConfig::new(dir.path()), MemoryClient::new())
        .load()
        .unwrap();

    assert_eq!(report.failed.len(), 2);
    for (_, err) in &report.failed {
        assert!(matches!(err, LoadError::InvalidTaskType { .. }));
    }
}

#[test]
fn test_other_files_are_ignored() {
    let dir = load_dir();
    write(dir.path(), TASKS_DIR, "notes.txt", "not a script");
    write(dir.path(), HANDLERS_DIR, "README.md", "# handlers");
    fs::create_dir(dir.path().join(TASKS_DIR).join("nested.tick")).unwrap();

    let report = LoadService::new(LoadConfig::new(dir.path()), MemoryClient::new())
        .load()
        .unwrap();

    assert!(report.is_success());
    assert!(report.loaded.is_empty());
}

// ============================================================================
// Templates and Vars
// ============================================================================

#[test]
fn test_template_and_json_vars() {
    let dir = load_dir();
    write(dir.path(), TEMPLATES_DIR, "cpu_alert.tick", CPU_TEMPLATE);
    write(
        dir.path(),
        TEMPLATES_DIR,
        "cpu_web.json",
        r#"{
            "template-id": "cpu_alert",
            "dbrps": [{"db": "telegraf", "rp": "autogen"}],
            "vars": {
                "measurement": {"type": "string", "value": "cpu"},
                "crit": {"type": "lambda", "value": "\"usage_idle\" < 10"}
            }
        }"#,
    );

    let mut client = MemoryClient::new();
    let report = LoadService::new(LoadConfig::new(dir.path()), &mut client)
        .load()
        .unwrap();

    assert!(report.is_success(), "failures: {:?}", report.failed);
    assert_eq!(
        client.calls(),
        &[
            ClientCall::CreateTemplate {
                id: "cpu_alert".to_string()
            },
            ClientCall::CreateTask {
                id: "cpu_web".to_string()
            },
        ]
    );

    let task = client.task("cpu_web").unwrap().expect("task stored");
    assert_eq!(task.template_id.as_deref(), Some("cpu_alert"));
    assert_eq!(task.task_type, Some(TaskType::Stream));
    assert_eq!(task.vars.len(), 2);
    assert!(task.tickscript.is_none());
}

#[test]
fn test_yaml_vars() {
    let dir = load_dir();
    write(dir.path(), TEMPLATES_DIR, "cpu_alert.tick", CPU_TEMPLATE);
    write(
        dir.path(),
        TEMPLATES_DIR,
        "cpu_db.yml",
        "template-id: cpu_alert\ndbrps:\n  - db: telegraf\n    rp: autogen\nvars:\n  measurement:\n    type: string\n    value: cpu\n",
    );

    let mut client = MemoryClient::new();
    let report = LoadService::new(LoadConfig::new(dir.path()), &mut client)
        .load()
        .unwrap();

    assert!(report.is_success(), "failures: {:?}", report.failed);
    let task = client.task("cpu_db").unwrap().expect("task stored");
    assert_eq!(task.dbrps, vec![Dbrp::new("telegraf", "autogen")]);
}

#[test]
fn test_var_type_mismatch() {
    let dir = load_dir();
    write(dir.path(), TEMPLATES_DIR, "cpu_alert.tick", CPU_TEMPLATE);
    write(
        dir.path(),
        TEMPLATES_DIR,
        "bad.yaml",
        "template-id: cpu_alert\nvars:\n  measurement:\n    type: int\n    value: 5\n",
    );

    let report = LoadService::new(LoadConfig::new(dir.path()), MemoryClient::new())
        .load()
        .unwrap();

    assert_eq!(report.loaded.len(), 1);
    match &report.failed[..] {
        [(_, LoadError::VarTypeMismatch { name, .. })] => assert_eq!(name, "measurement"),
        other => panic!("unexpected failures: {other:?}"),
    }
}

#[test]
fn test_var_value_must_match_type() {
    let dir = load_dir();
    write(
        dir.path(),
        TEMPLATES_DIR,
        "threshold.json",
        r#"{"template-id": "unknown", "vars": {"limit": {"type": "int", "value": "ten"}}}"#,
    );

    let report = LoadService::new(LoadConfig::new(dir.path()), MemoryClient::new())
        .load()
        .unwrap();

    assert!(matches!(
        report.failed[0].1,
        LoadError::InvalidVarValue { .. }
    ));
}

#[test]
fn test_malformed_vars_file() {
    let dir = load_dir();
    write(dir.path(), TEMPLATES_DIR, "broken.json", "{ not json");

    let report = LoadService::new(LoadConfig::new(dir.path()), MemoryClient::new())
        .load()
        .unwrap();

    assert!(matches!(report.failed[0].1, LoadError::Json { .. }));
}

// ============================================================================
// Handlers
// ============================================================================

#[test]
fn test_handler_created_then_replaced() {
    let dir = load_dir();
    write(dir.path(), HANDLERS_DIR, "slack.yaml", SLACK_HANDLER);

    let mut client = MemoryClient::new();
    let config = LoadConfig::new(dir.path());
    let first = LoadService::new(config.clone(), &mut client).load().unwrap();
    let second = LoadService::new(config, &mut client).load().unwrap();

    assert_eq!(first.loaded[0].id, "cpu/slack");
    assert_eq!(first.loaded[0].action, Action::Created);
    assert_eq!(second.loaded[0].action, Action::Updated);

    let handler = client.topic_handler("cpu", "slack").unwrap().expect("handler");
    assert_eq!(handler.kind, "slack");
    assert_eq!(handler.options["channel"], serde_json::json!("#alerts"));
}

#[test]
fn test_load_order() {
    let dir = load_dir();
    write(dir.path(), HANDLERS_DIR, "slack.yaml", SLACK_HANDLER);
    write(dir.path(), TEMPLATES_DIR, "cpu_alert.tick", CPU_TEMPLATE);
    write(dir.path(), TASKS_DIR, "cpu.tick", CPU_TASK);

    let report = LoadService::new(LoadConfig::new(dir.path()), MemoryClient::new())
        .load()
        .unwrap();

    let resources: Vec<Resource> = report.loaded.iter().map(|l| l.resource).collect();
    assert_eq!(
        resources,
        vec![Resource::Task, Resource::Template, Resource::TopicHandler]
    );
}

// ============================================================================
// Dry Run
// ============================================================================

#[test]
fn test_dry_run() {
    let dir = load_dir();
    write(dir.path(), TASKS_DIR, "cpu.tick", CPU_TASK);
    write(dir.path(), HANDLERS_DIR, "slack.yaml", SLACK_HANDLER);

    let outcome = execute_load(dir.path()).unwrap();
    let calls: Vec<String> = outcome.calls.iter().map(|c| c.to_string()).collect();
    assert_eq!(
        calls,
        vec!["create task cpu", "create handler slack on topic cpu"]
    );
    assert!(outcome.report.is_success());
}

#[test]
fn test_dry_run_requires_handlers_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(TASKS_DIR)).unwrap();

    assert!(execute_load(dir.path()).is_err());
}

use std::collections::BTreeSet;

use tick_lang::cli::{execute_check, CheckOptions};
use tick_lang::{
    ast::VarType, equal_as_sets, format_program, parse, Dbrp, SourceKind, TaskType,
};

fn task_type(source: &str) -> TaskType {
    parse(source)
        .unwrap_or_else(|e| panic!("error parsing tickscript: {e}"))
        .task_type()
}

fn dbrps(pairs: &[(&str, &str)]) -> Vec<Dbrp> {
    pairs.iter().map(|(db, rp)| Dbrp::new(*db, *rp)).collect()
}

// ============================================================================
// DBRPs
// ============================================================================

#[test]
fn test_one_dbrp() {
    let program = parse(
        r#"dbrp "telegraf"."autogen"

        stream|from().measurement('m')
        "#,
    )
    .unwrap();
    assert_eq!(program.dbrps(), dbrps(&[("telegraf", "autogen")]));
}

#[test]
fn test_two_dbrps_in_order() {
    let program = parse(
        r#"dbrp "telegraf"."autogen"
        dbrp "telegraf"."not_autogen"

        stream|from().measurement('m')
        "#,
    )
    .unwrap();
    assert_eq!(
        program.dbrps(),
        dbrps(&[("telegraf", "autogen"), ("telegraf", "not_autogen")])
    );
}

#[test]
fn test_duplicate_dbrps_are_kept() {
    let program = parse(
        r#"dbrp "telegraf"."autogen"
        dbrp "telegraf"."autogen"
        stream|from()"#,
    )
    .unwrap();
    assert_eq!(program.dbrps().len(), 2);
}

#[test]
fn test_no_dbrps() {
    let program = parse("stream|from()").unwrap();
    assert!(program.dbrps().is_empty());
}

// ============================================================================
// Task Type
// ============================================================================

#[test]
fn test_basic_stream() {
    let source = r#"dbrp "telegraf"."autogen"

        stream|from().measurement('m')
        "#;
    assert_eq!(task_type(source), TaskType::Stream);
}

#[test]
fn test_basic_batch() {
    let source = r#"dbrp "telegraf"."autogen"

        batch|query('SELECT * FROM "telegraf"."autogen"."mymeas"')
        "#;
    assert_eq!(task_type(source), TaskType::Batch);
}

#[test]
fn test_var_stream() {
    let source = r#"dbrp "telegraf"."autogen"

        var x = stream|from().measurement('m')
        "#;
    assert_eq!(task_type(source), TaskType::Stream);
}

#[test]
fn test_var_batch() {
    let source = r#"dbrp "telegraf"."autogen"

        var x = batch|query('SELECT * FROM "telegraf"."autogen"."mymeas"')
        "#;
    assert_eq!(task_type(source), TaskType::Batch);
}

#[test]
fn test_mixed_type_is_invalid() {
    let source = r#"dbrp "telegraf"."autogen"

        var x = batch|query('SELECT * FROM "telegraf"."autogen"."mymeas"')
        var y = stream|from().measurement('m')
        "#;
    assert_eq!(task_type(source), TaskType::Invalid);
}

#[test]
fn test_missing_source_is_invalid() {
    let source = r#"dbrp "telegraf"."autogen"

        var x = testing|query('SELECT * FROM "telegraf"."autogen"."mymeas"')
        "#;
    assert_eq!(task_type(source), TaskType::Invalid);
}

#[test]
fn test_empty_program_is_invalid() {
    assert_eq!(task_type(""), TaskType::Invalid);
    assert_eq!(task_type("var period = 10s"), TaskType::Invalid);
}

#[test]
fn test_pipeline_continued_from_variable() {
    let source = "var data = stream|from().measurement('cpu')\ndata|window().period(10s)\n";
    let program = parse(source).unwrap();
    assert_eq!(program.sources(), BTreeSet::from([SourceKind::Stream]));
    assert_eq!(program.task_type(), TaskType::Stream);
}

#[test]
fn test_bare_source() {
    assert_eq!(task_type("stream"), TaskType::Stream);
    assert_eq!(task_type("batch"), TaskType::Batch);
    assert_eq!(task_type("var s = stream\ns|from().measurement('m')"), TaskType::Stream);
    assert_eq!(task_type("var b = batch\nb|query('SELECT 1')"), TaskType::Batch);
}

#[test]
fn test_source_combinations() {
    let cases = vec![
        (
            "bare stream statement with batch declaration",
            "stream|from()\nvar b = batch|query('SELECT 1')",
            TaskType::Invalid,
        ),
        (
            "bare batch statement with stream declaration",
            "var s = stream|from()\nbatch|query('SELECT 1')",
            TaskType::Invalid,
        ),
        (
            "two bare statements",
            "stream|from()\nbatch|query('SELECT 1')",
            TaskType::Invalid,
        ),
        (
            "bare sources without calls",
            "var s = stream\nvar b = batch",
            TaskType::Invalid,
        ),
        (
            "stream through declarations",
            "var a = stream|from()\nvar b = a|window()\nb|alert()",
            TaskType::Stream,
        ),
        (
            "batch through declarations",
            "var a = batch|query('SELECT 1')\nvar b = a|window()\nb|alert()",
            TaskType::Batch,
        ),
        (
            "repeated stream sources",
            "stream|from()\nvar s = stream|from()\nstream",
            TaskType::Stream,
        ),
        (
            "variable named like a source",
            "var streams = 1\nstreams|from()",
            TaskType::Invalid,
        ),
    ];

    for (name, source, expected) in cases {
        assert_eq!(task_type(source), expected, "Failed for case: {}", name);
    }
}

#[test]
fn test_task_type_wire_names() {
    assert_eq!(serde_json::to_string(&TaskType::Stream).unwrap(), "\"stream\"");
    assert_eq!(serde_json::to_string(&TaskType::Invalid).unwrap(), "\"invalid\"");
    assert_eq!(TaskType::Batch.to_string(), "batch");
}

// ============================================================================
// Template Variables
// ============================================================================

#[test]
fn test_template_vars() {
    let program = parse(
        "var measurement string\nvar crit lambda\nvar period = 10s\nstream|from().measurement(measurement)",
    )
    .unwrap();
    assert_eq!(
        program.template_vars(),
        vec![("measurement", VarType::String), ("crit", VarType::Lambda)]
    );
}

// ============================================================================
// DBRP Set Equality
// ============================================================================

#[test]
fn test_equal_as_sets() {
    let cases = vec![
        (
            "two sets different order",
            dbrps(&[("telegraf", "autogen"), ("telegraf", "not_autogen")]),
            dbrps(&[("telegraf", "not_autogen"), ("telegraf", "autogen")]),
            true,
        ),
        (
            "unequal size",
            dbrps(&[("telegraf", "not_autogen")]),
            dbrps(&[("telegraf", "not_autogen"), ("telegraf", "autogen")]),
            false,
        ),
        (
            "one element different rp",
            dbrps(&[("telegraf", "not_autogen")]),
            dbrps(&[("telegraf", "autogen")]),
            false,
        ),
        (
            "one element different db",
            dbrps(&[("not_telegraf", "autogen")]),
            dbrps(&[("telegraf", "autogen")]),
            false,
        ),
        ("both empty", Vec::new(), Vec::new(), true),
    ];

    for (name, a, b, expected) in cases {
        assert_eq!(equal_as_sets(&a, &b), expected, "Failed for case: {}", name);
        assert_eq!(equal_as_sets(&b, &a), expected, "Failed for case: {}", name);
    }
}

#[test]
fn test_parsed_dbrps_compare_with_stored() {
    let program = parse(
        r#"dbrp "telegraf"."not_autogen"
        dbrp "telegraf"."autogen"
        stream|from()"#,
    )
    .unwrap();
    let stored = dbrps(&[("telegraf", "autogen"), ("telegraf", "not_autogen")]);
    assert!(equal_as_sets(&program.dbrps(), &stored));
}

// ============================================================================
// End to End
// ============================================================================

#[test]
fn test_formatted_program_keeps_analysis() {
    let source = r#"
// cpu alert
dbrp "telegraf"."autogen"

var data = stream
    |from()
        .measurement('cpu')
        .where(lambda: "host" =~ /^web/ AND "cpu" == 'cpu-total')

data
    |window()
        .period(1m)
        .every(10s)
    |mean('usage_idle')
    |alert()
        .crit(lambda: "mean" < (100 - 90) * 1.5)
"#;
    let program = parse(source).unwrap();
    let reparsed = parse(&format_program(&program)).unwrap();

    assert_eq!(reparsed, program);
    assert_eq!(reparsed.dbrps(), program.dbrps());
    assert_eq!(reparsed.task_type(), TaskType::Stream);
}

#[test]
fn test_check_command() {
    let source = "dbrp \"telegraf\".\"autogen\"\nvar crit lambda\nstream|from()\n";

    let text = execute_check(&CheckOptions {
        source: source.to_string(),
        json: false,
    })
    .unwrap();
    assert_eq!(
        text,
        "type: stream\ndbrp: \"telegraf\".\"autogen\"\nvar: crit lambda\nstatements: 2"
    );

    let json = execute_check(&CheckOptions {
        source: source.to_string(),
        json: true,
    })
    .unwrap();
    let summary: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(summary["type"], "stream");
    assert_eq!(summary["dbrps"][0]["db"], "telegraf");
    assert_eq!(summary["template_vars"][0]["type"], "lambda");
}

#[test]
fn test_check_reports_parse_errors() {
    let result = execute_check(&CheckOptions {
        source: "var x = 0x04".to_string(),
        json: false,
    });
    assert!(result.is_err());
}

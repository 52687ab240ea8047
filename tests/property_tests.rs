// tests/property_tests.rs

use std::time::Duration;

use proptest::prelude::*;
use tick_lang::ast::{Binding, Node, Statement};
use tick_lang::literal::{format_duration, parse_duration, parse_number, LiteralError, NumberValue};
use tick_lang::{parse, ParseErrorKind};

fn declared_value(source: &str) -> Node {
    let program = parse(source).unwrap_or_else(|e| panic!("{source:?} failed to parse: {e}"));
    match program.statements.into_iter().next() {
        Some(Statement::Declaration(decl)) => match decl.binding {
            Binding::Value(node) => node,
            Binding::Template(ty) => panic!("unexpected template declaration of {ty}"),
        },
        other => panic!("expected a declaration, got {other:?}"),
    }
}

proptest! {
    /// The parser reports errors for garbage input; it never panics.
    #[test]
    fn parser_never_panics(source in "\\PC{0,200}") {
        let _ = parse(&source);
    }

    #[test]
    fn integers_are_base_ten(n in 0i64..=i64::MAX, zeros in 0usize..4) {
        let text = format!("{}{}", "0".repeat(zeros), n);
        prop_assert_eq!(parse_number(&text), Ok(NumberValue::Int(n)));
    }

    #[test]
    fn integer_literals_are_never_floats(n in 0i64..=i64::MAX) {
        match declared_value(&format!("var x = {n}")) {
            Node::Number(number) => {
                prop_assert!(number.is_int());
                prop_assert!(!number.is_float());
                prop_assert_eq!(number.value.as_i64(), Some(n));
            }
            other => prop_assert!(false, "expected a number, got {:?}", other),
        }
    }

    #[test]
    fn one_dot_makes_a_float(whole in "[0-9]{1,8}", fraction in "[0-9]{0,8}") {
        let text = format!("{whole}.{fraction}");
        let expected: f64 = format!("{whole}.{fraction}0").parse().unwrap();
        match parse_number(&text) {
            Ok(NumberValue::Float(value)) => prop_assert_eq!(value, expected),
            other => prop_assert!(false, "{} gave {:?}", text, other),
        }
    }

    #[test]
    fn hex_prefix_is_illegal(prefix in "[0-9]{0,3}", digits in "[0-9a-f]{1,8}") {
        let text = format!("{prefix}0x{digits}");
        prop_assert_eq!(
            parse_number(&text),
            Err(LiteralError::IllegalNumberSyntax(text.clone()))
        );
    }

    #[test]
    fn second_dot_is_illegal(a in "[0-9]{1,4}", b in "[0-9]{0,4}", c in "[0-9.]{0,4}") {
        let text = format!("{a}.{b}.{c}");
        prop_assert_eq!(
            parse_number(&text),
            Err(LiteralError::IllegalNumberSyntax(text.clone()))
        );

        let err = parse(&format!("var x = {text}")).unwrap_err();
        prop_assert_eq!(err.kind, ParseErrorKind::Literal(LiteralError::IllegalNumberSyntax(text)));
    }

    #[test]
    fn seconds_durations(n in 0u64..1_000_000) {
        prop_assert_eq!(parse_duration(&format!("{n}s")), Ok(Duration::from_secs(n)));
    }

    #[test]
    fn formatted_durations_parse_back(micros in 0u64..10_000_000_000) {
        let duration = Duration::from_micros(micros);
        prop_assert_eq!(parse_duration(&format_duration(duration)), Ok(duration));
    }
}

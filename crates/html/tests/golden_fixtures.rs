mod common;

use common::{policy_from_toml, sanitize_fixtures, sanitize_whole};
use html_test_support::{diff_markup, escape_text};

#[test]
fn golden_sanitize_fixtures() {
    let mut failures = Vec::new();
    for case in sanitize_fixtures() {
        let policy = policy_from_toml(&case.config, &case.name);
        let actual = sanitize_whole(&policy, &case.input);
        if actual != case.expected {
            failures.push(format!(
                "'{}'\ninput: \"{}\"\n{}",
                case.name,
                escape_text(&case.input),
                diff_markup(&case.expected, &actual)
            ));
        }
    }
    assert!(
        failures.is_empty(),
        "{} golden case(s) failed:\n\n{}",
        failures.len(),
        failures.join("\n")
    );
}

#[test]
fn golden_outputs_are_fixed_points() {
    for case in sanitize_fixtures() {
        if case.not_idempotent {
            continue;
        }
        let policy = policy_from_toml(&case.config, &case.name);
        let again = sanitize_whole(&policy, &case.expected);
        assert_eq!(
            again, case.expected,
            "re-sanitizing the expected output of '{}' changed it\n{}",
            case.name,
            diff_markup(&case.expected, &again)
        );
    }
}

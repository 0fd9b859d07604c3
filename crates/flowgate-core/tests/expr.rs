// flowgate-core/tests/expr.rs
// ============================================================================
// Module: Expression Evaluator Tests
// Description: Tests for the sandboxed verification expression language.
// ============================================================================
//! ## Overview
//! Validates allow-list enforcement at parse time, the one-level access
//! rule, limit handling, and evaluation semantics over the three bindings.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::time::Duration;

use flowgate_core::Bindings;
use flowgate_core::EvalError;
use flowgate_core::EvalLimits;
use flowgate_core::Evaluator;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds bindings with a small context and scalar endpoints.
fn bindings() -> Bindings {
    Bindings {
        context: json!({"user": {"scopes": ["read", "write"]}, "count": 3}),
        source: json!("retail"),
        dest: json!("retail"),
    }
}

/// Creates an evaluator with default limits.
fn evaluator() -> Evaluator {
    Evaluator::default()
}

// ============================================================================
// SECTION: Parse-Time Safety
// ============================================================================

/// Tests an over-length expression is rejected before parsing.
#[test]
fn test_over_length_source_is_rejected() {
    let source = format!("source == \"{}\"", "x".repeat(600));
    let result = evaluator().pre_validate(&source);

    assert!(matches!(result, Err(EvalError::TooLong { .. })));
}

/// Tests an import-like construct never reaches evaluation.
#[test]
fn test_import_construct_is_rejected() {
    let result = evaluator().pre_validate("__import__(\"os\")");

    assert!(matches!(result, Err(EvalError::UnknownFunction(_))));
}

/// Tests string-interpolation characters are rejected outright.
#[test]
fn test_interpolation_characters_are_rejected() {
    let result = evaluator().pre_validate("source == `retail`");

    assert!(matches!(result, Err(EvalError::Disallowed(_))));
}

/// Tests identifiers outside the three bindings are rejected.
#[test]
fn test_unknown_binding_is_rejected() {
    let result = evaluator().pre_validate("payload == dest");

    assert!(matches!(result, Err(EvalError::UnknownBinding(_))));
}

/// Tests methods outside the allow-list are rejected.
#[test]
fn test_unknown_method_is_rejected() {
    let result = evaluator().pre_validate("context.keys() == 3");

    assert!(matches!(result, Err(EvalError::UnknownFunction(_))));
}

/// Tests chained access on a call result is rejected.
#[test]
fn test_chained_access_is_rejected() {
    let result = evaluator().pre_validate("context.get(\"user\").len() > 0");

    assert!(matches!(result, Err(EvalError::Disallowed(_))));
}

/// Tests assignment is rejected as a disallowed construct.
#[test]
fn test_assignment_is_rejected() {
    let result = evaluator().pre_validate("source = dest");

    assert!(matches!(result, Err(EvalError::Disallowed(_))));
}

/// Tests nesting beyond the depth limit is rejected at parse time.
#[test]
fn test_excessive_nesting_is_rejected() {
    let source = format!("{}source{}", "(".repeat(40), ")".repeat(40));
    let result = evaluator().pre_validate(&source);

    assert!(matches!(result, Err(EvalError::TooDeep { .. })));
}

/// Tests a valid expression passes pre-validation without bindings.
#[test]
fn test_valid_expression_prevalidates() {
    let result = evaluator().pre_validate("context.get(\"user.scopes\") != null && source == dest");

    assert!(result.is_ok());
}

// ============================================================================
// SECTION: Evaluation Semantics
// ============================================================================

/// Tests equality and boolean combination over bindings.
#[test]
fn test_equality_and_boolean_combination() {
    let result = evaluator().evaluate("source == dest && !(source == \"finance\")", &bindings());

    assert!(result.unwrap());
}

/// Tests one-level get access navigates dot-paths in the context.
#[test]
fn test_context_get_navigates_dot_paths() {
    let result = evaluator().evaluate("len(context.get(\"user.scopes\")) == 2", &bindings());

    assert!(result.unwrap());
}

/// Tests get on a missing path yields null, observable via present().
#[test]
fn test_missing_path_is_null() {
    let result = evaluator().evaluate("present(context.get(\"user.email\"))", &bindings());

    assert!(!result.unwrap());
}

/// Tests numeric ordering comparisons.
#[test]
fn test_numeric_ordering() {
    let result = evaluator().evaluate("context.get(\"count\") >= 3", &bindings());

    assert!(result.unwrap());
}

/// Tests string ordering comparisons are lexicographic.
#[test]
fn test_string_ordering_is_lexicographic() {
    let result = evaluator().evaluate("source < \"zzz\"", &bindings());

    assert!(result.unwrap());
}

/// Tests a non-boolean result is a type error.
#[test]
fn test_non_boolean_result_is_type_error() {
    let result = evaluator().evaluate("context.get(\"count\")", &bindings());

    assert!(matches!(result, Err(EvalError::Type(_))));
}

/// Tests ordering across mismatched types is a type error.
#[test]
fn test_mixed_type_ordering_is_type_error() {
    let result = evaluator().evaluate("source < 3", &bindings());

    assert!(matches!(result, Err(EvalError::Type(_))));
}

/// Tests is_null over a scalar binding.
#[test]
fn test_is_null_method() {
    let result = evaluator().evaluate("!dest.is_null()", &bindings());

    assert!(result.unwrap());
}

// ============================================================================
// SECTION: Deadline
// ============================================================================

/// Tests a zero deadline aborts evaluation as a timeout, never as false.
#[test]
fn test_zero_deadline_times_out() {
    let limits = EvalLimits {
        timeout: Duration::ZERO,
        ..EvalLimits::default()
    };
    let result = Evaluator::new(limits).evaluate("source == dest", &bindings());

    assert!(matches!(result, Err(EvalError::Timeout { .. })));
}

/// Tests the same expression passes pre-validation despite the zero deadline,
/// because the deadline applies only to evaluation.
#[test]
fn test_deadline_does_not_affect_prevalidation() {
    let limits = EvalLimits {
        timeout: Duration::ZERO,
        ..EvalLimits::default()
    };
    let result = Evaluator::new(limits).pre_validate("source == dest");

    assert!(result.is_ok());
}

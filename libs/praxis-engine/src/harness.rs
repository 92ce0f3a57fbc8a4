/// Test-Harness Generator
///
/// **Core Responsibility:**
/// Turn user code plus declarative test cases into one self-contained
/// JavaScript program whose final printed line is a machine-parseable
/// verdict payload.
///
/// **Script shape:**
/// - User code is inlined in a protective `try` block. If it throws, the
///   catch replaces the verdict list with exactly one synthetic
///   "Global Scope" verdict; the test phase lexically follows the user
///   code inside the same block, so the throw skips it entirely.
/// - The test phase shares the user code's scope: each case's input and
///   expected expressions are evaluated with direct `eval`, compared
///   structurally, and a per-case `try` keeps one failing case from
///   aborting the rest.
/// - The last printed line is `__VERDICTS__` immediately followed by the
///   JSON verdict array - an explicit frame, so user output that happens
///   to be a JSON array can never be mistaken for verdicts.
///
/// Test expressions intentionally execute in the same interpreter and
/// scope as the solution; the isolated worker is the only security
/// boundary here, not this script.

use anyhow::{Context as _, Result};
use handlebars::{no_escape, Handlebars};
use praxis_common::types::TestCase;
use serde_json::json;

/// Prefix of the structured verdict line in captured output.
pub const VERDICT_SENTINEL: &str = "__VERDICTS__";

const HARNESS_TEMPLATE: &str = r#"var __results = [];

function __praxisEq(a, b) {
    if (a === b) { return true; }
    if (typeof a === "number" && typeof b === "number") {
        return a !== a && b !== b;
    }
    if (typeof a !== "object" || typeof b !== "object" || a === null || b === null) {
        return false;
    }
    if (Array.isArray(a) !== Array.isArray(b)) { return false; }
    var keysA = Object.keys(a);
    var keysB = Object.keys(b);
    if (keysA.length !== keysB.length) { return false; }
    for (var i = 0; i < keysA.length; i += 1) {
        var key = keysA[i];
        if (!Object.prototype.hasOwnProperty.call(b, key)) { return false; }
        if (!__praxisEq(a[key], b[key])) { return false; }
    }
    return true;
}

function __praxisRepr(value) {
    if (value === undefined) { return "undefined"; }
    try {
        var rendered = JSON.stringify(value);
        if (rendered !== undefined) { return rendered; }
    } catch (ignored) {}
    return String(value);
}

function __praxisMessage(err) {
    if (err instanceof Error && typeof err.message === "string") {
        return err.message;
    }
    return String(err);
}

try {
{{{user_code}}}
;
    var __cases = {{{cases}}};
    for (var __i = 0; __i < __cases.length; __i += 1) {
        var __case = __cases[__i];
        try {
            var __actual = eval(__case.input);
            var __expected = eval(__case.expected);
            __results.push({
                passed: __praxisEq(__actual, __expected),
                input: __case.input,
                actual: __praxisRepr(__actual),
                expected: __praxisRepr(__expected)
            });
        } catch (__err) {
            __results.push({
                passed: false,
                input: __case.input,
                actual: "Error",
                expected: __case.expected,
                error: __praxisMessage(__err)
            });
        }
    }
} catch (__err) {
    __results = [{
        passed: false,
        input: "Global Scope",
        actual: __praxisMessage(__err),
        expected: "-",
        error: "Error executing user code"
    }];
}
print("{{{sentinel}}}" + JSON.stringify(__results));
"#;

/// Render the harness script for `user_code` against `test_cases`.
pub fn build_harness(user_code: &str, test_cases: &[TestCase]) -> Result<String> {
    let cases = serde_json::to_string(test_cases).context("failed to encode test cases")?;

    let mut registry = Handlebars::new();
    registry.register_escape_fn(no_escape);
    registry
        .render_template(
            HARNESS_TEMPLATE,
            &json!({
                "user_code": user_code,
                "cases": cases,
                "sentinel": VERDICT_SENTINEL,
            }),
        )
        .context("failed to render harness template")
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One declarative test case: a pair of JavaScript expression snippets.
///
/// Both sides are evaluated in the interpreter scope left behind by the
/// user's code, so solution functions and variables are visible to them.
/// Order within a problem is significant; duplicates are permitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub expected: String,
}

/// A coding exercise record. `id` is the persistence key; `starter_code`
/// is the pristine code a solution reset restores.
///
/// The external JSON shape uses camelCase keys (`starterCode`,
/// `testCases`). `title` and `testCases` are required for a document to
/// deserialize; the other fields default to empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub starter_code: String,
    pub test_cases: Vec<TestCase>,
}

/// Request dispatched to the execution worker. Produced fresh per run;
/// the id lets replies be matched back to their originating request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub id: Uuid,
    pub source_code: String,
}

/// Terminal reply for one request: exactly one per request, no streaming.
///
/// `captured_output` is the merged stdout/stderr stream, line-batched.
/// `error` is set when execution failed outside the user's own exception
/// handling; captured output is not guaranteed on that path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReply {
    pub id: Uuid,
    pub captured_output: String,
    pub structured_result: Option<String>,
    pub error: Option<String>,
}

/// Pass/fail outcome of one test case, as emitted by the harness script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVerdict {
    pub passed: bool,
    pub input: String,
    pub actual: String,
    pub expected: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

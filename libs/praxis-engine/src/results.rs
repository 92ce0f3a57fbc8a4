/// Result Interpreter
///
/// Given the accumulated output entries of a run, decide whether the run
/// produced a structured verdict sequence and extract it. Only the last
/// output entry is inspected, and only lines carrying the sentinel frame
/// qualify; anything else is plain console output, not an error.

use crate::harness::VERDICT_SENTINEL;
use praxis_common::types::TestVerdict;

/// Extract the verdict sequence from a finished run's output.
///
/// Returns `None` while a run is in flight, when no output exists, when
/// no sentinel-framed line is present in the last entry, or when the
/// framed payload is not a JSON array of verdicts.
pub fn extract_verdicts(output: &[String], is_running: bool) -> Option<Vec<TestVerdict>> {
    if is_running {
        return None;
    }
    let last_entry = output.last()?;
    let payload = last_entry
        .lines()
        .rev()
        .find_map(|line| line.trim().strip_prefix(VERDICT_SENTINEL))?;
    serde_json::from_str(payload).ok()
}

/// Output lines for console display: every line of every entry, with
/// sentinel-framed verdict lines filtered out.
pub fn console_lines(output: &[String]) -> Vec<String> {
    output
        .iter()
        .flat_map(|entry| entry.lines())
        .filter(|line| !line.trim().starts_with(VERDICT_SENTINEL))
        .map(str::to_string)
        .collect()
}

// Local problem/solution store
//
// Durable per-device state lives in one directory of plain files:
//   active-problem        id of the currently active problem
//   problem-<id>.json     full snapshot of that problem
//   solution-<id>.js      solution source, keyed separately per problem
//
// File names are deterministic functions of the problem id so readers and
// writers never drift. Problems are never deleted, only replaced/reset.

use crate::types::{Problem, TestCase};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const ACTIVE_PROBLEM_FILE: &str = "active-problem";

/// The bundled default problem: used on first run, as the fallback for
/// malformed persisted state, and as the factory-reset target.
pub fn default_problem() -> Problem {
    Problem {
        id: "sum-of-list".to_string(),
        title: "Sum of a List".to_string(),
        description: "Implement sumList(values) so it returns the sum of all numbers in \
                      the array. An empty array sums to 0."
            .to_string(),
        starter_code: "function sumList(values) {\n    // your code here\n    return 0;\n}"
            .to_string(),
        test_cases: vec![
            TestCase {
                input: "sumList([1, 2, 3])".to_string(),
                expected: "6".to_string(),
            },
            TestCase {
                input: "sumList([])".to_string(),
                expected: "0".to_string(),
            },
            TestCase {
                input: "sumList([-4, 9, 5])".to_string(),
                expected: "10".to_string(),
            },
        ],
    }
}

/// Keep ids safe to embed in file names.
fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '-'
            }
        })
        .collect()
}

pub struct ProblemStore {
    root: PathBuf,
}

impl ProblemStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create store directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn active_path(&self) -> PathBuf {
        self.root.join(ACTIVE_PROBLEM_FILE)
    }

    fn problem_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("problem-{}.json", sanitize_id(id)))
    }

    fn solution_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("solution-{}.js", sanitize_id(id)))
    }

    /// Load the active problem, falling back to the bundled default when
    /// nothing is stored yet or the snapshot fails to parse.
    pub fn active_problem(&self) -> Problem {
        let id = match fs::read_to_string(self.active_path()) {
            Ok(id) => id.trim().to_string(),
            Err(_) => return default_problem(),
        };

        let raw = match fs::read_to_string(self.problem_path(&id)) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(problem_id = %id, error = %err, "missing problem snapshot, using default");
                return default_problem();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(problem) => problem,
            Err(err) => {
                warn!(problem_id = %id, error = %err, "malformed problem snapshot, using default");
                default_problem()
            }
        }
    }

    /// Persist a problem snapshot and make it the active problem.
    pub fn save_problem(&self, problem: &Problem) -> Result<()> {
        let payload =
            serde_json::to_string_pretty(problem).context("failed to serialize problem")?;
        let path = self.problem_path(&problem.id);
        fs::write(&path, payload)
            .with_context(|| format!("failed to write {}", path.display()))?;
        fs::write(self.active_path(), &problem.id)
            .context("failed to update active problem pointer")?;
        Ok(())
    }

    pub fn load_solution(&self, problem_id: &str) -> Option<String> {
        fs::read_to_string(self.solution_path(problem_id)).ok()
    }

    pub fn save_solution(&self, problem_id: &str, code: &str) -> Result<()> {
        let path = self.solution_path(problem_id);
        fs::write(&path, code).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Rewrite the stored solution back to the problem's starter code.
    pub fn reset_solution(&self, problem: &Problem) -> Result<()> {
        self.save_solution(&problem.id, &problem.starter_code)
    }

    /// Restore the bundled default problem and discard its stored
    /// solution. Returns the restored problem.
    pub fn factory_reset(&self) -> Result<Problem> {
        let problem = default_problem();
        let solution = self.solution_path(&problem.id);
        if solution.exists() {
            fs::remove_file(&solution)
                .with_context(|| format!("failed to remove {}", solution.display()))?;
        }
        self.save_problem(&problem)?;
        Ok(problem)
    }
}

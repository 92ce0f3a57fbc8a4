// CLI commands: the reference consumer of the store and the engine

use anyhow::{Context, Result};
use praxis_common::io;
use praxis_common::store::ProblemStore;
use praxis_common::types::TestVerdict;
use praxis_engine::{build_harness, console_lines, extract_verdicts, EngineConfig, ExecutionBridge};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Run a solution against the active problem and print the verdicts.
pub async fn run(
    store: &ProblemStore,
    solution: Option<&Path>,
    timeout_ms: Option<u64>,
) -> Result<()> {
    let problem = store.active_problem();

    let code = match solution {
        Some(path) => {
            let code = fs::read_to_string(path)
                .with_context(|| format!("failed to read solution {}", path.display()))?;
            // The supplied file becomes the stored solution for this
            // problem, like any other edit.
            store.save_solution(&problem.id, &code)?;
            code
        }
        None => store
            .load_solution(&problem.id)
            .unwrap_or_else(|| problem.starter_code.clone()),
    };

    let mut config = EngineConfig::from_env();
    if let Some(ms) = timeout_ms {
        config.run_timeout = if ms == 0 {
            None
        } else {
            Some(Duration::from_millis(ms))
        };
    }

    info!(
        problem_id = %problem.id,
        test_cases = problem.test_cases.len(),
        source_bytes = code.len(),
        "running solution"
    );

    let script = build_harness(&code, &problem.test_cases)?;
    let bridge = ExecutionBridge::new(config)?;
    bridge.run(&script);

    while bridge.is_running() {
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    let output = bridge.output();
    let console = console_lines(&output);
    if !console.is_empty() {
        println!("→ Console output");
        for line in &console {
            println!("  {line}");
        }
        println!();
    }

    match extract_verdicts(&output, bridge.is_running()) {
        Some(verdicts) => print_verdicts(&verdicts),
        None => println!("→ No test verdicts produced"),
    }

    Ok(())
}

fn print_verdicts(verdicts: &[TestVerdict]) {
    let passed = verdicts.iter().filter(|v| v.passed).count();
    println!("→ Results: {} / {} passed", passed, verdicts.len());

    for verdict in verdicts {
        if verdict.passed {
            println!("  ✓ {}", verdict.input);
        } else {
            println!("  ✗ {}", verdict.input);
            match &verdict.error {
                Some(error) => println!("    Error: {error}"),
                None => {
                    println!("    Expected: {}", verdict.expected);
                    println!("    Actual:   {}", verdict.actual);
                }
            }
        }
    }
}

/// Import a problem file and make it active. On rejection the active
/// problem is left unchanged.
pub fn import(store: &ProblemStore, file: &Path) -> Result<()> {
    let problem = io::import_problem(file)?;
    store.save_problem(&problem)?;
    println!("→ Imported \"{}\" (id: {})", problem.title, problem.id);
    Ok(())
}

/// Export the active problem as `<slug>.json` in `out_dir`.
pub fn export(store: &ProblemStore, out_dir: &Path) -> Result<()> {
    let problem = store.active_problem();
    let path = io::export_problem(&problem, out_dir)?;
    println!("→ Exported \"{}\" to {}", problem.title, path.display());
    Ok(())
}

pub fn show(store: &ProblemStore) {
    let problem = store.active_problem();
    println!("{}", problem.title);
    if !problem.description.is_empty() {
        println!("{}", problem.description);
    }
    println!();
    println!("Starter code:");
    for line in problem.starter_code.lines() {
        println!("  {line}");
    }
    println!();
    println!("Test cases:");
    for case in &problem.test_cases {
        println!("  {} → {}", case.input, case.expected);
    }
}

pub fn reset_solution(store: &ProblemStore) -> Result<()> {
    let problem = store.active_problem();
    store.reset_solution(&problem)?;
    println!("→ Solution reset to starter code for \"{}\"", problem.title);
    Ok(())
}

pub fn factory_reset(store: &ProblemStore) -> Result<()> {
    let problem = store.factory_reset()?;
    println!("→ Restored default problem \"{}\"", problem.title);
    Ok(())
}

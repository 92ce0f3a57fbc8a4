//! End-to-end tests for the execution pipeline: harness generation,
//! dispatch through the bridge, worker execution, verdict extraction.
//!
//! These run real scripts on the embedded interpreter; each test owns its
//! bridge (and therefore its interpreter thread).

#[cfg(test)]
mod pipeline_tests {
    use crate::bridge::ExecutionBridge;
    use crate::config::EngineConfig;
    use crate::harness::build_harness;
    use crate::results::{console_lines, extract_verdicts};
    use praxis_common::types::{TestCase, TestVerdict};
    use std::time::{Duration, Instant};

    fn case(input: &str, expected: &str) -> TestCase {
        TestCase {
            input: input.to_string(),
            expected: expected.to_string(),
        }
    }

    fn bridge() -> ExecutionBridge {
        ExecutionBridge::new(EngineConfig::default()).expect("failed to create bridge")
    }

    async fn wait_until_idle(bridge: &ExecutionBridge) {
        let deadline = Instant::now() + Duration::from_secs(30);
        while bridge.is_running() {
            assert!(Instant::now() < deadline, "run did not complete in time");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    async fn run_to_completion(bridge: &ExecutionBridge, source: &str) -> Vec<String> {
        bridge.run(source);
        wait_until_idle(bridge).await;
        bridge.output()
    }

    async fn run_tests(
        bridge: &ExecutionBridge,
        user_code: &str,
        cases: &[TestCase],
    ) -> Vec<TestVerdict> {
        let script = build_harness(user_code, cases).unwrap();
        let output = run_to_completion(bridge, &script).await;
        extract_verdicts(&output, bridge.is_running()).expect("no verdicts produced")
    }

    #[tokio::test]
    async fn test_single_passing_case() {
        let bridge = bridge();
        let verdicts = run_tests(&bridge, "", &[case("1+1", "2")]).await;

        assert_eq!(
            verdicts,
            vec![TestVerdict {
                passed: true,
                input: "1+1".to_string(),
                actual: "2".to_string(),
                expected: "2".to_string(),
                error: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_solution_functions_visible_to_cases() {
        let bridge = bridge();
        let verdicts = run_tests(
            &bridge,
            "function add(a, b) { return a + b; }",
            &[case("add(2, 3)", "5"), case("add(\"a\", \"b\")", "\"ab\"")],
        )
        .await;

        assert_eq!(verdicts.len(), 2);
        assert!(verdicts.iter().all(|v| v.passed));
    }

    #[tokio::test]
    async fn test_global_failure_yields_one_synthetic_verdict() {
        let bridge = bridge();
        let verdicts = run_tests(
            &bridge,
            "throw new Error(\"boom\")",
            &[case("1", "1"), case("2", "2")],
        )
        .await;

        assert_eq!(
            verdicts,
            vec![TestVerdict {
                passed: false,
                input: "Global Scope".to_string(),
                actual: "boom".to_string(),
                expected: "-".to_string(),
                error: Some("Error executing user code".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_global_failure_with_zero_cases() {
        let bridge = bridge();
        let verdicts = run_tests(&bridge, "undefinedVariable.property", &[]).await;
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].input, "Global Scope");
    }

    #[tokio::test]
    async fn test_per_case_failure_does_not_abort_others() {
        let bridge = bridge();
        let verdicts = run_tests(
            &bridge,
            "",
            &[case("1+1", "2"), case("__noSuchFn()", "1"), case("2+2", "4")],
        )
        .await;

        assert_eq!(verdicts.len(), 3);
        assert!(verdicts[0].passed);
        assert!(verdicts[2].passed);

        assert!(!verdicts[1].passed);
        assert_eq!(verdicts[1].actual, "Error");
        // The expected string stays unevaluated on this path.
        assert_eq!(verdicts[1].expected, "1");
        assert!(verdicts[1].error.is_some());
    }

    #[tokio::test]
    async fn test_structural_equality() {
        let bridge = bridge();
        let verdicts = run_tests(
            &bridge,
            "function pair() { return { a: [1, 2], b: \"x\" }; }",
            &[
                case("[1, 2].concat([3])", "[1, 2, 3]"),
                case("pair()", "({ a: [1, 2], b: \"x\" })"),
                case("NaN", "NaN"),
                case("[1, 2]", "[2, 1]"),
            ],
        )
        .await;

        assert!(verdicts[0].passed);
        assert_eq!(verdicts[0].actual, "[1,2,3]");
        assert!(verdicts[1].passed);
        assert!(verdicts[2].passed);
        assert!(!verdicts[3].passed);
    }

    #[tokio::test]
    async fn test_verdict_count_and_order_match_cases() {
        let bridge = bridge();
        let cases: Vec<TestCase> =
            (0..5).map(|n| case(&format!("{n}"), &format!("{n}"))).collect();
        let verdicts = run_tests(&bridge, "", &cases).await;

        assert_eq!(verdicts.len(), cases.len());
        for (verdict, case) in verdicts.iter().zip(&cases) {
            assert_eq!(verdict.input, case.input);
        }
    }

    #[tokio::test]
    async fn test_same_run_twice_is_idempotent() {
        let bridge = bridge();
        let user_code = "function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); }";
        let cases = [case("fib(10)", "55"), case("fib(1)", "1")];

        let first = run_tests(&bridge, user_code, &cases).await;
        let second = run_tests(&bridge, user_code, &cases).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_incidental_prints_coexist_with_verdicts() {
        let bridge = bridge();
        let script = build_harness(
            "print(\"hello\"); print(\"world\");",
            &[case("1+1", "2")],
        )
        .unwrap();
        let output = run_to_completion(&bridge, &script).await;

        assert_eq!(
            console_lines(&output),
            vec!["hello".to_string(), "world".to_string()]
        );
        let verdicts = extract_verdicts(&output, false).unwrap();
        assert!(verdicts[0].passed);
    }

    #[tokio::test]
    async fn test_user_printed_json_array_is_not_misclassified() {
        let bridge = bridge();
        // Raw run, no harness: the printed array carries no sentinel frame.
        let output = run_to_completion(&bridge, "print('[{\"passed\": true}]')").await;

        assert_eq!(extract_verdicts(&output, false), None);
        assert_eq!(
            console_lines(&output),
            vec!["[{\"passed\": true}]".to_string()]
        );
    }

    #[tokio::test]
    async fn test_invalid_script_surfaces_as_error_line() {
        let bridge = bridge();
        let output = run_to_completion(&bridge, "this is not javascript {").await;

        assert_eq!(output.len(), 1);
        assert!(output[0].starts_with("Error: "));
        assert_eq!(extract_verdicts(&output, false), None);
    }

    #[tokio::test]
    async fn test_output_resets_between_runs() {
        let bridge = bridge();
        let first = run_to_completion(&bridge, "print(\"first\")").await;
        assert_eq!(first, vec!["first".to_string()]);

        let second = run_to_completion(&bridge, "print(\"second\")").await;
        assert_eq!(second, vec!["second".to_string()]);
    }

    #[tokio::test]
    async fn test_expression_result_is_not_output() {
        let bridge = bridge();
        let output = run_to_completion(&bridge, "1 + 2").await;
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_superseded_run_reply_is_dropped() {
        // No wall-clock budget: only id correlation decides which reply
        // is attributed to the session.
        let config = EngineConfig {
            run_timeout: None,
            ..EngineConfig::default()
        };
        let bridge = ExecutionBridge::new(config).unwrap();

        // The slow first run prints a marker the session must not
        // inherit once it has been superseded.
        bridge.run("var __n = 0; while (__n < 5000000) { __n += 1; } print(\"stale\");");
        bridge.run("print(\"fresh\")");

        wait_until_idle(&bridge).await;

        // The worker executed both requests in arrival order; the first
        // reply arrived for a superseded id and was dropped.
        assert_eq!(bridge.output(), vec!["fresh".to_string()]);
    }

    #[tokio::test]
    async fn test_wall_clock_budget_finishes_runaway_run() {
        let config = EngineConfig {
            run_timeout: Some(Duration::from_millis(100)),
            loop_iteration_limit: u64::MAX,
            ..EngineConfig::default()
        };
        let bridge = ExecutionBridge::new(config).unwrap();

        bridge.run("while (true) {}");
        let deadline = Instant::now() + Duration::from_secs(5);
        while bridge.is_running() {
            assert!(Instant::now() < deadline, "timeout never fired");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let output = bridge.output();
        assert_eq!(output.len(), 1);
        assert!(output[0].starts_with("Error: execution timed out after"));
        // The interpreter thread stays abandoned on its loop; dropping the
        // bridge detaches it rather than joining.
    }
}

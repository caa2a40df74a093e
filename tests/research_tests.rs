//! Integration tests for supervised research and the orchestrator
//!
//! These tests verify the end-to-end research workflow with scripted models:
//! - Concurrency cap and overflow findings
//! - Iteration budget and stop reasons
//! - Failure isolation between parallel researchers
//! - Clarification, brief, report and cancellation behavior

mod common;

use ares_research::research::prompts::{COMPRESS_SYSTEM, FINAL_REPORT_SYSTEM, INSUFFICIENT_INFORMATION};
use ares_research::research::supervisor::{overflow_message, Supervisor};
use ares_research::research::{
    ResearchConfig, ResearchObserver, ResearchOrchestrator, ResearchOutcome, SupervisorPhase,
};
use ares_research::tools::Tool;
use ares_research::types::{AppError, ConversationMessage};
use common::mocks::{calls, context, registry_with, tool_call, CannedSearchTool, ScriptedLLMClient};
use parking_lot::Mutex;
use rstest::rstest;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn plan(topics: &[&str]) -> Value {
    let tasks: Vec<Value> = topics
        .iter()
        .enumerate()
        .map(|(i, topic)| json!({ "id": format!("t{}", i + 1), "topic": topic, "priority": i }))
        .collect();
    json!({ "is_complete": false, "tasks": tasks })
}

fn complete() -> Value {
    json!({ "is_complete": true, "tasks": [] })
}

fn config() -> ResearchConfig {
    ResearchConfig::default().with_clarification(false)
}

/// Researchers search their topic once, then stop.
fn searching_client() -> ScriptedLLMClient {
    ScriptedLLMClient::new()
        .with_tool_script(|topic, round| {
            if round == 0 {
                Ok(calls(vec![tool_call("", "web_search", json!({ "query": topic }))]))
            } else {
                Ok(calls(vec![]))
            }
        })
        .with_text_script(|system, prompt| {
            if system == COMPRESS_SYSTEM {
                Ok("Compressed notes without links.".to_string())
            } else if system == FINAL_REPORT_SYSTEM {
                assert!(prompt.contains("<Findings>"));
                Ok("# Heat Pump Report\n\nSubsidies differ by country [1].".to_string())
            } else {
                Ok(String::new())
            }
        })
}

// ============= Supervisor =============

#[rstest]
#[case(3, 2)]
#[case(5, 5)]
#[case(6, 1)]
#[case(1, 3)]
#[tokio::test]
async fn test_overflow_tasks_become_findings(#[case] planned: usize, #[case] max_concurrent: usize) {
    let topics: Vec<String> = (1..=planned).map(|i| format!("topic {}", i)).collect();
    let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
    let client = Arc::new(
        ScriptedLLMClient::new()
            .push_structured("ResearchPlan", plan(&topic_refs))
            .push_structured("ResearchPlan", complete())
            .with_tool_delay(Duration::from_millis(20)),
    );
    let ctx = context(
        client.clone(),
        config().with_max_concurrent_research(max_concurrent),
        registry_with(vec![]),
    );

    let outcome = Supervisor::new(ctx)
        .conduct_supervised_research("brief", vec![])
        .await
        .unwrap();

    let executed = planned.min(max_concurrent);
    let overflowed = planned - executed;
    assert_eq!(outcome.findings.len(), planned);
    assert_eq!(outcome.tasks_planned, planned);
    assert_eq!(outcome.tasks_executed, executed);
    assert_eq!(outcome.tasks_overflowed, overflowed);
    assert_eq!(client.tool_turns(), executed);
    assert!(client.max_in_flight() <= max_concurrent);

    for finding in &outcome.findings[..executed] {
        assert_eq!(finding, INSUFFICIENT_INFORMATION);
    }
    for (finding, topic) in outcome.findings[executed..].iter().zip(&topics[executed..]) {
        assert_eq!(finding, &overflow_message(topic, max_concurrent));
    }
    assert!(outcome.is_complete);
}

#[tokio::test]
async fn test_researchers_run_in_parallel() {
    let client = Arc::new(
        ScriptedLLMClient::new()
            .push_structured("ResearchPlan", plan(&["a", "b", "c"]))
            .push_structured("ResearchPlan", complete())
            .with_tool_delay(Duration::from_millis(100)),
    );
    let ctx = context(
        client.clone(),
        config().with_max_concurrent_research(3),
        registry_with(vec![]),
    );

    Supervisor::new(ctx)
        .conduct_supervised_research("brief", vec![])
        .await
        .unwrap();

    assert_eq!(client.max_in_flight(), 3);
}

#[tokio::test]
async fn test_overflow_follows_plan_order_not_priority() {
    let client = Arc::new(
        ScriptedLLMClient::new()
            .push_structured(
                "ResearchPlan",
                json!({ "is_complete": false, "tasks": [
                    { "id": "late", "topic": "nice to have", "priority": 9 },
                    { "id": "core", "topic": "core question", "priority": 0 },
                ]}),
            )
            .push_structured("ResearchPlan", complete()),
    );
    let ctx = context(
        client,
        config().with_max_concurrent_research(1),
        registry_with(vec![]),
    );

    let outcome = Supervisor::new(ctx)
        .conduct_supervised_research("brief", vec![])
        .await
        .unwrap();

    assert_eq!(outcome.findings.len(), 2);
    assert_ne!(outcome.findings[0], overflow_message("nice to have", 1));
    assert_eq!(outcome.findings[1], overflow_message("core question", 1));
}

#[rstest]
#[case(plan(&["never runs"]), SupervisorPhase::BudgetExhausted, false)]
#[case(complete(), SupervisorPhase::Converged, true)]
#[tokio::test]
async fn test_zero_iteration_budget(
    #[case] first_plan: Value,
    #[case] expected_phase: SupervisorPhase,
    #[case] expected_complete: bool,
) {
    let client = Arc::new(ScriptedLLMClient::new().push_structured("ResearchPlan", first_plan));
    let ctx = context(
        client.clone(),
        config().with_max_research_iterations(0),
        registry_with(vec![]),
    );

    let outcome = Supervisor::new(ctx)
        .conduct_supervised_research("brief", vec![])
        .await
        .unwrap();

    assert_eq!(client.structured_calls("ResearchPlan"), 1);
    assert_eq!(client.tool_turns(), 0);
    assert_eq!(outcome.iterations, 0);
    assert!(outcome.findings.is_empty());
    assert_eq!(outcome.stop_reason, expected_phase);
    assert_eq!(outcome.is_complete, expected_complete);
}

#[tokio::test]
async fn test_iteration_budget_stops_non_converging_planner() {
    let client = Arc::new(ScriptedLLMClient::new().push_structured("ResearchPlan", plan(&["again"])));
    let ctx = context(
        client.clone(),
        config().with_max_research_iterations(2),
        registry_with(vec![]),
    );

    let outcome = Supervisor::new(ctx)
        .conduct_supervised_research("brief", vec![])
        .await
        .unwrap();

    assert_eq!(outcome.iterations, 2);
    assert_eq!(client.structured_calls("ResearchPlan"), 3);
    assert_eq!(outcome.findings.len(), 2);
    assert_eq!(outcome.stop_reason, SupervisorPhase::BudgetExhausted);
    assert!(!outcome.is_complete);
}

#[tokio::test]
async fn test_empty_plan_stops_without_completion() {
    let client = Arc::new(
        ScriptedLLMClient::new().push_structured("ResearchPlan", json!({ "is_complete": false, "tasks": [] })),
    );
    let ctx = context(client.clone(), config(), registry_with(vec![]));

    let outcome = Supervisor::new(ctx)
        .conduct_supervised_research("brief", vec!["prior finding".to_string()])
        .await
        .unwrap();

    assert_eq!(outcome.stop_reason, SupervisorPhase::NoFurtherTasks);
    assert!(!outcome.is_complete);
    assert_eq!(outcome.findings, vec!["prior finding".to_string()]);
    assert_eq!(client.structured_calls("ResearchPlan"), 1);
}

#[tokio::test]
async fn test_planning_failure_keeps_prior_findings() {
    let client = Arc::new(
        ScriptedLLMClient::new()
            .push_structured("ResearchPlan", plan(&["first"]))
            .push_structured_error("ResearchPlan", "planner offline"),
    );
    let ctx = context(client, config(), registry_with(vec![]));

    let outcome = Supervisor::new(ctx)
        .conduct_supervised_research("brief", vec![])
        .await
        .unwrap();

    assert!(matches!(outcome.stop_reason, SupervisorPhase::PlanningFailed(ref e) if e.contains("planner offline")));
    assert_eq!(outcome.findings, vec![INSUFFICIENT_INFORMATION.to_string()]);
    assert!(!outcome.is_complete);
}

#[tokio::test]
async fn test_failing_researcher_is_isolated() {
    let client = Arc::new(
        ScriptedLLMClient::new()
            .push_structured("ResearchPlan", plan(&["healthy topic", "broken topic", "explosive topic"]))
            .push_structured("ResearchPlan", complete())
            .with_tool_script(|topic, _| match topic {
                "broken topic" => Err(AppError::LLM("context length exceeded".to_string())),
                "explosive topic" => panic!("researcher state corrupted"),
                _ => Ok(calls(vec![])),
            }),
    );
    let ctx = context(client, config(), registry_with(vec![]));

    let outcome = Supervisor::new(ctx)
        .conduct_supervised_research("brief", vec![])
        .await
        .unwrap();

    assert_eq!(outcome.findings.len(), 3);
    assert_eq!(outcome.findings[0], INSUFFICIENT_INFORMATION);
    assert_eq!(
        outcome.findings[1],
        "Error researching \"broken topic\": LLM error: context length exceeded"
    );
    assert!(outcome.findings[2].starts_with("Error researching \"explosive topic\":"));
    assert!(outcome.findings[2].contains("researcher state corrupted"));
    assert!(outcome.is_complete);
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl ResearchObserver for RecordingObserver {
    fn on_plan(&self, iteration: usize, task_count: usize, is_complete: bool) {
        self.events
            .lock()
            .push(format!("plan {} {} {}", iteration, task_count, is_complete));
    }

    fn on_dispatch(&self, iteration: usize, executed: usize, overflowed: usize) {
        self.events
            .lock()
            .push(format!("dispatch {} {} {}", iteration, executed, overflowed));
    }

    fn on_supervisor_finished(&self, phase: &SupervisorPhase, iterations: usize) {
        self.events.lock().push(format!("finished {:?} {}", phase, iterations));
    }
}

#[tokio::test]
async fn test_observer_sees_budget_counters() {
    let client = Arc::new(
        ScriptedLLMClient::new()
            .push_structured("ResearchPlan", plan(&["a", "b", "c"]))
            .push_structured("ResearchPlan", complete()),
    );
    let observer = Arc::new(RecordingObserver::default());
    let ctx = context(
        client,
        config().with_max_concurrent_research(2),
        registry_with(vec![]),
    )
    .with_observer(observer.clone());

    Supervisor::new(ctx)
        .conduct_supervised_research("brief", vec![])
        .await
        .unwrap();

    assert_eq!(
        *observer.events.lock(),
        vec![
            "plan 0 3 false".to_string(),
            "dispatch 0 2 1".to_string(),
            "plan 1 0 true".to_string(),
            "finished Converged 1".to_string(),
        ]
    );
}

// ============= Orchestrator =============

#[tokio::test]
async fn test_end_to_end_report() {
    let search_tool = Arc::new(CannedSearchTool::new());
    let client = Arc::new(
        searching_client()
            .push_structured(
                "ClarifyWithUser",
                json!({ "need_clarification": false, "verification": "I will compare subsidy schemes." }),
            )
            .push_structured(
                "ResearchQuestion",
                json!({ "research_brief": "I want to compare heat pump subsidies in Germany and France." }),
            )
            .push_structured("ResearchPlan", plan(&["germany subsidies", "france subsidies"]))
            .push_structured("ResearchPlan", complete()),
    );
    let ctx = context(
        client.clone(),
        ResearchConfig::default(),
        registry_with(vec![search_tool.clone() as Arc<dyn Tool>]),
    );

    let outcome = ResearchOrchestrator::new(ctx)
        .run(vec![ConversationMessage::user("Compare heat pump subsidies in DE and FR")])
        .await
        .unwrap();

    let ResearchOutcome::Report(report) = outcome else {
        panic!("expected a report");
    };
    assert!(report.is_complete);
    assert_eq!(report.stats.stop_reason, SupervisorPhase::Converged);
    assert_eq!(report.stats.supervisor_iterations, 1);
    assert_eq!(report.stats.tasks_executed, 2);
    assert_eq!(report.research_brief, "I want to compare heat pump subsidies in Germany and France.");
    assert_eq!(report.findings.len(), 2);
    assert!(report.findings[0].contains("https://search.example/germany-subsidies"));
    assert!(report.findings[1].contains("https://search.example/france-subsidies"));
    assert_eq!(report.raw_notes.len(), 2);
    assert_eq!(search_tool.executions.load(Ordering::SeqCst), 2);

    assert!(report.report.starts_with("# Heat Pump Report"));
    assert!(report.report.contains("### Sources"));
    let urls: Vec<_> = report.sources.iter().filter_map(|s| s.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            "https://search.example/germany-subsidies".to_string(),
            "https://search.example/france-subsidies".to_string(),
        ]
    );
    assert_eq!(report.sources[0].number, 1);

    // The verification message is part of the transcript the brief is written from.
    let prompts = client.prompts();
    let brief_prompt = prompts
        .iter()
        .find(|p| p.contains("I will compare subsidy schemes."))
        .expect("brief prompt includes verification");
    assert!(brief_prompt.contains("assistant: I will compare subsidy schemes."));
    // two compressions and the report
    assert_eq!(client.text_calls(), 3);
    assert_eq!(client.structured_calls("ResearchPlan"), 2);
}

#[tokio::test]
async fn test_single_iteration_budget_summarize() {
    let client = Arc::new(
        searching_client()
            .push_structured(
                "ResearchQuestion",
                json!({ "research_brief": "I want a summary of X." }),
            )
            .push_structured("ResearchPlan", plan(&["x history", "x adoption", "x criticism"]))
            .push_structured("ResearchPlan", plan(&["x follow up"])),
    );
    let ctx = context(
        client.clone(),
        ResearchConfig::default()
            .with_clarification(false)
            .with_max_concurrent_research(2)
            .with_max_research_iterations(1)
            .with_max_tool_calls(1),
        registry_with(vec![Arc::new(CannedSearchTool::new())]),
    );

    let outcome = ResearchOrchestrator::new(ctx)
        .run(vec![ConversationMessage::user("Summarize X")])
        .await
        .unwrap();

    let ResearchOutcome::Report(report) = outcome else {
        panic!("expected a report");
    };
    assert_eq!(client.structured_calls("ClarifyWithUser"), 0);
    assert_eq!(client.structured_calls("ResearchQuestion"), 1);
    assert_eq!(client.structured_calls("ResearchPlan"), 2);
    assert_eq!(report.stats.supervisor_iterations, 1);
    assert_eq!(report.stats.tasks_executed, 2);
    assert_eq!(report.stats.tasks_overflowed, 1);
    assert!(client.max_in_flight() <= 2);
    // one tool round per researcher
    assert_eq!(client.tool_turns(), 2);
    assert_eq!(report.findings.len(), 3);
    assert_eq!(report.findings[2], overflow_message("x criticism", 2));
    assert!(!report.is_complete);
    assert_eq!(report.stats.stop_reason, SupervisorPhase::BudgetExhausted);
    assert!(!report.report.is_empty());
    assert!(report.report.contains("Sources"));
}

#[tokio::test]
async fn test_clarification_short_circuits() {
    let client = Arc::new(searching_client().push_structured(
        "ClarifyWithUser",
        json!({ "need_clarification": true, "question": "Which countries should I compare?" }),
    ));
    let ctx = context(client.clone(), ResearchConfig::default(), registry_with(vec![]));

    let answer = ResearchOrchestrator::new(ctx)
        .conduct_research("compare subsidies")
        .await
        .unwrap();

    assert_eq!(answer, "Which countries should I compare?");
    assert_eq!(client.structured_calls("ResearchQuestion"), 0);
    assert_eq!(client.structured_calls("ResearchPlan"), 0);
    assert_eq!(client.tool_turns(), 0);
    assert_eq!(client.text_calls(), 0);
}

#[tokio::test]
async fn test_clarification_disabled_skips_clarify_call() {
    let client = Arc::new(
        searching_client()
            .push_structured("ResearchQuestion", json!({ "research_brief": "brief" }))
            .push_structured("ResearchPlan", complete()),
    );
    let ctx = context(client.clone(), config(), registry_with(vec![]));

    let report = ResearchOrchestrator::new(ctx)
        .conduct_research("anything")
        .await
        .unwrap();

    assert!(report.starts_with("# Heat Pump Report"));
    assert_eq!(client.structured_calls("ClarifyWithUser"), 0);
    assert!(report.contains("No sources were gathered during research."));
}

#[tokio::test]
async fn test_planning_failure_still_produces_partial_report() {
    let client = Arc::new(
        searching_client()
            .push_structured("ResearchQuestion", json!({ "research_brief": "brief" }))
            .push_structured_error("ResearchPlan", "planner offline"),
    );
    let ctx = context(client.clone(), config(), registry_with(vec![]));

    let outcome = ResearchOrchestrator::new(ctx)
        .run(vec![ConversationMessage::user("question")])
        .await
        .unwrap();

    let ResearchOutcome::Report(report) = outcome else {
        panic!("expected a report");
    };
    assert!(!report.is_complete);
    assert!(matches!(report.stats.stop_reason, SupervisorPhase::PlanningFailed(_)));
    assert_eq!(client.text_calls(), 1);
}

#[tokio::test]
async fn test_brief_failure_is_fatal() {
    let client = Arc::new(searching_client().push_structured_error("ResearchQuestion", "bad json"));
    let ctx = context(client.clone(), config(), registry_with(vec![]));

    let err = ResearchOrchestrator::new(ctx)
        .conduct_research("question")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::LLM(_)));
    assert_eq!(client.structured_calls("ResearchPlan"), 0);
}

#[tokio::test]
async fn test_report_failure_is_fatal() {
    let client = Arc::new(
        ScriptedLLMClient::new()
            .push_structured("ResearchQuestion", json!({ "research_brief": "brief" }))
            .push_structured("ResearchPlan", complete())
            .with_text_script(|_, _| Err(AppError::LLM("report model crashed".to_string()))),
    );
    let ctx = context(client, config(), registry_with(vec![]));

    let err = ResearchOrchestrator::new(ctx)
        .conduct_research("question")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("report model crashed"));
}

#[rstest]
#[case(vec![])]
#[case(vec![ConversationMessage::user("   ")])]
#[case(vec![ConversationMessage::system("only a system prompt")])]
#[tokio::test]
async fn test_empty_request_is_rejected(#[case] messages: Vec<ConversationMessage>) {
    let client = Arc::new(ScriptedLLMClient::new());
    let ctx = context(client.clone(), ResearchConfig::default(), registry_with(vec![]));

    let err = ResearchOrchestrator::new(ctx).run(messages).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let client = Arc::new(ScriptedLLMClient::new().push_structured("ResearchQuestion", json!({ "research_brief": "b" })));
    let ctx = context(client.clone(), config(), registry_with(vec![]));
    ctx.cancel.cancel();

    let err = ResearchOrchestrator::new(ctx)
        .conduct_research("question")
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(client.structured_calls("ResearchQuestion"), 0);
}

#[tokio::test]
async fn test_cancellation_interrupts_running_researchers() {
    let client = Arc::new(
        searching_client()
            .push_structured("ResearchQuestion", json!({ "research_brief": "brief" }))
            .push_structured("ResearchPlan", plan(&["slow a", "slow b"]))
            .with_tool_delay(Duration::from_secs(30)),
    );
    let ctx = context(client.clone(), config(), registry_with(vec![]));
    let cancel = ctx.cancel.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        ResearchOrchestrator::new(ctx).conduct_research("question"),
    )
    .await
    .expect("cancellation should stop the session promptly");

    assert!(matches!(result, Err(AppError::Cancelled)));
    assert_eq!(client.text_calls(), 0);
}

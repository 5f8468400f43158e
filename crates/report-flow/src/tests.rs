/// End-to-end flow runs against an in-process model double.
#[cfg(test)]
mod flows {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::{
        FailureKind, FlowError, FlowOptions, FlowRunner, ModelClient, ModelError, ModelRequest,
        ModelResponse, ReportSlot, RiskFlow, RiskInput, RiskLevel, ScopeCreepFlow,
        ScopeCreepInput, SprintPlanFlow, SprintPlanInput, TokenUsage,
    };

    enum Reply {
        Output(serde_json::Value),
        Nothing,
        Fail(fn() -> ModelError),
    }

    /// Replies with a canned answer and records every request it receives.
    struct Scripted {
        reply: Reply,
        seen: Mutex<Vec<ModelRequest>>,
    }

    impl Scripted {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn last_prompt(&self) -> String {
            self.seen.lock().unwrap().last().unwrap().prompt.clone()
        }
    }

    #[async_trait]
    impl ModelClient for Scripted {
        async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Reply::Output(v) => Ok(ModelResponse {
                    output: Some(v.clone()),
                    text: String::new(),
                    model: "test-model".into(),
                    usage: Some(TokenUsage {
                        input_tokens: 120,
                        output_tokens: 40,
                    }),
                }),
                Reply::Nothing => Ok(ModelResponse {
                    text: "I could not produce a plan.".into(),
                    model: "test-model".into(),
                    ..Default::default()
                }),
                Reply::Fail(make) => Err(make()),
            }
        }
    }

    fn runner(client: Arc<Scripted>) -> FlowRunner {
        FlowRunner::new(client, FlowOptions::default())
    }

    fn sprint_input() -> SprintPlanInput {
        SprintPlanInput {
            tasks_text: "Fix bug – High – 3\nFix bug – High – 3\nWrite docs – Low – 1".into(),
            sprint_duration: Some("2 weeks".into()),
            ..Default::default()
        }
    }

    // ---------------------------------------------------------------------------
    // Sprint planning
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn sprint_plan_prompt_is_deduplicated_and_missing_heading_is_format_error() {
        let client = Scripted::new(Reply::Output(json!({
            "plan": "Take both tasks.\n\n## Deferred Tasks\nNone"
        })));
        let err = runner(client.clone())
            .run::<SprintPlanFlow>(&sprint_input())
            .await
            .unwrap_err();

        let prompt = client.last_prompt();
        assert_eq!(prompt.matches("Fix bug – High – 3").count(), 1);
        assert!(prompt.contains("Sprint Duration: 2 weeks"));
        assert_eq!(err.kind(), FailureKind::FormatError);
        assert!(err.to_string().contains("## Sprint Plan"));
    }

    #[tokio::test]
    async fn sprint_plan_success_carries_metadata() {
        let client = Scripted::new(Reply::Output(json!({
            "plan": "## Sprint Plan\n- Fix bug\n\n## Deferred Tasks\n- Write docs",
            "warnings": "Docs unestimated"
        })));
        let report = runner(client.clone())
            .run::<SprintPlanFlow>(&sprint_input())
            .await
            .unwrap();
        assert_eq!(report.flow, "sprint_plan");
        assert_eq!(report.model, "test-model");
        assert_eq!(report.usage.unwrap().output_tokens, 40);
        assert_eq!(report.output.warnings.as_deref(), Some("Docs unestimated"));

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].schema_name, "sprint_plan");
        assert!((seen[0].temperature - 0.4).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_model() {
        let client = Scripted::new(Reply::Nothing);
        let err = runner(client.clone())
            .run::<SprintPlanFlow>(&SprintPlanInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidInput);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn schema_violation_is_invalid_output() {
        let client = Scripted::new(Reply::Output(json!({
            "analysis": "Grew a lot",
            "creep_level": "Extreme"
        })));
        let err = runner(client)
            .run::<ScopeCreepFlow>(&ScopeCreepInput {
                current_tasks: "A\nB".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidOutput { flow: "scope_creep", .. }));
    }

    // ---------------------------------------------------------------------------
    // Risk
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn unassigned_critical_task_is_flagged_without_team_context() {
        let client = Scripted::new(Reply::Output(json!({
            "member_risks": [],
            "task_risks": [],
            "overall_assessment": "One task needs an owner.",
            "recommendations": ["Assign T1"]
        })));
        let report = runner(client.clone())
            .run::<RiskFlow>(&RiskInput {
                tasks_json: r#"[{"id":"1","title":"T1","status":"To Do","priority":"Critical"}]"#
                    .into(),
                team_context: None,
            })
            .await
            .unwrap();

        assert!(!client.last_prompt().contains("Team Context:"));
        let flagged = report
            .output
            .task_risks
            .iter()
            .find(|r| r.task_id == "1")
            .expect("task 1 flagged");
        assert!(flagged.risk_level >= RiskLevel::High);
        assert!(flagged
            .risk_factors
            .iter()
            .any(|f| f.to_lowercase().contains("unassigned")));
    }

    // ---------------------------------------------------------------------------
    // Failure kinds
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn empty_response_and_unavailable_are_distinct() {
        let empty = runner(Scripted::new(Reply::Nothing))
            .run::<SprintPlanFlow>(&sprint_input())
            .await
            .unwrap_err();
        let down = runner(Scripted::new(Reply::Fail(|| {
            ModelError::Transport("upstream returned 503".into())
        })))
        .run::<SprintPlanFlow>(&sprint_input())
        .await
        .unwrap_err();

        assert_eq!(empty.kind(), FailureKind::EmptyResponse);
        assert_eq!(down.kind(), FailureKind::ServiceUnavailable);
        assert_ne!(empty.kind().user_message(), down.kind().user_message());
        assert_ne!(empty.to_string(), down.to_string());
    }

    #[tokio::test]
    async fn null_output_is_empty_response() {
        let err = runner(Scripted::new(Reply::Output(serde_json::Value::Null)))
            .run::<SprintPlanFlow>(&sprint_input())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::EmptyResponse);
    }

    #[tokio::test]
    async fn client_error_status_is_upstream() {
        let err = runner(Scripted::new(Reply::Fail(|| ModelError::Status {
            status: 400,
            body: "invalid_request_error: bad schema".into(),
        })))
        .run::<SprintPlanFlow>(&sprint_input())
        .await
        .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Upstream);
    }

    // ---------------------------------------------------------------------------
    // Result slot
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn failed_run_leaves_stored_report_untouched() {
        let slot = ReportSlot::new();
        let good = runner(Scripted::new(Reply::Output(json!({
            "plan": "## Sprint Plan\n- A\n\n## Deferred Tasks\nNone"
        }))));
        let bad = runner(Scripted::new(Reply::Nothing));

        let ticket = slot.begin();
        let report = good.run::<SprintPlanFlow>(&sprint_input()).await.unwrap();
        assert!(slot.publish(ticket, report.clone()));

        let ticket = slot.begin();
        if let Ok(r) = bad.run::<SprintPlanFlow>(&sprint_input()).await {
            slot.publish(ticket, r);
        }
        assert_eq!(slot.latest().map(|r| r.run_id), Some(report.run_id));
    }

    #[tokio::test]
    async fn configured_sampling_reaches_the_model() {
        let model = board_core::config::ModelConfig {
            temperature: 0.2,
            max_tokens: 900,
            ..Default::default()
        };
        let client = Scripted::new(Reply::Nothing);
        let runner = FlowRunner::new(client.clone(), FlowOptions::from(&model));
        let _ = runner
            .run::<SprintPlanFlow>(&SprintPlanInput {
                tasks_text: "Fix bug – High – 3".into(),
                ..Default::default()
            })
            .await;

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].temperature, 0.2);
        assert_eq!(seen[0].max_tokens, 900);
    }
}

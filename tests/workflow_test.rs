// Integration tests for the generation workflow
//
// Drives `GenerationWorkflow` against a scripted in-process service and
// checks state transitions, request contents and stale-response handling.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{catalog, document, ScriptedService};
use portfolio_review::{
    GenerationWorkflow, Outcome, ReviewError, SectionKey, ServiceError, ToggleOutcome,
    ValidationError, WorkflowState,
};

const DESCRIPTION: &str = "62 year old with new onset atrial fibrillation";

fn setup(names: &[&str]) -> (Arc<ScriptedService>, GenerationWorkflow) {
    let service = Arc::new(ScriptedService::new(catalog(names)));
    let workflow = GenerationWorkflow::new(service.clone(), Arc::new(catalog(names)));
    (service, workflow)
}

async fn generated(names: &[&str], selected: &[&str]) -> (Arc<ScriptedService>, GenerationWorkflow) {
    let (service, workflow) = setup(names);
    service.push_generate(Ok(document("First", selected)));
    for name in selected {
        workflow.toggle_capability(name).await;
    }
    let selection = workflow.selection().await;
    let outcome = workflow.generate(DESCRIPTION, &selection).await.unwrap();
    assert_eq!(outcome, Outcome::Applied);
    (service, workflow)
}

// ── Selection ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fourth_capability_is_rejected() {
    let (_, workflow) = setup(&["A", "B", "C", "D"]);
    for name in ["A", "B", "C"] {
        assert_eq!(workflow.toggle_capability(name).await, ToggleOutcome::Added);
    }
    assert_eq!(
        workflow.toggle_capability("D").await,
        ToggleOutcome::Saturated
    );
    assert_eq!(workflow.selection().await.names(), &["A", "B", "C"]);
}

#[tokio::test]
async fn test_connect_loads_catalog_from_service() {
    let service = Arc::new(ScriptedService::new(catalog(&["A", "B"])));
    let workflow = GenerationWorkflow::connect(service).await.unwrap();
    assert_eq!(workflow.catalog().len(), 2);
    assert_eq!(workflow.state().await, WorkflowState::Idle);
}

// ── Generate ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_short_description_fails_without_network_call() {
    let (service, workflow) = setup(&["A"]);
    workflow.toggle_capability("A").await;
    let selection = workflow.selection().await;

    let err = workflow.generate("short", &selection).await.unwrap_err();
    assert_eq!(
        err,
        ReviewError::Validation(ValidationError::DescriptionTooShort { min: 10 })
    );
    assert_eq!(workflow.state().await, WorkflowState::Idle);
    assert!(service.generate_requests().is_empty());
}

#[tokio::test]
async fn test_whitespace_padding_does_not_count() {
    let (service, workflow) = setup(&["A"]);
    workflow.toggle_capability("A").await;
    let selection = workflow.selection().await;

    let err = workflow
        .generate("   nine char   ", &selection)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(service.generate_requests().is_empty());
}

#[tokio::test]
async fn test_empty_selection_fails_without_network_call() {
    let (service, workflow) = setup(&["A"]);
    let selection = workflow.selection().await;
    let err = workflow.generate(DESCRIPTION, &selection).await.unwrap_err();
    assert_eq!(err, ReviewError::Validation(ValidationError::EmptySelection));
    assert!(service.generate_requests().is_empty());
}

#[tokio::test]
async fn test_generate_loads_document_with_selected_keys() {
    let (service, workflow) = generated(&["A", "B", "C"], &["A", "B"]).await;

    assert_eq!(workflow.state().await, WorkflowState::Viewing);
    let requests = service.generate_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].case_description, DESCRIPTION);
    assert_eq!(requests[0].selected_capabilities, vec!["A", "B"]);

    let snapshot = workflow.snapshot().await.unwrap();
    assert_eq!(snapshot.capability_keys(), vec!["A", "B"]);
}

#[tokio::test]
async fn test_edit_one_capability_leaves_others() {
    let (_, workflow) = generated(&["A", "B"], &["A", "B"]).await;

    assert!(workflow.set_capability_field("A", "new text").await.unwrap());
    let snapshot = workflow.snapshot().await.unwrap();
    assert_eq!(snapshot.sections.capabilities["A"], "new text");
    assert_eq!(snapshot.sections.capabilities["B"], "First on B");
}

#[tokio::test]
async fn test_edit_absent_capability_is_noop() {
    let (_, workflow) = generated(&["A", "B"], &["A"]).await;
    let before = workflow.snapshot().await.unwrap();

    assert!(!workflow.set_capability_field("B", "ghost").await.unwrap());
    assert_eq!(workflow.snapshot().await.unwrap(), before);
}

#[tokio::test]
async fn test_reflection_edit_is_isolated() {
    let (_, workflow) = generated(&["A", "B"], &["A", "B"]).await;
    let before = workflow.snapshot().await.unwrap();

    workflow.set_field(SectionKey::Reflection, "x").await.unwrap();
    let after = workflow.snapshot().await.unwrap();
    assert_eq!(after.sections.reflection, "x");
    assert_eq!(after.sections.brief_description, before.sections.brief_description);
    assert_eq!(after.sections.learning_needs, before.sections.learning_needs);
    assert_eq!(after.sections.capabilities, before.sections.capabilities);
}

#[tokio::test]
async fn test_snapshot_is_stable_without_edits() {
    let (_, workflow) = generated(&["A"], &["A"]).await;
    assert_eq!(workflow.snapshot().await, workflow.snapshot().await);
}

#[tokio::test]
async fn test_service_failure_stays_idle_with_message() {
    let (service, workflow) = setup(&["A"]);
    service.push_generate(Err(ServiceError::Status {
        status: 500,
        message: "OpenAI quota exceeded".to_string(),
    }));
    workflow.toggle_capability("A").await;
    let selection = workflow.selection().await;

    let err = workflow.generate(DESCRIPTION, &selection).await.unwrap_err();
    assert!(matches!(
        err,
        ReviewError::Service(ServiceError::Status { status: 500, .. })
    ));
    assert_eq!(workflow.state().await, WorkflowState::Idle);
    assert_eq!(
        workflow.last_error().await.as_deref(),
        Some("OpenAI quota exceeded")
    );
    assert!(!workflow.is_in_flight().await);
    // Selection survives for the retry.
    assert_eq!(workflow.selection().await.names(), &["A"]);
}

#[tokio::test]
async fn test_concurrent_generate_is_rejected() {
    let names = ["A"];
    let (service, gate) = ScriptedService::gated(catalog(&names));
    service.push_generate(Ok(document("First", &names)));
    let service = Arc::new(service);
    let workflow = GenerationWorkflow::new(service.clone(), Arc::new(catalog(&names)));
    workflow.toggle_capability("A").await;
    let selection = workflow.selection().await;

    let pending = tokio::spawn({
        let workflow = workflow.clone();
        let selection = selection.clone();
        async move { workflow.generate(DESCRIPTION, &selection).await }
    });
    while !workflow.is_in_flight().await {
        tokio::task::yield_now().await;
    }

    let err = workflow.generate(DESCRIPTION, &selection).await.unwrap_err();
    assert_eq!(err, ReviewError::Validation(ValidationError::AlreadyInFlight));
    assert_eq!(service.generate_requests().len(), 1);

    gate.add_permits(1);
    assert_eq!(pending.await.unwrap().unwrap(), Outcome::Applied);
    assert_eq!(workflow.state().await, WorkflowState::Viewing);
}

#[tokio::test]
async fn test_new_case_discards_pending_generate() {
    let names = ["A", "B"];
    let (service, gate) = ScriptedService::gated(catalog(&names));
    service.push_generate(Ok(document("Late", &names)));
    let service = Arc::new(service);
    let workflow = GenerationWorkflow::new(service.clone(), Arc::new(catalog(&names)));
    workflow.toggle_capability("A").await;
    let selection = workflow.selection().await;

    let pending = tokio::spawn({
        let workflow = workflow.clone();
        async move { workflow.generate(DESCRIPTION, &selection).await }
    });
    while !workflow.is_in_flight().await {
        tokio::task::yield_now().await;
    }

    workflow.new_case().await;
    assert_eq!(workflow.state().await, WorkflowState::Idle);

    gate.add_permits(1);
    assert_eq!(pending.await.unwrap().unwrap(), Outcome::Discarded);
    assert_eq!(workflow.state().await, WorkflowState::Idle);
    assert!(workflow.snapshot().await.is_none());
    assert!(workflow.selection().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_generate_releases_request() {
    let names = ["A"];
    let (service, gate) = ScriptedService::gated(catalog(&names));
    let service = Arc::new(service);
    let workflow = GenerationWorkflow::new(service.clone(), Arc::new(catalog(&names)));
    workflow.toggle_capability("A").await;
    let selection = workflow.selection().await;

    let abandoned =
        tokio::time::timeout(Duration::from_secs(5), workflow.generate(DESCRIPTION, &selection))
            .await;
    assert!(abandoned.is_err());
    assert!(!workflow.is_in_flight().await);
    assert_eq!(workflow.state().await, WorkflowState::Idle);

    service.push_generate(Ok(document("Retry", &names)));
    gate.add_permits(1);
    let outcome = workflow.generate(DESCRIPTION, &selection).await.unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(workflow.snapshot().await.unwrap().title, "Retry");
    assert_eq!(service.generate_requests().len(), 2);
}

// ── Improve ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_instruction_keeps_improving() {
    let (service, workflow) = generated(&["A"], &["A"]).await;
    workflow.enter_improve().await.unwrap();

    let err = workflow.improve("").await.unwrap_err();
    assert_eq!(err, ReviewError::Validation(ValidationError::EmptyInstruction));
    assert_eq!(workflow.state().await, WorkflowState::Improving);
    assert!(service.improve_requests().is_empty());
}

#[tokio::test]
async fn test_improve_replaces_whole_document() {
    let (service, workflow) = generated(&["A", "B"], &["A", "B"]).await;
    workflow.set_field(SectionKey::Reflection, "my edit").await.unwrap();
    workflow.set_capability_field("B", "my edit").await.unwrap();
    workflow.enter_improve().await.unwrap();
    workflow.set_instruction("make it formal").await;

    service.push_improve(Ok(document("Second", &["A", "B"])));
    let outcome = workflow.improve("make it formal").await.unwrap();

    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(workflow.state().await, WorkflowState::Viewing);
    assert_eq!(workflow.snapshot().await.unwrap(), document("Second", &["A", "B"]));
    assert_eq!(workflow.instruction().await, "");
    assert_eq!(
        workflow.narrative_snapshot().await.as_deref(),
        Some("Second narrative")
    );

    let requests = service.improve_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].original_case, "First narrative");
    assert_eq!(requests[0].improvement_prompt, "make it formal");
    assert_eq!(requests[0].selected_capabilities, vec!["A", "B"]);
}

#[tokio::test]
async fn test_improve_failure_keeps_instruction_and_state() {
    let (service, workflow) = generated(&["A"], &["A"]).await;
    workflow.enter_improve().await.unwrap();
    service.push_improve(Err(ServiceError::Transport("connection reset".to_string())));

    let err = workflow.improve("shorten the reflection").await.unwrap_err();
    assert!(matches!(err, ReviewError::Service(ServiceError::Transport(_))));
    assert_eq!(workflow.state().await, WorkflowState::Improving);
    assert_eq!(workflow.instruction().await, "shorten the reflection");
    assert_eq!(workflow.snapshot().await.unwrap().title, "First");
}

#[tokio::test]
async fn test_improve_outside_prompt_is_invalid() {
    let (service, workflow) = generated(&["A"], &["A"]).await;
    let err = workflow.improve("make it formal").await.unwrap_err();
    assert!(matches!(
        err,
        ReviewError::Validation(ValidationError::InvalidState { .. })
    ));
    assert!(service.improve_requests().is_empty());
}

#[tokio::test]
async fn test_cancel_improve_keeps_edits() {
    let (_, workflow) = generated(&["A"], &["A"]).await;
    workflow.enter_improve().await.unwrap();
    workflow.set_field(SectionKey::LearningNeeds, "while improving").await.unwrap();
    workflow.cancel_improve().await.unwrap();

    assert_eq!(workflow.state().await, WorkflowState::Viewing);
    assert_eq!(
        workflow.snapshot().await.unwrap().sections.learning_needs,
        "while improving"
    );
}

#[tokio::test]
async fn test_new_case_from_improving() {
    let (_, workflow) = generated(&["A"], &["A"]).await;
    workflow.enter_improve().await.unwrap();
    workflow.set_instruction("draft").await;

    workflow.new_case().await;
    assert_eq!(workflow.state().await, WorkflowState::Idle);
    assert!(workflow.snapshot().await.is_none());
    assert_eq!(workflow.instruction().await, "");
    assert!(workflow.selection().await.is_empty());
}

#[tokio::test]
async fn test_edits_rejected_while_improve_pending() {
    let names = ["A"];
    let (service, gate) = ScriptedService::gated(catalog(&names));
    service.push_generate(Ok(document("First", &names)));
    service.push_improve(Ok(document("Second", &names)));
    let service = Arc::new(service);
    let workflow = GenerationWorkflow::new(service.clone(), Arc::new(catalog(&names)));
    workflow.toggle_capability("A").await;
    let selection = workflow.selection().await;
    gate.add_permits(1);
    workflow.generate(DESCRIPTION, &selection).await.unwrap();
    workflow.enter_improve().await.unwrap();

    let pending = tokio::spawn({
        let workflow = workflow.clone();
        async move { workflow.improve("make it formal").await }
    });
    while !workflow.is_in_flight().await {
        tokio::task::yield_now().await;
    }

    assert_eq!(
        workflow.set_field(SectionKey::Reflection, "lost edit").await,
        Err(ValidationError::AlreadyInFlight)
    );
    assert_eq!(
        workflow.set_capability_field("A", "lost edit").await,
        Err(ValidationError::AlreadyInFlight)
    );

    gate.add_permits(1);
    assert_eq!(pending.await.unwrap().unwrap(), Outcome::Applied);
    let document = workflow.snapshot().await.unwrap();
    assert_eq!(document.sections.reflection, "Second reflection");
    assert_eq!(document.sections.capabilities["A"], "Second on A");

    // Editing resumes once the improved document is in place.
    assert_eq!(
        workflow.set_field(SectionKey::Reflection, "kept edit").await,
        Ok(true)
    );
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_improve_keeps_document_editable() {
    let names = ["A"];
    let (service, gate) = ScriptedService::gated(catalog(&names));
    service.push_generate(Ok(document("First", &names)));
    let service = Arc::new(service);
    let workflow = GenerationWorkflow::new(service.clone(), Arc::new(catalog(&names)));
    workflow.toggle_capability("A").await;
    let selection = workflow.selection().await;
    gate.add_permits(1);
    workflow.generate(DESCRIPTION, &selection).await.unwrap();
    workflow.enter_improve().await.unwrap();

    let abandoned =
        tokio::time::timeout(Duration::from_secs(5), workflow.improve("make it formal")).await;
    assert!(abandoned.is_err());
    assert!(!workflow.is_in_flight().await);
    assert_eq!(workflow.state().await, WorkflowState::Improving);
    assert_eq!(
        workflow.set_field(SectionKey::Reflection, "after timeout").await,
        Ok(true)
    );
}

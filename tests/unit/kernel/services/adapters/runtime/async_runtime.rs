use super::*;
use crate::kernel::services::adapters::json::{json_collaborators, JsonDocument};
use crate::kernel::services::ports::{DocumentRef, JsonTreeSettings};
use crate::kernel::services::{kernel_bus, KernelMessage};
use crate::kernel::Action;
use crate::models::{NodeId, NodeInfo};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn runner() -> (AsyncRuntime, EffectRunner, crate::kernel::services::KernelBusReceiver, JsonDocument) {
    let document = JsonDocument::new(json!({ "name": "root", "children": [{ "name": "a" }] }));
    let collaborators = json_collaborators(
        &document,
        Arc::new(JsonTreeSettings::default()),
        PathBuf::from("unused.json"),
    );
    let runtime = AsyncRuntime::new().unwrap();
    let (tx, rx) = kernel_bus();
    let runner = EffectRunner::new(runtime.tokio_handle(), collaborators, tx);
    (runtime, runner, rx, document)
}

#[test]
fn test_effect_completion_is_posted_to_bus() {
    let (_runtime, runner, mut rx, document) = runner();
    let root = NodeInfo {
        id: NodeId::default(),
        parent: None,
        editor_id: "json-tree".into(),
        type_tag: "object".into(),
        data_ref: document.root_ref(),
    };

    runner.run(Effect::LoadChildren { node: root });

    let KernelMessage::Action(action) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let Action::ChildrenLoaded {
        result: Ok(drafts), ..
    } = action
    else {
        panic!("expected loaded children");
    };
    assert_eq!(drafts.len(), 1);
}

#[test]
fn test_failures_come_back_as_completions() {
    let (_runtime, runner, mut rx, _document) = runner();

    runner.run(Effect::Commit {
        document: DocumentRef::new("file://somewhere-else.json"),
    });

    let KernelMessage::Action(action) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(action, Action::SaveCompleted { result: Err(_) }));
}

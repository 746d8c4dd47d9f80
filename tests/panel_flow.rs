//! End-to-end panel flow: fetch a snapshot on a worker, drain the channel
//! the way the app does each frame, then drive visibility mutations and
//! check the bulk-button gating predicates at every step.

use std::sync::mpsc;
use std::time::Duration;

use planfe::plan::PlanState;
use planfe::source::{SourceResult, StubSource, spawn_fetch};
use pretty_assertions::assert_eq;

fn drain_until_settled(plan: &mut PlanState, receiver: &mpsc::Receiver<SourceResult>) {
    let result = receiver
        .recv_timeout(Duration::from_secs(5))
        .expect("fetch worker never reported");
    match result {
        SourceResult::Loaded(layers) => plan.finish_load(layers),
        SourceResult::Failed(err) => plan.fail_load(err.to_string()),
    }
}

#[test]
fn fetch_then_toggle_then_bulk_flow() {
    let mut plan = PlanState::new();
    assert!(plan.is_loading());

    let (sender, receiver) = mpsc::channel();
    spawn_fetch(StubSource::with_latency(Duration::from_millis(10)), sender);
    drain_until_settled(&mut plan, &receiver);

    // Embedded snapshot: Walls/Doors/Electrical visible, Furniture hidden
    assert!(!plan.is_loading());
    assert_eq!(plan.load_error(), None);
    assert_eq!(plan.layers().len(), 4);
    assert_eq!(plan.visible_count(), 3);
    assert!(!plan.all_visible());
    assert!(!plan.none_visible());

    // Toggling the one hidden layer makes everything visible
    plan.toggle_layer("3");
    assert!(plan.all_visible());
    assert!(!plan.none_visible());
    assert_eq!(plan.visible_count(), 4);

    // Hide All
    plan.set_all_visibility(false);
    assert!(plan.none_visible());
    assert!(!plan.all_visible());
    assert_eq!(plan.visible_count(), 0);

    // Show All
    plan.set_all_visibility(true);
    assert!(plan.all_visible());
    assert_eq!(plan.visible_count(), 4);

    // Order and identity survive every mutation
    let ids: Vec<&str> = plan.layers().iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"]);
}

#[test]
fn undecodable_snapshot_surfaces_as_failure() {
    let mut plan = PlanState::new();

    let (sender, receiver) = mpsc::channel();
    let source = StubSource::with_payload("{ not json");
    spawn_fetch(source, sender);
    drain_until_settled(&mut plan, &receiver);

    assert!(!plan.is_loading());
    assert!(plan.load_error().is_some());
    assert!(plan.layers().is_empty());

    // A failed plan gates both bulk actions off via none_visible/all_visible
    assert!(plan.none_visible());
    assert!(!plan.all_visible());
}

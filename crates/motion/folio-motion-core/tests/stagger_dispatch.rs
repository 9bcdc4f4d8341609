mod common;

use common::{portfolio_engine, DT};
use folio_motion::{BuildMode, CoreEvent, Inputs, MotionEngine, NodeConfig, NodeId};

fn container_with_cards(engine: &mut MotionEngine, cards: usize) -> (NodeId, Vec<NodeId>) {
    let parent = engine
        .mount(None, NodeConfig::scoped("staggerContainer").initial("hidden"))
        .unwrap();
    let children = (0..cards)
        .map(|_| engine.mount(Some(parent), NodeConfig::scoped("fadeInUp")).unwrap())
        .collect();
    (parent, children)
}

/// Clock time of the tick in which each child was dispatched.
fn run_and_record(engine: &mut MotionEngine, children: &[NodeId], seconds: f32) -> Vec<Option<f64>> {
    let mut dispatched = vec![None; children.len()];
    let ticks = (seconds / DT).ceil() as usize;
    for _ in 0..ticks {
        let events = engine.update(DT, Inputs::default()).unwrap().events.clone();
        let now = engine.time();
        for ev in &events {
            if let CoreEvent::ChildDispatched { child, .. } = ev {
                let i = children.iter().position(|c| c == child).unwrap();
                assert!(dispatched[i].is_none(), "child {i} dispatched twice");
                dispatched[i] = Some(now);
            }
        }
    }
    dispatched
}

#[test]
fn children_dispatch_within_one_tick_of_their_offset() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let (parent, children) = container_with_cards(&mut engine, 5);
    // Children inherit the parent's initial pose.
    for c in &children {
        assert_eq!(engine.value(*c, "opacity"), Some(0.0));
        assert_eq!(engine.value(*c, "y"), Some(20.0));
    }

    engine.request(parent, "visible").unwrap();
    assert_eq!(engine.pending_dispatches(), 5);
    let dispatched = run_and_record(&mut engine, &children, 2.0);

    // staggerChildren = 0.1, delayChildren = 0.2
    for (i, at) in dispatched.iter().enumerate() {
        let at = at.expect("every child dispatched");
        let due = 0.2 + 0.1 * i as f64;
        assert!(at >= due - 1e-4, "child {i} early: {at} < {due}");
        assert!(at <= due + DT as f64 + 1e-4, "child {i} late: {at} > {due}");
    }
    for pair in dispatched.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
    assert_eq!(engine.pending_dispatches(), 0);
    for c in &children {
        assert_eq!(engine.node(*c).unwrap().requested_variant(), Some("visible"));
        assert_eq!(engine.value(*c, "opacity"), Some(1.0));
        assert_eq!(engine.value(*c, "y"), Some(0.0));
    }
}

#[test]
fn dispatch_does_not_wait_for_siblings_to_finish() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let (parent, children) = container_with_cards(&mut engine, 3);
    engine.request(parent, "visible").unwrap();
    // Child 1 is due at 0.3s while child 0 (started at 0.2s) still runs until 0.7s.
    let dispatched = run_and_record(&mut engine, &children, 0.35);
    assert!(dispatched[0].is_some() && dispatched[1].is_some());
    assert!(engine.node(children[0]).unwrap().is_playing());
}

#[test]
fn unmounting_a_sibling_keeps_remaining_offsets() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let (parent, children) = container_with_cards(&mut engine, 4);
    engine.request(parent, "visible").unwrap();
    engine.unmount(children[1]).unwrap();
    assert_eq!(engine.pending_dispatches(), 3);

    let dispatched = run_and_record(&mut engine, &children, 1.0);
    assert_eq!(dispatched[1], None);
    let at = dispatched[2].unwrap();
    // Still 0.2 + 2 * 0.1, not moved up into the removed slot.
    assert!(at >= 0.4 - 1e-4 && at <= 0.4 + DT as f64 + 1e-4, "{at}");
    assert_eq!(engine.children(parent).unwrap(), &[children[0], children[2], children[3]]);
}

#[test]
fn new_parent_request_cancels_pending_fan_out() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let (parent, children) = container_with_cards(&mut engine, 4);
    engine.request(parent, "visible").unwrap();
    run_and_record(&mut engine, &children, 0.25);
    assert_eq!(engine.pending_dispatches(), 3);

    engine.request(parent, "hidden").unwrap();
    // Old fan-out gone; new one covers every child.
    assert_eq!(engine.pending_dispatches(), 4);
    let mut last_label = Vec::new();
    for _ in 0..120 {
        let out = engine.update(DT, Inputs::default()).unwrap();
        for ev in &out.events {
            if let CoreEvent::ChildDispatched { variant: Some(variant), .. } = ev {
                last_label.push(variant.clone());
            }
        }
    }
    assert!(last_label.iter().all(|l| l == "hidden"));
    for c in &children {
        assert_eq!(engine.node(*c).unwrap().requested_variant(), Some("hidden"));
    }
}

#[test]
fn non_inheriting_children_are_skipped() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let parent = engine
        .mount(None, NodeConfig::scoped("staggerContainer").initial("hidden"))
        .unwrap();
    let follower = engine.mount(Some(parent), NodeConfig::scoped("fadeInUp")).unwrap();
    let independent = engine
        .mount(Some(parent), NodeConfig::scoped("fadeInUp").inherit(false).initial("hidden"))
        .unwrap();
    engine.request(parent, "visible").unwrap();
    assert_eq!(engine.pending_dispatches(), 1);
    for _ in 0..60 {
        engine.update(DT, Inputs::default()).unwrap();
    }
    assert_eq!(engine.node(follower).unwrap().requested_variant(), Some("visible"));
    assert_eq!(engine.node(independent).unwrap().requested_variant(), Some("hidden"));
}

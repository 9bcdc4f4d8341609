mod common;

use common::{count, mount_scene, portfolio_engine, DT};
use folio_motion::{
    BuildMode, CoreEvent, InViewConfig, Inputs, IntersectionEntry, NodeConfig, NodeState, Rect,
};

#[test]
fn once_trigger_fires_a_single_time_and_releases() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let ids = mount_scene(&mut engine, "project-grid");
    let grid = ids[0];
    assert!(engine.is_observing(grid));
    assert_eq!(engine.node_state(grid), Some(NodeState::Initial));

    let mut entered = 0;
    let mut released = 0;
    let mut exited = 0;
    let mut started = 0;
    for i in 0..20 {
        let ratio = if i % 2 == 0 { 1.0 } else { 0.0 };
        let out = engine
            .update(DT, Inputs::default().intersection(grid, ratio))
            .unwrap();
        entered += count(&out.events, |e| matches!(e, CoreEvent::ViewportEntered { .. }));
        released += count(&out.events, |e| matches!(e, CoreEvent::ViewportReleased { .. }));
        exited += count(&out.events, |e| matches!(e, CoreEvent::ViewportExited { .. }));
        started += count(&out.events, |e| {
            matches!(e, CoreEvent::AnimationStarted { node, .. } if *node == grid)
        });
    }
    assert_eq!((entered, released, exited, started), (1, 1, 0, 1));
    assert!(!engine.is_observing(grid));
    assert!(engine.trigger(grid).unwrap().has_fired());
    assert_eq!(engine.node(grid).unwrap().requested_variant(), Some("visible"));

    for _ in 0..120 {
        engine.update(DT, Inputs::default()).unwrap();
    }
    for card in &ids[1..] {
        assert_eq!(engine.value(*card, "opacity"), Some(1.0));
        assert_eq!(engine.node_state(*card), Some(NodeState::Settled));
    }
}

#[test]
fn below_threshold_does_not_count_as_visible() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let card = engine
        .mount(
            None,
            NodeConfig::scoped("fadeInUp").initial("hidden").in_view(InViewConfig {
                amount: 0.5,
                ..InViewConfig::default()
            }),
        )
        .unwrap();
    let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
    // 30% of the card overlaps the viewport.
    let element = Rect::new(0.0, 70.0, 100.0, 100.0);
    let out = engine
        .update(
            DT,
            Inputs {
                intersections: vec![IntersectionEntry::from_bounds(card, &element, &viewport)],
                ..Inputs::default()
            },
        )
        .unwrap();
    assert!(out.events.is_empty());
    assert_eq!(engine.node(card).unwrap().requested_variant(), Some("hidden"));
}

#[test]
fn repeatable_trigger_toggles_between_labels() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let card = engine
        .mount(
            None,
            NodeConfig::scoped("fadeInUp").initial("hidden").in_view(InViewConfig {
                amount: 0.5,
                ..InViewConfig::default()
            }),
        )
        .unwrap();

    // Only the last entry per node in a tick counts.
    let out = engine
        .update(
            DT,
            Inputs::default().intersection(card, 0.0).intersection(card, 0.8),
        )
        .unwrap();
    assert!(out.events.contains(&CoreEvent::ViewportEntered { node: card }));
    assert_eq!(engine.node(card).unwrap().requested_variant(), Some("visible"));

    let out = engine
        .update(DT, Inputs::default().intersection(card, 0.1))
        .unwrap();
    assert!(out.events.contains(&CoreEvent::ViewportExited { node: card }));
    assert_eq!(engine.node(card).unwrap().requested_variant(), Some("hidden"));
    assert!(engine.is_observing(card));
}

#[test]
fn unmount_releases_an_observing_trigger() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let ids = mount_scene(&mut engine, "project-grid");
    engine.unmount(ids[0]).unwrap();
    assert!(!engine.is_observing(ids[0]));
    let out = engine.update(DT, Inputs::default()).unwrap();
    assert_eq!(
        count(&out.events, |e| matches!(e, CoreEvent::ViewportReleased { .. })),
        1
    );
    assert_eq!(count(&out.events, |e| matches!(e, CoreEvent::Error { .. })), 0);
    assert_eq!(engine.node_count(), 0);
    assert_eq!(engine.live_values(), 0);
}

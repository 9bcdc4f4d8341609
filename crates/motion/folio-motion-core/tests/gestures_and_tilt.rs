mod common;

use common::{approx, portfolio_engine, DT};
use folio_motion::{
    BuildMode, GestureKind, Inputs, MotionEngine, NodeConfig, NodeId, TiltConfig, ROTATE_X,
    ROTATE_Y,
};

fn settle(engine: &mut MotionEngine, seconds: f32) {
    for _ in 0..(seconds / DT) as usize {
        engine.update(DT, Inputs::default()).unwrap();
    }
}

fn press(engine: &mut MotionEngine, node: NodeId, kind: GestureKind) {
    engine.update(DT, Inputs::default().gesture(node, kind)).unwrap();
}

#[test]
fn tap_beats_hover_beats_rest() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let button = engine
        .mount(
            None,
            NodeConfig::scoped("pressable").initial("rest").hover("hover").tap("tap"),
        )
        .unwrap();
    assert_eq!(engine.value(button, "scale"), Some(1.0));

    press(&mut engine, button, GestureKind::HoverStart);
    settle(&mut engine, 0.5);
    approx(engine.value(button, "scale").unwrap(), 1.05, 1e-5);

    press(&mut engine, button, GestureKind::TapStart);
    settle(&mut engine, 0.5);
    approx(engine.value(button, "scale").unwrap(), 0.95, 1e-5);

    // Releasing the tap falls back to hover while the pointer is still over it.
    press(&mut engine, button, GestureKind::TapEnd);
    settle(&mut engine, 0.5);
    approx(engine.value(button, "scale").unwrap(), 1.05, 1e-5);

    press(&mut engine, button, GestureKind::HoverEnd);
    settle(&mut engine, 0.5);
    approx(engine.value(button, "scale").unwrap(), 1.0, 1e-5);
    assert_eq!(engine.node(button).unwrap().requested_variant(), Some("rest"));
}

#[test]
fn cancelled_tap_without_hover_returns_to_rest() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let button = engine
        .mount(None, NodeConfig::scoped("pressable").initial("rest").tap("tap"))
        .unwrap();
    press(&mut engine, button, GestureKind::TapStart);
    settle(&mut engine, 0.05);
    assert!(engine.value(button, "scale").unwrap() < 1.0);
    press(&mut engine, button, GestureKind::TapCancel);
    settle(&mut engine, 0.5);
    approx(engine.value(button, "scale").unwrap(), 1.0, 1e-5);
}

#[test]
fn retargeting_mid_flight_starts_from_current_value() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let card = engine
        .mount(
            None,
            NodeConfig::scoped("scaleOnHover").initial("rest").hover("hover"),
        )
        .unwrap();
    press(&mut engine, card, GestureKind::HoverStart);
    settle(&mut engine, 0.1);
    let mid = engine.value(card, "scale").unwrap();
    assert!(mid > 1.0 && mid < 1.05);

    let out = engine
        .update(DT, Inputs::default().gesture(card, GestureKind::HoverEnd))
        .unwrap();
    // First sample of the new animation sits at the value it interrupted.
    approx(out.change_for(card, "scale").unwrap(), mid, 1e-5);
}

#[test]
fn pointer_tilt_follows_the_last_sample_and_springs_back() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let card = engine
        .mount(None, NodeConfig::default().tilt(TiltConfig::default()))
        .unwrap();
    assert_eq!(engine.value(card, ROTATE_X), Some(0.0));

    // Only the last sample in a tick is used.
    engine
        .update(
            DT,
            Inputs::default()
                .pointer_move(card, -0.5, 0.5)
                .pointer_move(card, 0.5, -0.5),
        )
        .unwrap();
    assert_eq!(engine.spring(card, ROTATE_X).unwrap().target, 17.5);
    assert_eq!(engine.spring(card, ROTATE_Y).unwrap().target, 17.5);

    settle(&mut engine, 2.0);
    approx(engine.value(card, ROTATE_X).unwrap(), 17.5, 1e-2);
    approx(engine.value(card, ROTATE_Y).unwrap(), 17.5, 1e-2);
    assert_eq!(engine.active_springs(), 0);

    engine
        .update(DT, Inputs::default().pointer_leave(card))
        .unwrap();
    settle(&mut engine, 2.0);
    approx(engine.value(card, ROTATE_X).unwrap(), 0.0, 1e-2);
    approx(engine.value(card, ROTATE_Y).unwrap(), 0.0, 1e-2);
}

#[test]
fn non_finite_pointer_samples_are_dropped() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let card = engine
        .mount(
            None,
            NodeConfig::default().tilt(TiltConfig {
                max_degrees: 10.0,
                spring: None,
            }),
        )
        .unwrap();
    engine
        .update(DT, Inputs::default().pointer_move(card, 0.25, 0.0))
        .unwrap();
    engine
        .update(DT, Inputs::default().pointer_move(card, f32::NAN, 0.0))
        .unwrap();
    assert_eq!(engine.spring(card, ROTATE_Y).unwrap().target, 5.0);
    assert!(engine.value(card, ROTATE_Y).unwrap().is_finite());
}

#[test]
fn unmount_drops_tilt_springs() {
    let mut engine = portfolio_engine(BuildMode::Development);
    let card = engine
        .mount(None, NodeConfig::default().tilt(TiltConfig::default()))
        .unwrap();
    engine
        .update(DT, Inputs::default().pointer_move(card, 0.5, 0.5))
        .unwrap();
    assert_eq!(engine.active_springs(), 2);
    engine.unmount(card).unwrap();
    assert_eq!(engine.active_springs(), 0);
    assert!(engine.spring(card, ROTATE_X).is_none());
    // Samples for a removed node are ignored.
    engine
        .update(DT, Inputs::default().pointer_move(card, 0.5, 0.5))
        .unwrap();
}

#[test]
fn card_hover_passes_through_to_heading_and_reverts() {
    for mode in [BuildMode::Development, BuildMode::Production] {
        let mut engine = portfolio_engine(mode);
        // fadeInUp has no "hover" label; scaleOnHover has no "visible".
        let card = engine
            .mount(
                None,
                NodeConfig::scoped("fadeInUp")
                    .initial("hidden")
                    .animate("visible")
                    .hover("hover"),
            )
            .unwrap();
        let heading = engine
            .mount(Some(card), NodeConfig::scoped("scaleOnHover"))
            .unwrap();
        settle(&mut engine, 1.0);
        approx(engine.value(card, "opacity").unwrap(), 1.0, 1e-5);

        press(&mut engine, card, GestureKind::HoverStart);
        settle(&mut engine, 0.5);
        approx(engine.value(heading, "scale").unwrap(), 1.05, 1e-5);
        // The card's own pose is untouched by a label it doesn't define.
        approx(engine.value(card, "opacity").unwrap(), 1.0, 1e-5);
        approx(engine.value(card, "y").unwrap(), 0.0, 1e-5);

        press(&mut engine, card, GestureKind::HoverEnd);
        settle(&mut engine, 0.5);
        approx(engine.value(heading, "scale").unwrap(), 1.0, 1e-5);
        assert_eq!(
            engine.node(heading).unwrap().requested_variant(),
            Some("visible")
        );
        assert!(!engine.node(card).unwrap().is_hovered());
    }
}

#[test]
fn hover_end_restores_properties_the_base_label_never_set() {
    let mut engine = portfolio_engine(BuildMode::Development);
    // Only the hover label touches scale; it rests at its default of 1.
    let button = engine
        .mount(None, NodeConfig::scoped("scaleOnHover").hover("hover"))
        .unwrap();
    assert_eq!(engine.value(button, "scale"), None);
    press(&mut engine, button, GestureKind::HoverStart);
    settle(&mut engine, 0.5);
    approx(engine.value(button, "scale").unwrap(), 1.05, 1e-5);
    press(&mut engine, button, GestureKind::HoverEnd);
    settle(&mut engine, 0.5);
    approx(engine.value(button, "scale").unwrap(), 1.0, 1e-5);
    assert_eq!(engine.node(button).unwrap().requested_variant(), None);
}

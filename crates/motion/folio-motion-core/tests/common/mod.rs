#![allow(dead_code)]

use folio_motion::{load_variant_sheet_json, BuildMode, Config, CoreEvent, MotionEngine, NodeConfig, NodeId};
use serde::Deserialize;

pub const DT: f32 = 1.0 / 60.0;

#[derive(Debug, Deserialize)]
pub struct Scene {
    pub name: String,
    pub root: SceneNode,
}

#[derive(Debug, Deserialize)]
pub struct SceneNode {
    pub config: NodeConfig,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

/// Engine with the shared portfolio variant sheet registered.
pub fn portfolio_engine(mode: BuildMode) -> MotionEngine {
    let mut engine = MotionEngine::new(Config {
        mode,
        ..Config::default()
    });
    let json = folio_test_fixtures::variant_sheets::json("portfolio").expect("load portfolio sheet");
    load_variant_sheet_json(engine.registry_mut(), &json).expect("register portfolio sheet");
    engine
}

/// Mount a scene fixture depth-first. Returns ids in mount order, root first.
pub fn mount_scene(engine: &mut MotionEngine, name: &str) -> Vec<NodeId> {
    let scene: Scene = folio_test_fixtures::scenes::load(name).expect("load scene");
    let mut ids = Vec::new();
    mount_node(engine, None, scene.root, &mut ids);
    ids
}

fn mount_node(engine: &mut MotionEngine, parent: Option<NodeId>, node: SceneNode, ids: &mut Vec<NodeId>) {
    let id = engine.mount(parent, node.config).expect("mount scene node");
    ids.push(id);
    for child in node.children {
        mount_node(engine, Some(id), child, ids);
    }
}

pub fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

pub fn count(events: &[CoreEvent], pred: impl Fn(&CoreEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

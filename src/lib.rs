pub mod config;
pub mod effects;
pub mod error;
pub mod formation;
pub mod gesture;
pub mod math;
pub mod noise;
pub mod path_history;
pub mod steering;
pub mod swarm;
pub mod tracker;

#[cfg(target_arch = "wasm32")]
mod console;

use log::warn;
use wasm_bindgen::prelude::*;

use crate::config::{DeviceClass, SwarmConfig};
use crate::effects::{LightningArcs, SealCircle};
use crate::error::{Result, SwarmError};
use crate::gesture::GestureMode;
use crate::steering::Transform;
use crate::swarm::{FrameInput, Swarm};
use crate::tracker::{HandFrame, MatrixCamera};

pub const TRANSFORM_STRIDE: usize = 8;

const FALLBACK_SEED: u32 = 0x5eed_b1ad;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    console::init(if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
}

fn resolve_seed(seed: Option<u32>) -> u32 {
    seed.unwrap_or_else(|| getrandom::u32().unwrap_or(FALLBACK_SEED))
}

fn into_js(err: SwarmError) -> JsValue {
    warn!("rejected host input: {err}");
    JsValue::from_str(&err.to_string())
}

fn write_transforms(transforms: &[Transform], out: &mut [f32]) {
    for (chunk, t) in out.chunks_exact_mut(TRANSFORM_STRIDE).zip(transforms) {
        chunk[0] = t.position.x;
        chunk[1] = t.position.y;
        chunk[2] = t.position.z;
        chunk[3] = t.rotation.x;
        chunk[4] = t.rotation.y;
        chunk[5] = t.rotation.z;
        chunk[6] = t.rotation.w;
        chunk[7] = t.scale;
    }
}

#[wasm_bindgen]
pub struct Sim {
    swarm: Swarm,
    camera: MatrixCamera,
    pending_hand: Option<HandFrame>,
    lightning: LightningArcs,
    seal: SealCircle,
    transforms: Vec<f32>,
    auras: Vec<f32>,
}

#[wasm_bindgen]
impl Sim {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u32>) -> Sim {
        Sim::from_config(SwarmConfig::default(), resolve_seed(seed))
    }

    pub fn for_device(user_agent: &str, viewport_width: f32, seed: Option<u32>) -> Sim {
        let device = DeviceClass::detect(user_agent, viewport_width);
        Sim::from_config(SwarmConfig::for_device(device), resolve_seed(seed))
    }

    pub fn with_config_json(json: &str, seed: Option<u32>) -> std::result::Result<Sim, JsValue> {
        let config = SwarmConfig::from_json(json).map_err(into_js)?;
        Ok(Sim::from_config(config, resolve_seed(seed)))
    }

    /// Buffers this frame's detected hand. Rejected input leaves the buffer
    /// untouched.
    pub fn set_hand(
        &mut self,
        gesture_label: &str,
        landmarks: &[f32],
    ) -> std::result::Result<(), JsValue> {
        self.submit_hand(gesture_label, landmarks).map_err(into_js)
    }

    pub fn clear_hand(&mut self) {
        self.pending_hand = None;
    }

    pub fn set_camera(
        &mut self,
        position: &[f32],
        inverse_view_projection: &[f32],
    ) -> std::result::Result<(), JsValue> {
        self.apply_camera(position, inverse_view_projection)
            .map_err(into_js)
    }

    pub fn step(&mut self, elapsed_secs: f64, delta_secs: f32) {
        let hand = self.pending_hand.take();
        self.swarm.step(
            &self.camera,
            FrameInput {
                hand: hand.as_ref(),
                elapsed: elapsed_secs,
                delta: delta_secs,
            },
        );

        let mode = self.swarm.confirmed_mode();
        let tracking = self.swarm.is_tracking();
        let time = elapsed_secs as f32;
        self.lightning
            .update(mode, tracking, time, self.swarm.positions());
        self.seal
            .update(mode, tracking, time, self.swarm.target_point());

        self.sync_render_buffers();
    }

    pub fn count(&self) -> usize {
        self.swarm.len()
    }

    pub fn confirmed_mode(&self) -> u32 {
        self.swarm.confirmed_mode().as_u32()
    }

    pub fn confirmed_mode_label(&self) -> String {
        self.swarm.confirmed_mode().label().to_string()
    }

    pub fn is_tracking(&self) -> bool {
        self.swarm.is_tracking()
    }

    pub fn target_point(&self) -> Vec<f32> {
        self.swarm.target_point().to_array().to_vec()
    }

    /// Flat `x, y, z` triples, most recent first.
    pub fn path_history(&self) -> Vec<f32> {
        let mut out = Vec::new();
        self.swarm.path_history().write_flat(&mut out);
        out
    }

    pub fn positions(&self) -> Vec<f32> {
        self.swarm
            .positions()
            .iter()
            .flat_map(|p| p.to_array())
            .collect()
    }

    pub fn transforms_ptr(&self) -> *const f32 {
        self.transforms.as_ptr()
    }

    pub fn aura_ptr(&self) -> *const f32 {
        self.auras.as_ptr()
    }

    pub fn transform_stride(&self) -> usize {
        TRANSFORM_STRIDE
    }

    pub fn lightning_ptr(&self) -> *const f32 {
        self.lightning.segments().as_ptr()
    }

    pub fn lightning_len(&self) -> usize {
        self.lightning.segments().len()
    }

    pub fn lightning_arc_count(&self) -> usize {
        self.lightning.arc_count()
    }

    pub fn lightning_visible(&self) -> bool {
        self.lightning.is_visible()
    }

    pub fn lightning_intensity(&self) -> f32 {
        self.lightning.intensity()
    }

    pub fn seal_visible(&self) -> bool {
        self.seal.is_visible()
    }

    pub fn seal_opacity(&self) -> f32 {
        self.seal.opacity()
    }

    pub fn seal_rotation(&self) -> f32 {
        self.seal.rotation()
    }

    pub fn seal_anchor(&self) -> Vec<f32> {
        self.seal.anchor().to_array().to_vec()
    }
}

impl Sim {
    fn from_config(config: SwarmConfig, seed: u32) -> Sim {
        let swarm = Swarm::new(config, seed);
        let len = swarm.len() * TRANSFORM_STRIDE;
        let mut sim = Sim {
            swarm,
            camera: MatrixCamera::default(),
            pending_hand: None,
            lightning: LightningArcs::new(seed),
            seal: SealCircle::new(),
            transforms: vec![0.0; len],
            auras: vec![0.0; len],
        };
        sim.sync_render_buffers();
        sim
    }

    fn submit_hand(&mut self, gesture_label: &str, landmarks: &[f32]) -> Result<()> {
        let gesture: GestureMode = gesture_label.parse()?;
        self.pending_hand = Some(HandFrame::from_flat(gesture, landmarks)?);
        Ok(())
    }

    fn apply_camera(&mut self, position: &[f32], inverse_view_projection: &[f32]) -> Result<()> {
        self.camera = MatrixCamera::from_slices(position, inverse_view_projection)?;
        Ok(())
    }

    fn sync_render_buffers(&mut self) {
        write_transforms(self.swarm.transforms(), &mut self.transforms);
        write_transforms(self.swarm.aura_transforms(), &mut self.auras);
    }
}

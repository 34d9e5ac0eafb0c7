use glam::Vec3;

use crate::config::SwarmConfig;
use crate::formation::{Formation, FormationEngine};
use crate::gesture::{GestureDebouncer, GestureMode};
use crate::math::{clamp_finite, hash_unit};
use crate::noise::{NoiseField, TrigNoise};
use crate::path_history::PathHistory;
use crate::steering::{step_agents, Agent, SteeringFrame, Transform};
use crate::tracker::{HandFrame, TargetTracker, Unproject};

pub const DEFAULT_DELTA: f32 = 1.0 / 60.0;
pub const MAX_DELTA: f32 = 0.1;

const SCATTER_HALF_WIDTH: f32 = 10.0;
const SCATTER_HALF_HEIGHT: f32 = 7.5;
const SCATTER_DEPTH: f32 = 10.0;

/// Everything the host reports for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    pub hand: Option<&'a HandFrame>,
    pub elapsed: f64,
    pub delta: f32,
}

pub fn sanitize_delta(delta: f32) -> f32 {
    clamp_finite(delta, 0.0, MAX_DELTA, DEFAULT_DELTA)
}

pub struct Swarm {
    config: SwarmConfig,
    agents: Vec<Agent>,
    debouncer: GestureDebouncer,
    tracker: TargetTracker,
    formation: FormationEngine,
    blades: Vec<Transform>,
    auras: Vec<Transform>,
    positions: Vec<Vec3>,
}

impl Swarm {
    pub fn new(config: SwarmConfig, seed: u32) -> Self {
        Self::with_noise(config, seed, Box::new(TrigNoise))
    }

    pub fn with_noise(mut config: SwarmConfig, seed: u32, noise: Box<dyn NoiseField>) -> Self {
        config.sanitize();
        let count = config.agent_count;

        let agents: Vec<Agent> = (0..count as u32)
            .map(|i| {
                Agent::at(Vec3::new(
                    hash_unit(seed, i, 0) * SCATTER_HALF_WIDTH,
                    hash_unit(seed, i, 1) * SCATTER_HALF_HEIGHT,
                    (hash_unit(seed, i, 2) - 1.0) * SCATTER_DEPTH * 0.5,
                ))
            })
            .collect();
        let positions = agents.iter().map(|a| a.position).collect();
        let blades = agents
            .iter()
            .map(|a| Transform {
                position: a.position,
                ..Transform::default()
            })
            .collect();

        Self {
            formation: FormationEngine::new(&config, noise),
            debouncer: GestureDebouncer::new(config.debounce_secs),
            tracker: TargetTracker::new(),
            auras: vec![
                Transform {
                    scale: 0.0,
                    ..Transform::default()
                };
                count
            ],
            blades,
            positions,
            agents,
            config,
        }
    }

    /// Runs one frame: debounce, track, record the trail, lay out the
    /// formation, then steer every agent.
    pub fn step(&mut self, camera: &dyn Unproject, input: FrameInput<'_>) {
        let dt = sanitize_delta(input.delta);
        let time = input.elapsed as f32;

        let mode = self
            .debouncer
            .observe(input.hand.map(|hand| hand.gesture), input.elapsed);
        self.tracker.observe(input.hand, mode, camera);
        let tracking = self.tracker.is_tracking();
        let center = self.tracker.effective_target();

        self.formation.advance_history(mode, tracking, center);
        self.formation.layout(
            &self.config,
            mode,
            tracking,
            center,
            time,
            &self.positions,
        );

        let frame = SteeringFrame {
            mode,
            formation: self.formation.formation(),
            tracking,
            center,
            time,
            dt,
        };
        step_agents(
            &self.config,
            &frame,
            &mut self.agents,
            self.formation.ideal_targets(),
            &mut self.blades,
            &mut self.auras,
        );

        for (slot, agent) in self.positions.iter_mut().zip(&self.agents) {
            *slot = agent.position;
        }

        self.debug_validate_state();
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn confirmed_mode(&self) -> GestureMode {
        self.debouncer.confirmed()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracker.is_tracking()
    }

    pub fn target_point(&self) -> Vec3 {
        self.tracker.target()
    }

    pub fn formation(&self) -> Formation {
        self.formation.formation()
    }

    pub fn path_history(&self) -> &PathHistory {
        self.formation.history()
    }

    /// Read-only snapshot of agent positions as of the last completed step.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.blades
    }

    pub fn aura_transforms(&self) -> &[Transform] {
        &self.auras
    }

    #[cfg(debug_assertions)]
    fn debug_validate_state(&self) {
        let count = self.config.agent_count;
        debug_assert_eq!(self.agents.len(), count);
        debug_assert_eq!(self.blades.len(), count);
        debug_assert_eq!(self.auras.len(), count);
        debug_assert_eq!(self.positions.len(), count);
        debug_assert_eq!(
            self.formation.history().len(),
            self.config.path_history_length
        );

        for agent in &self.agents {
            debug_assert!(agent.position.is_finite());
            debug_assert!(agent.velocity.is_finite());
            debug_assert!(agent.scale.is_finite());
        }
    }

    #[cfg(not(debug_assertions))]
    fn debug_validate_state(&self) {}
}

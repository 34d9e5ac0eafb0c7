use glam::{Quat, Vec3};

use crate::config::SwarmConfig;
use crate::formation::{Formation, LEAD_AGENT};
use crate::gesture::GestureMode;
use crate::math::{lerp, limit_magnitude, look_rotation, normalize_or_default};

pub const CATCH_UP_DISTANCE: f32 = 4.0;
pub const SETTLE_DISTANCE: f32 = 1.0;
pub const ARRIVAL_RADIUS: f32 = 10.0;
pub const FOCUSED_STEER_FACTOR: f32 = 3.0;
pub const MIN_SEPARATION_OFFSET: f32 = 0.01;
pub const HEADING_MIN_SPEED: f32 = 0.1;
pub const LEAD_SCALE: f32 = 6.0;
pub const RANK_SCALE: f32 = 1.5;
pub const SCALE_RATE: f32 = 0.02;
pub const LEAD_SCALE_RATE: f32 = 0.01;
pub const AURA_GROWTH: f32 = 1.3;

const IDLE_HEADING: Vec3 = Vec3::NEG_Z;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Agent {
    pub position: Vec3,
    pub velocity: Vec3,
    pub scale: f32,
}

impl Agent {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SteeringFrame {
    pub mode: GestureMode,
    pub formation: Formation,
    pub tracking: bool,
    pub center: Vec3,
    pub time: f32,
    pub dt: f32,
}

pub fn select_speed(config: &SwarmConfig, mode: GestureMode, distance: f32) -> f32 {
    if distance > CATCH_UP_DISTANCE {
        return config.sprint_speed;
    }
    if distance < SETTLE_DISTANCE {
        return distance * config.max_speed;
    }

    match mode {
        GestureMode::Shield => config.sprint_speed,
        _ => config.max_speed,
    }
}

/// Seek velocity toward `offset`, slowing linearly inside the arrival radius.
pub fn desired_velocity(config: &SwarmConfig, mode: GestureMode, offset: Vec3) -> Vec3 {
    let distance = offset.length();
    if distance <= 0.0 {
        return Vec3::ZERO;
    }

    let speed = select_speed(config, mode, distance);
    let magnitude = if distance < ARRIVAL_RADIUS {
        speed * (distance / ARRIVAL_RADIUS)
    } else {
        speed
    };

    offset * (magnitude / distance)
}

pub fn focus_factor(mode: GestureMode) -> f32 {
    match mode {
        GestureMode::Shield | GestureMode::Lotus => FOCUSED_STEER_FACTOR,
        GestureMode::Dageng | GestureMode::Dragon => 1.0,
    }
}

pub fn separation_enabled(mode: GestureMode, tracking: bool) -> bool {
    match mode {
        GestureMode::Shield => false,
        GestureMode::Lotus => !tracking,
        GestureMode::Dageng | GestureMode::Dragon => true,
    }
}

pub fn heading(formation: Formation, agent: &Agent, center: Vec3) -> Vec3 {
    let moving = agent.velocity.length() > HEADING_MIN_SPEED;
    match formation {
        Formation::Shield if moving => agent.velocity.normalize(),
        Formation::Shield => {
            let rel = agent.position - center;
            normalize_or_default(Vec3::new(-rel.z, 0.0, rel.x), IDLE_HEADING)
        }
        Formation::Lotus => normalize_or_default(agent.position - center, IDLE_HEADING),
        Formation::Dageng => Vec3::NEG_Y,
        Formation::Dragon if moving => agent.velocity.normalize(),
        Formation::Dragon => IDLE_HEADING,
    }
}

pub fn target_scale(formation: Formation, i: usize) -> f32 {
    match formation {
        Formation::Dageng if i == LEAD_AGENT => LEAD_SCALE,
        Formation::Dageng => RANK_SCALE,
        _ => 1.0,
    }
}

pub fn scale_rate(mode: GestureMode, i: usize) -> f32 {
    if mode == GestureMode::Dageng && i == LEAD_AGENT {
        LEAD_SCALE_RATE
    } else {
        SCALE_RATE
    }
}

/// Aura scale for this frame; zero hides the aura.
pub fn aura_scale(mode: GestureMode, i: usize, time: f32, scale: f32) -> f32 {
    let fi = i as f32;
    let active = match mode {
        GestureMode::Shield => (time * 30.0 + fi * 0.5).sin() > 0.0,
        _ => (time * 20.0 + fi * 0.7).sin() > 0.3,
    };

    if active {
        scale * AURA_GROWTH
    } else if mode == GestureMode::Dageng && i == LEAD_AGENT {
        scale
    } else {
        0.0
    }
}

/// Advances every agent one explicit-Euler step toward its ideal position
/// and writes the blade and aura transforms.
///
/// Agents are processed in index order; separation compares each agent with
/// its predecessor's already-updated position.
pub fn step_agents(
    config: &SwarmConfig,
    frame: &SteeringFrame,
    agents: &mut [Agent],
    ideal: &[Vec3],
    blades: &mut [Transform],
    auras: &mut [Transform],
) {
    debug_assert_eq!(agents.len(), ideal.len());
    debug_assert_eq!(agents.len(), blades.len());
    debug_assert_eq!(agents.len(), auras.len());

    let steer_limit = config.steer_force * frame.dt * focus_factor(frame.mode);
    let separate = separation_enabled(frame.mode, frame.tracking);
    let push = config.separation_force * frame.dt;

    for i in 0..agents.len() {
        let previous = if i > 0 {
            Some(agents[i - 1].position)
        } else {
            None
        };
        let agent = &mut agents[i];

        let desired = desired_velocity(config, frame.mode, ideal[i] - agent.position);
        let steer = limit_magnitude(desired - agent.velocity, steer_limit);
        agent.velocity += steer;

        if let (true, Some(prev)) = (separate, previous) {
            let offset = agent.position - prev;
            let d = offset.length();
            if d < config.separation_distance && d > MIN_SEPARATION_OFFSET {
                agent.velocity += offset * (push / d);
            }
        }

        agent.position += agent.velocity * frame.dt;

        let rotation = look_rotation(heading(frame.formation, agent, frame.center));
        agent.scale = lerp(
            agent.scale,
            target_scale(frame.formation, i),
            scale_rate(frame.mode, i),
        );

        blades[i] = Transform {
            position: agent.position,
            rotation,
            scale: agent.scale,
        };
        auras[i] = Transform {
            position: agent.position,
            rotation,
            scale: aura_scale(frame.mode, i, frame.time, agent.scale),
        };
    }
}

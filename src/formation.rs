use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::config::SwarmConfig;
use crate::gesture::GestureMode;
use crate::noise::NoiseField;
use crate::path_history::PathHistory;

/// `PI * (3 - sqrt(5))`
pub const GOLDEN_ANGLE: f32 = 2.399_963_3;
pub const LEAD_AGENT: usize = 0;
pub const DRAGON_HEAD_COUNT: usize = 5;
pub const DRAGON_BODY_SPACING: f32 = 0.8;

const SHIELD_WOBBLE: f32 = 0.2;
const LOTUS_BREATHE: f32 = 0.05;
const LOTUS_BOB: f32 = 0.2;
const DAGENG_LEAD_LIFT: f32 = 5.0;
const DAGENG_RING_SPACING: f32 = 1.5;
const DAGENG_RING_OFFSET: f32 = 2.0;
const DAGENG_DROP: f32 = 10.0;
const DAGENG_HEIGHT_HASH: f32 = 13.1;
const DRAGON_HEAD_SWAY: f32 = 0.3;
const DRAGON_BODY_SWAY: f32 = 0.2;

/// Layout actually applied this frame. Differs from the confirmed gesture
/// while no hand is visible, when the swarm idles in the lotus spiral.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Formation {
    Shield,
    Lotus,
    Dageng,
    Dragon,
}

impl Formation {
    pub fn select(mode: GestureMode, tracking: bool) -> Self {
        if !tracking {
            return Self::Lotus;
        }

        match mode {
            GestureMode::Shield => Self::Shield,
            GestureMode::Lotus => Self::Lotus,
            GestureMode::Dageng => Self::Dageng,
            GestureMode::Dragon => Self::Dragon,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutFrame<'a> {
    pub config: &'a SwarmConfig,
    pub count: usize,
    pub center: Vec3,
    pub time: f32,
}

/// Fibonacci sphere, spun about the view axis and slowly tilted about the
/// vertical.
pub fn shield_slot(frame: &LayoutFrame<'_>, i: usize) -> Vec3 {
    let n = frame.count.max(1) as f32;
    let fi = i as f32;
    let t = frame.time;
    let radius = frame.config.shield_radius;

    let phi = (1.0 - 2.0 * (fi + 0.5) / n).clamp(-1.0, 1.0).acos();
    let theta = PI * (1.0 + 5.0_f32.sqrt()) * fi;
    let orbit = theta + t * frame.config.shield_orbit_speed;

    let orbit_x = radius * phi.sin() * orbit.cos();
    let orbit_y = radius * phi.sin() * orbit.sin();
    let orbit_z = radius * phi.cos();

    let (tilt_sin, tilt_cos) = (t * frame.config.shield_tilt_speed).sin_cos();
    let rotated_x = orbit_x * tilt_cos - orbit_z * tilt_sin;
    let rotated_z = orbit_x * tilt_sin + orbit_z * tilt_cos;

    frame.center
        + Vec3::new(
            rotated_x + (t * 3.0 + fi).sin() * SHIELD_WOBBLE,
            orbit_y + (t * 3.0 + fi * 0.7).cos() * SHIELD_WOBBLE,
            rotated_z,
        )
}

/// Area-uniform golden-angle spiral in the view plane.
pub fn lotus_slot(frame: &LayoutFrame<'_>, i: usize) -> Vec3 {
    let fi = i as f32;
    let t = frame.time;
    let min_radius = frame.config.lotus_min_radius;
    let max_radius = frame.config.lotus_radius;

    let along = if frame.count > 1 {
        fi / (frame.count - 1) as f32
    } else {
        0.0
    };
    let radius = min_radius + (max_radius - min_radius) * along.sqrt();
    let theta = fi * GOLDEN_ANGLE + t * frame.config.lotus_rotate_speed;
    let breathe = 1.0 + (t * 2.0).sin() * LOTUS_BREATHE;

    frame.center
        + Vec3::new(
            radius * breathe * theta.cos(),
            radius * breathe * theta.sin(),
            (t * 2.0 + fi * 0.1).sin() * LOTUS_BOB,
        )
}

/// Lead blade above the target, the rest on counter-rotating rings hanging
/// below it.
pub fn dageng_slot(frame: &LayoutFrame<'_>, i: usize) -> Vec3 {
    let center = frame.center;
    if i == LEAD_AGENT {
        return center + Vec3::Y * DAGENG_LEAD_LIFT;
    }

    let config = frame.config;
    let rank = i - 1;
    let rank_count = frame.count.saturating_sub(1).max(1);
    let per_layer = (rank_count / config.dageng_layers.max(1)).max(1);
    let layer = rank / per_layer;
    let index_in_layer = rank % per_layer;

    let radius = config.dageng_radius + layer as f32 * DAGENG_RING_SPACING + DAGENG_RING_OFFSET;
    let direction = if layer % 2 == 0 { 1.0 } else { -1.0 };
    let theta = index_in_layer as f32 / per_layer as f32 * TAU
        + frame.time * config.dageng_rotate_speed * direction;

    let height_hash = (rank as f32 * DAGENG_HEIGHT_HASH).sin() * 0.5 + 0.5;
    let height = center.y - DAGENG_DROP + (height_hash - 0.5) * config.dageng_height;

    Vec3::new(
        center.x + theta.cos() * radius,
        height,
        center.z + theta.sin() * radius,
    )
}

/// Head blades hover on the target; the body samples the path trail and is
/// roughened by the noise field evaluated at each blade's own position.
pub fn dragon_slot(
    frame: &LayoutFrame<'_>,
    i: usize,
    history: &PathHistory,
    position: Vec3,
    noise: &dyn NoiseField,
) -> Vec3 {
    let fi = i as f32;
    let t = frame.time;

    if i < DRAGON_HEAD_COUNT {
        let phase = t * 8.0 + fi;
        return frame.center
            + Vec3::new(phase.sin() * DRAGON_HEAD_SWAY, phase.cos() * DRAGON_HEAD_SWAY, 0.0);
    }

    let sway = t * 10.0 + fi * 0.5;
    let body = history.sample(fi * DRAGON_BODY_SPACING)
        + Vec3::new(sway.sin() * DRAGON_BODY_SWAY, sway.cos() * DRAGON_BODY_SWAY, 0.0);

    let scale = frame.config.noise_scale;
    let amplitude = frame.config.noise_strength * (0.8 + (t * 2.0 + fi * 0.05).sin() * 0.4);
    let p = position * scale;

    body + Vec3::new(
        noise.sample(p.x, p.y, t),
        noise.sample(p.y, p.z, t + 100.0),
        noise.sample(p.z, p.x, t + 200.0),
    ) * amplitude
}

/// Owns the path trail and the per-agent ideal positions.
pub struct FormationEngine {
    history: PathHistory,
    noise: Box<dyn NoiseField>,
    ideal: Vec<Vec3>,
    formation: Formation,
}

impl FormationEngine {
    pub fn new(config: &SwarmConfig, noise: Box<dyn NoiseField>) -> Self {
        Self {
            history: PathHistory::new(config.path_history_length),
            noise,
            ideal: vec![Vec3::ZERO; config.agent_count],
            formation: Formation::Lotus,
        }
    }

    pub fn history(&self) -> &PathHistory {
        &self.history
    }

    pub fn formation(&self) -> Formation {
        self.formation
    }

    pub fn ideal_targets(&self) -> &[Vec3] {
        &self.ideal
    }

    /// Records or extrapolates the trail. While untracked the origin is fed
    /// in so the trail is already home when the hand returns.
    pub fn advance_history(&mut self, mode: GestureMode, tracking: bool, center: Vec3) {
        if !tracking {
            self.history.update(Vec3::ZERO);
            return;
        }

        if mode == GestureMode::Dragon && !self.history.update(center) {
            self.history.extend();
        }
    }

    /// Computes every agent's ideal position for this frame. The formation is
    /// chosen once; each branch runs its own tight loop.
    pub fn layout(
        &mut self,
        config: &SwarmConfig,
        mode: GestureMode,
        tracking: bool,
        center: Vec3,
        time: f32,
        positions: &[Vec3],
    ) -> &[Vec3] {
        let formation = Formation::select(mode, tracking);
        let frame = LayoutFrame {
            config,
            count: self.ideal.len(),
            center,
            time,
        };

        match formation {
            Formation::Shield => {
                for (i, slot) in self.ideal.iter_mut().enumerate() {
                    *slot = shield_slot(&frame, i);
                }
            }
            Formation::Lotus => {
                for (i, slot) in self.ideal.iter_mut().enumerate() {
                    *slot = lotus_slot(&frame, i);
                }
            }
            Formation::Dageng => {
                for (i, slot) in self.ideal.iter_mut().enumerate() {
                    *slot = dageng_slot(&frame, i);
                }
            }
            Formation::Dragon => {
                let noise = self.noise.as_ref();
                for (i, slot) in self.ideal.iter_mut().enumerate() {
                    let position = positions.get(i).copied().unwrap_or(center);
                    *slot = dragon_slot(&frame, i, &self.history, position, noise);
                }
            }
        }

        self.formation = formation;
        &self.ideal
    }
}

#[cfg(test)]
mod tests {
    use super::{
        dageng_slot, dragon_slot, lotus_slot, shield_slot, Formation, FormationEngine,
        LayoutFrame, DRAGON_HEAD_COUNT, GOLDEN_ANGLE,
    };
    use crate::config::SwarmConfig;
    use crate::gesture::GestureMode;
    use crate::noise::SilentNoise;
    use crate::path_history::PathHistory;
    use glam::Vec3;

    fn frame(config: &SwarmConfig, count: usize, center: Vec3, time: f32) -> LayoutFrame<'_> {
        LayoutFrame {
            config,
            count,
            center,
            time,
        }
    }

    #[test]
    fn untracked_swarm_idles_in_lotus() {
        for mode in [
            GestureMode::Shield,
            GestureMode::Lotus,
            GestureMode::Dageng,
            GestureMode::Dragon,
        ] {
            assert_eq!(Formation::select(mode, false), Formation::Lotus);
        }
        assert_eq!(Formation::select(GestureMode::Dageng, true), Formation::Dageng);
    }

    #[test]
    fn golden_angle_constant_matches_definition() {
        let expected = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        assert!((GOLDEN_ANGLE - expected).abs() < 1.0e-6);
    }

    #[test]
    fn four_blade_lotus_spans_min_to_max_radius() {
        let config = SwarmConfig::default();
        let f = frame(&config, 4, Vec3::ZERO, 0.0);

        let first = lotus_slot(&f, 0);
        assert!((first - Vec3::new(config.lotus_min_radius, 0.0, 0.0)).length() < 1.0e-5);

        let last = lotus_slot(&f, 3);
        let angle = 3.0 * GOLDEN_ANGLE;
        assert!((last.x - config.lotus_radius * angle.cos()).abs() < 1.0e-4);
        assert!((last.y - config.lotus_radius * angle.sin()).abs() < 1.0e-4);
        assert!(last.z.abs() <= 0.2);
    }

    #[test]
    fn shield_slots_sit_on_the_sphere() {
        let config = SwarmConfig::default();
        let center = Vec3::new(3.0, -2.0, 0.0);
        for step in 0..5 {
            let f = frame(&config, 200, center, step as f32 * 0.7);
            for i in 0..200 {
                let d = (shield_slot(&f, i) - center).length();
                assert!((d - config.shield_radius).abs() < 0.3, "slot {i} at {d}");
            }
        }
    }

    #[test]
    fn dageng_lead_hovers_and_ranks_hang_below() {
        let config = SwarmConfig::default();
        let center = Vec3::new(1.0, 4.0, -2.0);
        let f = frame(&config, 101, center, 1.5);

        assert_eq!(dageng_slot(&f, 0), center + Vec3::new(0.0, 5.0, 0.0));

        let band_low = center.y - 10.0 - config.dageng_height * 0.5;
        let band_high = center.y - 10.0 + config.dageng_height * 0.5;
        for i in 1..101 {
            let p = dageng_slot(&f, i);
            assert!(p.y >= band_low - 1.0e-4 && p.y <= band_high + 1.0e-4);
            let ring = Vec3::new(p.x - center.x, 0.0, p.z - center.z).length();
            assert!(ring >= config.dageng_radius + 2.0 - 1.0e-3);
        }
    }

    #[test]
    fn dageng_layers_counter_rotate() {
        let config = SwarmConfig::default();
        let center = Vec3::ZERO;
        // 100 ranks over 10 layers: blade 1 opens layer 0, blade 11 opens layer 1.
        let before = frame(&config, 101, center, 0.0);
        let after = frame(&config, 101, center, 1.0);

        let angle = |p: Vec3| p.z.atan2(p.x);
        let layer0 = angle(dageng_slot(&after, 1)) - angle(dageng_slot(&before, 1));
        let layer1 = angle(dageng_slot(&after, 11)) - angle(dageng_slot(&before, 11));

        assert!((layer0 - config.dageng_rotate_speed).abs() < 1.0e-4);
        assert!((layer1 + config.dageng_rotate_speed).abs() < 1.0e-4);
    }

    #[test]
    fn dragon_head_hugs_target_and_body_follows_trail() {
        let config = SwarmConfig::default();
        let center = Vec3::new(5.0, 5.0, 0.0);
        let f = frame(&config, 50, center, 0.0);

        let mut history = PathHistory::new(config.path_history_length);
        for step in 1..=40 {
            history.update(Vec3::new(step as f32, 0.0, 0.0));
        }

        for i in 0..DRAGON_HEAD_COUNT {
            let p = dragon_slot(&f, i, &history, Vec3::ZERO, &SilentNoise);
            assert!((p - center).length() <= 0.3 + 1.0e-5);
        }

        // Blade 10 samples trail index 8: newest is x=40, so x=32.
        let body = dragon_slot(&f, 10, &history, Vec3::ZERO, &SilentNoise);
        assert!((body.x - 32.0).abs() <= 0.2 + 1.0e-5);
        assert!(body.y.abs() <= 0.2 + 1.0e-5);
    }

    #[test]
    fn dragon_trail_extends_when_target_is_still() {
        let config = SwarmConfig {
            agent_count: 16,
            ..SwarmConfig::default()
        };
        let mut engine = FormationEngine::new(&config, Box::new(SilentNoise));

        engine.advance_history(GestureMode::Dragon, true, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(engine.history().front(), Vec3::new(2.0, 0.0, 0.0));

        engine.advance_history(GestureMode::Dragon, true, Vec3::new(2.0, 0.0, 0.0));
        assert!((engine.history().front().x - 2.3).abs() < 1.0e-5);

        // Other tracked formations leave the trail alone.
        engine.advance_history(GestureMode::Shield, true, Vec3::new(9.0, 0.0, 0.0));
        assert!((engine.history().front().x - 2.3).abs() < 1.0e-5);

        engine.advance_history(GestureMode::Dragon, false, Vec3::new(9.0, 0.0, 0.0));
        assert_eq!(engine.history().front(), Vec3::ZERO);
        assert_eq!(engine.history().len(), config.path_history_length);
    }

    #[test]
    fn layout_is_a_pure_function_of_inputs() {
        let config = SwarmConfig {
            agent_count: 32,
            ..SwarmConfig::default()
        };
        let positions: Vec<Vec3> = (0..32).map(|i| Vec3::splat(i as f32 * 0.3)).collect();
        let mut a = FormationEngine::new(&config, Box::new(crate::noise::TrigNoise));
        let mut b = FormationEngine::new(&config, Box::new(crate::noise::TrigNoise));

        for mode in [
            GestureMode::Shield,
            GestureMode::Lotus,
            GestureMode::Dageng,
            GestureMode::Dragon,
        ] {
            let center = Vec3::new(1.0, 2.0, 0.0);
            let left = a.layout(&config, mode, true, center, 3.25, &positions).to_vec();
            let right = b.layout(&config, mode, true, center, 3.25, &positions).to_vec();
            assert_eq!(left, right);
            assert_eq!(left.len(), 32);
        }
    }
}

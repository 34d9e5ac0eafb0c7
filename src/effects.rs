use glam::Vec3;

use crate::gesture::GestureMode;
use crate::math::{hash_unit, lerp};

pub const MAX_ARCS: usize = 100;
pub const FLOATS_PER_ARC: usize = 6;

const ARC_INTENSITY_RATE: f32 = 0.02;
const SEAL_OPACITY_RATE: f32 = 0.05;
const SEAL_SPIN_SPEED: f32 = 0.1;
const SEAL_LIFT: f32 = 15.0;
const SEAL_MIN_OPACITY: f32 = 0.01;

/// Flickering arcs drawn between nearby blades. Reads the swarm's position
/// snapshot and never writes to it.
#[derive(Clone, Debug)]
pub struct LightningArcs {
    seed: u32,
    frame: u32,
    intensity: f32,
    visible: bool,
    arc_count: usize,
    segments: Vec<f32>,
}

impl LightningArcs {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            frame: 0,
            intensity: 0.0,
            visible: false,
            arc_count: 0,
            segments: vec![0.0; MAX_ARCS * FLOATS_PER_ARC],
        }
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn arc_count(&self) -> usize {
        self.arc_count
    }

    /// `MAX_ARCS` segments as `ax, ay, az, bx, by, bz`; unused slots are zero.
    pub fn segments(&self) -> &[f32] {
        &self.segments
    }

    pub fn update(&mut self, mode: GestureMode, tracking: bool, time: f32, positions: &[Vec3]) {
        self.frame = self.frame.wrapping_add(1);

        let goal = if mode == GestureMode::Dageng { 1.0 } else { 0.0 };
        self.intensity = lerp(self.intensity, goal, ARC_INTENSITY_RATE);
        let intensity = self.intensity;

        let flash_speed = 15.0 + intensity * 10.0;
        let flash_threshold = 0.7 - intensity * 0.3;
        let attempts = ((30.0 + intensity * 70.0) as usize).min(MAX_ARCS);
        let max_length = 5.0 + intensity * 20.0;
        let jitter = 0.2 + intensity * 0.3;

        let flash = (time * flash_speed).sin() > flash_threshold;
        self.visible = flash && tracking && !positions.is_empty();
        self.arc_count = 0;
        if !self.visible {
            self.segments.fill(0.0);
            return;
        }

        let stream = self.seed ^ self.frame.wrapping_mul(0x2545_f491);
        let n = positions.len();
        let pick = |k: u32, channel: u32| {
            let u = (hash_unit(stream, k, channel) + 1.0) * 0.5;
            ((u * n as f32) as usize).min(n - 1)
        };

        let mut idx = 0;
        for k in 0..attempts as u32 {
            let a = positions[pick(k, 0)];
            let b = positions[pick(k, 1)];
            if a.distance(b) >= max_length {
                continue;
            }

            for (offset, end) in [a, b].into_iter().enumerate() {
                let channel = 2 + offset as u32 * 3;
                let shake = Vec3::new(
                    hash_unit(stream, k, channel),
                    hash_unit(stream, k, channel + 1),
                    hash_unit(stream, k, channel + 2),
                ) * (jitter * 0.5);
                let p = end + shake;
                self.segments[idx..idx + 3].copy_from_slice(&[p.x, p.y, p.z]);
                idx += 3;
            }
            self.arc_count += 1;
        }

        self.segments[idx..].fill(0.0);
    }
}

/// Ground seal shown above the target while the two-tier array is held.
#[derive(Clone, Debug, Default)]
pub struct SealCircle {
    opacity: f32,
    rotation: f32,
    anchor: Vec3,
}

impl SealCircle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, mode: GestureMode, tracking: bool, time: f32, target: Vec3) {
        let goal = if mode == GestureMode::Dageng && tracking {
            1.0
        } else {
            0.0
        };
        self.opacity = lerp(self.opacity, goal, SEAL_OPACITY_RATE);
        self.rotation = time * SEAL_SPIN_SPEED;

        if self.is_visible() {
            self.anchor = target + Vec3::Y * SEAL_LIFT;
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > SEAL_MIN_OPACITY
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }
}

#[cfg(test)]
mod tests {
    use super::{LightningArcs, SealCircle, FLOATS_PER_ARC, MAX_ARCS};
    use crate::gesture::GestureMode;
    use glam::Vec3;

    fn cluster() -> Vec<Vec3> {
        (0..64)
            .map(|i| Vec3::new((i % 8) as f32 * 0.5, (i / 8) as f32 * 0.5, 0.0))
            .collect()
    }

    #[test]
    fn intensity_ramps_toward_dageng() {
        let mut arcs = LightningArcs::new(11);
        let positions = cluster();
        for step in 0..300 {
            arcs.update(GestureMode::Dageng, true, step as f32 / 60.0, &positions);
        }
        assert!(arcs.intensity() > 0.99);

        for step in 0..300 {
            arcs.update(GestureMode::Lotus, true, step as f32 / 60.0, &positions);
        }
        assert!(arcs.intensity() < 0.01);
    }

    #[test]
    fn arcs_hidden_without_tracking() {
        let mut arcs = LightningArcs::new(3);
        let positions = cluster();
        for step in 0..120 {
            arcs.update(GestureMode::Dageng, false, step as f32 / 60.0, &positions);
            assert!(!arcs.is_visible());
            assert!(arcs.segments().iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn visible_arcs_connect_nearby_blades() {
        let mut arcs = LightningArcs::new(5);
        let positions = cluster();
        let mut seen = false;

        for step in 0..240 {
            arcs.update(GestureMode::Dragon, true, step as f32 / 60.0, &positions);
            assert_eq!(arcs.segments().len(), MAX_ARCS * FLOATS_PER_ARC);
            if !arcs.is_visible() {
                continue;
            }

            seen = true;
            // The whole cluster is closer than the minimum arc length.
            assert_eq!(arcs.arc_count(), 30);
            let used = arcs.arc_count() * FLOATS_PER_ARC;
            assert!(arcs.segments()[used..].iter().all(|v| *v == 0.0));
            for chunk in arcs.segments()[..used].chunks_exact(3) {
                let p = Vec3::new(chunk[0], chunk[1], chunk[2]);
                assert!(p.x >= -0.2 && p.x <= 3.7 && p.z.abs() <= 0.2);
            }
        }
        assert!(seen);
    }

    #[test]
    fn seal_fades_in_above_target() {
        let mut seal = SealCircle::new();
        let target = Vec3::new(2.0, 1.0, 0.0);
        assert!(!seal.is_visible());

        for step in 0..120 {
            seal.update(GestureMode::Dageng, true, step as f32 / 60.0, target);
        }
        assert!(seal.opacity() > 0.99);
        assert_eq!(seal.anchor(), Vec3::new(2.0, 16.0, 0.0));

        for step in 0..200 {
            seal.update(GestureMode::Dageng, false, step as f32 / 60.0, target);
        }
        assert!(!seal.is_visible());
    }
}

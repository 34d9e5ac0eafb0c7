use std::collections::VecDeque;

use glam::Vec3;

use crate::math::normalize_or_default;

/// Movement below this is treated as tracking jitter and not recorded.
pub const MIN_RECORDED_STEP: f32 = 0.1;
/// Below this the last direction is considered unset.
pub const MIN_DIRECTION_LENGTH: f32 = 0.01;
/// Distance a synthesized point is placed ahead of the newest entry.
pub const EXTEND_STEP: f32 = 0.3;

/// Fixed-length trail of recent target points, newest first.
///
/// The buffer is always full: it starts as `capacity` copies of the origin
/// and every accepted write drops the oldest entry.
#[derive(Clone, Debug)]
pub struct PathHistory {
    points: VecDeque<Vec3>,
    last_direction: Vec3,
}

impl PathHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::from(vec![Vec3::ZERO; capacity]),
            last_direction: Vec3::ZERO,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn front(&self) -> Vec3 {
        self.points.front().copied().unwrap_or(Vec3::ZERO)
    }

    pub fn last_direction(&self) -> Vec3 {
        self.last_direction
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Vec3> + '_ {
        self.points.iter()
    }

    /// Records `pos` if it is far enough from the newest point. Returns
    /// whether the point was accepted.
    pub fn update(&mut self, pos: Vec3) -> bool {
        let diff = pos - self.front();
        if diff.length() <= MIN_RECORDED_STEP {
            return false;
        }

        self.last_direction = normalize_or_default(diff, Vec3::ZERO);
        self.push_front(pos);
        true
    }

    /// Continues the trail along the last recorded direction. No-op until a
    /// direction has been established.
    pub fn extend(&mut self) -> bool {
        if self.last_direction.length() < MIN_DIRECTION_LENGTH {
            return false;
        }

        let next = self.front() + self.last_direction * EXTEND_STEP;
        self.push_front(next);
        true
    }

    /// Linear interpolation at a fractional index; indices past either end
    /// clamp to the nearest entry.
    pub fn sample(&self, index: f32) -> Vec3 {
        let last = self.points.len().saturating_sub(1);
        if !index.is_finite() || index <= 0.0 {
            return self.front();
        }

        let floor = index.floor();
        let idx_a = (floor as usize).min(last);
        let idx_b = (idx_a + 1).min(last);
        let alpha = index - floor;

        self.points[idx_a].lerp(self.points[idx_b], alpha)
    }

    pub fn write_flat(&self, out: &mut Vec<f32>) {
        out.clear();
        out.reserve(self.points.len() * 3);
        for p in &self.points {
            out.extend_from_slice(&[p.x, p.y, p.z]);
        }
    }

    fn push_front(&mut self, pos: Vec3) {
        self.points.pop_back();
        self.points.push_front(pos);
    }
}

use glam::{Mat4, Vec2, Vec3};
use log::{debug, trace};

use crate::error::{Result, SwarmError};
use crate::gesture::GestureMode;
use crate::math::{normalize_or_default, EPSILON};

pub const HAND_LANDMARK_COUNT: usize = 21;
pub const WRIST: usize = 0;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;

const NDC_DEPTH: f32 = 0.5;

pub const DEFAULT_FOV_Y_DEG: f32 = 60.0;
pub const DEFAULT_EYE: Vec3 = Vec3::new(0.0, 3.0, 35.0);

/// Camera capable of mapping normalized device coordinates back into world
/// space.
pub trait Unproject {
    fn position(&self) -> Vec3;
    fn unproject(&self, ndc: Vec3) -> Vec3;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatrixCamera {
    eye: Vec3,
    inverse_view_projection: Mat4,
}

impl MatrixCamera {
    pub fn new(eye: Vec3, inverse_view_projection: Mat4) -> Self {
        Self {
            eye,
            inverse_view_projection,
        }
    }

    /// `matrix` is column-major, the layout three.js uses for `elements`.
    pub fn from_slices(position: &[f32], matrix: &[f32]) -> Result<Self> {
        if position.len() != 3 {
            return Err(SwarmError::MatrixLength {
                expected: 3,
                found: position.len(),
            });
        }
        if matrix.len() != 16 {
            return Err(SwarmError::MatrixLength {
                expected: 16,
                found: matrix.len(),
            });
        }

        let mut cols = [0.0; 16];
        cols.copy_from_slice(matrix);
        Ok(Self::new(
            Vec3::new(position[0], position[1], position[2]),
            Mat4::from_cols_array(&cols),
        ))
    }

    pub fn perspective(
        fov_y_deg: f32,
        aspect: f32,
        near: f32,
        far: f32,
        eye: Vec3,
        look_at: Vec3,
    ) -> Self {
        let projection = Mat4::perspective_rh_gl(fov_y_deg.to_radians(), aspect, near, far);
        let view = Mat4::look_at_rh(eye, look_at, Vec3::Y);
        Self::new(eye, (projection * view).inverse())
    }
}

impl Default for MatrixCamera {
    fn default() -> Self {
        Self::perspective(
            DEFAULT_FOV_Y_DEG,
            16.0 / 9.0,
            0.1,
            1_000.0,
            DEFAULT_EYE,
            DEFAULT_EYE + Vec3::NEG_Z,
        )
    }
}

impl Unproject for MatrixCamera {
    fn position(&self) -> Vec3 {
        self.eye
    }

    fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.inverse_view_projection.project_point3(ndc)
    }
}

/// One detected hand: the classifier's label plus its landmarks in
/// normalized, unmirrored image coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct HandFrame {
    pub gesture: GestureMode,
    pub landmarks: [Vec2; HAND_LANDMARK_COUNT],
}

impl HandFrame {
    /// Accepts `x, y` pairs or `x, y, z` triples; depth is ignored.
    pub fn from_flat(gesture: GestureMode, values: &[f32]) -> Result<Self> {
        let stride = match values.len() {
            n if n == HAND_LANDMARK_COUNT * 2 => 2,
            n if n == HAND_LANDMARK_COUNT * 3 => 3,
            n => {
                return Err(SwarmError::LandmarkCount {
                    expected: HAND_LANDMARK_COUNT,
                    found: n,
                })
            }
        };

        let mut landmarks = [Vec2::ZERO; HAND_LANDMARK_COUNT];
        for (slot, chunk) in landmarks.iter_mut().zip(values.chunks_exact(stride)) {
            *slot = Vec2::new(chunk[0], chunk[1]);
        }

        Ok(Self { gesture, landmarks })
    }

    /// Palm center for the open-hand formations, index fingertip otherwise.
    pub fn reference_point(&self, mode: GestureMode) -> Vec2 {
        match mode {
            GestureMode::Shield | GestureMode::Lotus => {
                (self.landmarks[WRIST] + self.landmarks[MIDDLE_MCP]) * 0.5
            }
            GestureMode::Dageng | GestureMode::Dragon => self.landmarks[INDEX_TIP],
        }
    }
}

/// Casts a mirrored image-space point through the camera onto the `z = 0`
/// world plane. Returns `None` when the ray runs parallel to the plane.
pub fn project_to_world_plane(camera: &dyn Unproject, reference: Vec2) -> Option<Vec3> {
    let ndc = Vec3::new(
        (1.0 - reference.x) * 2.0 - 1.0,
        -(reference.y * 2.0 - 1.0),
        NDC_DEPTH,
    );

    let eye = camera.position();
    let dir = normalize_or_default(camera.unproject(ndc) - eye, Vec3::ZERO);
    if dir.z.abs() <= EPSILON {
        trace!("camera ray parallel to target plane; holding previous target");
        return None;
    }

    let point = eye + dir * (-eye.z / dir.z);
    point.is_finite().then_some(point)
}

#[derive(Clone, Debug, Default)]
pub struct TargetTracker {
    target: Vec3,
    tracking: bool,
}

impl TargetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Last projected target. Frozen while tracking is lost.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// The point formations center on: the live target, or the origin while
    /// no hand is visible.
    pub fn effective_target(&self) -> Vec3 {
        if self.tracking {
            self.target
        } else {
            Vec3::ZERO
        }
    }

    pub fn observe(&mut self, hand: Option<&HandFrame>, mode: GestureMode, camera: &dyn Unproject) {
        let Some(hand) = hand else {
            if self.tracking {
                debug!("hand tracking lost; holding target at {:?}", self.target);
            }
            self.tracking = false;
            return;
        };

        if !self.tracking {
            debug!("hand tracking acquired");
        }
        self.tracking = true;

        if let Some(point) = project_to_world_plane(camera, hand.reference_point(mode)) {
            self.target = point;
        }
    }
}

use glam::{Mat3, Quat, Vec3};

pub const EPSILON: f32 = 1.0e-6;

pub fn normalize_or_default(v: Vec3, default: Vec3) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq <= EPSILON {
        return default;
    }
    v * (1.0 / len_sq.sqrt())
}

pub fn limit_magnitude(v: Vec3, max_magnitude: f32) -> Vec3 {
    if max_magnitude <= 0.0 {
        return Vec3::ZERO;
    }

    let mag_sq = v.length_squared();
    if mag_sq <= max_magnitude * max_magnitude {
        return v;
    }

    v * (max_magnitude / mag_sq.sqrt())
}

/// Rotation that carries local +Z onto `forward`, keeping local +Y as close
/// to world up as the heading allows.
pub fn look_rotation(forward: Vec3) -> Quat {
    let fwd = normalize_or_default(forward, Vec3::Z);

    let mut up_ref = Vec3::Y;
    if fwd.dot(up_ref).abs() > 0.97 {
        up_ref = Vec3::Z;
    }

    let right = normalize_or_default(up_ref.cross(fwd), Vec3::X);
    let up = normalize_or_default(fwd.cross(right), Vec3::Y);

    Quat::from_mat3(&Mat3::from_cols(right, up, fwd)).normalize()
}

pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

pub fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if !value.is_finite() {
        return fallback;
    }
    value.clamp(min, max)
}

// Integer avalanche hash mapped onto [-1, 1). Stands in for an RNG wherever a
// value must be reproducible from (seed, index, channel).
pub fn hash_unit(a: u32, b: u32, c: u32) -> f32 {
    let mut h = a.wrapping_mul(0x9e37_79b1)
        ^ b.wrapping_mul(0x85eb_ca77).rotate_left(13)
        ^ c.wrapping_mul(0xc2b2_ae3d).rotate_left(26);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;

    ((h >> 8) as f32 / (1u32 << 24) as f32) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::{hash_unit, limit_magnitude, look_rotation, normalize_or_default};
    use glam::Vec3;

    #[test]
    fn degenerate_vector_falls_back() {
        let v = normalize_or_default(Vec3::ZERO, Vec3::NEG_Z);
        assert_eq!(v, Vec3::NEG_Z);

        let v = normalize_or_default(Vec3::new(3.0, 4.0, 0.0), Vec3::X);
        assert!((v.length() - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn limited_vector_has_expected_upper_bound() {
        let v = limit_magnitude(Vec3::new(0.0, 0.0, 10.0), 2.0);
        assert!((v.z - 2.0).abs() < 1.0e-5);

        let short = Vec3::new(0.5, 0.0, 0.0);
        assert_eq!(limit_magnitude(short, 2.0), short);
        assert_eq!(limit_magnitude(short, 0.0), Vec3::ZERO);
    }

    #[test]
    fn look_rotation_points_local_z_along_heading() {
        let headings = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.3, 0.9, -0.2),
            Vec3::new(0.0, 0.0, -1.0),
        ];

        for heading in headings {
            let q = look_rotation(heading);
            let rotated = q * Vec3::Z;
            assert!((rotated - heading.normalize()).length() < 1.0e-4);
        }
    }

    #[test]
    fn hash_is_bounded_and_repeatable() {
        for i in 0..512 {
            let h = hash_unit(7, i, 2);
            assert!((-1.0..1.0).contains(&h));
            assert_eq!(h, hash_unit(7, i, 2));
        }
        assert_ne!(hash_unit(7, 1, 0), hash_unit(7, 1, 1));
    }
}

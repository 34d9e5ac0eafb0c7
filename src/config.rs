use log::info;
use serde::Deserialize;

use crate::error::Result;
use crate::math::clamp_finite;

pub const DESKTOP_AGENT_COUNT: usize = 500;
pub const MOBILE_AGENT_COUNT: usize = 300;
pub const MAX_AGENT_COUNT: usize = 4_096;
pub const MIN_PATH_HISTORY_LENGTH: usize = 2;
pub const MAX_PATH_HISTORY_LENGTH: usize = 4_096;
pub const MIN_DAGENG_LAYERS: usize = 1;
pub const MAX_DAGENG_LAYERS: usize = 64;
pub const MOBILE_VIEWPORT_WIDTH: f32 = 768.0;

const MOBILE_AGENT_MARKERS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    Mobile,
}

impl DeviceClass {
    pub fn detect(user_agent: &str, viewport_width: f32) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        let mobile_agent = MOBILE_AGENT_MARKERS.iter().any(|marker| ua.contains(marker));
        if mobile_agent || viewport_width < MOBILE_VIEWPORT_WIDTH {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    pub fn agent_count(self) -> usize {
        match self {
            Self::Desktop => DESKTOP_AGENT_COUNT,
            Self::Mobile => MOBILE_AGENT_COUNT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwarmConfig {
    pub agent_count: usize,
    pub path_history_length: usize,
    pub max_speed: f32,
    pub sprint_speed: f32,
    pub steer_force: f32,
    pub separation_distance: f32,
    pub separation_force: f32,
    pub noise_scale: f32,
    pub noise_strength: f32,
    pub shield_radius: f32,
    pub shield_orbit_speed: f32,
    pub shield_tilt_speed: f32,
    pub lotus_min_radius: f32,
    pub lotus_radius: f32,
    pub lotus_rotate_speed: f32,
    pub dageng_radius: f32,
    pub dageng_height: f32,
    pub dageng_rotate_speed: f32,
    pub dageng_layers: usize,
    pub debounce_secs: f32,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            agent_count: DESKTOP_AGENT_COUNT,
            path_history_length: 300,
            max_speed: 25.0,
            sprint_speed: 50.0,
            steer_force: 28.0,
            separation_distance: 3.0,
            separation_force: 10.0,
            noise_scale: 0.3,
            noise_strength: 1.0,
            shield_radius: 18.0,
            shield_orbit_speed: 2.5,
            shield_tilt_speed: 0.3,
            lotus_min_radius: 6.0,
            lotus_radius: 24.0,
            lotus_rotate_speed: 2.5,
            dageng_radius: 30.0,
            dageng_height: 20.0,
            dageng_rotate_speed: 0.2,
            dageng_layers: 10,
            debounce_secs: 0.25,
        }
    }
}

impl SwarmConfig {
    pub fn for_device(device: DeviceClass) -> Self {
        let config = Self {
            agent_count: device.agent_count(),
            ..Self::default()
        };
        info!(
            "swarm config resolved for {:?}: {} agents",
            device, config.agent_count
        );
        config
    }

    /// Applies a JSON object of field overrides on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.sanitize();
        info!("swarm config loaded from overrides: {} agents", config.agent_count);
        Ok(config)
    }

    pub fn sanitize(&mut self) {
        let defaults = Self::default();

        self.agent_count = self.agent_count.clamp(1, MAX_AGENT_COUNT);
        self.path_history_length = self
            .path_history_length
            .clamp(MIN_PATH_HISTORY_LENGTH, MAX_PATH_HISTORY_LENGTH);
        self.max_speed = clamp_finite(self.max_speed, 0.1, 500.0, defaults.max_speed);
        self.sprint_speed = clamp_finite(
            self.sprint_speed,
            self.max_speed,
            1_000.0,
            defaults.sprint_speed.max(self.max_speed),
        );
        self.steer_force = clamp_finite(self.steer_force, 0.0, 1_000.0, defaults.steer_force);
        self.separation_distance = clamp_finite(
            self.separation_distance,
            0.0,
            100.0,
            defaults.separation_distance,
        );
        self.separation_force = clamp_finite(
            self.separation_force,
            0.0,
            1_000.0,
            defaults.separation_force,
        );
        self.noise_scale = clamp_finite(self.noise_scale, 0.0, 10.0, defaults.noise_scale);
        self.noise_strength =
            clamp_finite(self.noise_strength, 0.0, 10.0, defaults.noise_strength);
        self.shield_radius =
            clamp_finite(self.shield_radius, 0.1, 500.0, defaults.shield_radius);
        self.shield_orbit_speed = clamp_finite(
            self.shield_orbit_speed,
            -50.0,
            50.0,
            defaults.shield_orbit_speed,
        );
        self.shield_tilt_speed = clamp_finite(
            self.shield_tilt_speed,
            -50.0,
            50.0,
            defaults.shield_tilt_speed,
        );
        self.lotus_min_radius =
            clamp_finite(self.lotus_min_radius, 0.0, 500.0, defaults.lotus_min_radius);
        self.lotus_radius = clamp_finite(
            self.lotus_radius,
            self.lotus_min_radius,
            500.0,
            defaults.lotus_radius.max(self.lotus_min_radius),
        );
        self.lotus_rotate_speed = clamp_finite(
            self.lotus_rotate_speed,
            -50.0,
            50.0,
            defaults.lotus_rotate_speed,
        );
        self.dageng_radius =
            clamp_finite(self.dageng_radius, 0.0, 500.0, defaults.dageng_radius);
        self.dageng_height =
            clamp_finite(self.dageng_height, 0.0, 500.0, defaults.dageng_height);
        self.dageng_rotate_speed = clamp_finite(
            self.dageng_rotate_speed,
            -50.0,
            50.0,
            defaults.dageng_rotate_speed,
        );
        self.dageng_layers = self.dageng_layers.clamp(MIN_DAGENG_LAYERS, MAX_DAGENG_LAYERS);
        self.debounce_secs = clamp_finite(self.debounce_secs, 0.0, 5.0, defaults.debounce_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceClass, SwarmConfig, MOBILE_AGENT_COUNT};

    #[test]
    fn detects_mobile_from_agent_or_width() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        let desktop = "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/128.0";

        assert_eq!(DeviceClass::detect(iphone, 1_200.0), DeviceClass::Mobile);
        assert_eq!(DeviceClass::detect(desktop, 600.0), DeviceClass::Mobile);
        assert_eq!(DeviceClass::detect(desktop, 1_440.0), DeviceClass::Desktop);
        assert_eq!(
            SwarmConfig::for_device(DeviceClass::Mobile).agent_count,
            MOBILE_AGENT_COUNT
        );
    }

    #[test]
    fn json_overrides_keep_remaining_defaults() {
        let config = SwarmConfig::from_json(r#"{ "agent_count": 64, "shield_radius": 12.0 }"#)
            .expect("valid overrides");

        assert_eq!(config.agent_count, 64);
        assert_eq!(config.shield_radius, 12.0);
        assert_eq!(config.path_history_length, 300);
        assert_eq!(config.lotus_radius, 24.0);
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(SwarmConfig::from_json(r#"{ "swordCount": 10 }"#).is_err());
        assert!(SwarmConfig::from_json("not json").is_err());
    }

    #[test]
    fn sanitize_replaces_non_finite_and_clamps_counts() {
        let mut config = SwarmConfig {
            agent_count: 0,
            path_history_length: 1,
            max_speed: f32::NAN,
            sprint_speed: 1.0,
            lotus_radius: 2.0,
            ..SwarmConfig::default()
        };
        config.sanitize();

        assert_eq!(config.agent_count, 1);
        assert_eq!(config.path_history_length, 2);
        assert_eq!(config.max_speed, 25.0);
        assert!(config.sprint_speed >= config.max_speed);
        assert!(config.lotus_radius >= config.lotus_min_radius);
    }
}

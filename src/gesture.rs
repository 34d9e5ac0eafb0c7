use std::fmt;
use std::str::FromStr;

use log::info;

use crate::error::SwarmError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GestureMode {
    Shield,
    #[default]
    Lotus,
    Dageng,
    Dragon,
}

impl GestureMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Shield),
            1 => Some(Self::Lotus),
            2 => Some(Self::Dageng),
            3 => Some(Self::Dragon),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            Self::Shield => 0,
            Self::Lotus => 1,
            Self::Dageng => 2,
            Self::Dragon => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Shield => "SHIELD",
            Self::Lotus => "LOTUS",
            Self::Dageng => "DAGENG",
            Self::Dragon => "DRAGON",
        }
    }
}

impl fmt::Display for GestureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GestureMode {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SHIELD" => Ok(Self::Shield),
            "LOTUS" => Ok(Self::Lotus),
            "DAGENG" => Ok(Self::Dageng),
            "DRAGON" => Ok(Self::Dragon),
            _ => Err(SwarmError::UnknownGesture(s.to_string())),
        }
    }
}

/// Turns a flickering per-frame classification into a stable formation mode.
///
/// A candidate label must be observed continuously for longer than the hold
/// time before it is confirmed. A change of the raw label restarts the hold
/// timer. Frames with no detection are skipped entirely: the candidate and
/// its timer survive a dropout and the confirmed mode is never touched.
#[derive(Clone, Debug)]
pub struct GestureDebouncer {
    hold_secs: f64,
    confirmed: GestureMode,
    pending: Option<GestureMode>,
    pending_since: f64,
}

impl GestureDebouncer {
    pub fn new(hold_secs: f32) -> Self {
        Self {
            hold_secs: f64::from(hold_secs.max(0.0)),
            confirmed: GestureMode::default(),
            pending: None,
            pending_since: 0.0,
        }
    }

    pub fn confirmed(&self) -> GestureMode {
        self.confirmed
    }

    pub fn pending(&self) -> Option<GestureMode> {
        self.pending
    }

    /// Feeds one frame of raw classification; returns the confirmed mode
    /// after the update.
    pub fn observe(&mut self, raw: Option<GestureMode>, now: f64) -> GestureMode {
        let Some(raw) = raw else {
            return self.confirmed;
        };

        if Some(raw) != self.pending {
            self.pending = Some(raw);
            self.pending_since = now;
            return self.confirmed;
        }

        if let Some(candidate) = self.pending {
            if candidate != self.confirmed && now - self.pending_since > self.hold_secs {
                info!(
                    "gesture confirmed: {} -> {} after {:.3}s",
                    self.confirmed,
                    candidate,
                    now - self.pending_since
                );
                self.confirmed = candidate;
            }
        }

        self.confirmed
    }
}

//! Session record and partial-update types.

use serde::{Deserialize, Serialize};

/// Countdown before each capture, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TimerSetting {
    #[default]
    Three,
    Five,
}

impl TimerSetting {
    pub fn seconds(self) -> u8 {
        match self {
            Self::Three => 3,
            Self::Five => 5,
        }
    }
}

impl TryFrom<u8> for TimerSetting {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Self::Three),
            5 => Ok(Self::Five),
            other => Err(format!("timer must be 3 or 5 seconds, got {other}")),
        }
    }
}

impl From<TimerSetting> for u8 {
    fn from(timer: TimerSetting) -> Self {
        timer.seconds()
    }
}

/// One photobooth session: the chosen layout, captured photos (data URLs)
/// and countdown setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub layout: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub timer: TimerSetting,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl SessionRecord {
    /// Apply a patch. The id and creation time never change.
    pub fn merge(&mut self, patch: SessionPatch) {
        if let Some(layout) = patch.layout {
            self.layout = layout;
        }
        if let Some(photos) = patch.photos {
            self.photos = photos;
        }
        if let Some(timer) = patch.timer {
            self.timer = timer;
        }
    }
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    pub layout: Option<String>,
    pub photos: Option<Vec<String>>,
    pub timer: Option<TimerSetting>,
}

/// Session ids are used as file names, so they are restricted to
/// `[A-Za-z0-9_-]`.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

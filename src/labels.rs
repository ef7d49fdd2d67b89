//! Decoding of the labeled recording filename convention.
//!
//! Recordings are named `modality-channel-emotion-intensity-statement-repetition-actor.wav`,
//! each segment a two-digit code. Channel, emotion, intensity and statement are looked
//! up in fixed tables; modality, repetition and actor are kept as literal identifiers.

use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LabelError;

const SEGMENT_COUNT: usize = 7;

/// Emotion expressed in a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Neutral,
    Calm,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgust,
    Surprised,
}

impl Emotion {
    pub const ALL: [Emotion; 8] = [
        Emotion::Neutral,
        Emotion::Calm,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
        Emotion::Disgust,
        Emotion::Surprised,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        let index = match code {
            "01" => 0,
            "02" => 1,
            "03" => 2,
            "04" => 3,
            "05" => 4,
            "06" => 5,
            "07" => 6,
            "08" => 7,
            _ => return None,
        };
        Some(Self::ALL[index])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Calm => "calm",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fearful => "fearful",
            Emotion::Disgust => "disgust",
            Emotion::Surprised => "surprised",
        }
    }
}

/// Whether the actor spoke or sang the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocalChannel {
    Speech,
    Song,
}

impl VocalChannel {
    pub const ALL: [VocalChannel; 2] = [VocalChannel::Speech, VocalChannel::Song];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(VocalChannel::Speech),
            "02" => Some(VocalChannel::Song),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VocalChannel::Speech => "speech",
            VocalChannel::Song => "song",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Normal,
    Strong,
}

impl Intensity {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Intensity::Normal),
            "02" => Some(Intensity::Strong),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::Normal => "normal",
            Intensity::Strong => "strong",
        }
    }
}

/// One of the two fixed sentences every actor recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statement {
    #[serde(rename = "Kids are talking by the door")]
    KidsTalking,
    #[serde(rename = "Dogs are sitting by the door")]
    DogsSitting,
}

impl Statement {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Statement::KidsTalking),
            "02" => Some(Statement::DogsSitting),
            _ => None,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Statement::KidsTalking => "Kids are talking by the door",
            Statement::DogsSitting => "Dogs are sitting by the door",
        }
    }
}

macro_rules! display_via_str {
    ($ty:ty, $method:ident) => {
        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.$method())
            }
        }
    };
}

display_via_str!(Emotion, as_str);
display_via_str!(VocalChannel, as_str);
display_via_str!(Intensity, as_str);
display_via_str!(Statement, text);

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|emotion| emotion.as_str() == lowered)
            .or_else(|| Self::from_code(&lowered))
            .ok_or_else(|| format!("unknown emotion '{s}'"))
    }
}

impl FromStr for VocalChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|channel| channel.as_str() == lowered)
            .or_else(|| Self::from_code(&lowered))
            .ok_or_else(|| format!("unknown vocal channel '{s}'"))
    }
}

/// Labels decoded from one recording's file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilenameLabels {
    pub modality: String,
    pub channel: VocalChannel,
    pub emotion: Emotion,
    pub intensity: Intensity,
    pub statement: Statement,
    pub repetition: String,
    pub actor: String,
}

impl FilenameLabels {
    /// Decode a file stem (extension already stripped). All-or-nothing.
    pub fn parse(stem: &str) -> Result<Self, LabelError> {
        let segments: Vec<&str> = stem.split('-').collect();
        if segments.len() != SEGMENT_COUNT {
            return Err(LabelError::SegmentCount {
                name: stem.to_string(),
                found: segments.len(),
            });
        }

        let unknown = |field: &'static str, code: &str| LabelError::UnknownCode {
            field,
            code: code.to_string(),
            name: stem.to_string(),
        };
        let literal = |field: &'static str, value: &str| {
            if value.is_empty() {
                Err(LabelError::EmptySegment {
                    field,
                    name: stem.to_string(),
                })
            } else {
                Ok(value.to_string())
            }
        };

        Ok(Self {
            modality: literal("modality", segments[0])?,
            channel: VocalChannel::from_code(segments[1])
                .ok_or_else(|| unknown("channel", segments[1]))?,
            emotion: Emotion::from_code(segments[2])
                .ok_or_else(|| unknown("emotion", segments[2]))?,
            intensity: Intensity::from_code(segments[3])
                .ok_or_else(|| unknown("intensity", segments[3]))?,
            statement: Statement::from_code(segments[4])
                .ok_or_else(|| unknown("statement", segments[4]))?,
            repetition: literal("repetition", segments[5])?,
            actor: literal("actor", segments[6])?,
        })
    }

    /// Decode the file name of `path`, ignoring its directory and extension.
    pub fn from_path(path: &Path) -> Result<Self, LabelError> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| LabelError::InvalidName(path.to_path_buf()))?;
        Self::parse(stem)
    }
}

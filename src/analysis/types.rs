//! Core data types of the recall pipeline.
//!
//! Defines [`Emotion`] / [`EmotionTag`] (the emotional context of a memory),
//! [`MemoryInput`] (one submission), [`Candidate`] (a proposed place) and
//! [`AnalysisResult`] (the single output shape handed to the presentation layer).

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Maximum length of a user submission, in characters.
pub const MAX_SUBMISSION_CHARS: usize = 500;

/// Maximum length of text handed to upstream sources, in characters.
pub const MAX_SANITIZED_CHARS: usize = 1000;

/// Maximum number of secondary candidates kept in a result.
pub const MAX_SECONDARY: usize = 4;

/// The six emotions offered by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Nostalgic,
    Peaceful,
    Melancholy,
    Joyful,
    Mysterious,
    Warm,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Self::Nostalgic,
        Self::Peaceful,
        Self::Melancholy,
        Self::Joyful,
        Self::Mysterious,
        Self::Warm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nostalgic => "nostalgic",
            Self::Peaceful => "peaceful",
            Self::Melancholy => "melancholy",
            Self::Joyful => "joyful",
            Self::Mysterious => "mysterious",
            Self::Warm => "warm",
        }
    }

    /// Phrase used when the emotion is woven into story text.
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::Nostalgic => "a quiet nostalgia",
            Self::Peaceful => "a deep sense of peace",
            Self::Melancholy => "a gentle melancholy",
            Self::Joyful => "a bright, lingering joy",
            Self::Mysterious => "an unexplained sense of mystery",
            Self::Warm => "a lasting warmth",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nostalgic" => Ok(Self::Nostalgic),
            "peaceful" => Ok(Self::Peaceful),
            "melancholy" => Ok(Self::Melancholy),
            "joyful" => Ok(Self::Joyful),
            "mysterious" => Ok(Self::Mysterious),
            "warm" => Ok(Self::Warm),
            _ => Err(format!("unknown emotion: {s}")),
        }
    }
}

/// An emotion tag as submitted. Unknown tags are kept verbatim and passed to
/// upstream sources as opaque context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmotionTag {
    Known(Emotion),
    Other(String),
}

impl EmotionTag {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<Emotion>() {
            Ok(emotion) => Self::Known(emotion),
            Err(_) => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(emotion) => emotion.as_str(),
            Self::Other(raw) => raw,
        }
    }

    pub fn known(&self) -> Option<Emotion> {
        match self {
            Self::Known(emotion) => Some(*emotion),
            Self::Other(_) => None,
        }
    }

    /// Phrase for story text. Unknown tags are quoted as given.
    pub fn phrase(&self) -> String {
        match self {
            Self::Known(emotion) => emotion.phrase().to_string(),
            Self::Other(raw) if raw.is_empty() => "a feeling you could not name".to_string(),
            Self::Other(raw) => format!("a feeling of \"{raw}\""),
        }
    }
}

impl std::fmt::Display for EmotionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One memory submission. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryInput {
    text: String,
    emotion: EmotionTag,
}

impl MemoryInput {
    /// Strict constructor for user submissions: trims, then rejects text over
    /// [`MAX_SUBMISSION_CHARS`].
    pub fn submit(text: &str, emotion: &str) -> Result<Self, InputError> {
        let trimmed = text.trim();
        let len = trimmed.chars().count();
        if len > MAX_SUBMISSION_CHARS {
            return Err(InputError::TooLong {
                len,
                max: MAX_SUBMISSION_CHARS,
            });
        }
        Ok(Self {
            text: trimmed.to_string(),
            emotion: EmotionTag::parse(emotion),
        })
    }

    /// Lenient constructor: trims and truncates to [`MAX_SANITIZED_CHARS`].
    pub fn sanitize(text: &str, emotion: &str) -> Self {
        let text = truncate_chars(text.trim(), MAX_SANITIZED_CHARS).to_string();
        Self {
            text,
            emotion: EmotionTag::parse(emotion),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn emotion(&self) -> &EmotionTag {
        &self.emotion
    }
}

/// Truncate to at most `max` chars without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A proposed real-world place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub name: String,
    /// Raw score as proposed by the source; percentage after normalization.
    pub probability: f64,
    /// Story text for the primary candidate, short description otherwise.
    pub description: String,
    pub region: String,
    pub coordinates: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Candidate {
    pub fn new(
        name: impl Into<String>,
        probability: f64,
        description: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            probability,
            description: description.into(),
            region: region.into(),
            coordinates: None,
            image_url: None,
            address: None,
        }
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some(Coordinates { lat, lng });
        self
    }
}

/// Which fallback source produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMethod {
    QuantumBackend,
    GeminiDirect,
    GeminiLocal,
    KeywordFallback,
}

impl SourceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuantumBackend => "quantum_backend",
            Self::GeminiDirect => "gemini_direct",
            Self::GeminiLocal => "gemini_local",
            Self::KeywordFallback => "keyword_fallback",
        }
    }
}

impl std::fmt::Display for SourceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One primary candidate plus up to [`MAX_SECONDARY`] alternates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub primary: Candidate,
    pub secondary: Vec<Candidate>,
    pub source_method: SourceMethod,
}

impl AnalysisResult {
    /// All candidates, primary first.
    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        std::iter::once(&self.primary).chain(self.secondary.iter())
    }

    /// Drop secondaries that repeat an earlier name (case-insensitive) and cap
    /// the list at [`MAX_SECONDARY`].
    pub fn dedup_secondary(&mut self) {
        let mut seen = vec![name_key(&self.primary.name)];
        self.secondary.retain(|candidate| {
            let key = name_key(&candidate.name);
            if key.is_empty() || seen.contains(&key) {
                tracing::debug!(name = %candidate.name, "dropping duplicate secondary candidate");
                false
            } else {
                seen.push(key);
                true
            }
        });
        self.secondary.truncate(MAX_SECONDARY);
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

//! Upstream payload parsing.
//!
//! Generative models wrap their JSON in prose or code fences, so
//! [`extract_json_object`] scans for the first balanced `{...}` block that
//! actually parses. [`ModelPayload`] and [`BackendPayload`] are the two wire
//! shapes sources return; both convert into an un-normalized [`AnalysisResult`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::types::{AnalysisResult, Candidate, Coordinates, SourceMethod};
use crate::error::SourceError;

/// Raw primary score used when a source does not provide one.
pub const DEFAULT_PRIMARY_SCORE: f64 = 75.0;

/// Return the first well-formed JSON object embedded in `text`.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        if let Some(close) = matching_brace(bytes, open) {
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&text[open..=close]) {
                return Some(value);
            }
        }
        start = open + 1;
    }
    None
}

/// Index of the `}` closing the `{` at `open`, skipping braces inside strings.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Shape returned by the generative model and the secondary backend route.
///
/// Accepts both the flat `location/story/region` form and the nested
/// `primaryLocation` form the prompt asks for.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPayload {
    location: Option<String>,
    story: Option<String>,
    region: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    probability: Option<f64>,
    primary_location: Option<ModelPrimary>,
    #[serde(default, alias = "secondary_locations", deserialize_with = "null_as_default")]
    secondary_locations: Vec<ModelSecondary>,
}

#[derive(Debug, Deserialize)]
struct ModelPrimary {
    name: Option<String>,
    story: Option<String>,
    region: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ModelSecondary {
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    probability: Option<f64>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    region: String,
}

impl ModelPayload {
    /// Parse model text: extract the embedded object, then deserialize it.
    pub fn from_text(text: &str) -> Result<Self, SourceError> {
        let value = extract_json_object(text)
            .ok_or_else(|| SourceError::Malformed("no JSON object in model output".into()))?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn into_result(self, method: SourceMethod) -> Result<AnalysisResult, SourceError> {
        let (name, story, region, probability) = match self.primary_location {
            Some(p) => (
                p.name.or(self.location),
                p.story.or(self.story),
                p.region.or(self.region),
                p.probability.or(self.probability),
            ),
            None => (self.location, self.story, self.region, self.probability),
        };

        let name = non_empty(name)
            .ok_or_else(|| SourceError::Malformed("missing primary location name".into()))?;

        let primary = Candidate::new(
            name,
            probability.unwrap_or(DEFAULT_PRIMARY_SCORE),
            story.unwrap_or_default(),
            region.unwrap_or_default(),
        );

        let secondary = self
            .secondary_locations
            .into_iter()
            .filter_map(|s| {
                let name = non_empty(s.name)?;
                Some(Candidate::new(
                    name,
                    s.probability.unwrap_or(0.0),
                    s.description,
                    s.region,
                ))
            })
            .collect();

        Ok(AnalysisResult {
            primary,
            secondary,
            source_method: method,
        })
    }
}

/// Shape returned by the quantum analysis backend.
#[derive(Debug, Deserialize)]
pub struct BackendPayload {
    primary_location: BackendPrimary,
    #[serde(default, deserialize_with = "null_as_default")]
    secondary_locations: Vec<BackendSecondary>,
}

#[derive(Debug, Deserialize)]
struct BackendPrimary {
    name: String,
    #[serde(default)]
    story: String,
    #[serde(default, deserialize_with = "lenient_score")]
    probability: Option<f64>,
    coordinates: Option<Coordinates>,
    image_url: Option<String>,
    #[serde(default)]
    region: String,
}

#[derive(Debug, Deserialize)]
struct BackendSecondary {
    name: String,
    #[serde(default, deserialize_with = "lenient_score")]
    probability: Option<f64>,
    #[serde(default)]
    description: String,
    coordinates: Option<Coordinates>,
    #[serde(default)]
    region: String,
}

impl BackendPayload {
    pub fn into_result(self, method: SourceMethod) -> Result<AnalysisResult, SourceError> {
        let p = self.primary_location;
        let name = non_empty(Some(p.name))
            .ok_or_else(|| SourceError::Malformed("missing primary location name".into()))?;

        let mut primary = Candidate::new(
            name,
            p.probability.unwrap_or(DEFAULT_PRIMARY_SCORE),
            p.story,
            p.region,
        );
        primary.coordinates = p.coordinates;
        primary.image_url = p.image_url;

        let secondary = self
            .secondary_locations
            .into_iter()
            .filter(|s| !s.name.trim().is_empty())
            .map(|s| {
                let mut c = Candidate::new(
                    s.name.trim(),
                    s.probability.unwrap_or(0.0),
                    s.description,
                    s.region,
                );
                c.coordinates = s.coordinates;
                c
            })
            .collect();

        Ok(AnalysisResult {
            primary,
            secondary,
            source_method: method,
        })
    }
}

/// Scores arrive as numbers or numeric strings (`"20"`, `" 0.4 "`). Anything
/// else counts as missing.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let score = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(score)
}

/// `null` reads as the default (an empty list).
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

//! Direct call to the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::post_json;
use crate::analysis::keyword::contains_keyword;
use crate::analysis::payload::ModelPayload;
use crate::analysis::source::LocationSource;
use crate::analysis::types::{AnalysisResult, MemoryInput, SourceMethod};
use crate::error::SourceError;

/// Mentions that steer the prompt away from its Japan-first default.
const INTERNATIONAL_KEYWORDS: &[&str] = &[
    "paris", "london", "new york", "rome", "berlin", "madrid", "amsterdam", "zurich",
    "sydney", "toronto", "france", "uk", "usa", "italy", "germany", "spain",
    "netherlands", "switzerland", "australia", "canada", "europe",
    "パリ", "ロンドン", "ニューヨーク", "ローマ", "ベルリン", "マドリード", "アムステルダム",
    "チューリッヒ", "シドニー", "トロント", "フランス", "イギリス", "アメリカ", "イタリア",
    "ドイツ", "スペイン", "オランダ", "スイス", "オーストラリア", "カナダ", "ヨーロッパ",
    "海外", "外国", "石畳", "教会", "カフェ", "エッフェル塔", "セーヌ川", "テムズ川", "高層ビル",
];

pub struct GeminiSource {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiSource {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, api_key: &str) -> Result<reqwest::Url, SourceError> {
        let raw = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        reqwest::Url::parse_with_params(&raw, &[("key", api_key)])
            .map_err(|e| SourceError::Unavailable(format!("invalid gemini url: {e}")))
    }
}

#[async_trait]
impl LocationSource for GeminiSource {
    fn method(&self) -> SourceMethod {
        SourceMethod::GeminiDirect
    }

    async fn analyze(&self, input: &MemoryInput) -> Result<AnalysisResult, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::NotConfigured("gemini api key"))?;
        let url = self.endpoint(api_key)?;

        let request = json!({
            "contents": [{ "parts": [{ "text": build_prompt(input) }] }]
        });
        let body = post_json(&self.client, url.as_str(), &request).await?;

        let text = response_text(&body)?;
        ModelPayload::from_text(&text)?.into_result(self.method())
    }
}

/// Concatenate the text parts of the first candidate.
pub fn response_text(body: &str) -> Result<String, SourceError> {
    let v: Value = serde_json::from_str(body)?;

    if let Some(message) = v["error"]["message"].as_str() {
        return Err(SourceError::Unavailable(format!("gemini error: {message}")));
    }

    let text: String = v["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(SourceError::Malformed("gemini response has no text".into()));
    }
    Ok(text)
}

pub fn is_international(memory: &str) -> bool {
    let lower = memory.to_lowercase();
    INTERNATIONAL_KEYWORDS
        .iter()
        .any(|kw| contains_keyword(&lower, kw))
}

pub fn build_prompt(input: &MemoryInput) -> String {
    let international = is_international(input.text());

    let location_constraint = if international {
        "Use real, existing locations worldwide that match the memory. If the memory suggests \
         international locations (Europe, America, etc.), suggest those places. Include specific \
         landmarks, cities, or well-known places that actually exist."
    } else {
        "Use real, existing locations primarily in Japan, but if the memory clearly suggests \
         international locations, include those as well."
    };
    let region = if international {
        r#""region": "Country or major region (e.g., France, UK, USA, Italy, etc.)""#
    } else {
        r#""region": "Prefecture, country, or region name""#
    };

    format!(
        r#"You help people rediscover meaningful places from fragments of their memories.

Given the following memory fragment and emotional context, suggest specific, real locations that could match this memory.

Memory Fragment: "{memory}"
Emotional Context: "{emotion}"

Respond with JSON only, in the following format:
{{
  "primaryLocation": {{
    "name": "A specific, real location name (city, landmark, or place)",
    "story": "A 2-3 sentence emotional and poetic story connecting the memory to this place",
    {region}
  }},
  "secondaryLocations": [
    {{
      "name": "Another possible real location",
      "probability": number between 10-30,
      "description": "Brief poetic description",
      {region}
    }},
    {{
      "name": "Third possible real location",
      "probability": number between 5-25,
      "description": "Brief poetic description",
      {region}
    }}
  ]
}}

IMPORTANT:
- {location_constraint}
- The locations must actually exist and be findable on a map
- Match the geographic context of the memory
- Do not repeat the same place twice
"#,
        memory = input.text(),
        emotion = input.emotion(),
    )
}

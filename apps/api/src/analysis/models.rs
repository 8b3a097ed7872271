//! Wire types for the analysis API. Field names are camelCase on the wire.

use serde::{Deserialize, Deserializer, Serialize};

use crate::extraction::DocumentFormat;

// ────────────────────────────────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze body. Legacy field names are accepted as aliases.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default, alias = "resumeBase64", deserialize_with = "null_as_empty")]
    pub document_base64: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub file_name: String,
    #[serde(default, alias = "jobDescription", deserialize_with = "null_as_empty")]
    pub job_description_text: String,
}

/// POST /api/v1/extract body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    #[serde(default, alias = "resumeBase64", deserialize_with = "null_as_empty")]
    pub document_base64: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub file_name: String,
}

/// Treats an explicit `null` like a missing field, so both hit the same
/// "Missing required fields" check.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub file_name: String,
    pub format: DocumentFormat,
    pub character_count: usize,
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Analysis record returned by the scorer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

/// A JD keyword and where it shows up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordPresence {
    pub keyword: String,
    pub in_resume: bool,
    #[serde(rename = "inJD")]
    pub in_jd: bool,
    pub importance: Importance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Structured resume-vs-JD analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    #[serde(deserialize_with = "deserialize_score")]
    pub match_score: u8,
    #[serde(deserialize_with = "deserialize_score")]
    pub ats_score: u8,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<KeywordPresence>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub ats_tips: Vec<String>,
}

/// Accepts any JSON number and rounds/clamps it into 0–100.
fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom("score must be a finite number"));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

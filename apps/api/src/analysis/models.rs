//! Analysis data model: request, per-stage results, and the assembled result.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Minimum trimmed input length, in characters, before any LLM call is made.
pub const MIN_INPUT_CHARS: usize = 20;
/// Inputs shorter than this are analysed but flagged as likely to give thin results.
pub const SHORT_INPUT_CHARS: usize = 80;

pub const NEUTRAL_SCORE: u8 = 3;
pub const MAX_SCORE: u8 = 5;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Input too short. Provide at least {min} characters for analysis (got {actual}).")]
    InputTooShort { min: usize, actual: usize },
}

// ────────────────────────────────────────────────────────────────────────────
// Request
// ────────────────────────────────────────────────────────────────────────────

/// Which template family the prompts and fallbacks use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyLevel {
    /// High school and university work.
    #[default]
    Default,
    /// Elementary school work, ages 6–12.
    Elementary,
}

impl StudyLevel {
    pub fn label(self) -> &'static str {
        match self {
            StudyLevel::Default => "Default Mode",
            StudyLevel::Elementary => "Elementary Mode",
        }
    }
}

/// A validated analysis request. Only constructible through [`AnalysisRequest::new`].
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    text: String,
    study_level: StudyLevel,
    wellbeing_enabled: bool,
}

impl AnalysisRequest {
    pub fn new(
        text: impl Into<String>,
        study_level: StudyLevel,
        wellbeing_enabled: bool,
    ) -> Result<Self, AnalysisError> {
        let text = text.into();
        let actual = text.trim().chars().count();
        if actual < MIN_INPUT_CHARS {
            return Err(AnalysisError::InputTooShort {
                min: MIN_INPUT_CHARS,
                actual,
            });
        }
        Ok(Self {
            text,
            study_level,
            wellbeing_enabled,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn study_level(&self) -> StudyLevel {
        self.study_level
    }

    pub fn wellbeing_enabled(&self) -> bool {
        self.wellbeing_enabled
    }

    pub fn is_short(&self) -> bool {
        self.text.trim().chars().count() < SHORT_INPUT_CHARS
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rubric
// ────────────────────────────────────────────────────────────────────────────

pub const DIMENSIONS: [&str; 5] = ["structure", "clarity", "evidence", "originality", "coherence"];

/// Rubric scores, 0–5 per dimension. A dimension the model left out scores 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricScores {
    #[serde(default = "neutral_score", deserialize_with = "lenient_score")]
    pub structure: u8,
    #[serde(default = "neutral_score", deserialize_with = "lenient_score")]
    pub clarity: u8,
    #[serde(default = "neutral_score", deserialize_with = "lenient_score")]
    pub evidence: u8,
    #[serde(default = "neutral_score", deserialize_with = "lenient_score")]
    pub originality: u8,
    #[serde(default = "neutral_score", deserialize_with = "lenient_score")]
    pub coherence: u8,
}

impl Default for RubricScores {
    fn default() -> Self {
        Self::uniform(NEUTRAL_SCORE)
    }
}

impl RubricScores {
    pub fn uniform(score: u8) -> Self {
        Self {
            structure: score,
            clarity: score,
            evidence: score,
            originality: score,
            coherence: score,
        }
    }

    /// Scores in [`DIMENSIONS`] order.
    pub fn values(&self) -> [u8; 5] {
        [
            self.structure,
            self.clarity,
            self.evidence,
            self.originality,
            self.coherence,
        ]
    }

    pub fn average(&self) -> f64 {
        self.values().iter().map(|&s| f64::from(s)).sum::<f64>() / DIMENSIONS.len() as f64
    }
}

fn neutral_score() -> u8 {
    NEUTRAL_SCORE
}

/// Accepts integers, floats and numeric strings; rounds and clamps into 0–5.
/// `NaN` and infinities are rejected.
fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let raw = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite());
    let raw = raw.ok_or_else(|| serde::de::Error::custom(format!("invalid score: {value}")))?;
    Ok(raw.round().clamp(0.0, f64::from(MAX_SCORE)) as u8)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RubricJustifications {
    pub structure: String,
    pub clarity: String,
    pub evidence: String,
    pub originality: String,
    pub coherence: String,
}

impl RubricJustifications {
    pub fn uniform(text: &str) -> Self {
        Self {
            structure: text.to_string(),
            clarity: text.to_string(),
            evidence: text.to_string(),
            originality: text.to_string(),
            coherence: text.to_string(),
        }
    }

    /// Justifications in [`DIMENSIONS`] order.
    pub fn values(&self) -> [&str; 5] {
        [
            self.structure.as_str(),
            self.clarity.as_str(),
            self.evidence.as_str(),
            self.originality.as_str(),
            self.coherence.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RubricResult {
    pub scores: RubricScores,
    pub justifications: RubricJustifications,
}

// ────────────────────────────────────────────────────────────────────────────
// Profile
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileResult {
    pub strengths: Vec<String>,
    pub growth_areas: Vec<String>,
    pub cognitive_pattern: String,
    /// Day-labelled actions, "Day 1: ..." through "Day 3: ...".
    pub development_plan: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Talent
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TalentFocus {
    pub talent: String,
    pub rationale: String,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementaryTalent {
    pub talent_indicators: Vec<String>,
    pub learning_recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultTalent {
    pub talent_indicators: Vec<String>,
    pub matching_domains: Vec<String>,
    pub talent_development_focus: Vec<TalentFocus>,
}

/// Talent stage output. The variant always matches the request's study level, so
/// only that level's keys appear in the serialized result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TalentResult {
    Elementary(ElementaryTalent),
    Default(DefaultTalent),
}

impl TalentResult {
    pub fn talent_indicators(&self) -> &[String] {
        match self {
            TalentResult::Elementary(t) => &t.talent_indicators,
            TalentResult::Default(t) => &t.talent_indicators,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wellbeing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellbeingLevel {
    #[default]
    None,
    Mild,
    Flag,
}

impl WellbeingLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            WellbeingLevel::None => "none",
            WellbeingLevel::Mild => "mild",
            WellbeingLevel::Flag => "flag",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellbeingResult {
    pub level: WellbeingLevel,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub next_step: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Assembled result
// ────────────────────────────────────────────────────────────────────────────

/// Everything one analysis produces. Built once by the pipeline and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub study_level: StudyLevel,
    pub rubric: RubricResult,
    #[serde(flatten)]
    pub profile: ProfileResult,
    #[serde(flatten)]
    pub talent: TalentResult,
    pub wellbeing: Option<WellbeingResult>,
}

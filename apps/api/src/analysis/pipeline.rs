//! Analysis Pipeline: runs the four stages in order for one piece of work.
//!
//! rubric → profile (from scores) → talent (from profile + scores) → wellbeing (optional).
//! Each stage makes exactly one gateway call. Output that does not parse into the
//! stage's shape is replaced by that stage's static fallback, so an analysis of
//! validated input always completes.

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::analysis::fallbacks;
use crate::analysis::models::{
    AnalysisRequest, AnalysisResult, ProfileResult, RubricResult, RubricScores,
    StudyLevel, TalentResult, WellbeingResult,
};
use crate::analysis::prompts::{
    profile_prompt, rubric_prompt, talent_prompt, wellbeing_prompt, ANALYSIS_SYSTEM,
};
use crate::analysis::screening::screen;
use crate::llm_client::{strip_code_fences, Completer};

/// Receives stage progress as a percentage and a short status line.
pub trait ProgressObserver: Send + Sync {
    fn report(&self, percent: u8, message: &str);
}

impl<F> ProgressObserver for F
where
    F: Fn(u8, &str) + Send + Sync,
{
    fn report(&self, percent: u8, message: &str) {
        self(percent, message)
    }
}

/// Parses model output into `T`, or returns `fallback()` when it cannot.
/// Surrounding code fences are ignored.
pub fn parse_with_fallback<T: DeserializeOwned>(
    stage: &str,
    raw: &str,
    fallback: impl FnOnce() -> T,
) -> T {
    match serde_json::from_str(strip_code_fences(raw)) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(stage, "Model output did not parse, using fallback: {e}");
            fallback()
        }
    }
}

/// Runs every stage for an already validated request.
pub async fn analyze(
    llm: &dyn Completer,
    request: &AnalysisRequest,
    observer: Option<&dyn ProgressObserver>,
) -> AnalysisResult {
    let progress = |percent: u8, message: &str| {
        info!(percent, "{message}");
        if let Some(observer) = observer {
            observer.report(percent, message);
        }
    };
    let level = request.study_level();
    let text = request.text();

    progress(20, "Evaluating rubric scores...");
    let rubric = run_rubric(llm, text, level).await;

    progress(50, "Building profile...");
    let profile = run_profile(llm, &rubric.scores, text, level).await;

    progress(75, "Identifying talents...");
    let talent = run_talent(llm, &profile, &rubric.scores, text, level).await;

    let wellbeing = if request.wellbeing_enabled() {
        progress(90, "Checking wellbeing signals...");
        Some(run_wellbeing(llm, text).await)
    } else {
        None
    };

    progress(100, "Finalizing results...");
    AnalysisResult {
        study_level: level,
        rubric,
        profile,
        talent,
        wellbeing,
    }
}

async fn run_rubric(llm: &dyn Completer, text: &str, level: StudyLevel) -> RubricResult {
    let raw = llm
        .complete(&rubric_prompt(text, level), Some(ANALYSIS_SYSTEM))
        .await;
    parse_with_fallback("rubric", &raw, fallbacks::rubric)
}

async fn run_profile(
    llm: &dyn Completer,
    scores: &RubricScores,
    text: &str,
    level: StudyLevel,
) -> ProfileResult {
    let raw = llm
        .complete(&profile_prompt(scores, text, level), Some(ANALYSIS_SYSTEM))
        .await;
    parse_with_fallback("profile", &raw, || fallbacks::profile(level))
}

async fn run_talent(
    llm: &dyn Completer,
    profile: &ProfileResult,
    scores: &RubricScores,
    text: &str,
    level: StudyLevel,
) -> TalentResult {
    let raw = llm
        .complete(
            &talent_prompt(profile, scores, text, level),
            Some(ANALYSIS_SYSTEM),
        )
        .await;
    match level {
        StudyLevel::Elementary => TalentResult::Elementary(parse_with_fallback(
            "talent",
            &raw,
            fallbacks::elementary_talent,
        )),
        StudyLevel::Default => TalentResult::Default(parse_with_fallback(
            "talent",
            &raw,
            fallbacks::default_talent,
        )),
    }
}

async fn run_wellbeing(llm: &dyn Completer, text: &str) -> WellbeingResult {
    let keywords = screen(text);
    if !keywords.is_empty() {
        info!(matches = keywords.len(), "Wellbeing keywords detected");
    }
    let raw = llm
        .complete(&wellbeing_prompt(text, &keywords), Some(ANALYSIS_SYSTEM))
        .await;
    parse_with_fallback("wellbeing", &raw, fallbacks::wellbeing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::WellbeingLevel;
    use crate::llm_client::LlmGateway;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const ESSAY: &str = "The Roman Empire declined because of a combination of political \
        instability, economic decline and military pressure. Between 235 and 284 AD the \
        empire faced an almost constant cycle of civil wars.";

    /// Replays scripted responses in order and records every prompt it receives.
    struct ScriptedCompleter {
        responses: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedCompleter {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn prompt(&self, index: usize) -> String {
            self.prompts.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl Completer for ScriptedCompleter {
        async fn complete(&self, prompt: &str, _system: Option<&str>) -> String {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| "not json".to_string())
        }
    }

    fn request(text: &str, level: StudyLevel, wellbeing: bool) -> AnalysisRequest {
        AnalysisRequest::new(text, level, wellbeing).unwrap()
    }

    #[test]
    fn test_parse_with_fallback_strips_fences() {
        let scores: RubricScores = parse_with_fallback(
            "rubric",
            "```json\n{\"structure\": 5}\n```",
            RubricScores::default,
        );
        assert_eq!(scores.structure, 5);
    }

    #[test]
    fn test_parse_with_fallback_on_garbage() {
        let scores = parse_with_fallback("rubric", "Sorry, I cannot help.", || {
            RubricScores::uniform(1)
        });
        assert_eq!(scores, RubricScores::uniform(1));
    }

    #[tokio::test]
    async fn test_invalid_json_everywhere_yields_every_fallback() {
        let llm = ScriptedCompleter::new(&["nope", "nope", "nope", "nope"]);
        let result = analyze(&llm, &request(ESSAY, StudyLevel::Default, true), None).await;

        assert_eq!(llm.calls(), 4);
        assert_eq!(result.rubric, fallbacks::rubric());
        assert_eq!(result.profile, fallbacks::profile(StudyLevel::Default));
        assert_eq!(result.talent, fallbacks::talent(StudyLevel::Default));
        assert_eq!(result.wellbeing, Some(fallbacks::wellbeing()));
    }

    #[tokio::test]
    async fn test_elementary_fallbacks_follow_level() {
        let llm = ScriptedCompleter::new(&[]);
        let result = analyze(&llm, &request(ESSAY, StudyLevel::Elementary, false), None).await;
        assert_eq!(result.profile, fallbacks::profile(StudyLevel::Elementary));
        assert_eq!(result.talent, fallbacks::talent(StudyLevel::Elementary));
    }

    #[tokio::test]
    async fn test_wellbeing_skipped_when_disabled() {
        let llm = ScriptedCompleter::new(&[]);
        let result = analyze(&llm, &request(ESSAY, StudyLevel::Default, false), None).await;
        assert_eq!(llm.calls(), 3);
        assert!(result.wellbeing.is_none());
    }

    #[tokio::test]
    async fn test_scores_flow_into_the_profile_prompt() {
        let llm = ScriptedCompleter::new(&[
            r#"{"scores": {"structure": 1, "clarity": 2, "evidence": 3, "originality": 4, "coherence": 5}}"#,
        ]);
        analyze(&llm, &request(ESSAY, StudyLevel::Default, false), None).await;
        let profile_prompt = llm.prompt(1);
        assert!(profile_prompt.contains("\"structure\": 1"));
        assert!(profile_prompt.contains("\"coherence\": 5"));
    }

    #[tokio::test]
    async fn test_wellbeing_prompt_carries_screener_matches() {
        let text = format!("{ESSAY} Ich bin oft müde und habe Stress.");
        let llm = ScriptedCompleter::new(&[
            "{}",
            "{}",
            "{}",
            r#"{"level": "mild", "note": "Light stress signals.", "next_step": "Offer a check-in."}"#,
        ]);
        let result = analyze(&llm, &request(&text, StudyLevel::Default, true), None).await;

        assert!(llm.prompt(3).contains("Detected keywords: stress, müde"));
        let wellbeing = result.wellbeing.unwrap();
        assert_eq!(wellbeing.level, WellbeingLevel::Mild);
        assert_eq!(wellbeing.next_step, "Offer a check-in.");
    }

    #[tokio::test]
    async fn test_unknown_wellbeing_level_falls_back() {
        let llm = ScriptedCompleter::new(&["{}", "{}", "{}", r#"{"level": "severe"}"#]);
        let result = analyze(&llm, &request(ESSAY, StudyLevel::Default, true), None).await;
        assert_eq!(result.wellbeing, Some(fallbacks::wellbeing()));
    }

    #[tokio::test]
    async fn test_progress_sequence() {
        let seen = Mutex::new(Vec::new());
        let observer = |percent: u8, message: &str| {
            seen.lock().unwrap().push((percent, message.to_string()));
        };
        let llm = ScriptedCompleter::new(&[]);
        analyze(
            &llm,
            &request(ESSAY, StudyLevel::Default, true),
            Some(&observer),
        )
        .await;

        let seen = seen.into_inner().unwrap();
        let percents: Vec<u8> = seen.iter().map(|(p, _)| *p).collect();
        assert_eq!(percents, vec![20, 50, 75, 90, 100]);
        assert_eq!(seen[0].1, "Evaluating rubric scores...");
        assert_eq!(seen[4].1, "Finalizing results...");
    }

    #[tokio::test]
    async fn test_progress_skips_ninety_without_wellbeing() {
        let seen = Mutex::new(Vec::new());
        let observer = |percent: u8, _: &str| seen.lock().unwrap().push(percent);
        let llm = ScriptedCompleter::new(&[]);
        analyze(
            &llm,
            &request(ESSAY, StudyLevel::Default, false),
            Some(&observer),
        )
        .await;
        assert_eq!(seen.into_inner().unwrap(), vec![20, 50, 75, 100]);
    }

    #[tokio::test]
    async fn test_offline_default_round_trip() {
        let llm = LlmGateway::offline();
        let result = analyze(&llm, &request(ESSAY, StudyLevel::Default, true), None).await;

        assert_eq!(result.rubric.scores.values(), [4, 3, 4, 3, 4]);
        assert!(result.rubric.justifications.structure.starts_with("Clear introduction"));
        assert_eq!(result.profile.strengths.len(), 3);
        match &result.talent {
            TalentResult::Default(t) => {
                assert_eq!(t.matching_domains[0], "Political Science");
                assert_eq!(t.talent_development_focus.len(), 1);
            }
            other => panic!("expected default talent, got {other:?}"),
        }
        assert_eq!(result.wellbeing.unwrap().level, WellbeingLevel::None);
    }

    #[tokio::test]
    async fn test_offline_elementary_round_trip() {
        let llm = LlmGateway::offline();
        let text = "I am nine years old. My favorite sport is Leichtathletik and I like pizza.";
        let result = analyze(&llm, &request(text, StudyLevel::Elementary, false), None).await;

        assert_eq!(result.rubric.scores.values(), [3, 3, 2, 4, 3]);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("learning_recommendations").is_some());
        assert!(json.get("matching_domains").is_none());
    }
}

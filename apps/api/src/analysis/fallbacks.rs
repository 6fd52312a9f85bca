//! Static stand-ins used when a stage's LLM output cannot be parsed.

use crate::analysis::models::{
    DefaultTalent, ElementaryTalent, ProfileResult, RubricJustifications, RubricResult,
    RubricScores, StudyLevel, TalentFocus, WellbeingLevel, WellbeingResult,
};
#[cfg(test)]
use crate::analysis::models::TalentResult;

pub const RUBRIC_PLACEHOLDER: &str = "Automated assessment unavailable.";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Every dimension at 3 with a placeholder justification.
pub fn rubric() -> RubricResult {
    RubricResult {
        scores: RubricScores::default(),
        justifications: RubricJustifications::uniform(RUBRIC_PLACEHOLDER),
    }
}

pub fn profile(level: StudyLevel) -> ProfileResult {
    match level {
        StudyLevel::Elementary => ProfileResult {
            strengths: strings(&[
                "Narrative thinking + 'My favorite'",
                "Topic organization + 'I like'",
                "Personal expression + 'My hobby'",
            ]),
            growth_areas: strings(&[
                "Limited sentence variety + 'I am'",
                "Basic vocabulary expansion + 'simple words'",
                "Simple transitions missing + 'My favorite'",
            ]),
            cognitive_pattern: "Descriptive reasoning with personal experience-based organization. \
                Operates at concrete, personal level."
                .to_string(),
            development_plan: strings(&[
                "Day 1: Read texts about interests to improve vocabulary",
                "Day 2: Write about favorite topic to practice sentence variety",
                "Day 3: Connect interests with learning subjects",
            ]),
        },
        StudyLevel::Default => ProfileResult {
            strengths: strings(&[
                "Pattern Recognition + 'data shows patterns'",
                "Deductive Structuring + 'logical sequence'",
                "Comparative Reasoning + 'contrasting approaches'",
            ]),
            growth_areas: strings(&[
                "Low evidence density + 'few citations'",
                "Weak causal linking + 'unclear connections'",
                "Unclear thesis definition + 'vague argument'",
            ]),
            cognitive_pattern: "Analytical reasoning with structured information organization. \
                Operates at moderate abstraction level. Uses deductive problem-solving approach."
                .to_string(),
            development_plan: strings(&[
                "Day 1: Practice evidence integration with primary sources",
                "Day 2: Strengthen causal linking through comparative analysis",
                "Day 3: Refine thesis definition with structured argumentation",
            ]),
        },
    }
}

/// Level-matched talent fallback, for comparing whole results.
#[cfg(test)]
pub fn talent(level: StudyLevel) -> TalentResult {
    match level {
        StudyLevel::Elementary => TalentResult::Elementary(elementary_talent()),
        StudyLevel::Default => TalentResult::Default(default_talent()),
    }
}

pub fn elementary_talent() -> ElementaryTalent {
    ElementaryTalent {
        talent_indicators: strings(&[
            "Sports-themed narrative thinking",
            "Personal experience-based reasoning",
            "Interest-driven organization",
        ]),
        learning_recommendations: strings(&[
            "Math with football context: Calculate goals, player statistics, field dimensions",
            "English texts about football: Read stories about favorite teams, write about matches",
            "History project about favorite football club: Research club history, connect to historical events",
        ]),
    }
}

pub fn default_talent() -> DefaultTalent {
    DefaultTalent {
        talent_indicators: strings(&[
            "Pattern Recognition + Causal Linking",
            "Systems thinking",
            "Comparative analysis",
        ]),
        matching_domains: strings(&["Political Science", "Data Science", "Research"]),
        talent_development_focus: vec![TalentFocus {
            talent: "Pattern Recognition + Causal Linking".to_string(),
            rationale: "Strong foundation for research and analytical work, visible in text structure."
                .to_string(),
            next_steps: strings(&[
                "Engage in structured debate forums focusing on evidence-based argumentation",
                "Conduct evidence-based research projects using primary sources",
            ]),
        }],
    }
}

pub fn wellbeing() -> WellbeingResult {
    WellbeingResult {
        level: WellbeingLevel::None,
        note: "Assessment unavailable.".to_string(),
        next_step: "Continue standard monitoring.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rubric_fallback_is_neutral() {
        let rubric = rubric();
        assert_eq!(rubric.scores.values(), [3; 5]);
        assert!(rubric
            .justifications
            .values()
            .iter()
            .all(|j| *j == RUBRIC_PLACEHOLDER));
    }

    #[test]
    fn test_talent_fallback_follows_study_level() {
        assert!(matches!(talent(StudyLevel::Elementary), TalentResult::Elementary(_)));
        assert!(matches!(talent(StudyLevel::Default), TalentResult::Default(_)));
    }

    #[test]
    fn test_profile_fallback_plan_is_day_labelled() {
        for level in [StudyLevel::Default, StudyLevel::Elementary] {
            let plan = profile(level).development_plan;
            assert_eq!(plan.len(), 3);
            for (i, step) in plan.iter().enumerate() {
                assert!(step.starts_with(&format!("Day {}:", i + 1)));
            }
        }
    }

    #[test]
    fn test_wellbeing_fallback_level_is_none() {
        let w = wellbeing();
        assert_eq!(w.level, WellbeingLevel::None);
        assert_eq!(w.note, "Assessment unavailable.");
    }
}

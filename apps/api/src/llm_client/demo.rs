//! Offline responder: canned JSON payloads served when no provider is usable.
//!
//! Dispatch looks only at the prompt's own wording. A prompt that names none of the
//! stage keywords gets `{}`.

const RUBRIC: &str = r#"{
  "scores": {"structure": 4, "clarity": 3, "evidence": 4, "originality": 3, "coherence": 4},
  "justifications": {
    "structure": "Clear introduction-body-conclusion sequencing with logical transitions. Example: 'political instability' shows structured sectioning.",
    "clarity": "Consistent wording throughout; a few sentences could be tighter. Example: 'Rome faced an almost constant cycle' demonstrates readable prose.",
    "evidence": "Sources and quantitative data embedded throughout the argument. Example: 'Between 235 and 284 AD' shows historical data integration.",
    "originality": "Independent reasoning appears but can deepen with more unique framing. Example: 'combination of political instability' shows some original synthesis.",
    "coherence": "Argument threads remain aligned end to end with consistent logic. Example: 'economic decline further accelerated' demonstrates causal linking."
  }
}"#;

const RUBRIC_ELEMENTARY: &str = r#"{
  "scores": {"structure": 3, "clarity": 3, "evidence": 2, "originality": 4, "coherence": 3},
  "justifications": {
    "structure": "Simple topic-based organization with personal statements. Example: 'My favorite pet' shows basic structure.",
    "clarity": "Clear, age-appropriate language with simple sentences. Example: 'I am nine years old' demonstrates readable prose.",
    "evidence": "Personal experiences used as examples. Example: 'I like pizza' shows personal evidence.",
    "originality": "Personal expression with unique interests visible. Example: 'My favorite sport is Leichtathletik' shows individual perspective.",
    "coherence": "Logical flow between personal statements. Example: 'I am in 4th grade' connects to context."
  }
}"#;

const PROFILE: &str = r#"{
  "strengths": [
    "Pattern Recognition + 'data shows patterns'",
    "Deductive Structuring + 'logical sequence'",
    "Causal Linking + 'direct relationship'"
  ],
  "growth_areas": [
    "Low evidence density + 'few citations'",
    "Weak causal linking + 'unclear connections'",
    "Unclear thesis definition + 'vague argument'"
  ],
  "cognitive_pattern": "Analytical reasoning with structured information organization. Operates at moderate abstraction level. Uses deductive problem-solving approach.",
  "development_plan": [
    "Day 1: Practice evidence integration with primary sources",
    "Day 2: Strengthen causal linking through comparative analysis",
    "Day 3: Refine thesis definition with structured argumentation"
  ]
}"#;

const PROFILE_ELEMENTARY: &str = r#"{
  "strengths": [
    "Narrative thinking + 'My favorite pet'",
    "Topic organization + 'I like pizza'",
    "Personal expression + 'My hobby is sport'"
  ],
  "growth_areas": [
    "Limited sentence variety + 'I am nine'",
    "Basic vocabulary expansion + 'I like'",
    "Simple transitions missing + 'My favorite'"
  ],
  "cognitive_pattern": "Descriptive reasoning with personal experience-based organization. Operates at concrete, personal level. Uses direct, topic-based approach.",
  "development_plan": [
    "Day 1: Read English texts about football to improve vocabulary",
    "Day 2: Write a short presentation about favorite football club to practice sentence variety",
    "Day 3: Learn history of favorite football club to connect interests with learning"
  ]
}"#;

const WELLBEING: &str = r#"{
  "level": "none",
  "note": "No special signals detected.",
  "next_step": "Continue standard monitoring."
}"#;

const TALENT: &str = r#"{
  "talent_indicators": [
    "Pattern Recognition + Causal Linking",
    "Systems thinking",
    "Comparative analysis"
  ],
  "matching_domains": ["Political Science", "Data Science", "Research"],
  "talent_development_focus": [
    {
      "talent": "Pattern Recognition + Causal Linking",
      "rationale": "Strong foundation for research and analytical work, visible in text structure.",
      "next_steps": [
        "Engage in structured debate forums focusing on evidence-based argumentation",
        "Conduct evidence-based research projects using primary sources"
      ]
    }
  ]
}"#;

const TALENT_ELEMENTARY: &str = r#"{
  "talent_indicators": [
    "Sports-themed narrative thinking",
    "Personal experience-based reasoning",
    "Interest-driven organization"
  ],
  "learning_recommendations": [
    "Math with football context: Calculate goals, player statistics, field dimensions",
    "English texts about football: Read stories about favorite teams, write about matches",
    "History project about favorite football club: Research club history, connect to historical events"
  ]
}"#;

const EMPTY: &str = "{}";

/// Every string the offline responder can return.
#[cfg(test)]
pub const ALL_RESPONSES: [&str; 8] = [
    RUBRIC,
    RUBRIC_ELEMENTARY,
    PROFILE,
    PROFILE_ELEMENTARY,
    WELLBEING,
    TALENT,
    TALENT_ELEMENTARY,
    EMPTY,
];

/// Picks a canned payload for `prompt`. Checked in order: rubric, profile,
/// wellbeing, then any talent-stage wording.
pub fn demo_response(prompt: &str) -> &'static str {
    let prompt = prompt.to_lowercase();
    let elementary = prompt.contains("elementary");

    if prompt.contains("rubric") {
        if elementary {
            RUBRIC_ELEMENTARY
        } else {
            RUBRIC
        }
    } else if prompt.contains("profile") {
        if elementary {
            PROFILE_ELEMENTARY
        } else {
            PROFILE
        }
    } else if prompt.contains("wellbeing") {
        WELLBEING
    } else if ["talent", "indicator", "matching", "learning"]
        .iter()
        .any(|k| prompt.contains(k))
    {
        if elementary {
            TALENT_ELEMENTARY
        } else {
            TALENT
        }
    } else {
        EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_payloads_are_valid_json() {
        for payload in ALL_RESPONSES {
            assert!(
                serde_json::from_str::<serde_json::Value>(payload).is_ok(),
                "invalid demo payload: {payload}"
            );
        }
    }

    #[test]
    fn test_dispatch_by_keyword_and_level() {
        assert_eq!(demo_response("Score this with the RUBRIC"), RUBRIC);
        assert_eq!(
            demo_response("elementary work, rubric please"),
            RUBRIC_ELEMENTARY
        );
        assert_eq!(demo_response("build a profile"), PROFILE);
        assert_eq!(demo_response("Wellbeing check"), WELLBEING);
        assert_eq!(demo_response("list matching domains"), TALENT);
        assert_eq!(
            demo_response("elementary learning recommendations"),
            TALENT_ELEMENTARY
        );
    }

    #[test]
    fn test_rubric_wins_over_later_keywords() {
        assert_eq!(demo_response("rubric, profile and talent"), RUBRIC);
    }

    #[test]
    fn test_unmatched_prompt_yields_empty_object() {
        assert_eq!(demo_response("Summarize this essay."), "{}");
    }
}

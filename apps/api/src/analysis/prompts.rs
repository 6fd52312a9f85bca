// All LLM prompt templates for the analysis pipeline.
// Builders fill `{placeholders}`; the student text is always substituted last so
// braces inside it are never mistaken for a placeholder.

use crate::analysis::models::{ProfileResult, RubricScores, StudyLevel};

/// System prompt shared by every analysis stage.
pub const ANALYSIS_SYSTEM: &str = "You are a precise, evidence-based assessor of student writing. \
    You describe observable text behavior only and never diagnose. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object.";

const RUBRIC_TEXT_CHARS: usize = 2000;
const RUBRIC_TEXT_CHARS_ELEMENTARY: usize = 500;
const PROFILE_TEXT_CHARS: usize = 1500;
const PROFILE_TEXT_CHARS_ELEMENTARY: usize = 500;
const TALENT_TEXT_CHARS: usize = 1200;
const WELLBEING_TEXT_CHARS: usize = 2000;

const EVIDENCE_LANGUAGE_RULES: &str = "\
**REQUIREMENTS (EVIDENCE-BASED LANGUAGE):**
- Describe only observable text behavior (structure, reasoning, support)
- No personality, motivation, emotion, or identity references
- No adjectives targeting the person (e.g., \"creative\", \"lazy\")
- No speculation about psychology or intention
- Short, declarative sentences
- Tie each justification to concrete textual behavior
- Each justification: 1-2 sentences describing observable behavior + direct quote (≤6 words) as evidence";

const RUBRIC_SCHEMA: &str = r#"**Respond ONLY with JSON using this schema:**
{
  "scores": {
    "structure": 0-5,
    "clarity": 0-5,
    "evidence": 0-5,
    "originality": 0-5,
    "coherence": 0-5
  },
  "justifications": {
    "structure": "1-2 sentences describing observable behavior. Include direct quote (≤6 words) as evidence.",
    "clarity": "1-2 sentences describing observable behavior. Include direct quote (≤6 words) as evidence.",
    "evidence": "1-2 sentences describing observable behavior. Include direct quote (≤6 words) as evidence.",
    "originality": "1-2 sentences describing observable behavior. Include direct quote (≤6 words) as evidence.",
    "coherence": "1-2 sentences describing observable behavior. Include direct quote (≤6 words) as evidence."
  }
}"#;

const PROFILE_RESTRICTIONS: &str = "\
**ABSOLUTE RESTRICTIONS:**
- Use precise, neutral, skill-based language
- NO personality, emotion, or character descriptions
- Focus ONLY on observable cognitive operations
- NO vague feedback
- Short, crisp sentences
- NO emojis, NO psychological diagnosis, NO moral judgement";

// ────────────────────────────────────────────────────────────────────────────
// Rubric
// ────────────────────────────────────────────────────────────────────────────

const RUBRIC_PROMPT: &str = r#"Analyze the following academic work against a fixed five-criterion scoring rubric and assign scores (0-5) based on observable text behavior:

1. **Structure**: Visible organization, sectioning, transitions
2. **Clarity**: Precise wording, sentence control, readability
3. **Evidence**: Use of data, citations, source integration
4. **Originality**: Unique framing, synthesis, novel angles
5. **Coherence**: Logical flow, consistent argument linkage

{rules}

**Text:**
{text}

{schema}"#;

const RUBRIC_PROMPT_ELEMENTARY: &str = r#"Analyze this elementary school work against an age-appropriate scoring rubric and assign scores (0-5) across five criteria:

1. **Structure**: Basic organization, sentence flow, simple transitions
2. **Clarity**: Word choice, sentence clarity, age-appropriate language
3. **Evidence**: Use of examples, personal experiences, simple facts
4. **Originality**: Personal expression, creative ideas, unique perspectives
5. **Coherence**: Logical flow, topic consistency, simple connections

{rules}

**Text:**
{text}

{schema}"#;

/// Rubric scoring prompt. Embeds at most 2000 characters (500 for elementary work).
pub fn rubric_prompt(text: &str, level: StudyLevel) -> String {
    let (template, limit) = match level {
        StudyLevel::Default => (RUBRIC_PROMPT, RUBRIC_TEXT_CHARS),
        StudyLevel::Elementary => (RUBRIC_PROMPT_ELEMENTARY, RUBRIC_TEXT_CHARS_ELEMENTARY),
    };
    template
        .replace("{rules}", EVIDENCE_LANGUAGE_RULES)
        .replace("{schema}", RUBRIC_SCHEMA)
        .replace("{text}", truncate_chars(text, limit))
}

// ────────────────────────────────────────────────────────────────────────────
// Profile
// ────────────────────────────────────────────────────────────────────────────

const PROFILE_PROMPT: &str = r#"Analyze the academic work and produce a structured cognitive profile:

**Scores:**
{scores_json}

**Text (excerpt):**
{text}

**Produce:**

A. **3 Strengths**: Each must be a cognitive skill (e.g., "Pattern Recognition", "Deductive Structuring", "Comparative Reasoning") supported by a cited text excerpt (quote ≤6 words).

B. **3 Growth Areas**: Each must be a concrete skill gap (e.g., "Low evidence density", "Weak causal linking") supported by a cited text excerpt (quote ≤6 words).

C. **Cognitive Pattern Summary**: 2-3 sentences explaining how the student processes information:
   - reasoning type
   - information organization
   - abstraction level
   - problem-solving approach

D. **3-Day Development Plan**: Three consecutive daily actions (Day 1–Day 3). Each day = 1 targeted exercise linked to the growth areas.

{restrictions}

**Respond ONLY with JSON:**
{
  "strengths": ["Cognitive skill name + cited excerpt (≤6 words)", "Cognitive skill name + cited excerpt (≤6 words)", "Cognitive skill name + cited excerpt (≤6 words)"],
  "growth_areas": ["Concrete skill gap + cited excerpt (≤6 words)", "Concrete skill gap + cited excerpt (≤6 words)", "Concrete skill gap + cited excerpt (≤6 words)"],
  "cognitive_pattern": "2-3 sentences: reasoning type, information organization, abstraction level, problem-solving approach",
  "development_plan": ["Day 1: Targeted exercise linked to growth areas", "Day 2: Targeted exercise linked to growth areas", "Day 3: Targeted exercise linked to growth areas"]
}"#;

const PROFILE_PROMPT_ELEMENTARY: &str = r#"Analyze this elementary school work and produce a structured profile:

**Scores:**
{scores_json}

**Text (excerpt):**
{text}

**Produce:**

A. **3 Strengths**: Each must be a cognitive skill appropriate for elementary level (e.g., "Narrative thinking", "Topic organization", "Personal expression") supported by a cited text excerpt (quote ≤6 words).

B. **3 Growth Areas**: Each must be a concrete skill gap appropriate for elementary level (e.g., "Limited sentence variety", "Basic vocabulary expansion needed", "Simple transitions missing") supported by a cited text excerpt (quote ≤6 words).

C. **Cognitive Pattern Summary**: 2 sentences explaining how the student processes information:
   - reasoning type (simple/narrative/descriptive)
   - information organization (topical/chronological/personal)
   - abstraction level (concrete/personal experiences)
   - problem-solving approach (direct/exploratory)

D. **3-Day Development Plan**: Three consecutive daily actions (Day 1–Day 3). Each day = 1 targeted exercise linked to growth areas AND student interests mentioned in text. Format: "Day X: [Activity] related to [interest from text] to improve [skill]". Example: "Day 1: Read English texts about football to improve vocabulary" if student mentioned football.

{restrictions}

**Respond ONLY with JSON:**
{
  "strengths": ["Cognitive skill name + cited excerpt (≤6 words)", "Cognitive skill name + cited excerpt (≤6 words)", "Cognitive skill name + cited excerpt (≤6 words)"],
  "growth_areas": ["Concrete skill gap + cited excerpt (≤6 words)", "Concrete skill gap + cited excerpt (≤6 words)", "Concrete skill gap + cited excerpt (≤6 words)"],
  "cognitive_pattern": "2 sentences: reasoning type, information organization, abstraction level, problem-solving approach",
  "development_plan": ["Day 1: Activity related to student interest to improve skill", "Day 2: Activity related to student interest to improve skill", "Day 3: Activity related to student interest to improve skill"]
}"#;

/// Profile prompt built from the rubric scores. Embeds at most 1500 characters
/// (500 for elementary work).
pub fn profile_prompt(scores: &RubricScores, text: &str, level: StudyLevel) -> String {
    let (template, limit) = match level {
        StudyLevel::Default => (PROFILE_PROMPT, PROFILE_TEXT_CHARS),
        StudyLevel::Elementary => (PROFILE_PROMPT_ELEMENTARY, PROFILE_TEXT_CHARS_ELEMENTARY),
    };
    template
        .replace("{restrictions}", PROFILE_RESTRICTIONS)
        .replace("{scores_json}", &pretty_json(scores))
        .replace("{text}", truncate_chars(text, limit))
}

// ────────────────────────────────────────────────────────────────────────────
// Talent
// ────────────────────────────────────────────────────────────────────────────

const TALENT_PROMPT: &str = r#"Based on the analysis, identify early talent indicators and matching domains:

**Strengths:**
{strengths_json}

**Cognitive Pattern:**
{cognitive_pattern}

**Scores:**
{scores_json}

**Text (excerpt):**
{text}

**Deliver:**

E. **Talent Indicators (3-5 items)**: Early indicators of natural strengths, expressed as:
   - skill clusters (e.g., "Pattern Recognition + Causal Linking")
   - ways of thinking (e.g., "Systems thinking", "Comparative analysis")
   - potential academic/professional domains (e.g., "Research methodology", "Data analysis")

F. **Matching Domains (3-5 items)**: University-level or early-career areas the student may thrive in, based on cognitive patterns:
   - Specific academic fields (e.g., "Political Science", "Data Science")
   - Professional domains (e.g., "Research", "Technical Writing")
   - Career tracks (e.g., "Data Analyst", "Research Assistant")

G. **Talent Development Focus (1-2 items)**: Prioritized talents for focused development. Each item includes:
   - Talent name (from talent indicators)
   - Brief rationale (1 sentence: why this talent should be prioritized)
   - 1-2 concrete next steps (specific, actionable exercises)

**CRITICAL DISTINCTION:**
- **Talent Indicators**: What cognitive skills/patterns are visible (skill clusters, thinking styles)
- **Matching Domains**: Where these skills can be applied (academic fields, career areas)
- **Talent Development Focus**: Which talents to prioritize and how to develop them

**ABSOLUTE RESTRICTIONS:**
- Use precise, neutral, skill-based language
- NO personality, emotion, or character descriptions
- NO psychological diagnosis
- NO moral judgement
- NO political or demographic inference
- Focus ONLY on observable cognitive operations
- Keep Talent Development Focus compact: 1-2 talents max, 1-2 steps per talent

**Respond ONLY with JSON:**
{
  "talent_indicators": ["Skill cluster or thinking style (e.g., 'Pattern Recognition + Causal Linking')", "Skill cluster or thinking style", "Skill cluster or thinking style"],
  "matching_domains": ["Academic field or career area (e.g., 'Political Science')", "Academic field or career area", "Academic field or career area"],
  "talent_development_focus": [
    {
      "talent": "Talent name from indicators",
      "rationale": "1 sentence: why prioritize this talent",
      "next_steps": ["Concrete action 1", "Concrete action 2"]
    }
  ]
}"#;

const TALENT_PROMPT_ELEMENTARY: &str = r#"Based on this elementary school work, identify talent indicators and learning recommendations:

**Strengths:**
{strengths_json}

**Cognitive Pattern:**
{cognitive_pattern}

**Scores:**
{scores_json}

**Full Text (read carefully to extract ALL specific interests mentioned - favorite sports, hobbies, subjects, colors, foods, etc.):**
{text}

**Deliver:**

E. **Talent Indicators (3-5 items)**: Early indicators of natural strengths, expressed as:
   - skill clusters appropriate for elementary level (e.g., "Narrative thinking + Topic organization", "Sports-themed narrative thinking")
   - ways of thinking (e.g., "Descriptive thinking", "Personal experience-based reasoning")
   - interest-based patterns visible in text (e.g., "Sports-oriented", "Creative expression")

F. **Learning Recommendations (3-5 items)**: Concrete, practical recommendations on how to best teach and learn based on EXACT interests extracted from the text.

**CRITICAL REQUIREMENTS:**
1. Extract SPECIFIC interests from the text (e.g., if text says "I like football" → use "football", if text says "My favorite sport is Leichtathletik" → use "Leichtathletik", if text says "I like pizza" → use "pizza/cooking")
2. Each recommendation MUST reference the specific interest mentioned in the text
3. Format: "Subject + specific task with interest: Detailed description"
4. Be VERY specific and detailed - not generic like "English with personal interests" but concrete like "English texts about football: Read stories about FC Bayern Munich, write a short report about your favorite match, learn vocabulary about football positions and rules"

**Examples based on text content:**
- If text mentions "football" or "soccer": "Math with football context: Calculate goals scored per game, player statistics (goals, assists), field dimensions (length × width), time calculations for match duration"
- If text mentions "football": "English texts about football: Read short stories about favorite teams (e.g., FC Bayern), write 3 sentences about a match you watched, learn vocabulary: goal, player, team, match"
- If text mentions "football": "History project about favorite football club: Research when your favorite club was founded, find out what historical events happened in that year, create a timeline connecting club history to world history"
- If text mentions "sports": "Science experiments related to sports: Measure how far you can throw a ball, learn about muscles used in running, observe heart rate during exercise"
- If text mentions specific hobby: Use that EXACT hobby in the recommendation

**IMPORTANT**: You MUST extract the exact interests from the text and use them in every recommendation. Do NOT use generic terms like "personal interests" or "hobbies" - use the SPECIFIC interest mentioned (e.g., "football", "pizza", "Leichtathletik", "red color", etc.)

**ABSOLUTE RESTRICTIONS:**
- Use precise, neutral, skill-based language
- NO personality, emotion, or character descriptions
- NO psychological diagnosis
- NO moral judgement
- Focus ONLY on observable cognitive operations and interests mentioned in text
- Each recommendation must be specific and actionable

**Respond ONLY with JSON:**
{
  "talent_indicators": ["Skill cluster or thinking style (e.g., 'Sports-themed narrative thinking')", "Skill cluster or thinking style", "Skill cluster or thinking style"],
  "learning_recommendations": ["Subject + specific interest-based example (e.g., 'Math with football context: Calculate goals and statistics')", "Subject + specific interest-based example", "Subject + specific interest-based example"]
}"#;

/// Talent prompt built from the profile and scores. Embeds at most 1200 characters;
/// elementary work is embedded in full so every stated interest is visible.
pub fn talent_prompt(
    profile: &ProfileResult,
    scores: &RubricScores,
    text: &str,
    level: StudyLevel,
) -> String {
    let (template, text) = match level {
        StudyLevel::Default => (TALENT_PROMPT, truncate_chars(text, TALENT_TEXT_CHARS)),
        StudyLevel::Elementary => (TALENT_PROMPT_ELEMENTARY, text),
    };
    template
        .replace("{strengths_json}", &pretty_json(&profile.strengths))
        .replace("{scores_json}", &pretty_json(scores))
        .replace("{cognitive_pattern}", &profile.cognitive_pattern)
        .replace("{text}", text)
}

// ────────────────────────────────────────────────────────────────────────────
// Wellbeing
// ────────────────────────────────────────────────────────────────────────────

const WELLBEING_PROMPT: &str = r#"Review the following text for potential wellbeing signals (NOT a diagnosis):

**Text:**
{text}

**Keyword context:**
{keyword_info}

**SAFETY REQUIREMENTS:**
- Do NOT deliver a diagnosis.
- Treat the output as an indicator only, not medical guidance.
- Emphasize that a human must review and decide next steps.
- Use cautious, supportive wording.

**Evaluate the level:**
- "none": No notable wellbeing signals.
- "mild": Light indicators (e.g., stress, uncertainty).
- "flag": Stronger signals requiring attention.

**Respond ONLY with JSON:**
{
  "level": "none|mild|flag",
  "note": "One sentence rationale (cautious wording)",
  "next_step": "One sentence, human action suggestion (e.g., 'Offer a check-in conversation')"
}"#;

/// Wellbeing prompt. `keywords` are the screener's matches and only inform the model.
pub fn wellbeing_prompt(text: &str, keywords: &[&str]) -> String {
    let keyword_info = if keywords.is_empty() {
        "No flagged keywords detected".to_string()
    } else {
        format!("Detected keywords: {}", keywords.join(", "))
    };
    WELLBEING_PROMPT
        .replace("{keyword_info}", &keyword_info)
        .replace("{text}", truncate_chars(text, WELLBEING_TEXT_CHARS))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Prefix of at most `max_chars` characters. Not sentence-aware.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

fn pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn essay(chars: usize) -> String {
        "abcdefghij".repeat(chars / 10)
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("müde müde", 3), "müd");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_rubric_prompt_truncates_by_level() {
        let text = format!("{}TAIL_MARKER", essay(2000));
        let default = rubric_prompt(&text, StudyLevel::Default);
        assert!(!default.contains("TAIL_MARKER"));
        assert!(default.contains(&essay(2000)));

        let elementary = rubric_prompt(&text, StudyLevel::Elementary);
        assert!(elementary.contains(&essay(500)));
        assert!(!elementary.contains(&essay(510)));
    }

    #[test]
    fn test_every_prompt_names_its_own_domain() {
        let scores = RubricScores::default();
        let profile = ProfileResult::default();
        let text = "The empire fell because of many interacting causes.";

        let rubric = rubric_prompt(text, StudyLevel::Default).to_lowercase();
        assert!(rubric.contains("rubric"));
        assert!(!rubric.contains("elementary"));

        let profile_p = profile_prompt(&scores, text, StudyLevel::Default).to_lowercase();
        assert!(profile_p.contains("profile"));
        assert!(!profile_p.contains("rubric"));

        let talent = talent_prompt(&profile, &scores, text, StudyLevel::Default).to_lowercase();
        assert!(talent.contains("talent"));
        assert!(!talent.contains("rubric") && !talent.contains("profile"));

        let wellbeing = wellbeing_prompt(text, &[]).to_lowercase();
        assert!(wellbeing.contains("wellbeing"));
        assert!(!wellbeing.contains("rubric") && !wellbeing.contains("profile"));
    }

    #[test]
    fn test_elementary_prompts_carry_the_marker() {
        let scores = RubricScores::default();
        let profile = ProfileResult::default();
        let text = "I am nine years old and I like football.";

        for prompt in [
            rubric_prompt(text, StudyLevel::Elementary),
            profile_prompt(&scores, text, StudyLevel::Elementary),
            talent_prompt(&profile, &scores, text, StudyLevel::Elementary),
        ] {
            assert!(prompt.to_lowercase().contains("elementary"));
        }
    }

    #[test]
    fn test_profile_prompt_embeds_scores_as_json() {
        let scores = RubricScores {
            structure: 4,
            clarity: 3,
            evidence: 4,
            originality: 3,
            coherence: 4,
        };
        let prompt = profile_prompt(&scores, "Some essay text here.", StudyLevel::Default);
        assert!(prompt.contains("\"structure\": 4"));
        assert!(prompt.contains("\"originality\": 3"));
    }

    #[test]
    fn test_talent_prompt_elementary_embeds_full_text() {
        let text = format!("{}I love Leichtathletik", essay(3000));
        let prompt = talent_prompt(
            &ProfileResult::default(),
            &RubricScores::default(),
            &text,
            StudyLevel::Elementary,
        );
        assert!(prompt.contains("I love Leichtathletik"));

        let prompt = talent_prompt(
            &ProfileResult::default(),
            &RubricScores::default(),
            &text,
            StudyLevel::Default,
        );
        assert!(!prompt.contains("I love Leichtathletik"));
    }

    #[test]
    fn test_talent_prompt_embeds_profile_fields() {
        let profile = ProfileResult {
            strengths: vec!["Causal Linking + 'therefore'".into()],
            cognitive_pattern: "Analytical reasoning.".into(),
            ..Default::default()
        };
        let prompt = talent_prompt(
            &profile,
            &RubricScores::default(),
            "text body of the essay",
            StudyLevel::Default,
        );
        assert!(prompt.contains("Causal Linking + 'therefore'"));
        assert!(prompt.contains("Analytical reasoning."));
    }

    #[test]
    fn test_wellbeing_prompt_keyword_context() {
        let with = wellbeing_prompt("text", &["hoffnungslos", "müde"]);
        assert!(with.contains("Detected keywords: hoffnungslos, müde"));

        let without = wellbeing_prompt("text", &[]);
        assert!(without.contains("No flagged keywords detected"));
    }

    #[test]
    fn test_placeholders_in_student_text_are_left_alone() {
        let prompt = profile_prompt(
            &RubricScores::default(),
            "My essay literally contains {scores_json} here.",
            StudyLevel::Default,
        );
        assert!(prompt.contains("contains {scores_json} here"));
    }
}

//! Markdown rendering of a finished analysis, suitable for download.

use chrono::{DateTime, Utc};

use crate::analysis::models::{AnalysisResult, TalentResult, DIMENSIONS};

pub const WELLBEING_DISCLAIMER: &str = "Indicative, not diagnostic. Decisions by humans.";

const SECTION_BREAK: &str = "\n---\n\n";

/// Renders sections A–G in fixed order; the wellbeing section is appended only when
/// the result carries one.
pub fn render_report(result: &AnalysisResult, generated_at: DateTime<Utc>) -> String {
    let mut report = format!(
        "# NUCLEA Analysis Report\nGenerated: {}\nMode: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        result.study_level.label()
    );

    report.push_str(SECTION_BREAK);
    report.push_str("## A. Evaluation Rubric\n\n");
    let scores = result.rubric.scores.values();
    let justifications = result.rubric.justifications.values();
    for ((dimension, score), justification) in DIMENSIONS.iter().zip(scores).zip(justifications) {
        report.push_str(&format!(
            "### {}: {score}/5\n{justification}\n\n",
            capitalize(dimension)
        ));
    }

    report.push_str(SECTION_BREAK);
    report.push_str("## B. Strengths\n\n");
    report.push_str(&numbered(&result.profile.strengths));

    report.push_str(SECTION_BREAK);
    report.push_str("## C. Growth Areas\n\n");
    report.push_str(&numbered(&result.profile.growth_areas));

    report.push_str(SECTION_BREAK);
    report.push_str("## D. Cognitive Pattern\n\n");
    report.push_str(&result.profile.cognitive_pattern);
    report.push('\n');

    report.push_str(SECTION_BREAK);
    report.push_str("## E. 3-Day Development Plan\n\n");
    for day in &result.profile.development_plan {
        report.push_str(&format!("- {day}\n"));
    }

    report.push_str(SECTION_BREAK);
    report.push_str("## F. Talent Indicators\n\n");
    report.push_str(&numbered(result.talent.talent_indicators()));

    match &result.talent {
        TalentResult::Default(talent) => {
            if !talent.talent_development_focus.is_empty() {
                report.push_str(SECTION_BREAK);
                report.push_str("## F.1. Talent Development Focus\n\n");
                for (i, focus) in talent.talent_development_focus.iter().enumerate() {
                    report.push_str(&format!("**{}. {}**\n", i + 1, focus.talent));
                    if !focus.rationale.is_empty() {
                        report.push_str(&format!("   *{}*\n", focus.rationale));
                    }
                    for step in &focus.next_steps {
                        report.push_str(&format!("   - {step}\n"));
                    }
                    report.push('\n');
                }
            }
            report.push_str(SECTION_BREAK);
            report.push_str("## G. Matching Domains\n\n");
            report.push_str(&numbered(&talent.matching_domains));
        }
        TalentResult::Elementary(talent) => {
            report.push_str(SECTION_BREAK);
            report.push_str("## G. Learning Recommendations\n\n");
            report.push_str(&numbered(&talent.learning_recommendations));
        }
    }

    if let Some(wellbeing) = &result.wellbeing {
        report.push_str(SECTION_BREAK);
        report.push_str("## Wellbeing Signals\n\n");
        report.push_str(&format!("**Level:** {}\n\n", wellbeing.level.as_str()));
        report.push_str(&format!("**Note:** {}\n\n", wellbeing.note));
        report.push_str(&format!("**Next Step:** {}\n\n", wellbeing.next_step));
        report.push_str(&format!("**Disclaimer:** {WELLBEING_DISCLAIMER}\n"));
    }

    report
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}\n", i + 1))
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

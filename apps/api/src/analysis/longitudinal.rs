//! Longitudinal Talent Profile: folds several analyses of one learner into trends.
//!
//! Pure and deterministic: no LLM call. Snapshots are ordered by `analyzed_at`
//! before anything is computed, so "first" and "last" always mean oldest and newest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::models::{RubricScores, DIMENSIONS};

/// Share of analyses a strength must appear in to count as consistent.
const CONSISTENT_STRENGTH_SHARE: f64 = 0.4;
/// Score change (first to last) beyond which a dimension is trending.
const TREND_THRESHOLD: f64 = 0.5;

// ────────────────────────────────────────────────────────────────────────────
// Input / output models
// ────────────────────────────────────────────────────────────────────────────

/// The parts of one past analysis that aggregation needs.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSnapshot {
    pub title: String,
    pub analyzed_at: DateTime<Utc>,
    pub scores: RubricScores,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub talent_indicators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePoint {
    pub date: DateTime<Utc>,
    pub work_title: String,
    pub structure: u8,
    pub clarity: u8,
    pub evidence: u8,
    pub originality: u8,
    pub coherence: u8,
    /// Mean of the five scores, one decimal.
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TalentSignal {
    pub indicator: String,
    pub frequency: usize,
    pub total_analyses: usize,
    /// 0–100.
    pub confidence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainFit {
    pub domain: &'static str,
    pub fit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainFitPoint {
    pub date: DateTime<Utc>,
    pub work_title: String,
    pub fits: Vec<DomainFit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionTrajectory {
    pub dimension: &'static str,
    pub label: String,
    pub first_score: u8,
    pub last_score: u8,
    pub average_score: f64,
    pub trend: Trend,
    pub change_percent: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopDomain {
    pub name: &'static str,
    pub avg_fit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongitudinalProfile {
    pub score_progression: Vec<ScorePoint>,
    pub talent_signals: Vec<TalentSignal>,
    pub domain_fit_progression: Vec<DomainFitPoint>,
    pub trajectories: Vec<DimensionTrajectory>,
    pub top_domains: Vec<TopDomain>,
    pub consistent_strengths: Vec<String>,
    pub total_analyses: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Career domains
// ────────────────────────────────────────────────────────────────────────────

struct CareerDomain {
    name: &'static str,
    /// Weights in rubric dimension order; each row sums to 1.
    weights: [f64; 5],
}

const CAREER_DOMAINS: [CareerDomain; 6] = [
    CareerDomain {
        name: "Technology",
        weights: [0.3, 0.15, 0.25, 0.15, 0.15],
    },
    CareerDomain {
        name: "Sciences",
        weights: [0.25, 0.15, 0.35, 0.1, 0.15],
    },
    CareerDomain {
        name: "Humanities",
        weights: [0.15, 0.25, 0.2, 0.2, 0.2],
    },
    CareerDomain {
        name: "Creative Arts",
        weights: [0.1, 0.2, 0.05, 0.45, 0.2],
    },
    CareerDomain {
        name: "Business",
        weights: [0.3, 0.25, 0.2, 0.05, 0.2],
    },
    CareerDomain {
        name: "Law",
        weights: [0.2, 0.2, 0.3, 0.1, 0.2],
    },
];

/// Weighted fit of one score set to a domain, as a whole percentage.
fn domain_fit(scores: &RubricScores, weights: &[f64; 5]) -> u32 {
    let total: f64 = scores
        .values()
        .iter()
        .zip(weights)
        .map(|(&score, weight)| f64::from(score) / 5.0 * weight)
        .sum();
    round_half_up(total * 100.0) as u32
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregation
// ────────────────────────────────────────────────────────────────────────────

/// Builds the longitudinal profile. Returns `None` for an empty history.
pub fn aggregate(snapshots: &[AnalysisSnapshot]) -> Option<LongitudinalProfile> {
    if snapshots.is_empty() {
        return None;
    }

    let mut ordered: Vec<&AnalysisSnapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.analyzed_at);
    let total = ordered.len();

    let score_progression: Vec<ScorePoint> = ordered
        .iter()
        .map(|s| ScorePoint {
            date: s.analyzed_at,
            work_title: s.title.clone(),
            structure: s.scores.structure,
            clarity: s.scores.clarity,
            evidence: s.scores.evidence,
            originality: s.scores.originality,
            coherence: s.scores.coherence,
            average: round_one_decimal(s.scores.average()),
        })
        .collect();

    let mut talent_signals: Vec<TalentSignal> = count_in_order(
        ordered
            .iter()
            .flat_map(|s| s.talent_indicators.iter().map(|i| i.trim().to_string())),
    )
    .into_iter()
    .map(|(indicator, frequency)| TalentSignal {
        indicator,
        frequency,
        total_analyses: total,
        confidence: round_half_up(frequency as f64 / total as f64 * 100.0) as u32,
    })
    .collect();
    talent_signals.sort_by(|a, b| b.confidence.cmp(&a.confidence));

    let domain_fit_progression: Vec<DomainFitPoint> = ordered
        .iter()
        .map(|s| DomainFitPoint {
            date: s.analyzed_at,
            work_title: s.title.clone(),
            fits: CAREER_DOMAINS
                .iter()
                .map(|d| DomainFit {
                    domain: d.name,
                    fit: domain_fit(&s.scores, &d.weights),
                })
                .collect(),
        })
        .collect();

    let trajectories = DIMENSIONS
        .iter()
        .enumerate()
        .map(|(idx, &dimension)| {
            let values: Vec<u8> = ordered.iter().map(|s| s.scores.values()[idx]).collect();
            trajectory(dimension, &values)
        })
        .collect();

    let mut top_domains: Vec<TopDomain> = CAREER_DOMAINS
        .iter()
        .enumerate()
        .map(|(idx, d)| {
            let sum: u32 = domain_fit_progression.iter().map(|p| p.fits[idx].fit).sum();
            TopDomain {
                name: d.name,
                avg_fit: round_half_up(f64::from(sum) / total as f64) as u32,
            }
        })
        .collect();
    top_domains.sort_by(|a, b| b.avg_fit.cmp(&a.avg_fit));

    let threshold = (total as f64 * CONSISTENT_STRENGTH_SHARE).ceil() as usize;
    let mut strengths = count_in_order(
        ordered
            .iter()
            .flat_map(|s| s.strengths.iter().map(|st| strength_label(st).to_string())),
    );
    strengths.retain(|(_, count)| *count >= threshold);
    strengths.sort_by(|a, b| b.1.cmp(&a.1));
    let consistent_strengths = strengths.into_iter().map(|(label, _)| label).collect();

    Some(LongitudinalProfile {
        score_progression,
        talent_signals,
        domain_fit_progression,
        trajectories,
        top_domains,
        consistent_strengths,
        total_analyses: total,
    })
}

/// `values` is non-empty and ordered oldest first.
fn trajectory(dimension: &'static str, values: &[u8]) -> DimensionTrajectory {
    let first = values[0];
    let last = values[values.len() - 1];
    let average = values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64;
    let change = f64::from(last) - f64::from(first);

    let trend = if change > TREND_THRESHOLD {
        Trend::Improving
    } else if change < -TREND_THRESHOLD {
        Trend::Declining
    } else {
        Trend::Stable
    };
    let change_percent = if first > 0 {
        round_half_up(change / f64::from(first) * 100.0) as i32
    } else {
        0
    };

    DimensionTrajectory {
        dimension,
        label: capitalize(dimension),
        first_score: first,
        last_score: last,
        average_score: round_one_decimal(average),
        trend,
        change_percent,
    }
}

/// The skill name of a "Skill + 'quote'" strength.
fn strength_label(strength: &str) -> &str {
    strength.split(" + ").next().unwrap_or(strength).trim()
}

/// Occurrence counts keyed by first appearance.
fn count_in_order(items: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(key, _)| *key == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }
    counts
}

/// Rounds .5 toward positive infinity.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn round_one_decimal(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(
        day: u32,
        scores: [u8; 5],
        strengths: &[&str],
        talents: &[&str],
    ) -> AnalysisSnapshot {
        AnalysisSnapshot {
            title: format!("Essay {day}"),
            analyzed_at: Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap(),
            scores: RubricScores {
                structure: scores[0],
                clarity: scores[1],
                evidence: scores[2],
                originality: scores[3],
                coherence: scores[4],
            },
            strengths: strengths.iter().map(|s| s.to_string()).collect(),
            talent_indicators: talents.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_history_yields_none() {
        assert!(aggregate(&[]).is_none());
    }

    #[test]
    fn test_progression_sorted_by_date() {
        let profile = aggregate(&[
            snapshot(20, [3, 3, 3, 3, 3], &[], &[]),
            snapshot(5, [4, 3, 4, 3, 4], &[], &[]),
        ])
        .unwrap();

        assert_eq!(profile.total_analyses, 2);
        assert_eq!(profile.score_progression[0].work_title, "Essay 5");
        assert_eq!(profile.score_progression[0].average, 3.6);
        assert_eq!(profile.score_progression[1].average, 3.0);
    }

    #[test]
    fn test_domain_fit_values() {
        let profile = aggregate(&[snapshot(1, [4, 3, 4, 3, 4], &[], &[])]).unwrap();
        let fits = &profile.domain_fit_progression[0].fits;
        assert_eq!(fits[0], DomainFit { domain: "Technology", fit: 74 });
        assert_eq!(fits[1], DomainFit { domain: "Sciences", fit: 75 });

        let perfect = aggregate(&[snapshot(1, [5; 5], &[], &[])]).unwrap();
        assert!(perfect.top_domains.iter().all(|d| d.avg_fit == 100));
    }

    #[test]
    fn test_top_domains_sorted_by_average_fit() {
        // Originality-heavy work favors Creative Arts.
        let profile = aggregate(&[
            snapshot(1, [1, 2, 1, 5, 2], &[], &[]),
            snapshot(2, [1, 2, 1, 5, 3], &[], &[]),
        ])
        .unwrap();
        assert_eq!(profile.top_domains[0].name, "Creative Arts");
        assert!(profile
            .top_domains
            .windows(2)
            .all(|w| w[0].avg_fit >= w[1].avg_fit));
    }

    #[test]
    fn test_trajectories_trend_and_change() {
        let profile = aggregate(&[
            snapshot(1, [2, 4, 3, 0, 3], &[], &[]),
            snapshot(2, [3, 4, 3, 2, 3], &[], &[]),
            snapshot(3, [4, 3, 3, 2, 3], &[], &[]),
        ])
        .unwrap();
        let t = &profile.trajectories;

        assert_eq!(t[0].dimension, "structure");
        assert_eq!(t[0].label, "Structure");
        assert_eq!(t[0].trend, Trend::Improving);
        assert_eq!(t[0].change_percent, 100);
        assert_eq!(t[0].average_score, 3.0);

        assert_eq!(t[1].trend, Trend::Declining);
        assert_eq!(t[1].change_percent, -25);
        assert_eq!(t[1].average_score, 3.7);

        assert_eq!(t[2].trend, Trend::Stable);
        assert_eq!(t[2].change_percent, 0);

        // First score 0: change percent is reported as 0.
        assert_eq!(t[3].trend, Trend::Improving);
        assert_eq!(t[3].change_percent, 0);
    }

    #[test]
    fn test_talent_signals_confidence() {
        let profile = aggregate(&[
            snapshot(1, [3; 5], &[], &["Systems thinking", " Comparative analysis "]),
            snapshot(2, [3; 5], &[], &["Comparative analysis"]),
            snapshot(3, [3; 5], &[], &["Comparative analysis", "Systems thinking"]),
            snapshot(4, [3; 5], &[], &[]),
        ])
        .unwrap();
        let signals = &profile.talent_signals;

        assert_eq!(signals[0].indicator, "Comparative analysis");
        assert_eq!(signals[0].frequency, 3);
        assert_eq!(signals[0].confidence, 75);
        assert_eq!(signals[1].indicator, "Systems thinking");
        assert_eq!(signals[1].confidence, 50);
        assert!(signals.iter().all(|s| s.total_analyses == 4));
    }

    #[test]
    fn test_consistent_strengths_use_label_and_threshold() {
        let profile = aggregate(&[
            snapshot(
                1,
                [3; 5],
                &["Pattern Recognition + 'data shows'", "Causal Linking + 'because'"],
                &[],
            ),
            snapshot(2, [3; 5], &["Pattern Recognition + 'trend'"], &[]),
            snapshot(3, [3; 5], &["Pattern Recognition + 'again'", "Narrative thinking"], &[]),
        ])
        .unwrap();
        // Threshold is ceil(3 * 0.4) = 2 appearances.
        assert_eq!(profile.consistent_strengths, vec!["Pattern Recognition"]);
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let profile = aggregate(&[snapshot(1, [3; 5], &[], &[])]).unwrap();
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("scoreProgression").is_some());
        assert_eq!(json["trajectories"][0]["trend"], "stable");
        assert_eq!(json["scoreProgression"][0]["workTitle"], "Essay 1");
    }

    #[test]
    fn test_snapshot_deserializes_with_lenient_scores() {
        let snapshot: AnalysisSnapshot = serde_json::from_str(
            r#"{"title": "Essay", "analyzed_at": "2026-02-01T10:00:00Z",
                "scores": {"structure": 4.4, "clarity": "3"}}"#,
        )
        .unwrap();
        assert_eq!(snapshot.scores.values(), [4, 3, 3, 3, 3]);
        assert!(snapshot.strengths.is_empty());
    }
}

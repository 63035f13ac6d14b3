//! Cross-Call Aggregation
//!
//! Folds every per-pair `CallAnalysis` into an `AggregateAnalysis`. All
//! statistics are computed over scored analyses only; unscored ones are
//! counted and called out in notes and recommendations.

use std::collections::HashMap;

use call_analyzer_core::{
    mean, AggregateAnalysis, AggregateInsights, CallAnalysis, FrameworkComparison,
    FrameworkStats, Recommendations, ScoreTrend, TrendDirection,
};

const TOP_INSIGHTS: usize = 5;
const TOP_OPPORTUNITIES: usize = 3;
/// Sub-component scores at or below this mark an improvement area.
const WEAK_SCORE: f64 = 6.0;
/// Framework mean gap above which one framework is called stronger.
const COMPARISON_GAP: f64 = 1.0;
/// Minimum score change that counts as a trend.
const TREND_THRESHOLD: f64 = 0.5;

const IMMEDIATE_THRESHOLD: f64 = 3.0;
const TRAINING_THRESHOLD: f64 = 5.0;
const VALIDATED_THRESHOLD: f64 = 6.0;
const EXEMPLAR_THRESHOLD: f64 = 9.0;

/// Framework identity as requested: `(id, display name)`.
pub type FrameworkLabel = (String, String);

#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateOptions {
    pub include_score_trend: bool,
}

/// Build the aggregate report for a batch.
pub fn aggregate(
    call_analyses: Vec<CallAnalysis>,
    frameworks: &[FrameworkLabel],
    options: AggregateOptions,
) -> AggregateAnalysis {
    let framework_ids: Vec<String> = frameworks.iter().map(|(id, _)| id.clone()).collect();
    if call_analyses.is_empty() {
        return empty_aggregate(framework_ids);
    }

    let scored: Vec<&CallAnalysis> = call_analyses.iter().filter(|a| a.is_scored()).collect();
    let unscored = call_analyses.len() - scored.len();
    let scores: Vec<f64> = scored.iter().filter_map(|a| a.overall_score).collect();
    let overall_score = mean(&scores);

    let mut notes = Vec::new();
    if unscored > 0 {
        notes.push(unscored_note(unscored, call_analyses.len()));
    }

    let aggregate_insights = AggregateInsights {
        common_strengths: rank_by_frequency(
            scored.iter().flat_map(|a| a.executive_summary.strengths.iter()),
            TOP_INSIGHTS,
        ),
        common_weaknesses: rank_by_frequency(
            scored.iter().flat_map(|a| a.executive_summary.weaknesses.iter()),
            TOP_INSIGHTS,
        ),
        improvement_opportunities: improvement_opportunities(&scored),
        framework_comparison: (frameworks.len() > 1)
            .then(|| compare_frameworks(frameworks, &scored)),
        score_trend: if options.include_score_trend {
            score_trend(&scored)
        } else {
            None
        },
        notes,
    };

    let recommendations = recommend(&scored, overall_score, unscored, frameworks);

    tracing::info!(
        total = call_analyses.len(),
        scored = scored.len(),
        overall_score = ?overall_score,
        "aggregate analysis complete"
    );

    AggregateAnalysis {
        total_calls: call_analyses.len(),
        scored_calls: scored.len(),
        frameworks: framework_ids,
        overall_score,
        aggregate_insights,
        recommendations,
        call_analyses,
    }
}

/// Report for a batch that produced no analyses at all.
pub fn empty_aggregate(frameworks: Vec<String>) -> AggregateAnalysis {
    AggregateAnalysis {
        total_calls: 0,
        scored_calls: 0,
        frameworks,
        overall_score: None,
        call_analyses: Vec::new(),
        aggregate_insights: AggregateInsights {
            notes: vec![
                "No call analyses were produced, so no statistics are available".to_string(),
            ],
            ..Default::default()
        },
        recommendations: Recommendations {
            immediate: vec![
                "Verify the requested call ids and frameworks, then re-run the analysis"
                    .to_string(),
            ],
            ..Default::default()
        },
    }
}

fn unscored_note(unscored: usize, total: usize) -> String {
    format!(
        "{} of {} call analyses could not be scored and are excluded from aggregate statistics",
        unscored, total
    )
}

/// Exact-string occurrence counts, most frequent first. Ties keep first-seen
/// order.
fn rank_by_frequency<'a>(items: impl Iterator<Item = &'a String>, limit: usize) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (order, item) in items.enumerate() {
        let entry = counts.entry(item.as_str()).or_insert((0, order));
        entry.0 += 1;
    }
    let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(item, _)| item.to_string())
        .collect()
}

fn improvement_opportunities(scored: &[&CallAnalysis]) -> Vec<String> {
    let weak: Vec<String> = scored
        .iter()
        .flat_map(|a| a.components.iter())
        .flat_map(|c| c.sub_components.iter())
        .filter(|s| s.score.is_some_and(|score| score <= WEAK_SCORE))
        .map(|s| s.name.clone())
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &weak {
        *counts.entry(name.as_str()).or_insert(0) += 1;
    }
    rank_by_frequency(weak.iter(), TOP_OPPORTUNITIES)
        .into_iter()
        .map(|name| {
            let n = counts.get(name.as_str()).copied().unwrap_or(0);
            format!("{}: scored {} or below in {} analyses", name, WEAK_SCORE, n)
        })
        .collect()
}

fn population_variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    mean(&values.iter().map(|v| (v - m).powi(2)).collect::<Vec<_>>())
}

fn compare_frameworks(
    frameworks: &[FrameworkLabel],
    scored: &[&CallAnalysis],
) -> FrameworkComparison {
    let stats: Vec<FrameworkStats> = frameworks
        .iter()
        .map(|(id, name)| {
            let scores: Vec<f64> = scored
                .iter()
                .filter(|a| &a.framework_id == id)
                .filter_map(|a| a.overall_score)
                .collect();
            FrameworkStats {
                framework_id: id.clone(),
                framework: name.clone(),
                scored_calls: scores.len(),
                mean_score: mean(&scores),
                variance: population_variance(&scores),
            }
        })
        .collect();

    let mut summary = Vec::new();
    let with_scores: Vec<&FrameworkStats> =
        stats.iter().filter(|s| s.mean_score.is_some()).collect();
    let by_mean = |a: &&FrameworkStats, b: &&FrameworkStats| {
        a.mean_score
            .unwrap_or_default()
            .total_cmp(&b.mean_score.unwrap_or_default())
    };

    if let (Some(high), Some(low)) = (
        with_scores.iter().copied().max_by(by_mean),
        with_scores.iter().copied().min_by(by_mean),
    ) {
        if with_scores.len() > 1 {
            let gap = high.mean_score.unwrap_or_default() - low.mean_score.unwrap_or_default();
            if gap > COMPARISON_GAP {
                summary.push(format!(
                    "{} scores higher than {} by {:.1} points ({:.1} vs {:.1})",
                    high.framework,
                    low.framework,
                    gap,
                    high.mean_score.unwrap_or_default(),
                    low.mean_score.unwrap_or_default()
                ));
            } else {
                summary.push(format!(
                    "Scores are similar across frameworks (within {:.1} points)",
                    gap
                ));
            }
        }
    }

    let by_variance = |a: &&FrameworkStats, b: &&FrameworkStats| {
        a.variance
            .unwrap_or_default()
            .total_cmp(&b.variance.unwrap_or_default())
    };
    if with_scores.len() > 1 {
        if let (Some(steady), Some(volatile)) = (
            with_scores.iter().copied().min_by(by_variance),
            with_scores.iter().copied().max_by(by_variance),
        ) {
            let (v_low, v_high) = (
                steady.variance.unwrap_or_default(),
                volatile.variance.unwrap_or_default(),
            );
            if v_low < v_high {
                summary.push(format!(
                    "{} is more consistent than {} (variance {:.2} vs {:.2})",
                    steady.framework, volatile.framework, v_low, v_high
                ));
            } else {
                summary.push(format!(
                    "Score consistency is equal across frameworks (variance {:.2})",
                    v_low
                ));
            }
        }
    }

    if with_scores.len() < stats.len() {
        for missing in stats.iter().filter(|s| s.mean_score.is_none()) {
            summary.push(format!("{} has no scored calls", missing.framework));
        }
    }

    FrameworkComparison {
        frameworks: stats,
        summary,
    }
}

/// Per-call mean score ordered by call date; calls without a date sort last
/// in request order.
fn score_trend(scored: &[&CallAnalysis]) -> Option<ScoreTrend> {
    let mut per_call: Vec<(&CallAnalysis, Vec<f64>)> = Vec::new();
    for analysis in scored {
        let Some(score) = analysis.overall_score else {
            continue;
        };
        match per_call.iter_mut().find(|(a, _)| a.call_id == analysis.call_id) {
            Some((_, scores)) => scores.push(score),
            None => per_call.push((analysis, vec![score])),
        }
    }
    if per_call.len() < 2 {
        return None;
    }
    per_call.sort_by_key(|(a, _)| (a.call_date.is_none(), a.call_date));

    let (first, first_scores) = per_call.first()?;
    let (last, last_scores) = per_call.last()?;
    let first_score = mean(first_scores)?;
    let last_score = mean(last_scores)?;
    let change = last_score - first_score;
    let direction = if change > TREND_THRESHOLD {
        TrendDirection::Improving
    } else if change < -TREND_THRESHOLD {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    Some(ScoreTrend {
        first_call_id: first.call_id.clone(),
        first_score,
        last_call_id: last.call_id.clone(),
        last_score,
        change,
        direction,
    })
}

fn recommend(
    scored: &[&CallAnalysis],
    overall_score: Option<f64>,
    unscored: usize,
    frameworks: &[FrameworkLabel],
) -> Recommendations {
    let mut recommendations = Recommendations::default();
    let by_score = |a: &&&CallAnalysis, b: &&&CallAnalysis| {
        a.overall_score
            .unwrap_or_default()
            .total_cmp(&b.overall_score.unwrap_or_default())
    };

    if let Some(lowest) = scored.iter().min_by(by_score) {
        let score = lowest.overall_score.unwrap_or_default();
        if score <= IMMEDIATE_THRESHOLD {
            recommendations.immediate.push(format!(
                "Review \"{}\" ({}) with the rep immediately: it scored {:.1}/10 under {}",
                lowest.call_title, lowest.call_id, score, lowest.framework
            ));
        }
    }

    match overall_score {
        Some(avg) if avg < TRAINING_THRESHOLD => {
            let names: Vec<&str> = frameworks.iter().map(|(_, name)| name.as_str()).collect();
            recommendations.strategic.push(format!(
                "Team average of {:.1}/10 points to a systematic gap; \
                 schedule {} training for the team",
                avg,
                names.join(" and ")
            ));
        }
        Some(avg) if avg >= VALIDATED_THRESHOLD => {
            recommendations.strategic.push(format!(
                "Team average of {:.1}/10 validates the current sales approach; \
                 keep reinforcing it",
                avg
            ));
        }
        Some(_) => {}
        None => recommendations.strategic.push(
            "No calls could be scored; resolve data gaps before drawing conclusions".to_string(),
        ),
    }

    if let Some(highest) = scored.iter().max_by(by_score) {
        let score = highest.overall_score.unwrap_or_default();
        if score >= EXEMPLAR_THRESHOLD {
            recommendations.coaching.push(format!(
                "Use \"{}\" ({}) as an exemplar call: it scored {:.1}/10 under {}",
                highest.call_title, highest.call_id, score, highest.framework
            ));
        }
    }
    recommendations.coaching.push(
        "Hold individual coaching sessions focused on each rep's lowest-scoring sub-components"
            .to_string(),
    );

    if unscored > 0 {
        recommendations.strategic.push(format!(
            "{} call analyses could not be scored; review their error reasons",
            unscored
        ));
    }

    recommendations
}

// Insight generator: a pure reduction from an aggregate Monte Carlo result
// to a short list of tagged advisories. Grounded on
// `analysis::advanced_classifier`'s regime-tagged feature summaries, reduced
// here to the six independent rule categories instead of a feature/score
// matrix.

use serde::{Deserialize, Serialize};

use crate::config::StrategyConfig;
use crate::monte_carlo::{MonteCarloResult, Regime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsightLevel {
    Positive,
    Neutral,
    Warning,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub level: InsightLevel,
    pub title: String,
    pub message: String,
    pub suggestion: Option<String>,
}

fn insight(level: InsightLevel, title: &str, message: String, suggestion: Option<&str>) -> Insight {
    Insight {
        level,
        title: title.to_string(),
        message,
        suggestion: suggestion.map(str::to_string),
    }
}

fn performance_insight(mc: &MonteCarloResult) -> Insight {
    if mc.mean_sharpe < 0.0 {
        insight(
            InsightLevel::Negative,
            "Poor Risk-Adjusted Returns",
            format!("Mean Sharpe ratio is {:.2}, indicating negative risk-adjusted performance.", mc.mean_sharpe),
            Some("Reconsider target delta or cycle length to reduce drawdown-driving trades."),
        )
    } else if mc.mean_sharpe < mc.mean_benchmark_sharpe {
        insight(
            InsightLevel::Warning,
            "Underperforming Benchmark",
            format!(
                "Mean Sharpe ratio {:.2} trails the buy-and-hold benchmark's {:.2}.",
                mc.mean_sharpe, mc.mean_benchmark_sharpe
            ),
            None,
        )
    } else {
        insight(
            InsightLevel::Positive,
            "Strong Risk-Adjusted Returns",
            format!("Mean Sharpe ratio {:.2} beats the buy-and-hold benchmark.", mc.mean_sharpe),
            None,
        )
    }
}

fn alpha_insight(mc: &MonteCarloResult) -> Insight {
    let alpha = mc.mean_apr - mc.mean_benchmark_apr;
    if alpha > 5.0 {
        insight(
            InsightLevel::Positive,
            "Significant Alpha",
            format!("Mean APR beats buy-and-hold by {alpha:.1} percentage points."),
            None,
        )
    } else if alpha < -5.0 {
        insight(
            InsightLevel::Negative,
            "Negative Alpha",
            format!("Mean APR trails buy-and-hold by {:.1} percentage points.", -alpha),
            None,
        )
    } else {
        insight(
            InsightLevel::Neutral,
            "Similar to Buy & Hold",
            format!("Mean APR is within {:.1} percentage points of buy-and-hold.", alpha.abs()),
            None,
        )
    }
}

fn downside_profile_insight(mc: &MonteCarloResult) -> Option<Insight> {
    if mc.mean_sharpe > 0.0 && mc.mean_sortino > 1.5 * mc.mean_sharpe {
        Some(insight(
            InsightLevel::Positive,
            "Downside Well Contained",
            "Sortino ratio is well above Sharpe, indicating losses cluster in small moves.".to_string(),
            None,
        ))
    } else if mc.mean_sharpe < 0.0 && mc.mean_sortino > 1.2 * mc.mean_sharpe {
        Some(insight(
            InsightLevel::Warning,
            "High Downside Volatility",
            "Sortino ratio tracks closely with a negative Sharpe, indicating concentrated downside risk.".to_string(),
            Some("Consider a smaller target delta to reduce assignment severity."),
        ))
    } else {
        None
    }
}

fn regime_vulnerability_insights(mc: &MonteCarloResult) -> Vec<Insight> {
    mc.regime_breakdown
        .iter()
        .filter(|r| r.count > 0 && r.mean_alpha < -10.0)
        .map(|r| {
            let regime_name = match r.regime {
                Regime::Bull => "bull",
                Regime::Bear => "bear",
                Regime::Sideways => "sideways",
            };
            insight(
                InsightLevel::Warning,
                "Regime Vulnerability",
                format!(
                    "In {regime_name} markets the strategy trails buy-and-hold by {:.1} APR points on average.",
                    -r.mean_alpha
                ),
                None,
            )
        })
        .collect()
}

fn risk_insights(mc: &MonteCarloResult) -> Vec<Insight> {
    let mut out = Vec::new();

    let estimated_capital = if mc.mean_benchmark_apr != 0.0 {
        Some((mc.mean_benchmark_pl / (mc.mean_benchmark_apr / 100.0)).abs())
    } else {
        None
    };
    if let Some(capital) = estimated_capital {
        if mc.mean_max_drawdown > 0.5 * capital {
            out.push(insight(
                InsightLevel::Negative,
                "Large Average Drawdown",
                format!(
                    "Mean max drawdown of {:.2} exceeds half the estimated capital at risk ({:.2}).",
                    mc.mean_max_drawdown, capital
                ),
                Some("Reduce contract size or tighten the roll-call ITM threshold."),
            ));
        }
    }

    if mc.winner_rate < 0.4 {
        out.push(insight(
            InsightLevel::Warning,
            "Low Win Rate",
            format!("Only {:.0}% of simulated runs ended profitable.", mc.winner_rate * 100.0),
            None,
        ));
    }

    out
}

fn assignment_frequency_insight(mc: &MonteCarloResult) -> Option<Insight> {
    if mc.num_runs == 0 || mc.mean_full_cycles == 0.0 || mc.mean_assignments < 3.0 {
        return None;
    }
    let ratio = mc.mean_assignments / mc.mean_full_cycles;
    if ratio > 3.0 {
        Some(insight(
            InsightLevel::Warning,
            "High Assignment Frequency",
            format!("Assignments outpace completed wheel cycles {ratio:.1}:1, suggesting puts are sold too aggressively."),
            Some("Lower target delta to reduce assignment frequency."),
        ))
    } else if mc.mean_assignments >= 2.0 {
        Some(insight(
            InsightLevel::Neutral,
            "Moderate Assignment Frequency",
            format!("Average of {:.1} assignments per run against {:.1} completed cycles.", mc.mean_assignments, mc.mean_full_cycles),
            None,
        ))
    } else {
        None
    }
}

/// Reduce an aggregate Monte Carlo result to a short list of advisories.
/// `config` is accepted for symmetry with the rest of the external
/// interface; none of the six rules currently gate on it directly.
pub fn generate_insights(mc: &MonteCarloResult, _config: &StrategyConfig) -> Vec<Insight> {
    let mut out = Vec::new();
    out.push(performance_insight(mc));
    out.push(alpha_insight(mc));
    out.extend(downside_profile_insight(mc));
    out.extend(regime_vulnerability_insights(mc));
    out.extend(risk_insights(mc));
    out.extend(assignment_frequency_insight(mc));
    out
}

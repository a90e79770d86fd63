use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal payload of the overview endpoint.
pub const OVERVIEW_PLACEHOLDER: &str = "risk matrix example";

/// Literal payload of the residual endpoint.
pub const RESIDUAL_RISK_PLACEHOLDER: i64 = 42;

/// Impact and probability ratings submitted for an asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RiskRequest {
    pub asset_id: String,
    pub impact: i64,
    pub probability: i64,
}

/// Computed risk score, echoing the asset it was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RiskResponse {
    pub asset_id: String,
    pub risk: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OverviewResponse {
    pub overview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResidualResponse {
    pub residual_risk: i64,
}

/// Band a risk score falls into on the impact/probability matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: i64) -> Self {
        match score {
            s if s >= 16 => RiskLevel::Critical,
            s if s >= 9 => RiskLevel::High,
            s if s >= 4 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        };
        f.write_str(name)
    }
}

/// Risk score paired with its band.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LevelResponse {
    pub risk: i64,
    pub level: RiskLevel,
}

/// Multiply impact by probability. No bounds are enforced; the product wraps on overflow.
pub fn risk_score(impact: i64, probability: i64) -> i64 {
    impact.wrapping_mul(probability)
}

/// Compute the response for a single request.
pub fn calculate(request: RiskRequest) -> RiskResponse {
    let risk = risk_score(request.impact, request.probability);
    RiskResponse {
        asset_id: request.asset_id,
        risk,
    }
}

pub fn overview() -> OverviewResponse {
    OverviewResponse {
        overview: OVERVIEW_PLACEHOLDER.to_string(),
    }
}

pub fn residual() -> ResidualResponse {
    ResidualResponse {
        residual_risk: RESIDUAL_RISK_PLACEHOLDER,
    }
}

pub fn classify(impact: i64, probability: i64) -> LevelResponse {
    let risk = risk_score(impact, probability);
    LevelResponse {
        risk,
        level: RiskLevel::from_score(risk),
    }
}

//! Risk assessment types
//!
//! `Valuation` is what the valuation provider hands in; everything else is
//! produced once by the risk engine and never mutated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Severity;

/// Statutory regions for small-amount deposit priority (주택임대차보호법 시행령 제10조, 제11조)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// 서울특별시
    Seoul,
    /// 수도권정비계획법에 따른 과밀억제권역 (서울 제외), 세종, 용인, 화성, 김포
    OvercrowdingControl,
    /// 광역시 (과밀억제권역과 군지역 제외), 안산, 광주(경기), 파주, 이천, 평택
    MetropolitanCity,
    /// 그 밖의 지역
    Other,
}

impl Region {
    pub fn name(&self) -> &'static str {
        match self {
            Region::Seoul => "서울특별시",
            Region::OvercrowdingControl => "과밀억제권역",
            Region::MetropolitanCity => "광역시",
            Region::Other => "그 밖의 지역",
        }
    }

    pub fn parse_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "seoul" | "서울" | "서울특별시" => Some(Region::Seoul),
            "overcrowding_control" | "overcrowding" | "과밀억제권역" => {
                Some(Region::OvercrowdingControl)
            }
            "metropolitan_city" | "metro" | "광역시" => Some(Region::MetropolitanCity),
            "other" | "그밖의지역" | "그 밖의 지역" => Some(Region::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketTrend {
    Rising,
    Stable,
    Falling,
}

/// Estimate supplied by the valuation provider. Only `value_mid` drives LTV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub value_low: u64,
    pub value_mid: u64,
    pub value_high: u64,
    /// 0.0 – 1.0
    pub confidence: f64,
    pub market_trend: MarketTrend,
    /// Pass-through market score (0–100) when the provider computes one
    #[serde(default)]
    pub market_score: Option<f64>,
    /// Pass-through building score (0–100) when the provider computes one
    #[serde(default)]
    pub building_score: Option<f64>,
}

impl Valuation {
    /// A point estimate with no spread, stable market and full confidence
    pub fn point(value: u64) -> Self {
        Self {
            value_low: value,
            value_mid: value,
            value_high: value,
            confidence: 1.0,
            market_trend: MarketTrend::Stable,
            market_score: None,
            building_score: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Safe,
    Caution,
    Dangerous,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub ltv: f64,
    pub debt: f64,
    pub legal: f64,
    pub market: f64,
    pub building: f64,
}

/// 소액보증금 최우선변제 eligibility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmallAmountPriority {
    pub is_eligible: bool,
    pub protected_amount: u64,
    pub threshold: u64,
    pub region: Region,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Ltv,
    Debt,
    Legal,
    Market,
    Protection,
    Data,
}

/// One fired risk rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    #[serde(rename = "type")]
    pub risk_type: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// Signed contribution to the overall score
    pub impact: f64,
    pub category: RiskCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub mandatory: Vec<String>,
    pub recommended: Vec<String>,
    pub optional: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtKind {
    Mortgage,
    Jeonse,
    Lease,
    ProposedDeposit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtPriority {
    Senior,
    Subordinate,
}

/// Position of a claim in the repayment order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtRankEntry {
    pub rank: u32,
    #[serde(rename = "type")]
    pub kind: DebtKind,
    pub creditor: String,
    pub amount: u64,
    pub registration_date: Option<NaiveDate>,
    pub priority: DebtPriority,
}

/// Verdict for one proposed deposit against one ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall_score: f64,
    pub risk_level: RiskLevel,
    pub ltv: f64,
    /// Registered mortgages plus the proposed deposit
    pub total_debt: u64,
    /// Valuation minus total debt; negative when underwater
    pub available_equity: i64,
    pub total_mortgage_amount: u64,
    pub total_estimated_principal: u64,
    pub proposed_deposit: u64,
    pub valuation_mid: u64,
    pub sub_scores: SubScores,
    pub small_amount_priority: SmallAmountPriority,
    pub risks: Vec<Risk>,
    pub recommendations: Recommendations,
    pub debt_ranking: Vec<DebtRankEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_parsing() {
        assert_eq!(Region::parse_code("seoul"), Some(Region::Seoul));
        assert_eq!(Region::parse_code("서울특별시"), Some(Region::Seoul));
        assert_eq!(Region::parse_code("METRO"), Some(Region::MetropolitanCity));
        assert_eq!(Region::parse_code("mars"), None);
    }

    #[test]
    fn test_risk_level_serializes_upper_case() {
        let json = serde_json::to_string(&RiskLevel::Dangerous).unwrap();
        assert_eq!(json, "\"DANGEROUS\"");
    }

    #[test]
    fn test_valuation_point_has_no_spread() {
        let valuation = Valuation::point(500);
        assert_eq!(valuation.value_low, valuation.value_high);
        assert_eq!(valuation.market_trend, MarketTrend::Stable);
    }
}

//! Engine configuration
//!
//! Every table the risk engine reads (regional thresholds, score weights,
//! band tables, rule thresholds and impacts) lives here with statutory or
//! house defaults, and can be overridden from a TOML file. Any table left out
//! of the file keeps its default.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared_types::{MarketTrend, Region, RiskLevel};
use std::fs;
use std::path::Path;

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub regional_thresholds: RegionalThresholds,
    pub score_weights: ScoreWeights,
    pub ltv_bands: BandTable,
    pub debt_bands: BandTable,
    pub risk_levels: RiskLevelThresholds,
    pub legal_penalties: LegalPenalties,
    pub rules: RuleSettings,
    pub market_trend_scores: MarketTrendScores,
    /// Building score used when the valuation carries none
    pub default_building_score: f64,
    /// Principal as a fraction of the maximum secured amount
    pub estimated_principal_fraction: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            regional_thresholds: RegionalThresholds::default(),
            score_weights: ScoreWeights::default(),
            ltv_bands: BandTable::ltv_default(),
            debt_bands: BandTable::debt_default(),
            risk_levels: RiskLevelThresholds::default(),
            legal_penalties: LegalPenalties::default(),
            rules: RuleSettings::default(),
            market_trend_scores: MarketTrendScores::default(),
            default_building_score: 70.0,
            // Banks register 120% of the principal as the maximum secured amount
            estimated_principal_fraction: 1.0 / 1.2,
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the scoring functions rely on
    pub fn validate(&self) -> Result<(), EngineError> {
        let fraction = self.estimated_principal_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "estimated_principal_fraction must be in (0, 1], got {}",
                fraction
            )));
        }

        let weights = &self.score_weights;
        for (name, weight) in [
            ("ltv", weights.ltv),
            ("debt", weights.debt),
            ("legal", weights.legal),
            ("market", weights.market),
            ("building", weights.building),
        ] {
            if !(weight > 0.0) {
                return Err(EngineError::InvalidConfig(format!(
                    "score weight '{}' must be positive, got {}",
                    name, weight
                )));
            }
        }

        self.ltv_bands.validate("ltv_bands")?;
        self.debt_bands.validate("debt_bands")?;

        if self.risk_levels.caution > self.risk_levels.safe {
            return Err(EngineError::InvalidConfig(
                "risk_levels.caution must not exceed risk_levels.safe".to_string(),
            ));
        }

        for (region, thresholds) in self.regional_thresholds.iter() {
            if thresholds.protected_amount > thresholds.deposit_threshold {
                return Err(EngineError::InvalidConfig(format!(
                    "protected amount exceeds deposit threshold for {}",
                    region
                )));
            }
        }

        Ok(())
    }
}

/// Deposit ceiling and protected amount for one region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionalThreshold {
    /// Deposits at or below this amount are eligible
    pub deposit_threshold: u64,
    /// Amount paid ahead of every secured creditor
    pub protected_amount: u64,
}

/// Small-amount priority table (시행령 제10조, 제11조, 2023-02-21 amendment)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionalThresholds {
    pub seoul: RegionalThreshold,
    pub overcrowding_control: RegionalThreshold,
    pub metropolitan_city: RegionalThreshold,
    pub other: RegionalThreshold,
}

impl Default for RegionalThresholds {
    fn default() -> Self {
        Self {
            seoul: RegionalThreshold {
                deposit_threshold: 165_000_000,
                protected_amount: 55_000_000,
            },
            overcrowding_control: RegionalThreshold {
                deposit_threshold: 145_000_000,
                protected_amount: 48_000_000,
            },
            metropolitan_city: RegionalThreshold {
                deposit_threshold: 85_000_000,
                protected_amount: 28_000_000,
            },
            other: RegionalThreshold {
                deposit_threshold: 75_000_000,
                protected_amount: 25_000_000,
            },
        }
    }
}

impl RegionalThresholds {
    pub fn get(&self, region: Region) -> RegionalThreshold {
        match region {
            Region::Seoul => self.seoul,
            Region::OvercrowdingControl => self.overcrowding_control,
            Region::MetropolitanCity => self.metropolitan_city,
            Region::Other => self.other,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Region, RegionalThreshold)> + '_ {
        [
            Region::Seoul,
            Region::OvercrowdingControl,
            Region::MetropolitanCity,
            Region::Other,
        ]
        .into_iter()
        .map(|region| (region, self.get(region)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub ltv: f64,
    pub debt: f64,
    pub legal: f64,
    pub market: f64,
    pub building: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            ltv: 0.40,
            debt: 0.20,
            legal: 0.25,
            market: 0.10,
            building: 0.05,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.ltv + self.debt + self.legal + self.market + self.building
    }
}

/// Inputs at or below `upper` score `score`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBand {
    pub upper: f64,
    pub score: f64,
}

/// Monotone step table: the first band whose `upper` bound is not exceeded
/// wins, inputs beyond the last band score `beyond`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    pub bands: Vec<ScoreBand>,
    pub beyond: f64,
}

impl BandTable {
    fn from_pairs(pairs: &[(f64, f64)], beyond: f64) -> Self {
        Self {
            bands: pairs
                .iter()
                .map(|(upper, score)| ScoreBand {
                    upper: *upper,
                    score: *score,
                })
                .collect(),
            beyond,
        }
    }

    /// LTV ratio bands
    pub fn ltv_default() -> Self {
        Self::from_pairs(
            &[
                (0.5, 100.0),
                (0.6, 90.0),
                (0.7, 75.0),
                (0.8, 55.0),
                (0.9, 35.0),
                (1.0, 15.0),
            ],
            0.0,
        )
    }

    /// Bands over absolute senior debt in won
    pub fn debt_default() -> Self {
        Self::from_pairs(
            &[
                (0.0, 100.0),
                (100_000_000.0, 85.0),
                (200_000_000.0, 70.0),
                (300_000_000.0, 55.0),
                (500_000_000.0, 35.0),
            ],
            20.0,
        )
    }

    pub fn score(&self, value: f64) -> f64 {
        self.bands
            .iter()
            .find(|band| value <= band.upper)
            .map(|band| band.score)
            .unwrap_or(self.beyond)
    }

    fn validate(&self, name: &str) -> Result<(), EngineError> {
        if self.bands.is_empty() {
            return Err(EngineError::InvalidConfig(format!("{} has no bands", name)));
        }
        let in_range = |score: f64| (0.0..=100.0).contains(&score);
        if !self.bands.iter().all(|b| in_range(b.score)) || !in_range(self.beyond) {
            return Err(EngineError::InvalidConfig(format!(
                "{} scores must lie in [0, 100]",
                name
            )));
        }
        let monotone = self.bands.windows(2).all(|pair| {
            pair[0].upper < pair[1].upper && pair[0].score >= pair[1].score
        });
        let last = self.bands[self.bands.len() - 1].score;
        if !monotone || self.beyond > last {
            return Err(EngineError::InvalidConfig(format!(
                "{} must have increasing bounds and non-increasing scores",
                name
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLevelThresholds {
    /// Overall scores at or above this are SAFE
    pub safe: f64,
    /// Overall scores at or above this (and below `safe`) are CAUTION
    pub caution: f64,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            safe: 70.0,
            caution: 50.0,
        }
    }
}

impl RiskLevelThresholds {
    pub fn level(&self, overall_score: f64) -> RiskLevel {
        if overall_score >= self.safe {
            RiskLevel::Safe
        } else if overall_score >= self.caution {
            RiskLevel::Caution
        } else {
            RiskLevel::Dangerous
        }
    }
}

/// Points taken off the legal sub-score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalPenalties {
    pub auction: f64,
    pub provisional_registration: f64,
    pub seizure: f64,
    pub co_ownership: f64,
}

impl Default for LegalPenalties {
    fn default() -> Self {
        Self {
            auction: 60.0,
            provisional_registration: 30.0,
            seizure: 30.0,
            co_ownership: 15.0,
        }
    }
}

/// Rule thresholds and the signed impact each fired rule adds to the overall score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSettings {
    pub ltv_critical: f64,
    pub ltv_high: f64,
    /// Share of the valuation above which the senior mortgages alone are heavy
    pub senior_mortgage_fraction: f64,
    /// Valuation confidence below this is flagged
    pub low_valuation_confidence: f64,

    pub ltv_critical_impact: f64,
    pub ltv_high_impact: f64,
    pub negative_equity_impact: f64,
    pub senior_mortgage_heavy_impact: f64,
    pub auction_filed_impact: f64,
    pub provisional_registration_impact: f64,
    pub seizure_impact: f64,
    pub co_ownership_impact: f64,
    pub senior_tenancy_impact: f64,
    pub non_bank_creditor_impact: f64,
    pub small_amount_ineligible_impact: f64,
    pub low_valuation_confidence_impact: f64,
    pub extraction_uncertain_impact: f64,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            ltv_critical: 0.9,
            ltv_high: 0.7,
            senior_mortgage_fraction: 0.5,
            low_valuation_confidence: 0.5,

            ltv_critical_impact: -20.0,
            ltv_high_impact: -10.0,
            negative_equity_impact: -15.0,
            senior_mortgage_heavy_impact: -5.0,
            auction_filed_impact: -30.0,
            provisional_registration_impact: -15.0,
            seizure_impact: -10.0,
            co_ownership_impact: -5.0,
            senior_tenancy_impact: -5.0,
            non_bank_creditor_impact: -5.0,
            small_amount_ineligible_impact: -3.0,
            low_valuation_confidence_impact: -3.0,
            extraction_uncertain_impact: -2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketTrendScores {
    pub rising: f64,
    pub stable: f64,
    pub falling: f64,
}

impl Default for MarketTrendScores {
    fn default() -> Self {
        Self {
            rising: 80.0,
            stable: 70.0,
            falling: 45.0,
        }
    }
}

impl MarketTrendScores {
    pub fn get(&self, trend: MarketTrend) -> f64 {
        match trend {
            MarketTrend::Rising => self.rising,
            MarketTrend::Stable => self.stable,
            MarketTrend::Falling => self.falling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = EngineConfig::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
            estimated_principal_fraction = 0.8

            [regional_thresholds.seoul]
            deposit_threshold = 150000000
            protected_amount = 50000000

            [score_weights]
            ltv = 0.5
        "#;

        let config = EngineConfig::from_str(toml).unwrap();
        assert_eq!(config.estimated_principal_fraction, 0.8);
        assert_eq!(
            config.regional_thresholds.get(Region::Seoul).deposit_threshold,
            150_000_000
        );
        assert_eq!(
            config.regional_thresholds.get(Region::Other).deposit_threshold,
            75_000_000
        );
        assert_eq!(config.score_weights.ltv, 0.5);
        assert_eq!(config.score_weights.debt, 0.20);
    }

    #[test]
    fn test_parse_band_table() {
        let toml = r#"
            [ltv_bands]
            beyond = 0.0
            bands = [
                { upper = 0.6, score = 100.0 },
                { upper = 0.9, score = 50.0 },
            ]
        "#;
        let config = EngineConfig::from_str(toml).unwrap();
        assert_eq!(config.ltv_bands.score(0.7), 50.0);
        assert_eq!(config.ltv_bands.score(0.95), 0.0);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = EngineConfig::from_str(include_str!("../../../config/engine.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_rejects_bad_fraction() {
        let err = EngineConfig::from_str("estimated_principal_fraction = 1.5").unwrap_err();
        assert!(err.to_string().contains("estimated_principal_fraction"));
    }

    #[test]
    fn test_rejects_non_monotone_bands() {
        let mut config = EngineConfig::default();
        config.ltv_bands.bands[1].score = 100.0 + 1.0;
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig(_))
        ));

        let mut config = EngineConfig::default();
        config.debt_bands.bands.swap(0, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_weight() {
        let mut config = EngineConfig::default();
        config.score_weights.market = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_band_lookup() {
        let bands = BandTable::ltv_default();
        assert_eq!(bands.score(0.5), 100.0);
        assert_eq!(bands.score(0.8), 55.0);
        assert_eq!(bands.score(0.81), 35.0);
        assert_eq!(bands.score(1.2), 0.0);
    }

    #[test]
    fn test_risk_level_thresholds() {
        let levels = RiskLevelThresholds::default();
        assert_eq!(levels.level(70.0), RiskLevel::Safe);
        assert_eq!(levels.level(69.9), RiskLevel::Caution);
        assert_eq!(levels.level(49.9), RiskLevel::Dangerous);
    }
}

pub mod assessment;
pub mod registry;
pub mod types;

pub use assessment::{
    DebtKind, DebtPriority, DebtRankEntry, MarketTrend, Recommendations, Region, Risk,
    RiskAssessment, RiskCategory, RiskLevel, SmallAmountPriority, SubScores, Valuation,
};
pub use registry::{
    ChainKind, ChainStatus, LienChain, RegistryEntry, RegistryLedger, RegistryRecord,
};
pub use types::{Diagnostic, SectionKind, Severity};

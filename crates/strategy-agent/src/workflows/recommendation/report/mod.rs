mod summary;
pub mod views;

pub use summary::{ItemOutcome, ReportAssembler};
pub use views::{CustomerInfo, ItemRecommendations, RecommendationReport, ReportSummary};

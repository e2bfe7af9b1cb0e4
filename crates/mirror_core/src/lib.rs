pub mod domain;
pub mod gateway;
pub mod ports;
pub mod prompts;
pub mod schema;
pub mod seed;

pub use domain::{
    AIRecommendation, Alert, AlertSeverity, ContentEntry, ContentTone, ContentType,
    DashboardInsights, DashboardSnapshot, HookStyle, NewContentEntry, PerformanceDNA, TrendPoint,
};
pub use gateway::AnalysisGateway;
pub use ports::{ContentStore, PortError, PortResult, StructuredGenerationService};
pub use schema::ResponseSchema;

pub mod description;
pub mod feature;
pub mod service_schema;
pub mod store;
pub mod tracker;

pub use description::{issue_summary, render_description};
pub use feature::{
    load_feature, parse_feature, FeatureDocument, FeatureError, FeatureSummary, ScenarioKind,
    ScenarioRecord,
};
pub use service_schema::{
    insert_config_step, insert_step, migrate_collection, wrap_config_schema, MigrationReport,
    SchemaError,
};
pub use store::{DocumentStore, JsonFileStore, StoreError};
pub use tracker::{
    CreatedIssue, IssueRequest, IssueTracker, JiraClient, TrackerConfig, TrackerError,
};

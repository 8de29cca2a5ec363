//! Export pipeline
//!
//! Resolve the organization, fetch its users, write them out. Each stage
//! receives its dependencies (store, operation scope, destination) explicitly
//! and the first failure ends the run.

pub mod export;
pub mod lookup;
pub mod scope;

pub use export::{Destination, ExportSummary, export, write_records};
pub use lookup::{fetch_users, resolve_org_id};
pub use scope::OperationScope;

use tracing::error;

use crate::error::Result;
use crate::formatter::JsonFormatter;
use crate::store::{DirectoryStore, operation};

/// What to export and where
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Organization path to resolve
    pub org_path: String,

    /// Output destination
    pub destination: Destination,
}

/// Run resolve, fetch and export in order
///
/// Failures are logged here, with the identifiers known at the failing stage,
/// before being returned.
///
/// # Arguments
/// * `store` - Directory to query
/// * `scope` - Deadline and cancellation shared by both lookups
/// * `job` - Organization path and destination
/// * `formatter` - JSON formatter for the export
///
/// # Returns
/// * `Result<ExportSummary>` - What was written
pub async fn run_export(
    store: &dyn DirectoryStore,
    scope: &OperationScope,
    job: &ExportJob,
    formatter: &JsonFormatter,
) -> Result<ExportSummary> {
    let org_id = resolve_org_id(store, scope, &job.org_path)
        .await
        .inspect_err(|e| {
            error!(
                kind = e.kind(),
                operation = operation::RESOLVE_ORG_ID,
                org = %job.org_path,
                error = %e,
                "couldn't get org id"
            )
        })?;

    let users = fetch_users(store, scope, &org_id).await.inspect_err(|e| {
        error!(
            kind = e.kind(),
            operation = operation::FETCH_USERS,
            org = %job.org_path,
            org_id = %org_id,
            error = %e,
            "couldn't get users for org"
        )
    })?;

    export(&users, &job.destination, formatter)
        .await
        .inspect_err(|e| {
            error!(
                kind = e.kind(),
                operation = "export",
                destination = %job.destination,
                error = %e,
                "couldn't write export"
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::User;
    use crate::store::memory::acme;
    use std::path::PathBuf;
    use std::time::Duration;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("orgusers-pipeline-{}-{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn test_acme_scenario_exports_both_members() {
        let store = acme();
        let path = temp_path("acme.json");
        let job = ExportJob {
            org_path: "acme".into(),
            destination: Destination::File(path.clone()),
        };

        let scope = OperationScope::new(Duration::from_secs(5));
        let summary = run_export(&store, &scope, &job, &JsonFormatter::plain())
            .await
            .unwrap();
        assert_eq!(summary, ExportSummary { records: 2, degraded: false });

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.starts_with("[\n  {\n    \"external_id\": \"ext-1\","));
        assert!(content.ends_with("]\n"));

        let users: Vec<User> = serde_json::from_str(&content).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].external_id, "ext-1");
        assert_eq!(users[0].organizations.len(), 1);
        assert_eq!(users[0].organizations[0].user_id, "u1");
        assert_eq!(users[0].organizations[0].email, "a@x.com");
        assert_eq!(users[1].external_id, "ext-2");
        assert_eq!(users[1].organizations.len(), 2);
        assert!(users[1].is_member_of("org_123"));

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_ghost_scenario_never_fetches_or_writes() {
        let store = acme();
        let path = temp_path("ghost.json");
        let job = ExportJob {
            org_path: "ghost".into(),
            destination: Destination::File(path.clone()),
        };

        let scope = OperationScope::new(Duration::from_secs(5));
        let err = run_export(&store, &scope, &job, &JsonFormatter::plain())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "not_found");
        assert_eq!(store.org_queries(), 1);
        assert_eq!(store.member_queries(), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unwritable_destination_fails_after_lookups() {
        let store = acme();
        let job = ExportJob {
            org_path: "acme".into(),
            destination: Destination::File(PathBuf::from("/nonexistent/directory/out.json")),
        };

        let scope = OperationScope::new(Duration::from_secs(5));
        let err = run_export(&store, &scope, &job, &JsonFormatter::plain())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "configuration");
        assert_eq!(store.member_queries(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_run_stops_before_fetch() {
        let store = acme();
        let job = ExportJob {
            org_path: "acme".into(),
            destination: Destination::Stdout,
        };

        let scope = OperationScope::new(Duration::from_secs(5));
        scope.cancel();

        let err = run_export(&store, &scope, &job, &JsonFormatter::plain())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "connectivity");
        assert_eq!(err.operation(), Some("resolve_org_id"));
        assert_eq!(store.member_queries(), 0);
    }
}

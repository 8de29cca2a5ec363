//! The two dependent reads: organization path to id, id to members.

use tracing::{debug, info};

use super::scope::OperationScope;
use crate::config::Lookup;
use crate::error::{ConfigError, NotFoundError, Result};
use crate::store::{DirectoryStore, User, operation};

/// Resolve an organization path to the organization's identifier
///
/// # Arguments
/// * `store` - Directory to query
/// * `scope` - Deadline and cancellation for the call
/// * `path` - Organization path, non-empty
///
/// # Returns
/// * `Result<String>` - The organization id, or `NotFound` when no
///   organization has this path
pub async fn resolve_org_id(
    store: &dyn DirectoryStore,
    scope: &OperationScope,
    path: &str,
) -> Result<String> {
    if path.is_empty() {
        return Err(ConfigError::InvalidArguments("organization path is empty".into()).into());
    }

    let org = scope
        .run(operation::RESOLVE_ORG_ID, store.find_organization(path))
        .await?
        .ok_or_else(|| NotFoundError::new(Lookup::ORGANIZATIONS, Lookup::ORG_PATH_FIELD, path))?;

    debug!(org = %path, org_id = %org.id, customer_id = %org.customer_id, "organization resolved");
    Ok(org.id)
}

/// Fetch every user with a membership in `org_id`
///
/// An organization without members yields an empty list.
pub async fn fetch_users(
    store: &dyn DirectoryStore,
    scope: &OperationScope,
    org_id: &str,
) -> Result<Vec<User>> {
    if org_id.is_empty() {
        return Err(ConfigError::InvalidArguments("organization id is empty".into()).into());
    }

    let users = scope
        .run(operation::FETCH_USERS, store.find_members(org_id))
        .await?;

    info!(org_id = %org_id, count = users.len(), "users fetched");
    Ok(users)
}

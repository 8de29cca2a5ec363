//! Directory store: the two reads the export needs.
//!
//! [`DirectoryStore`] is the seam between the pipeline and the database.
//! [`MongoDirectory`] implements it over a MongoDB database handle.

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::Document;
use mongodb::{Collection, Database};
use tracing::debug;

use crate::config::Lookup;
use crate::error::{Result, classify};

pub mod model;

#[cfg(test)]
pub(crate) mod memory;

pub use model::{Organization, OrganizationMembership, User};

/// Operation names used in logs and errors.
pub mod operation {
    pub const RESOLVE_ORG_ID: &str = "resolve_org_id";
    pub const FETCH_USERS: &str = "fetch_users";
}

/// Read access to organizations and their users.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Find the organization whose path equals `path`, if any.
    async fn find_organization(&self, path: &str) -> Result<Option<Organization>>;

    /// All users with a membership whose organization id equals `org_id`.
    /// The full result set is buffered.
    async fn find_members(&self, org_id: &str) -> Result<Vec<User>>;
}

/// Equality filter on the organization path
pub fn organization_filter(path: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(Lookup::ORG_PATH_FIELD, path);
    filter
}

/// Match users whose embedded membership list holds `org_id`
pub fn membership_filter(org_id: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(Lookup::MEMBERSHIP_ORG_FIELD, org_id);
    filter
}

/// [`DirectoryStore`] backed by a MongoDB database.
#[derive(Clone)]
pub struct MongoDirectory {
    db: Database,
}

impl MongoDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DirectoryStore for MongoDirectory {
    async fn find_organization(&self, path: &str) -> Result<Option<Organization>> {
        let filter = organization_filter(path);
        debug!(
            "Executing findOne on collection '{}' with filter: {:?}",
            Lookup::ORGANIZATIONS,
            filter
        );

        let coll: Collection<Document> = self.db.collection(Lookup::ORGANIZATIONS);
        let found = coll
            .find_one(filter)
            .await
            .map_err(|e| classify(operation::RESOLVE_ORG_ID, &e))?;

        found
            .map(|doc| model::decode(operation::RESOLVE_ORG_ID, doc))
            .transpose()
    }

    async fn find_members(&self, org_id: &str) -> Result<Vec<User>> {
        let filter = membership_filter(org_id);
        debug!(
            "Executing find on collection '{}' with filter: {:?}",
            Lookup::USERS,
            filter
        );

        let coll: Collection<Document> = self.db.collection(Lookup::USERS);

        // The cursor lives only in this frame; dropping it on any return path
        // closes it server-side.
        let mut cursor = coll
            .find(filter)
            .await
            .map_err(|e| classify(operation::FETCH_USERS, &e))?;

        let mut users = Vec::new();
        while let Some(doc) = cursor
            .try_next()
            .await
            .map_err(|e| classify(operation::FETCH_USERS, &e))?
        {
            users.push(model::decode(operation::FETCH_USERS, doc)?);
        }

        debug!("Retrieved {} user documents", users.len());
        Ok(users)
    }
}

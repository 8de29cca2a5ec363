//! In-memory [`DirectoryStore`] for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{DirectoryStore, Organization, OrganizationMembership, User};
use crate::error::Result;

#[derive(Default)]
pub struct MemoryDirectory {
    pub organizations: Vec<Organization>,
    pub users: Vec<User>,
    /// Artificial latency applied to every query
    pub delay: Option<Duration>,
    org_queries: AtomicUsize,
    member_queries: AtomicUsize,
}

impl MemoryDirectory {
    pub fn new(organizations: Vec<Organization>, users: Vec<User>) -> Self {
        Self {
            organizations,
            users,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn org_queries(&self) -> usize {
        self.org_queries.load(Ordering::SeqCst)
    }

    pub fn member_queries(&self) -> usize {
        self.member_queries.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectory {
    async fn find_organization(&self, path: &str) -> Result<Option<Organization>> {
        self.org_queries.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Ok(self.organizations.iter().find(|o| o.path == path).cloned())
    }

    async fn find_members(&self, org_id: &str) -> Result<Vec<User>> {
        self.member_queries.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Ok(self
            .users
            .iter()
            .filter(|u| u.is_member_of(org_id))
            .cloned()
            .collect())
    }
}

pub fn org(id: &str, path: &str) -> Organization {
    Organization {
        id: id.to_string(),
        path: path.to_string(),
        customer_id: format!("cus_{id}"),
    }
}

pub fn user(external_id: &str, memberships: &[(&str, &str, &str)]) -> User {
    User {
        external_id: external_id.to_string(),
        organizations: memberships
            .iter()
            .map(|(user_id, org_id, email)| OrganizationMembership {
                user_id: user_id.to_string(),
                org_id: org_id.to_string(),
                email: email.to_string(),
            })
            .collect(),
    }
}

/// The `acme` directory: two members of `org_123`, one outsider, one user
/// without memberships.
pub fn acme() -> MemoryDirectory {
    MemoryDirectory::new(
        vec![org("org_123", "acme"), org("org_456", "globex")],
        vec![
            user("ext-1", &[("u1", "org_123", "a@x.com")]),
            user(
                "ext-2",
                &[("u2", "org_456", "b@globex.com"), ("u2", "org_123", "b@x.com")],
            ),
            user("ext-3", &[("u3", "org_456", "c@globex.com")]),
            user("ext-4", &[]),
        ],
    )
}

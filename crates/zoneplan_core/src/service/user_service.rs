//! User use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for the participant registry.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Users are immutable after creation; no mutation API exists here.

use crate::model::user::{User, UserId};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoResult;

/// Use-case service wrapper for the participant registry.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new user and returns the persisted record.
    pub fn create_user(&self, name: impl Into<String>) -> RepoResult<User> {
        let user = User::new(name);
        self.repo.create_user(&user)?;
        Ok(user)
    }

    /// Gets one user by stable ID.
    pub fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.repo.get_user(id)
    }

    /// Lists all registered users sorted by name.
    pub fn list_users(&self) -> RepoResult<Vec<User>> {
        self.repo.list_users()
    }
}

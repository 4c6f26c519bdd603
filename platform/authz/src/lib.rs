//! Authorization decisions for posts and comments.
//!
//! Every check is a pure function over facts the caller has already loaded.
//! Handlers fetch the target row, ask for a [`Decision`] and only then touch
//! the database again. Existence is always reported before rights, so a
//! missing row yields [`Denied::NotFound`] even for callers who would be
//! refused anyway.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

mod comments;
mod posts;
mod validation;

pub use comments::{CommentFacts, comment_creation, comment_listing, comment_mutation};
pub use posts::{PostFacts, post_creation, post_mutation, post_visibility};
pub use validation::{ContentPolicy, InvalidInput};

/// Outcome of an access check. `Ok(())` means allowed (or visible).
pub type Decision = Result<(), Denied>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Author,
    Admin,
}

/// Identity resolved from a request credential.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when the caller is `owner` or holds the admin role.
    pub fn owns_or_admin(&self, owner: Uuid) -> bool {
        self.id == owner || self.is_admin()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    Post,
    Comment,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Post => "post",
            Resource::Comment => "comment",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Denied {
    #[error("{0} not found")]
    NotFound(Resource),
    /// No caller, but the operation needs one.
    #[error("authentication required")]
    Unauthenticated,
    /// Caller is known but lacks rights on the target.
    #[error("insufficient permissions")]
    Forbidden,
    #[error(transparent)]
    Invalid(#[from] InvalidInput),
}

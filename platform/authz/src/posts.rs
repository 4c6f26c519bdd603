use uuid::Uuid;

use crate::{Caller, Decision, Denied, Resource, Role};

/// The parts of a post that access rules look at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PostFacts {
    pub author_id: Uuid,
    pub published: bool,
}

/// Published posts are public. Drafts are visible to their author and admins;
/// an anonymous caller gets `Unauthenticated`, anyone else `Forbidden`.
pub fn post_visibility(post: Option<&PostFacts>, caller: Option<&Caller>) -> Decision {
    let post = post.ok_or(Denied::NotFound(Resource::Post))?;
    if post.published {
        return Ok(());
    }
    match caller {
        None => Err(Denied::Unauthenticated),
        Some(caller) if caller.owns_or_admin(post.author_id) => Ok(()),
        Some(_) => Err(Denied::Forbidden),
    }
}

/// Update, publish toggle and delete all share this rule.
pub fn post_mutation(post: Option<&PostFacts>, caller: &Caller) -> Decision {
    let post = post.ok_or(Denied::NotFound(Resource::Post))?;
    if caller.owns_or_admin(post.author_id) {
        Ok(())
    } else {
        Err(Denied::Forbidden)
    }
}

pub fn post_creation(caller: &Caller) -> Decision {
    match caller.role {
        Role::Author | Role::Admin => Ok(()),
        Role::User => Err(Denied::Forbidden),
    }
}

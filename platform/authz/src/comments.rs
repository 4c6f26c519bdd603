use uuid::Uuid;

use crate::{Caller, ContentPolicy, Decision, Denied, PostFacts, Resource, post_visibility};

/// A comment together with the author of the post it hangs off.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CommentFacts {
    pub author_id: Uuid,
    pub post_author_id: Uuid,
}

/// Listing comments follows the parent post's visibility; the result is
/// either the whole list or a denial, never a partial list.
pub fn comment_listing(post: Option<&PostFacts>, caller: Option<&Caller>) -> Decision {
    post_visibility(post, caller)
}

/// Checks run in order: authentication, content, existence, rights.
pub fn comment_creation(
    post: Option<&PostFacts>,
    caller: Option<&Caller>,
    content: &str,
    policy: &ContentPolicy,
) -> Decision {
    let caller = caller.ok_or(Denied::Unauthenticated)?;
    policy.check_comment(content)?;
    let post = post.ok_or(Denied::NotFound(Resource::Post))?;
    if post.published || caller.owns_or_admin(post.author_id) {
        Ok(())
    } else {
        Err(Denied::Forbidden)
    }
}

/// The comment's author, the parent post's author and admins may edit or
/// delete a comment.
pub fn comment_mutation(comment: Option<&CommentFacts>, caller: &Caller) -> Decision {
    let comment = comment.ok_or(Denied::NotFound(Resource::Comment))?;
    if caller.id == comment.author_id || caller.owns_or_admin(comment.post_author_id) {
        Ok(())
    } else {
        Err(Denied::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{ALL_ROLES, caller};
    use crate::{InvalidInput, Role};

    #[test]
    fn anonymous_listing_on_draft_is_unauthenticated() {
        let post = PostFacts {
            author_id: Uuid::new_v4(),
            published: false,
        };
        assert_eq!(comment_listing(Some(&post), None), Err(Denied::Unauthenticated));
        assert_eq!(
            comment_listing(Some(&post), Some(&caller(Role::User))),
            Err(Denied::Forbidden)
        );
        assert_eq!(
            comment_listing(None, None),
            Err(Denied::NotFound(Resource::Post))
        );
    }

    #[test]
    fn creation_enforces_minimum_length() {
        let policy = ContentPolicy::default();
        let post = PostFacts {
            author_id: Uuid::new_v4(),
            published: true,
        };
        let reader = caller(Role::User);
        assert_eq!(
            comment_creation(Some(&post), Some(&reader), "hi", &policy),
            Err(Denied::Invalid(InvalidInput {
                field: "content",
                min: 3
            }))
        );
        assert_eq!(
            comment_creation(Some(&post), Some(&reader), "hey", &policy),
            Ok(())
        );
    }

    #[test]
    fn creation_is_never_anonymous() {
        let policy = ContentPolicy::default();
        let post = PostFacts {
            author_id: Uuid::new_v4(),
            published: true,
        };
        assert_eq!(
            comment_creation(Some(&post), None, "great post", &policy),
            Err(Denied::Unauthenticated)
        );
    }

    #[test]
    fn creation_on_draft_needs_post_author_or_admin() {
        let policy = ContentPolicy::default();
        let author = caller(Role::Author);
        let post = PostFacts {
            author_id: author.id,
            published: false,
        };
        assert_eq!(
            comment_creation(Some(&post), Some(&author), "note to self", &policy),
            Ok(())
        );
        assert_eq!(
            comment_creation(Some(&post), Some(&caller(Role::Admin)), "review", &policy),
            Ok(())
        );
        assert_eq!(
            comment_creation(Some(&post), Some(&caller(Role::User)), "sneaky", &policy),
            Err(Denied::Forbidden)
        );
        assert_eq!(
            comment_creation(None, Some(&author), "orphan", &policy),
            Err(Denied::NotFound(Resource::Post))
        );
    }

    #[test]
    fn post_author_may_moderate_foreign_comments() {
        let post_author = caller(Role::Author);
        let commenter = caller(Role::User);
        let comment = CommentFacts {
            author_id: commenter.id,
            post_author_id: post_author.id,
        };
        assert_eq!(comment_mutation(Some(&comment), &post_author), Ok(()));
        assert_eq!(comment_mutation(Some(&comment), &commenter), Ok(()));
        assert_eq!(
            comment_mutation(Some(&comment), &caller(Role::Author)),
            Err(Denied::Forbidden)
        );
    }

    #[test]
    fn admins_may_mutate_any_comment() {
        let comment = CommentFacts {
            author_id: Uuid::new_v4(),
            post_author_id: Uuid::new_v4(),
        };
        assert_eq!(comment_mutation(Some(&comment), &caller(Role::Admin)), Ok(()));
        for role in ALL_ROLES.into_iter().filter(|role| *role != Role::Admin) {
            assert_eq!(
                comment_mutation(Some(&comment), &caller(role)),
                Err(Denied::Forbidden)
            );
        }
        assert_eq!(
            comment_mutation(None, &caller(Role::Admin)),
            Err(Denied::NotFound(Resource::Comment))
        );
    }
}

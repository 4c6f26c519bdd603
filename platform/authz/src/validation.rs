use thiserror::Error;

/// Content failed a minimum-length rule. Lengths count characters, not bytes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{field} must be at least {min} characters")]
pub struct InvalidInput {
    pub field: &'static str,
    pub min: usize,
}

/// Minimum lengths enforced before anything is persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentPolicy {
    pub comment_min_len: usize,
    pub title_min_len: usize,
    pub post_content_min_len: usize,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self {
            comment_min_len: 3,
            title_min_len: 3,
            post_content_min_len: 10,
        }
    }
}

impl ContentPolicy {
    pub fn check_comment(&self, content: &str) -> Result<(), InvalidInput> {
        min_len("content", content, self.comment_min_len)
    }

    pub fn check_post(&self, title: &str, content: &str) -> Result<(), InvalidInput> {
        min_len("title", title, self.title_min_len)?;
        min_len("content", content, self.post_content_min_len)
    }
}

fn min_len(field: &'static str, value: &str, min: usize) -> Result<(), InvalidInput> {
    if value.chars().count() < min {
        Err(InvalidInput { field, min })
    } else {
        Ok(())
    }
}

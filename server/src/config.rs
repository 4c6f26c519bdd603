use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use platform_authn::TokenConfig;
use platform_authz::ContentPolicy;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub tokens: TokenConfig,
    pub cors_allowed_origins: Vec<String>,
    pub content: ContentPolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    fn from_source(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secret = var("JWT_SECRET").context("JWT_SECRET missing")?;
        let ttl_minutes = parse_or(&var, "TOKEN_TTL_MINUTES", 24 * 60)?;
        let tokens = TokenConfig::new(secret.trim(), ttl_minutes)
            .context("invalid token settings")?;

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();

        let defaults = ContentPolicy::default();
        let content = ContentPolicy {
            comment_min_len: parse_or(&var, "COMMENT_MIN_LENGTH", defaults.comment_min_len)?,
            title_min_len: parse_or(&var, "POST_TITLE_MIN_LENGTH", defaults.title_min_len)?,
            post_content_min_len: parse_or(
                &var,
                "POST_CONTENT_MIN_LENGTH",
                defaults.post_content_min_len,
            )?,
        };

        Ok(Self {
            tokens,
            cors_allowed_origins,
            content,
        })
    }
}

fn parse_or<T: FromStr>(var: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("invalid value for {key}: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use platform_authn::AuthnError;

    use super::*;

    const SECRET: &str = "config-secret-config-secret-config";

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        AppConfig::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn unset_keys_fall_back_to_defaults() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();
        assert_eq!(config.content, ContentPolicy::default());
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:5173"]);
    }

    #[test]
    fn origins_and_thresholds_are_read() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("CORS_ALLOWED_ORIGINS", "https://a.test, ,https://b.test"),
            ("COMMENT_MIN_LENGTH", "5"),
        ])
        .unwrap();
        assert_eq!(config.cors_allowed_origins, vec!["https://a.test", "https://b.test"]);
        assert_eq!(config.content.comment_min_len, 5);
    }

    #[test]
    fn missing_secret_and_bad_numbers_fail() {
        assert!(load(&[]).is_err());
        assert!(load(&[("JWT_SECRET", SECRET), ("COMMENT_MIN_LENGTH", "three")]).is_err());
    }

    #[test]
    fn out_of_range_token_lifetime_is_an_error() {
        for ttl in ["0", "-30", "9223372036854775807"] {
            let err = load(&[("JWT_SECRET", SECRET), ("TOKEN_TTL_MINUTES", ttl)]).unwrap_err();
            assert!(
                matches!(err.downcast_ref::<AuthnError>(), Some(AuthnError::InvalidTtl(_))),
                "{ttl}: {err:#}"
            );
        }
    }
}

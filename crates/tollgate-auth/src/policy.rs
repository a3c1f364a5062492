//! Route access policy
//!
//! Declares which paths are reachable without an attached identity.
//! Patterns are exact paths, or a prefix followed by `/**` to cover the
//! prefix itself and everything below it.

/// Paths that never require credentials
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[
    "/api/auth/login",
    "/api/auth/register",
    "/v3/api-docs/**",
    "/swagger-ui/**",
    "/swagger-ui.html",
    "/health",
    "/healthz",
    "/metrics",
];

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    public_patterns: Vec<String>,
}

impl AccessPolicy {
    pub fn new<I, S>(public_patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            public_patterns: public_patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `path` may be served without an identity
    pub fn is_public(&self, path: &str) -> bool {
        self.public_patterns
            .iter()
            .any(|pattern| matches_path_pattern(pattern, path))
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_PATHS.iter().copied())
    }
}

fn matches_path_pattern(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix("/**") {
        Some(prefix) => {
            path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        }
        None => pattern == path,
    }
}

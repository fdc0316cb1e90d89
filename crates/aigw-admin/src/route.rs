//! Admin route parsing and rewriting.
//!
//! Admin URLs look like `/admin/<scopeType>/<scopeId>/<section...>`, e.g.
//! `/admin/division/div1/providers`. Older links carry the scope as a
//! `?scope=type:id` query token instead.

use aigw_core::models::scope::{ScopeInfo, ScopeType};
use percent_encoding::percent_decode_str;
use tracing::warn;

use crate::scope_state::{restore_scope_from_url, scope_to_url_param};

/// A parsed admin route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminRoute {
    /// Scope named by the path, or else by the `scope` query token.
    pub scope: Option<ScopeInfo>,
    /// Path segments after the scope, joined with `/`. Empty for the
    /// console's landing page.
    pub section: String,
}

impl AdminRoute {
    /// Parses `url` under `prefix`. Returns `None` for URLs outside the
    /// admin console.
    pub fn parse(prefix: &str, url: &str) -> Option<Self> {
        let url = url.split_once('#').map_or(url, |(u, _)| u);
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };

        let rest = path.strip_prefix(prefix.trim_end_matches('/'))?;
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }

        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let path_scope = match segments.as_slice() {
            [scope_type, scope_id, ..] => scope_type
                .parse::<ScopeType>()
                .ok()
                .map(|t| ScopeInfo::new(t, *scope_id)),
            _ => None,
        };
        let section_start = if path_scope.is_some() { 2 } else { 0 };

        Some(Self {
            scope: path_scope.or_else(|| query.and_then(scope_from_query)),
            section: segments[section_start..].join("/"),
        })
    }

    /// The same section at another scope.
    pub fn with_scope(&self, scope: ScopeInfo) -> Self {
        Self {
            scope: Some(scope),
            section: self.section.clone(),
        }
    }

    /// Renders the route as a path under `prefix`.
    pub fn to_path(&self, prefix: &str) -> String {
        let mut path = prefix.trim_end_matches('/').to_string();
        if let Some(scope) = &self.scope {
            path.push('/');
            path.push_str(&scope_to_url_param(scope));
        }
        if !self.section.is_empty() {
            path.push('/');
            path.push_str(&self.section);
        }
        path
    }
}

/// Browsers send the token percent-encoded (`division%3Adiv1`).
fn scope_from_query(query: &str) -> Option<ScopeInfo> {
    let raw = query.split('&').find_map(|pair| pair.strip_prefix("scope="))?;
    match percent_decode_str(raw).decode_utf8() {
        Ok(token) => restore_scope_from_url(&token),
        Err(e) => {
            warn!(raw, error = %e, "Ignoring scope token with invalid percent-encoding");
            None
        }
    }
}

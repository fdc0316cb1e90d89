//! The admin console's selected scope.
//!
//! One store per console session, created with [`selected_scope`]. Screens
//! hold the read half ([`SelectedScope`]); only the scope guard and the
//! scope switcher hold the write half ([`ScopeSelector`]).

use std::sync::Arc;

use aigw_core::models::scope::ScopeInfo;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

/// Creates an empty selected-scope store.
pub fn selected_scope() -> (SelectedScope, ScopeSelector) {
    let (tx, rx) = watch::channel(None);
    (
        SelectedScope { rx },
        ScopeSelector { tx: Arc::new(tx) },
    )
}

/// Read handle on the selected scope.
#[derive(Debug, Clone)]
pub struct SelectedScope {
    rx: watch::Receiver<Option<ScopeInfo>>,
}

impl SelectedScope {
    pub fn current(&self) -> Option<ScopeInfo> {
        self.rx.borrow().clone()
    }

    /// A receiver that reports the current value as unseen, so a late
    /// subscriber observes it on its first `changed()`.
    pub fn subscribe(&self) -> watch::Receiver<Option<ScopeInfo>> {
        let mut rx = self.rx.clone();
        rx.mark_changed();
        rx
    }

    /// Stream of the current value followed by every change. Ends only when
    /// every [`ScopeSelector`] is dropped.
    pub fn changes(&self) -> WatchStream<Option<ScopeInfo>> {
        WatchStream::new(self.rx.clone())
    }
}

/// Write capability on the selected scope.
#[derive(Debug, Clone)]
pub struct ScopeSelector {
    tx: Arc<watch::Sender<Option<ScopeInfo>>>,
}

impl ScopeSelector {
    /// Replaces the selected scope. Returns `false` and notifies nobody when
    /// `scope` equals the current value.
    pub fn set(&self, scope: Option<ScopeInfo>) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == scope {
                return false;
            }
            *current = scope;
            true
        });
        if changed {
            let key = self.tx.borrow().as_ref().map(ScopeInfo::key);
            debug!(scope = ?key, "Selected scope changed");
        }
        changed
    }

    pub fn current(&self) -> Option<ScopeInfo> {
        self.tx.borrow().clone()
    }

    /// A fresh read handle on the same store.
    pub fn reader(&self) -> SelectedScope {
        SelectedScope {
            rx: self.tx.subscribe(),
        }
    }
}

/// Parses a `type:id` URL token. Malformed tokens and unknown scope types
/// are logged and yield `None`.
pub fn restore_scope_from_url(param: &str) -> Option<ScopeInfo> {
    match param.parse::<ScopeInfo>() {
        Ok(scope) => Some(scope),
        Err(e) => {
            warn!(param, error = %e, "Ignoring malformed scope in URL");
            None
        }
    }
}

/// Renders a scope as the `type/id` path fragment of admin routes.
pub fn scope_to_url_param(scope: &ScopeInfo) -> String {
    format!("{}/{}", scope.scope_type, scope.scope_id)
}

#[cfg(test)]
mod tests {
    use aigw_core::models::scope::ScopeType;
    use tokio_stream::StreamExt;

    use super::*;

    #[test]
    fn restore_valid_token() {
        assert_eq!(
            restore_scope_from_url("division:div1"),
            Some(ScopeInfo::division("div1"))
        );
        assert_eq!(
            restore_scope_from_url("Organization:org1"),
            Some(ScopeInfo::organization("org1"))
        );
    }

    #[test]
    fn restore_rejects_malformed_tokens() {
        assert_eq!(restore_scope_from_url("bogus"), None);
        assert_eq!(restore_scope_from_url("planet:earth"), None);
        assert_eq!(restore_scope_from_url("division:"), None);
        assert_eq!(restore_scope_from_url(""), None);
    }

    #[test]
    fn url_param_uses_slash() {
        let scope = ScopeInfo::new(ScopeType::Team, "t-1");
        assert_eq!(scope_to_url_param(&scope), "team/t-1");
    }

    #[test]
    fn starts_empty() {
        let (scope, selector) = selected_scope();
        assert_eq!(scope.current(), None);
        assert_eq!(selector.current(), None);
    }

    #[test]
    fn equal_set_notifies_once() {
        let (scope, selector) = selected_scope();
        let mut rx = scope.subscribe();
        rx.borrow_and_update();

        assert!(selector.set(Some(ScopeInfo::division("div1"))));
        assert!(!selector.set(Some(ScopeInfo::division("div1"))));

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Some(ScopeInfo::division("div1")));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn clearing_notifies() {
        let (scope, selector) = selected_scope();
        selector.set(Some(ScopeInfo::organization("org1")));

        let mut rx = scope.subscribe();
        rx.borrow_and_update();
        assert!(selector.set(None));
        assert!(rx.has_changed().unwrap());
        assert_eq!(scope.current(), None);
        // Clearing an empty store is a no-op.
        assert!(!selector.set(None));
    }

    #[test]
    fn late_subscriber_sees_current_value() {
        let (scope, selector) = selected_scope();
        selector.set(Some(ScopeInfo::organization("org1")));

        let rx = scope.subscribe();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow(), Some(ScopeInfo::organization("org1")));
        assert_eq!(selector.reader().current(), Some(ScopeInfo::organization("org1")));
    }

    #[tokio::test]
    async fn change_stream_replays_latest() {
        let (scope, selector) = selected_scope();
        selector.set(Some(ScopeInfo::organization("org1")));

        let mut changes = scope.changes();
        assert_eq!(
            changes.next().await,
            Some(Some(ScopeInfo::organization("org1")))
        );

        selector.set(Some(ScopeInfo::division("div1")));
        assert_eq!(changes.next().await, Some(Some(ScopeInfo::division("div1"))));
    }
}

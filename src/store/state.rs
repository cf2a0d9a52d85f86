//! Tagged result state for cached content.
//!
//! Consumers must render distinct UI per state (spinner, content,
//! empty-state). `Empty` and `Failed` are deliberately separate variants —
//! most pages render them the same, but diagnostics and tests need to tell
//! "nothing configured" from "fetch broke".

use serde::Serialize;

use crate::error::ContentError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum ContentState<T> {
    /// No data yet; a fetch is (or is about to be) in flight.
    Loading,
    Loaded(T),
    /// The studio has no matching content.
    Empty,
    /// The fetch failed; the reason is for logs, not for rendering.
    Failed(String),
}

impl<T> ContentState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ContentState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ContentState::Loaded(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ContentState::Empty)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ContentState::Failed(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ContentState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            ContentState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

/// Map a singleton fetch outcome into a state.
pub(crate) fn singleton_state<T>(result: Result<Option<T>, ContentError>) -> ContentState<T> {
    match result {
        Ok(Some(value)) => ContentState::Loaded(value),
        Ok(None) => ContentState::Empty,
        Err(e) => {
            log::warn!("content fetch failed: {e}");
            ContentState::Failed(e.reason())
        }
    }
}

/// Map a collection fetch outcome into a state. An empty list is `Empty`,
/// not `Loaded(vec![])` — pages branch on "anything to show" exactly once.
pub(crate) fn collection_state<T>(result: Result<Vec<T>, ContentError>) -> ContentState<Vec<T>> {
    match result {
        Ok(items) if items.is_empty() => ContentState::Empty,
        Ok(items) => ContentState::Loaded(items),
        Err(e) => {
            log::warn!("content fetch failed: {e}");
            ContentState::Failed(e.reason())
        }
    }
}

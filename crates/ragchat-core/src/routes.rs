//! Client-side view routes.
//!
//! Three top-level views, each addressed by a single fixed path. There are
//! no parameters, guards, nested routes, or redirects.

use serde::{Deserialize, Serialize};

/// A named application view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Chat,
    Upload,
    History,
}

impl Route {
    /// Route table in declaration order.
    pub const ALL: [Route; 3] = [Route::Chat, Route::Upload, Route::History];

    /// Path the view is mounted at.
    pub fn path(self) -> &'static str {
        match self {
            Self::Chat => "/",
            Self::Upload => "/upload",
            Self::History => "/history",
        }
    }

    /// View name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Chat => "Chat",
            Self::Upload => "Upload",
            Self::History => "History",
        }
    }

    /// Resolve a browser location path to a view.
    ///
    /// Matching follows history-mode routing: the query string and fragment
    /// are ignored, a single trailing slash is tolerated, and comparison is
    /// case-insensitive. Unknown paths resolve to `None`.
    pub fn resolve(location: &str) -> Option<Self> {
        let end = location.find(['?', '#']).unwrap_or(location.len());
        let path = &location[..end];
        if !path.starts_with('/') {
            return None;
        }

        let path = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() && !stripped.ends_with('/') => stripped,
            _ => path,
        };

        Self::ALL
            .into_iter()
            .find(|route| route.path().eq_ignore_ascii_case(path))
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Route {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|route| route.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::InvalidInput(format!("unknown view: {}", s)))
    }
}

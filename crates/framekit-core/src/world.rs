//! Isolated world settings.
//!
//! World 0 is the page's main world. Any other id names an isolated world
//! whose origin, CSP and display name the embedder may configure.

use url::{Origin, Url};

/// Identifier of a script world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldId(i32);

impl WorldId {
    /// The page's own world.
    pub const MAIN: WorldId = WorldId(0);

    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> i32 {
        self.0
    }

    pub fn is_main(&self) -> bool {
        *self == Self::MAIN
    }
}

/// Per-frame settings of one isolated world.
#[derive(Debug, Clone, Default)]
pub struct IsolatedWorldInfo {
    pub security_origin: Option<Origin>,
    pub content_security_policy: Option<String>,
    pub human_readable_name: Option<String>,
}

impl IsolatedWorldInfo {
    /// Parse an origin string; anything unparseable becomes an opaque origin.
    pub fn parse_origin(origin_url: &str) -> Origin {
        Url::parse(origin_url)
            .map(|url| url.origin())
            .unwrap_or_else(|_| Origin::new_opaque())
    }
}

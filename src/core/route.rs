//! Fragment based navigation

use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    Currencies,
    Reports,
    About,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown route: {0}")]
pub struct UnknownRoute(pub String);

impl Route {
    pub const ALL: [Route; 3] = [Route::Currencies, Route::Reports, Route::About];

    /// Resolves a location fragment such as `#reports`. An empty fragment
    /// is the default route; anything unrecognized resolves to `None`.
    pub fn from_fragment(fragment: &str) -> Option<Self> {
        let name = fragment.trim();
        let name = name.strip_prefix('#').unwrap_or(name);
        match name.to_ascii_lowercase().as_str() {
            "" | "currencies" => Some(Route::Currencies),
            "reports" => Some(Route::Reports),
            "about" => Some(Route::About),
            _ => None,
        }
    }

    pub fn fragment(&self) -> &'static str {
        match self {
            Route::Currencies => "#currencies",
            Route::Reports => "#reports",
            Route::About => "#about",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Currencies => "Currencies",
            Route::Reports => "Reports",
            Route::About => "About",
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fragment())
    }
}

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::from_fragment(s).ok_or_else(|| UnknownRoute(s.to_string()))
    }
}

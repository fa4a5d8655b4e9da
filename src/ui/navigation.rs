//! Routes, the key-to-route table and a stack router

use super::icons::{images, Glyph, IconName, IconResolver};
use efishpond_types::MetricKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A screen the dashboard can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    #[default]
    Home,
    PhDetail,
    TemperatureDetail,
    OxygenDetail,
    FeederDetail,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Home,
        Route::PhDetail,
        Route::TemperatureDetail,
        Route::OxygenDetail,
        Route::FeederDetail,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::PhDetail => "/ph-detail",
            Route::TemperatureDetail => "/temperature-detail",
            Route::OxygenDetail => "/oxygen-detail",
            Route::FeederDetail => "/feeder-detail",
        }
    }

    /// The metric a detail route shows; `None` for the summary
    pub fn metric(self) -> Option<MetricKey> {
        match self {
            Route::Home => None,
            Route::PhDetail => Some(MetricKey::Ph),
            Route::TemperatureDetail => Some(MetricKey::Temperature),
            Route::OxygenDetail => Some(MetricKey::DissolvedOxygen),
            Route::FeederDetail => Some(MetricKey::Feeder),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim_start_matches('/');
        match name {
            "" | "home" | "index" => Ok(Route::Home),
            "ph-detail" | "ph" => Ok(Route::PhDetail),
            "temperature-detail" | "temperature" => Ok(Route::TemperatureDetail),
            "oxygen-detail" | "oxygen" => Ok(Route::OxygenDetail),
            "feeder-detail" | "feeder" => Ok(Route::FeederDetail),
            other => Err(format!("Unknown screen: {}", other)),
        }
    }
}

/// Detail screen for a metric. Every key has exactly one.
pub fn detail_route(key: MetricKey) -> Route {
    match key {
        MetricKey::Ph => Route::PhDetail,
        MetricKey::Temperature => Route::TemperatureDetail,
        MetricKey::DissolvedOxygen => Route::OxygenDetail,
        MetricKey::Feeder => Route::FeederDetail,
    }
}

/// Navigation surface used by screens
pub trait Router {
    /// Show `route` on top of the current screen
    fn push(&mut self, route: Route);

    /// Return to the previous screen. False if already at the root.
    fn back(&mut self) -> bool;

    /// The screen currently shown
    fn current(&self) -> Route;
}

/// History-stack router rooted at [`Route::Home`]
#[derive(Debug, Clone)]
pub struct StackRouter {
    stack: Vec<Route>,
}

impl StackRouter {
    pub fn new() -> Self {
        Self {
            stack: vec![Route::Home],
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for StackRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Router for StackRouter {
    fn push(&mut self, route: Route) {
        log::debug!("Navigate {} -> {}", self.current(), route);
        self.stack.push(route);
    }

    fn back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        true
    }

    fn current(&self) -> Route {
        self.stack.last().copied().unwrap_or_default()
    }
}

/// One entry of the bottom tab bar
#[derive(Debug, Clone, PartialEq)]
pub struct TabEntry {
    pub route: Route,
    pub title: &'static str,
    pub icon: Glyph,
}

/// The tab bar, in display order
pub fn tabs(icons: &IconResolver) -> Vec<TabEntry> {
    vec![
        TabEntry {
            route: Route::Home,
            title: "Home",
            icon: icons.symbol(IconName::HouseFill),
        },
        TabEntry {
            route: Route::PhDetail,
            title: "pH Level",
            icon: Glyph::Raster(images::PH_OPTIMAL),
        },
        TabEntry {
            route: Route::TemperatureDetail,
            title: "Temperature",
            icon: Glyph::Raster(images::TEMP_UP),
        },
        TabEntry {
            route: Route::OxygenDetail,
            title: "Oxygen",
            icon: Glyph::Raster(images::O2_OPTIMAL),
        },
        TabEntry {
            route: Route::FeederDetail,
            title: "Feeder",
            icon: Glyph::Raster(images::FISH_FEEDER),
        },
    ]
}

//! Dashboard presentation: icons, routes, rows and screens

pub mod icons;
mod navigation;
mod presentation;
pub mod screens;
pub mod text_renderer;

pub use icons::{icons, Glyph, IconName, IconResolver};
pub use navigation::{detail_route, tabs, Route, Router, StackRouter, TabEntry};
pub use presentation::{build_rows, detail_value, display_value, feeder_sub_label, MetricRow};
pub use screens::{mount, DetailCard, DetailScreen, Screen, ScreenSettings, ScreenView, SummaryScreen};

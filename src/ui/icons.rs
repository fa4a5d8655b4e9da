//! Icon resolution
//!
//! Screens ask for icons by abstract name (SF Symbols style, e.g.
//! `water.drop.fill`) or by metric key. The resolver maps those to a concrete
//! glyph from one of two families: a symbol in a vector icon font, or a fixed
//! raster image. Callers render a [`Glyph`] without caring which family it
//! came from.

use efishpond_types::MetricKey;
use log::warn;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Vector icon font a symbol belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconFamily {
    Material,
    FontAwesome5,
    FontAwesome6,
}

impl IconFamily {
    pub fn id(self) -> &'static str {
        match self {
            IconFamily::Material => "material",
            IconFamily::FontAwesome5 => "fontawesome5",
            IconFamily::FontAwesome6 => "fontawesome6",
        }
    }
}

/// A named symbol in a vector icon font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolGlyph {
    pub family: IconFamily,
    pub name: &'static str,
}

/// A bundled raster image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterGlyph {
    pub asset: &'static str,
}

impl RasterGlyph {
    pub const fn new(asset: &'static str) -> Self {
        Self { asset }
    }
}

/// Symbol shown when a requested name has no mapping
pub const FALLBACK_SYMBOL: SymbolGlyph = SymbolGlyph {
    family: IconFamily::Material,
    name: "help",
};

/// A renderable icon
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Glyph {
    Symbol(SymbolGlyph),
    Raster(RasterGlyph),
    /// No mapping for `requested`; rendered as [`FALLBACK_SYMBOL`]
    Fallback { requested: String },
}

impl Glyph {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Glyph::Fallback { .. })
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Glyph::Symbol(symbol) => write!(f, "[{}:{}]", symbol.family.id(), symbol.name),
            Glyph::Raster(raster) => write!(f, "[img:{}]", raster.asset),
            Glyph::Fallback { .. } => {
                write!(f, "[{}:{}]", FALLBACK_SYMBOL.family.id(), FALLBACK_SYMBOL.name)
            }
        }
    }
}

/// Every abstract symbol name the dashboard knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconName {
    HouseFill,
    PaperplaneFill,
    ChevronLeftForwardslashChevronRight,
    ChevronRight,
    ChevronLeft,
    WaterDropFill,
    TemperatureLowFill,
    OxygenFill,
    FishFill,
}

impl IconName {
    pub const ALL: [IconName; 9] = [
        IconName::HouseFill,
        IconName::PaperplaneFill,
        IconName::ChevronLeftForwardslashChevronRight,
        IconName::ChevronRight,
        IconName::ChevronLeft,
        IconName::WaterDropFill,
        IconName::TemperatureLowFill,
        IconName::OxygenFill,
        IconName::FishFill,
    ];

    /// The abstract (SF Symbols) name
    pub fn as_str(self) -> &'static str {
        match self {
            IconName::HouseFill => "house.fill",
            IconName::PaperplaneFill => "paperplane.fill",
            IconName::ChevronLeftForwardslashChevronRight => "chevron.left.forwardslash.chevron.right",
            IconName::ChevronRight => "chevron.right",
            IconName::ChevronLeft => "chevron.left",
            IconName::WaterDropFill => "water.drop.fill",
            IconName::TemperatureLowFill => "temperature.low.fill",
            IconName::OxygenFill => "oxygen.fill",
            IconName::FishFill => "fish.fill",
        }
    }

    /// Concrete symbol for this name
    pub fn symbol(self) -> SymbolGlyph {
        let (family, name) = match self {
            IconName::HouseFill => (IconFamily::Material, "home"),
            IconName::PaperplaneFill => (IconFamily::Material, "send"),
            IconName::ChevronLeftForwardslashChevronRight => (IconFamily::Material, "code"),
            IconName::ChevronRight => (IconFamily::Material, "chevron-right"),
            IconName::ChevronLeft => (IconFamily::Material, "chevron-left"),
            IconName::WaterDropFill => (IconFamily::Material, "water-drop"),
            IconName::TemperatureLowFill => (IconFamily::FontAwesome5, "temperature-low"),
            IconName::OxygenFill => (IconFamily::FontAwesome6, "arrow-up-from-water-pump"),
            IconName::FishFill => (IconFamily::FontAwesome5, "fish"),
        };
        SymbolGlyph { family, name }
    }
}

/// Raster images bundled with the dashboard
pub mod images {
    use super::RasterGlyph;

    pub const PH_OPTIMAL: RasterGlyph = RasterGlyph::new("images/ph-optimal.png");
    pub const TEMP_OPTIMAL: RasterGlyph = RasterGlyph::new("images/temp-optimal.png");
    pub const TEMP_UP: RasterGlyph = RasterGlyph::new("images/temp-up.png");
    pub const O2_OPTIMAL: RasterGlyph = RasterGlyph::new("images/o2-optimal.png");
    pub const FISH_FEEDER: RasterGlyph = RasterGlyph::new("images/fish-feeder.png");
}

/// One binding of an abstract name to a glyph source
#[derive(Debug, Clone, PartialEq)]
pub struct IconMappingEntry {
    pub abstract_name: &'static str,
    pub glyph: Glyph,
}

fn mapping_table() -> Vec<IconMappingEntry> {
    let symbols = IconName::ALL.into_iter().map(|name| IconMappingEntry {
        abstract_name: name.as_str(),
        glyph: Glyph::Symbol(name.symbol()),
    });
    let rasters = [
        ("ph-optimal", images::PH_OPTIMAL),
        ("temp-optimal", images::TEMP_OPTIMAL),
        ("temp-up", images::TEMP_UP),
        ("o2-optimal", images::O2_OPTIMAL),
        ("fish-feeder", images::FISH_FEEDER),
    ]
    .into_iter()
    .map(|(abstract_name, raster)| IconMappingEntry {
        abstract_name,
        glyph: Glyph::Raster(raster),
    });
    symbols.chain(rasters).collect()
}

/// Resolves abstract icon names against the static mapping table
pub struct IconResolver {
    table: HashMap<&'static str, Glyph>,
}

static ICONS: Lazy<IconResolver> = Lazy::new(IconResolver::new);

/// The process-wide resolver, built on first use
pub fn icons() -> &'static IconResolver {
    &ICONS
}

impl IconResolver {
    pub fn new() -> Self {
        Self::from_entries(mapping_table())
    }

    pub fn from_entries(entries: impl IntoIterator<Item = IconMappingEntry>) -> Self {
        Self {
            table: entries
                .into_iter()
                .map(|entry| (entry.abstract_name, entry.glyph))
                .collect(),
        }
    }

    /// Resolve an abstract name, falling back to the help symbol
    pub fn resolve(&self, name: &str) -> Glyph {
        match self.table.get(name) {
            Some(glyph) => glyph.clone(),
            None => {
                warn!("Icon mapping not found for: {}", name);
                Glyph::Fallback {
                    requested: name.to_string(),
                }
            }
        }
    }

    /// Resolve with an explicit image override
    ///
    /// A caller-supplied image always wins over the name. With neither, there
    /// is nothing to draw.
    pub fn resolve_with_image(&self, name: Option<&str>, image: Option<RasterGlyph>) -> Option<Glyph> {
        match (image, name) {
            (Some(image), _) => Some(Glyph::Raster(image)),
            (None, Some(name)) => Some(self.resolve(name)),
            (None, None) => None,
        }
    }

    /// Symbol for a known name; never falls back
    pub fn symbol(&self, name: IconName) -> Glyph {
        Glyph::Symbol(name.symbol())
    }

    /// Row and card image for a metric
    pub fn metric_image(&self, key: MetricKey) -> Glyph {
        Glyph::Raster(match key {
            MetricKey::Ph => images::PH_OPTIMAL,
            MetricKey::Temperature => images::TEMP_OPTIMAL,
            MetricKey::DissolvedOxygen => images::O2_OPTIMAL,
            MetricKey::Feeder => images::FISH_FEEDER,
        })
    }

    /// Symbolic alternative to [`metric_image`](Self::metric_image)
    pub fn metric_symbol(&self, key: MetricKey) -> Glyph {
        self.symbol(match key {
            MetricKey::Ph => IconName::WaterDropFill,
            MetricKey::Temperature => IconName::TemperatureLowFill,
            MetricKey::DissolvedOxygen => IconName::OxygenFill,
            MetricKey::Feeder => IconName::FishFill,
        })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for IconResolver {
    fn default() -> Self {
        Self::new()
    }
}

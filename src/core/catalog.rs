//! Asset catalog for the flywheel
//!
//! Assets are resolved into roles once, at load time:
//! - Index: the decorative center token
//! - Driver: the power source at the top of the ring, wired to the center by the beam
//! - Satellite: everything else, laid out around the orbit in catalog order

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Reserved ticker of the index asset
pub const INDEX_TICKER: &str = "$thewclstrat";
/// Reserved ticker of the driver asset
pub const DRIVER_TICKER: &str = "WCLUBBIGGS";

pub const DEFAULT_INDEX_COLOR: &str = "#FFFFFF";
pub const DEFAULT_DRIVER_COLOR: &str = "#39FF14";
pub const DEFAULT_SATELLITE_COLOR: &str = "#888888";
pub const DEFAULT_DESCRIPTION: &str = "Key ecosystem component.";

/// Role of an asset in the flywheel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRole {
    Index,
    Driver,
    Satellite,
}

impl AssetRole {
    pub fn default_color(self) -> &'static str {
        match self {
            AssetRole::Index => DEFAULT_INDEX_COLOR,
            AssetRole::Driver => DEFAULT_DRIVER_COLOR,
            AssetRole::Satellite => DEFAULT_SATELLITE_COLOR,
        }
    }
}

/// A catalog record as supplied by the data layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub ticker: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_core: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Explicit role tag; wins over reserved tickers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AssetRole>,
}

impl Asset {
    pub fn new(ticker: &str, name: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            name: name.to_string(),
            color: None,
            is_core: false,
            description: None,
            role: None,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_role(mut self, role: AssetRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn core(mut self) -> Self {
        self.is_core = true;
        self
    }

    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)
    }
}

/// Errors raised while loading a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog needs at least 2 assets (index and driver), got {0}")]
    TooFewAssets(usize),

    #[error("Duplicate ticker in catalog: {0}")]
    DuplicateTicker(String),
}

/// An asset with its resolved role and RGB color
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogEntry {
    pub asset: Asset,
    pub role: AssetRole,
    pub rgb: [u8; 3],
}

/// Immutable, role-resolved asset list
#[derive(Clone, Debug)]
pub struct AssetCatalog {
    entries: Vec<CatalogEntry>,
    index: usize,
    driver: usize,
}

impl AssetCatalog {
    /// Resolve roles for an ordered asset list.
    ///
    /// Explicit `role` tags win, then reserved tickers. A role still missing
    /// after both passes falls back to the first asset not holding the other.
    pub fn resolve(assets: Vec<Asset>) -> Result<Self, CatalogError> {
        if assets.len() < 2 {
            return Err(CatalogError::TooFewAssets(assets.len()));
        }

        let mut seen = HashSet::with_capacity(assets.len());
        for asset in &assets {
            if !seen.insert(asset.ticker.as_str()) {
                return Err(CatalogError::DuplicateTicker(asset.ticker.clone()));
            }
        }

        let tagged = |role: AssetRole| assets.iter().position(|a| a.role == Some(role));
        let reserved = |ticker: &str, skip: Option<usize>| {
            assets
                .iter()
                .enumerate()
                .position(|(i, a)| Some(i) != skip && a.role.is_none() && a.ticker == ticker)
        };

        // Both roles are claimed by tag or ticker before any positional fallback
        let found_index = tagged(AssetRole::Index).or_else(|| reserved(INDEX_TICKER, None));
        let found_driver = tagged(AssetRole::Driver).or_else(|| reserved(DRIVER_TICKER, found_index));

        let index = match found_index {
            Some(i) => i,
            None => {
                let fallback = first_other(found_driver);
                warn!(ticker = %assets[fallback].ticker, "No index asset found, using first remaining asset");
                fallback
            }
        };
        let driver = match found_driver {
            Some(i) if i != index => i,
            _ => {
                let fallback = first_other(Some(index));
                warn!(ticker = %assets[fallback].ticker, "No driver asset found, using next remaining asset");
                fallback
            }
        };

        let entries: Vec<CatalogEntry> = assets
            .into_iter()
            .enumerate()
            .map(|(i, asset)| {
                let role = if i == index {
                    AssetRole::Index
                } else if i == driver {
                    AssetRole::Driver
                } else {
                    AssetRole::Satellite
                };
                let rgb = resolve_color(&asset, role);
                CatalogEntry { asset, role, rgb }
            })
            .collect();

        debug!(
            assets = entries.len(),
            index = %entries[index].asset.ticker,
            driver = %entries[driver].asset.ticker,
            "Catalog resolved"
        );

        Ok(Self { entries, index, driver })
    }

    /// Parse a JSON array of asset records
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let assets: Vec<Asset> = serde_json::from_str(json)?;
        Self::resolve(assets)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entry(&self, idx: usize) -> Option<&CatalogEntry> {
        self.entries.get(idx)
    }

    pub fn index(&self) -> &CatalogEntry {
        &self.entries[self.index]
    }

    pub fn driver(&self) -> &CatalogEntry {
        &self.entries[self.driver]
    }

    /// Catalog positions of the satellites, in catalog order
    pub fn satellite_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.role == AssetRole::Satellite)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn satellites(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.role == AssetRole::Satellite)
    }

    pub fn lookup(&self, ticker: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.asset.ticker == ticker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AssetCatalog {
    fn default() -> Self {
        // Table order: index, driver, then satellites
        let entries = DEFAULT_ASSETS
            .iter()
            .enumerate()
            .map(|(i, &(ticker, name, color, description))| {
                let role = match i {
                    0 => AssetRole::Index,
                    1 => AssetRole::Driver,
                    _ => AssetRole::Satellite,
                };
                let mut asset = Asset::new(ticker, name)
                    .with_color(color)
                    .with_description(description);
                if role != AssetRole::Satellite {
                    asset = asset.core();
                }
                let rgb = resolve_color(&asset, role);
                CatalogEntry { asset, role, rgb }
            })
            .collect();

        Self { entries, index: 0, driver: 1 }
    }
}

/// Built-in ecosystem: (ticker, name, color, description)
const DEFAULT_ASSETS: &[(&str, &str, &str, &str)] = &[
    (INDEX_TICKER, "$thewclstrat Index", "#FFFFFF", "The central index fund token representing the entire ecosystem."),
    (DRIVER_TICKER, "The W Club Biggs", "#39FF14", "Core utility token driving rewards and governing the index."),
    ("LINK", "Chainlink", "#2A5ADA", "Decentralized oracle network connecting smart contracts to real-world data."),
    ("BTC", "Bitcoin", "#F7931A", "The original decentralized cryptocurrency and digital store of value."),
    ("ETH", "Ethereum", "#627EEA", "The leading programmable blockchain and smart contract platform."),
    ("SOL", "Solana", "#14F195", "High-performance blockchain optimizing for speed and low costs."),
    ("XRP", "XRP", "#1BA4C8", "Digital asset built for global payments and liquidity."),
    ("MORPHO", "Morpho", "#00C8AA", "Decentralized lending protocol optimizing yields via P2P matching."),
    ("VIRTUAL", "Virtuals", "#4ADE80", "Protocol for co-owning and interacting with AI agents."),
    ("BANKR", "Bankr Coin", "#22C55E", "Decentralized banking and yield aggregator protocol."),
    ("DRB", "DebtReliefBot", "#FF3366", "Automated debt management and relief execution bot."),
    ("$I", "Indexy", "#6366F1", "Automated crypto index fund management protocol."),
    ("CLANKER", "Clanker", "#EAB308", "AI-driven trading and arbitrage bot."),
    ("ZORA", "Zora", "#00BFFF", "Protocol and marketplace for creating and trading NFTs."),
    ("$QR", "QR Coin", "#D946EF", "Contract: 0x2b5050F01d64FBb3e4Ac44dc07f0732BFb5ecadF"),
];

fn resolve_color(asset: &Asset, role: AssetRole) -> [u8; 3] {
    let parsed = asset.color.as_deref().and_then(|c| {
        let rgb = parse_hex_color(c);
        if rgb.is_none() {
            warn!(ticker = %asset.ticker, color = c, "Unparseable color, using role default");
        }
        rgb
    });
    parsed
        .or_else(|| parse_hex_color(role.default_color()))
        .unwrap_or([136, 136, 136])
}

/// First position other than `taken`. Callers guarantee at least two assets.
fn first_other(taken: Option<usize>) -> usize {
    if taken == Some(0) {
        1
    } else {
        0
    }
}

/// Parse `#RGB` or `#RRGGBB` (leading `#` optional, case-insensitive)
pub fn parse_hex_color(s: &str) -> Option<[u8; 3]> {
    let hex = s.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 16 + v;
            }
            Some(rgb)
        }
        6 => {
            let mut rgb = [0u8; 3];
            for (i, slot) in rgb.iter_mut().enumerate() {
                *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
            }
            Some(rgb)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_roles() {
        let catalog = AssetCatalog::default();
        assert_eq!(catalog.len(), 15);
        assert_eq!(catalog.index().asset.ticker, INDEX_TICKER);
        assert_eq!(catalog.driver().asset.ticker, DRIVER_TICKER);
        assert_eq!(catalog.satellites().count(), 13);

        let tickers: Vec<&str> = catalog.satellites().map(|e| e.asset.ticker.as_str()).collect();
        assert_eq!(tickers.first(), Some(&"LINK"));
        assert_eq!(tickers.last(), Some(&"$QR"));
        assert_eq!(catalog.lookup("BTC").map(|e| e.rgb), Some([0xF7, 0x93, 0x1A]));
    }

    #[test]
    fn test_from_json_camel_case() {
        let json = r##"[
            {"ticker": "$thewclstrat", "name": "Index", "isCore": true},
            {"ticker": "WCLUBBIGGS", "name": "Driver", "isCore": true},
            {"ticker": "ETH", "name": "Ethereum", "color": "#627EEA", "description": "L1"}
        ]"##;
        let catalog = AssetCatalog::from_json(json).expect("valid catalog");
        assert!(catalog.index().asset.is_core);
        assert_eq!(catalog.driver().rgb, [0x39, 0xFF, 0x14]);
        let eth = catalog.lookup("ETH").expect("eth present");
        assert_eq!(eth.role, AssetRole::Satellite);
        assert_eq!(eth.asset.description_or_default(), "L1");
    }

    #[test]
    fn test_explicit_role_wins_over_ticker() {
        let assets = vec![
            Asset::new(INDEX_TICKER, "Old index"),
            Asset::new("HUB", "Hub").with_role(AssetRole::Index),
            Asset::new("PWR", "Power").with_role(AssetRole::Driver),
            Asset::new(DRIVER_TICKER, "Old driver"),
        ];
        let catalog = AssetCatalog::resolve(assets).expect("valid catalog");
        assert_eq!(catalog.index().asset.ticker, "HUB");
        assert_eq!(catalog.driver().asset.ticker, "PWR");
        assert_eq!(catalog.satellite_indices(), vec![0, 3]);
    }

    #[test]
    fn test_positional_fallback() {
        let assets = vec![
            Asset::new("A", "a"),
            Asset::new("B", "b"),
            Asset::new("C", "c"),
        ];
        let catalog = AssetCatalog::resolve(assets).expect("valid catalog");
        assert_eq!(catalog.index().asset.ticker, "A");
        assert_eq!(catalog.driver().asset.ticker, "B");
        assert_eq!(catalog.satellite_indices(), vec![2]);
    }

    #[test]
    fn test_fallback_driver_skips_found_index() {
        let assets = vec![
            Asset::new("A", "a"),
            Asset::new(INDEX_TICKER, "index"),
            Asset::new("C", "c"),
        ];
        let catalog = AssetCatalog::resolve(assets).expect("valid catalog");
        assert_eq!(catalog.index().asset.ticker, INDEX_TICKER);
        assert_eq!(catalog.driver().asset.ticker, "A");
    }

    #[test]
    fn test_fallback_keeps_tagged_driver() {
        let assets = vec![
            Asset::new("P", "p").with_role(AssetRole::Driver),
            Asset::new("A", "a"),
            Asset::new("B", "b"),
        ];
        let catalog = AssetCatalog::resolve(assets).expect("valid catalog");
        assert_eq!(catalog.driver().asset.ticker, "P");
        assert_eq!(catalog.index().asset.ticker, "A");
        assert_eq!(catalog.satellite_indices(), vec![2]);
    }

    #[test]
    fn test_fallback_keeps_reserved_driver() {
        let assets = vec![
            Asset::new(DRIVER_TICKER, "d"),
            Asset::new("A", "a"),
            Asset::new("B", "b"),
        ];
        let catalog = AssetCatalog::resolve(assets).expect("valid catalog");
        assert_eq!(catalog.driver().asset.ticker, DRIVER_TICKER);
        assert_eq!(catalog.index().asset.ticker, "A");
        assert_eq!(catalog.satellite_indices(), vec![2]);
    }

    #[test]
    fn test_index_and_driver_only() {
        let assets = vec![Asset::new(INDEX_TICKER, "i"), Asset::new(DRIVER_TICKER, "d")];
        let catalog = AssetCatalog::resolve(assets).expect("valid catalog");
        assert_eq!(catalog.satellites().count(), 0);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(
            AssetCatalog::resolve(vec![Asset::new("A", "a")]),
            Err(CatalogError::TooFewAssets(1))
        ));
        assert!(matches!(
            AssetCatalog::resolve(vec![Asset::new("A", "a"), Asset::new("A", "b")]),
            Err(CatalogError::DuplicateTicker(t)) if t == "A"
        ));
        assert!(matches!(AssetCatalog::from_json("{"), Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_color_defaults() {
        let assets = vec![
            Asset::new(INDEX_TICKER, "i"),
            Asset::new(DRIVER_TICKER, "d"),
            Asset::new("X", "x"),
            Asset::new("Y", "y").with_color("not-a-color"),
        ];
        let catalog = AssetCatalog::resolve(assets).expect("valid catalog");
        assert_eq!(catalog.index().rgb, [255, 255, 255]);
        assert_eq!(catalog.driver().rgb, [0x39, 0xFF, 0x14]);
        assert_eq!(catalog.lookup("X").map(|e| e.rgb), Some([0x88, 0x88, 0x88]));
        assert_eq!(catalog.lookup("Y").map(|e| e.rgb), Some([0x88, 0x88, 0x88]));
        assert_eq!(catalog.lookup("X").map(|e| e.asset.description_or_default()), Some(DEFAULT_DESCRIPTION));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#39FF14"), Some([0x39, 0xFF, 0x14]));
        assert_eq!(parse_hex_color("39ff14"), Some([0x39, 0xFF, 0x14]));
        assert_eq!(parse_hex_color("#888"), Some([0x88, 0x88, 0x88]));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }
}

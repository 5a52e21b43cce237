//! Macro catalog for Macrolink.
//!
//! This crate defines:
//! - The serializable macro model (`MacroDef`, `ColorCategory`)
//! - The lookup tables the grid needs: macro name -> image, image -> macro
//!   name (inverse), and macro name -> colour category for cosmetic styling.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Canonical name of the first fixed slot.
pub const REINFORCE: &str = "Reinforce";
/// Canonical name of the second fixed slot.
pub const RESUPPLY: &str = "Resupply";

/// Icon of the `Reinforce` slot.
pub const REINFORCE_ICON: &str = "redeploy";
/// Icon of the `Resupply` slot.
pub const RESUPPLY_ICON: &str = "resupply";

/// The two macros every grid and every profile starts with, in order.
pub const FIXED_MACROS: [&str; 2] = [REINFORCE, RESUPPLY];

/// Returns true for the two fixed macro names (exact match).
pub fn is_fixed_macro(key: &str) -> bool {
    FIXED_MACROS.contains(&key)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ColorCategory {
    Red,
    Blue,
    Green,
    Yellow,
}

impl ColorCategory {
    /// CSS-style border colour name.
    pub fn border(self) -> &'static str {
        match self {
            ColorCategory::Red => "red",
            ColorCategory::Blue => "blue",
            ColorCategory::Green => "green",
            ColorCategory::Yellow => "yellow",
        }
    }
}

/// One triggerable macro.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MacroDef {
    /// Canonical action name sent to the backend (e.g. `EagleStrike`).
    pub key: String,
    /// Human-readable label; falls back to `key` when empty.
    #[serde(default)]
    pub label: String,
    /// Image file name, e.g. `eagle_strike.webp`. The icon id is the stem.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub color: Option<ColorCategory>,
}

impl MacroDef {
    /// Icon identifier: the image stem, or the lower-cased key when no image exists.
    pub fn icon(&self) -> String {
        match &self.image {
            Some(img) => image_stem(img).to_string(),
            None => self.key.to_lowercase(),
        }
    }

    pub fn label(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to parse macro catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate macro key in catalog: {0}")]
    DuplicateKey(String),
    #[error("duplicate icon in catalog: {0}")]
    DuplicateIcon(String),
    #[error("catalog is missing fixed macro {0}")]
    MissingFixed(&'static str),
    #[error("fixed macro {key} must use icon '{expected}', got '{found}'")]
    FixedIcon {
        key: &'static str,
        expected: &'static str,
        found: String,
    },
}

/// Static macro configuration plus the derived lookup tables.
#[derive(Debug, Clone)]
pub struct MacroCatalog {
    macros: Vec<MacroDef>,
    by_key: HashMap<String, usize>,
    by_icon: HashMap<String, usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<MacroDef>),
    Wrapped { macros: Vec<MacroDef> },
}

impl MacroCatalog {
    /// Builds a catalog, rejecting duplicate keys or icons. The fixed macros
    /// must keep their grid icons.
    pub fn new(macros: Vec<MacroDef>) -> Result<Self, CatalogError> {
        let mut by_key = HashMap::with_capacity(macros.len());
        let mut by_icon = HashMap::with_capacity(macros.len());

        for (idx, m) in macros.iter().enumerate() {
            if by_key.insert(m.key.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateKey(m.key.clone()));
            }
            let icon = m.icon();
            if by_icon.insert(icon.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateIcon(icon));
            }
        }

        for (fixed, expected) in [(REINFORCE, REINFORCE_ICON), (RESUPPLY, RESUPPLY_ICON)] {
            let Some(&idx) = by_key.get(fixed) else {
                return Err(CatalogError::MissingFixed(fixed));
            };
            let found = macros[idx].icon();
            if found != expected {
                return Err(CatalogError::FixedIcon {
                    key: fixed,
                    expected,
                    found,
                });
            }
        }

        Ok(Self {
            macros,
            by_key,
            by_icon,
        })
    }

    /// Parses a catalog override file.
    ///
    /// Supported JSON shapes:
    /// - `[{...}, {...}]`
    /// - `{ "macros": [{...}, {...}] }`
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let macros = match serde_json::from_str::<CatalogFile>(raw)? {
            CatalogFile::List(list) => list,
            CatalogFile::Wrapped { macros } => macros,
        };
        Self::new(macros)
    }

    /// The built-in stratagem table.
    pub fn builtin() -> Self {
        let macros = BUILTIN
            .iter()
            .map(|(key, label, image, color)| MacroDef {
                key: (*key).to_string(),
                label: (*label).to_string(),
                image: Some(format!("{image}.webp")),
                color: Some(*color),
            })
            .collect();
        // The built-in table is fixed at compile time and covered by tests.
        match Self::new(macros) {
            Ok(c) => c,
            Err(e) => unreachable!("built-in catalog is invalid: {e}"),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MacroDef> {
        self.by_key.get(key).map(|&i| &self.macros[i])
    }

    /// Icon identifier for a macro key; unknown keys fall back to the
    /// lower-cased key instead of failing.
    pub fn icon_for(&self, key: &str) -> String {
        self.get(key)
            .map(MacroDef::icon)
            .unwrap_or_else(|| key.to_lowercase())
    }

    /// Inverse lookup: icon identifier -> canonical macro key.
    pub fn key_for_icon(&self, icon: &str) -> Option<&str> {
        self.by_icon.get(icon).map(|&i| self.macros[i].key.as_str())
    }

    /// Macro key for an icon, falling back to the icon itself.
    pub fn resolve_icon(&self, icon: &str) -> String {
        self.key_for_icon(icon)
            .map(str::to_string)
            .unwrap_or_else(|| icon.to_string())
    }

    pub fn color(&self, key: &str) -> Option<ColorCategory> {
        self.get(key).and_then(|m| m.color)
    }

    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).map(MacroDef::label).unwrap_or(key)
    }

    /// All macros in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &MacroDef> {
        self.macros.iter()
    }

    /// Macros a user may place in dynamic slots.
    pub fn selectable(&self) -> impl Iterator<Item = &MacroDef> {
        self.macros.iter().filter(|m| !is_fixed_macro(&m.key))
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

impl Default for MacroCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Strips the extension from an image file name (`eagle_strike.webp` -> `eagle_strike`).
pub fn image_stem(image: &str) -> &str {
    match image.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => image,
    }
}

const BUILTIN: &[(&str, &str, &str, ColorCategory)] = &[
    // Mission
    (REINFORCE, "Reinforce", "redeploy", ColorCategory::Yellow),
    (RESUPPLY, "Resupply", "resupply", ColorCategory::Yellow),
    ("SOSBeacon", "SOS Beacon", "sos_beacon", ColorCategory::Yellow),
    ("Hellbomb", "Hellbomb", "hellbomb", ColorCategory::Yellow),
    ("UploadData", "Upload Data", "upload_data", ColorCategory::Yellow),
    // Offensive: eagle
    ("EagleStrike", "Eagle Airstrike", "eagle_strike", ColorCategory::Red),
    ("Eagle500kg", "Eagle 500kg Bomb", "eagle_500kg", ColorCategory::Red),
    ("EagleClusterBomb", "Eagle Cluster Bomb", "eagle_cluster_bomb", ColorCategory::Red),
    ("EagleNapalm", "Eagle Napalm Airstrike", "eagle_napalm", ColorCategory::Red),
    ("EagleStrafingRun", "Eagle Strafing Run", "eagle_strafing_run", ColorCategory::Red),
    ("EagleSmokeStrike", "Eagle Smoke Strike", "eagle_smoke_strike", ColorCategory::Red),
    ("Eagle110mmRockets", "Eagle 110mm Rocket Pods", "eagle_110mm_rockets", ColorCategory::Red),
    // Offensive: orbital
    ("OrbitalRailcannon", "Orbital Railcannon Strike", "orbital_railcannon", ColorCategory::Red),
    ("OrbitalLaser", "Orbital Laser", "orbital_laser", ColorCategory::Red),
    ("OrbitalPrecisionStrike", "Orbital Precision Strike", "orbital_precision_strike", ColorCategory::Red),
    ("Orbital380mmBarrage", "Orbital 380mm HE Barrage", "orbital_380mm_barrage", ColorCategory::Red),
    ("OrbitalGasStrike", "Orbital Gas Strike", "orbital_gas_strike", ColorCategory::Red),
    ("OrbitalAirburst", "Orbital Airburst Strike", "orbital_airburst", ColorCategory::Red),
    ("OrbitalEMS", "Orbital EMS Strike", "orbital_ems", ColorCategory::Red),
    // Supply
    ("MachineGun", "Machine Gun", "machine_gun", ColorCategory::Blue),
    ("AntiMaterielRifle", "Anti-Materiel Rifle", "anti_materiel_rifle", ColorCategory::Blue),
    ("Autocannon", "Autocannon", "autocannon", ColorCategory::Blue),
    ("Railgun", "Railgun", "railgun", ColorCategory::Blue),
    ("QuasarCannon", "Quasar Cannon", "quasar_cannon", ColorCategory::Blue),
    ("RecoillessRifle", "Recoilless Rifle", "recoilless_rifle", ColorCategory::Blue),
    ("Spear", "Spear", "spear", ColorCategory::Blue),
    ("GrenadeLauncher", "Grenade Launcher", "grenade_launcher", ColorCategory::Blue),
    ("Flamethrower", "Flamethrower", "flamethrower", ColorCategory::Blue),
    ("SupplyPack", "Supply Pack", "supply_pack", ColorCategory::Blue),
    ("JumpPack", "Jump Pack", "jump_pack", ColorCategory::Blue),
    ("GuardDogRover", "Guard Dog Rover", "guard_dog_rover", ColorCategory::Blue),
    // Defensive
    ("MachineGunSentry", "Machine Gun Sentry", "machine_gun_sentry", ColorCategory::Green),
    ("GatlingSentry", "Gatling Sentry", "gatling_sentry", ColorCategory::Green),
    ("AutocannonSentry", "Autocannon Sentry", "autocannon_sentry", ColorCategory::Green),
    ("RocketSentry", "Rocket Sentry", "rocket_sentry", ColorCategory::Green),
    ("MortarSentry", "Mortar Sentry", "mortar_sentry", ColorCategory::Green),
    ("ShieldGenerator", "Shield Generator Relay", "shield_generator", ColorCategory::Green),
    ("TeslaTower", "Tesla Tower", "tesla_tower", ColorCategory::Green),
    ("AntiPersonnelMinefield", "Anti-Personnel Minefield", "anti_personnel_minefield", ColorCategory::Green),
];

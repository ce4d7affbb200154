//! Weapon specifications used to parameterize server-side attack resolution.
//!
//! Parses `data/config/weapons.toml`. Damage tables are indexed by weapon
//! level (1-based); levels past the end of a table extrapolate by adding
//! the overshoot to the last entry, so tables only need the tuned range.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::loader;

fn default_max_affected() -> u32 {
    8
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeaponSpec {
    /// Damage per weapon level, level 1 first.
    pub damage_by_level: Vec<i32>,
    pub range_m: f32,
    pub arc_deg: f32,
    pub vertical_tolerance_m: f32,
    pub max_targets: u32,
    /// Ranged only: secondary area damage around the impact point.
    #[serde(default)]
    pub splash_radius_m: f32,
    #[serde(default)]
    pub splash_damage: i32,
    /// Area cap for splash/burst victims.
    #[serde(default = "default_max_affected")]
    pub max_enemies_affected: u32,
    /// Magic only: heal per caster level, level 1 first.
    #[serde(default)]
    pub heal_by_level: Vec<i32>,
    #[serde(default)]
    pub max_players_healed: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeaponSpecDb {
    pub melee: WeaponSpec,
    pub ranged: WeaponSpec,
    pub magic: WeaponSpec,
}

impl WeaponSpecDb {
    /// Load `data/config/weapons.toml`, or built-in defaults when absent.
    pub fn load_default() -> Result<Self> {
        if let Some(db) = loader::read_toml_opt::<Self>("config/weapons.toml")
            .context("load weapons config")?
        {
            return Ok(db);
        }
        Ok(Self::builtin())
    }

    /// Tuned defaults mirroring the shipped `weapons.toml`.
    pub fn builtin() -> Self {
        Self {
            melee: WeaponSpec {
                damage_by_level: vec![6, 8, 11, 14, 18],
                range_m: 3.0,
                arc_deg: 90.0,
                vertical_tolerance_m: 1.5,
                max_targets: 4,
                splash_radius_m: 0.0,
                splash_damage: 0,
                max_enemies_affected: 8,
                heal_by_level: Vec::new(),
                max_players_healed: 0,
            },
            ranged: WeaponSpec {
                damage_by_level: vec![8, 10, 13, 17, 22],
                range_m: 12.0,
                arc_deg: 30.0,
                vertical_tolerance_m: 2.0,
                max_targets: 1,
                splash_radius_m: 1.5,
                splash_damage: 2,
                max_enemies_affected: 6,
                heal_by_level: Vec::new(),
                max_players_healed: 0,
            },
            magic: WeaponSpec {
                damage_by_level: vec![5, 7, 9, 12, 16],
                range_m: 9.0,
                arc_deg: 60.0,
                vertical_tolerance_m: 2.5,
                max_targets: 1,
                splash_radius_m: 2.5,
                splash_damage: 0,
                max_enemies_affected: 8,
                heal_by_level: vec![4, 5, 7, 9, 12],
                max_players_healed: 4,
            },
        }
    }
}

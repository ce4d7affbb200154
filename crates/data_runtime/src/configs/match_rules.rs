//! Match rules: player defaults, core hit points, pool limits, pacing.
//!
//! Parses `data/config/match.toml`; every section has serde defaults so a
//! partial file only overrides what it names.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::loader;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerDefaultsCfg {
    pub hp_max: i32,
    pub defense: i32,
    pub melee_level: u32,
    pub ranged_level: u32,
    pub magic_level: u32,
}

impl Default for PlayerDefaultsCfg {
    fn default() -> Self {
        Self {
            hp_max: 100,
            defense: 2,
            melee_level: 1,
            ranged_level: 1,
            magic_level: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoreCfg {
    pub hp: i32,
    pub radius_m: f32,
}

impl Default for CoreCfg {
    fn default() -> Self {
        Self {
            hp: 200,
            radius_m: 1.6,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolLimitsCfg {
    pub small: usize,
    pub large: usize,
    pub king: usize,
}

impl Default for PoolLimitsCfg {
    fn default() -> Self {
        Self {
            small: 24,
            large: 8,
            king: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchRulesCfg {
    pub player: PlayerDefaultsCfg,
    pub core: CoreCfg,
    pub pools: PoolLimitsCfg,
    /// Delay between WaveEnd and the next wave start (and before wave 1).
    pub wave_start_delay_s: f32,
    /// Spawn ring radius around the arena center.
    pub spawn_ring_m: f32,
}

impl Default for MatchRulesCfg {
    fn default() -> Self {
        Self {
            player: PlayerDefaultsCfg::default(),
            core: CoreCfg::default(),
            pools: PoolLimitsCfg::default(),
            wave_start_delay_s: 5.0,
            spawn_ring_m: 18.0,
        }
    }
}

impl MatchRulesCfg {
    /// Load `data/config/match.toml`, or defaults when absent.
    pub fn load_default() -> Result<Self> {
        if let Some(cfg) =
            loader::read_toml_opt::<Self>("config/match.toml").context("load match rules")?
        {
            return Ok(cfg);
        }
        Ok(Self::default())
    }
}

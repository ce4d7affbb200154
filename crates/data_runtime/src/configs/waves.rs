//! Per-wave plans: enemy composition, spawn cadence and scaling.
//!
//! Parses `data/config/waves.toml`. Wave numbers are 1-based; the plan
//! table is read-only reference data and the last configured wave is the
//! final one.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::loader;

#[derive(Debug, Clone, Deserialize)]
pub struct CompositionEntry {
    /// Enemy kind name ("small" | "large" | "king"); parsed by the sim.
    pub kind: String,
    /// Relative chance weight within this wave's roll table.
    pub weight: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WavePlan {
    pub wave: u32,
    pub composition: Vec<CompositionEntry>,
    pub spawn_interval_s: f32,
    pub duration_s: f32,
    #[serde(default = "one")]
    pub health_mul: f32,
    #[serde(default = "one")]
    pub damage_mul: f32,
    #[serde(default = "one")]
    pub scale_mul: f32,
}

fn one() -> f32 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct WavePlanDb {
    pub waves: Vec<WavePlan>,
}

impl WavePlanDb {
    /// Load `data/config/waves.toml`, or a generated default table when absent.
    pub fn load_default() -> Result<Self> {
        if let Some(db) =
            loader::read_toml_opt::<Self>("config/waves.toml").context("load waves config")?
        {
            anyhow::ensure!(!db.waves.is_empty(), "waves.toml defines no waves");
            return Ok(db);
        }
        Ok(Self::generated(10))
    }

    /// Procedural plan table used when no data file ships: escalating
    /// composition and scaling derived from the wave number.
    pub fn generated(count: u32) -> Self {
        let mut waves = Vec::with_capacity(count as usize);
        for n in 1..=count {
            let mut composition = vec![CompositionEntry {
                kind: "small".into(),
                weight: 6.0,
            }];
            if n >= 3 {
                composition.push(CompositionEntry {
                    kind: "large".into(),
                    weight: 1.0 + n as f32 * 0.5,
                });
            }
            if n >= 7 {
                composition.push(CompositionEntry {
                    kind: "king".into(),
                    weight: 0.5 + (n - 7) as f32 * 0.25,
                });
            }
            waves.push(WavePlan {
                wave: n,
                composition,
                spawn_interval_s: (4.0 - n as f32 * 0.2).max(1.5),
                duration_s: 45.0,
                health_mul: 1.0 + (n - 1) as f32 * 0.15,
                damage_mul: 1.0 + (n - 1) as f32 * 0.10,
                scale_mul: 1.0 + (n - 1) as f32 * 0.05,
            });
        }
        Self { waves }
    }

    /// Plan for a 1-based wave number, if configured.
    #[must_use]
    pub fn plan(&self, wave: u32) -> Option<&WavePlan> {
        self.waves.iter().find(|p| p.wave == wave)
    }

    /// Highest configured wave number.
    #[must_use]
    pub fn final_wave(&self) -> u32 {
        self.waves.iter().map(|p| p.wave).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn generated_escalates() {
        let db = WavePlanDb::generated(10);
        assert_eq!(db.final_wave(), 10);
        let first = db.plan(1).expect("wave 1");
        let last = db.plan(10).expect("wave 10");
        assert!(last.health_mul > first.health_mul);
        assert!(last.spawn_interval_s <= first.spawn_interval_s);
        assert_eq!(first.composition.len(), 1);
        assert!(last.composition.len() >= 2);
    }
    #[test]
    fn load_default_nonempty() {
        let db = WavePlanDb::load_default().expect("load");
        assert!(db.final_wave() >= 1);
    }
}

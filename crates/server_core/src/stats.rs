//! Authoritative per-player combat stats.
//!
//! The store is the single writer: every mutation funnels through `patch`,
//! which re-normalizes all invariant fields on each call, so the invariants
//! hold regardless of patch order or content. Readers get copies, never the
//! live record.

use std::collections::HashMap;

use net_core::snapshot::StatsUpdate;

use crate::actor::PlayerId;
use crate::weapons::WeaponKind;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlayerStats {
    pub hp: i32,
    pub hp_max: i32,
    pub defense: i32,
    pub melee_level: u32,
    pub ranged_level: u32,
    pub magic_level: u32,
    pub slime_kills: u32,
    pub waves_survived: u32,
}

impl PlayerStats {
    #[must_use]
    pub fn weapon_level(&self, kind: WeaponKind) -> u32 {
        match kind {
            WeaponKind::Melee => self.melee_level,
            WeaponKind::Ranged => self.ranged_level,
            WeaponKind::Magic => self.magic_level,
        }
    }

    fn normalize(&mut self) {
        self.hp_max = self.hp_max.max(1);
        self.hp = self.hp.clamp(0, self.hp_max);
        self.defense = self.defense.max(0);
        self.melee_level = self.melee_level.max(1);
        self.ranged_level = self.ranged_level.max(1);
        self.magic_level = self.magic_level.max(1);
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Copy, Clone, Debug, Default)]
pub struct StatsPatch {
    pub hp: Option<i32>,
    pub hp_max: Option<i32>,
    pub defense: Option<i32>,
    pub melee_level: Option<u32>,
    pub ranged_level: Option<u32>,
    pub magic_level: Option<u32>,
    pub slime_kills: Option<u32>,
    pub waves_survived: Option<u32>,
}

pub struct MatchStateStore {
    defaults: PlayerStats,
    players: HashMap<PlayerId, PlayerStats>,
    updates: Vec<StatsUpdate>,
}

impl MatchStateStore {
    #[must_use]
    pub fn new(defaults: PlayerStats) -> Self {
        let mut defaults = defaults;
        defaults.normalize();
        Self {
            defaults,
            players: HashMap::new(),
            updates: Vec::new(),
        }
    }

    /// Create the record from defaults (full hp) and emit the initial update.
    pub fn enter_match(&mut self, id: PlayerId) {
        let mut rec = self.defaults;
        rec.hp = rec.hp_max;
        rec.slime_kills = 0;
        rec.waves_survived = 0;
        self.players.insert(id, rec);
        self.emit(id, rec);
    }

    pub fn exit_match(&mut self, id: PlayerId) {
        self.players.remove(&id);
    }

    /// Snapshot copy; other components never see the live record.
    #[must_use]
    pub fn stats(&self, id: PlayerId) -> Option<PlayerStats> {
        self.players.get(&id).copied()
    }

    /// Read-modify-write with re-normalization of every invariant field,
    /// then an update notification. hp is clamped against the merged
    /// hp_max so simultaneous hp/hp_max changes resolve consistently.
    /// Returns false (with a warning) for unknown players.
    pub fn patch(&mut self, id: PlayerId, patch: &StatsPatch) -> bool {
        let Some(rec) = self.players.get_mut(&id) else {
            log::warn!("stats patch for unknown player {id:?}; skipped");
            return false;
        };
        if let Some(v) = patch.hp_max {
            rec.hp_max = v;
        }
        if let Some(v) = patch.hp {
            rec.hp = v;
        }
        if let Some(v) = patch.defense {
            rec.defense = v;
        }
        if let Some(v) = patch.melee_level {
            rec.melee_level = v;
        }
        if let Some(v) = patch.ranged_level {
            rec.ranged_level = v;
        }
        if let Some(v) = patch.magic_level {
            rec.magic_level = v;
        }
        if let Some(v) = patch.slime_kills {
            rec.slime_kills = v;
        }
        if let Some(v) = patch.waves_survived {
            rec.waves_survived = v;
        }
        rec.normalize();
        let snap = *rec;
        self.emit(id, snap);
        true
    }

    /// Signed hp adjustment (damage negative, heal positive).
    pub fn adjust_hp(&mut self, id: PlayerId, delta: i32) -> bool {
        let Some(cur) = self.stats(id) else {
            log::warn!("hp adjust for unknown player {id:?}; skipped");
            return false;
        };
        self.patch(
            id,
            &StatsPatch {
                hp: Some(cur.hp.saturating_add(delta)),
                ..StatsPatch::default()
            },
        )
    }

    pub fn increment_slime_kills(&mut self, id: PlayerId) -> bool {
        let Some(cur) = self.stats(id) else {
            return false;
        };
        self.patch(
            id,
            &StatsPatch {
                slime_kills: Some(cur.slime_kills + 1),
                ..StatsPatch::default()
            },
        )
    }

    pub fn set_wave_progress(&mut self, id: PlayerId, wave: u32) -> bool {
        self.patch(
            id,
            &StatsPatch {
                waves_survived: Some(wave),
                ..StatsPatch::default()
            },
        )
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    /// Updates accumulated since the last drain, in emission order.
    pub fn drain_updates(&mut self) -> Vec<StatsUpdate> {
        std::mem::take(&mut self.updates)
    }

    fn emit(&mut self, id: PlayerId, rec: PlayerStats) {
        self.updates.push(StatsUpdate {
            player: id.0,
            hp: rec.hp,
            hp_max: rec.hp_max,
            defense: rec.defense,
            melee_level: rec.melee_level,
            ranged_level: rec.ranged_level,
            magic_level: rec.magic_level,
            slime_kills: rec.slime_kills,
            waves_survived: rec.waves_survived,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MatchStateStore {
        MatchStateStore::new(PlayerStats {
            hp: 100,
            hp_max: 100,
            defense: 2,
            melee_level: 1,
            ranged_level: 1,
            magic_level: 1,
            slime_kills: 0,
            waves_survived: 0,
        })
    }

    #[test]
    fn patches_clamp_against_merged_hp_max() {
        let mut s = store();
        s.enter_match(PlayerId(1));
        // Shrink max and raise hp in the same patch: the merged max wins.
        assert!(s.patch(
            PlayerId(1),
            &StatsPatch {
                hp: Some(500),
                hp_max: Some(60),
                ..StatsPatch::default()
            }
        ));
        let rec = s.stats(PlayerId(1)).expect("present");
        assert_eq!(rec.hp_max, 60);
        assert_eq!(rec.hp, 60);
    }

    #[test]
    fn invariants_hold_over_any_patch_order() {
        let mut s = store();
        s.enter_match(PlayerId(1));
        let patches = [
            StatsPatch { hp: Some(-40), ..StatsPatch::default() },
            StatsPatch { melee_level: Some(0), ..StatsPatch::default() },
            StatsPatch { hp_max: Some(-10), ..StatsPatch::default() },
            StatsPatch { defense: Some(-3), ..StatsPatch::default() },
            StatsPatch { hp: Some(9999), ..StatsPatch::default() },
        ];
        for p in &patches {
            s.patch(PlayerId(1), p);
            let rec = s.stats(PlayerId(1)).expect("present");
            assert!(rec.hp >= 0 && rec.hp <= rec.hp_max);
            assert!(rec.hp_max >= 1);
            assert!(rec.defense >= 0);
            assert!(rec.melee_level >= 1 && rec.ranged_level >= 1 && rec.magic_level >= 1);
        }
    }

    #[test]
    fn unknown_player_patch_is_skipped_not_fatal() {
        let mut s = store();
        assert!(!s.patch(PlayerId(9), &StatsPatch::default()));
        assert!(!s.adjust_hp(PlayerId(9), -5));
        assert!(s.drain_updates().is_empty());
    }

    #[test]
    fn every_patch_emits_an_update() {
        let mut s = store();
        s.enter_match(PlayerId(1));
        s.adjust_hp(PlayerId(1), -10);
        s.increment_slime_kills(PlayerId(1));
        let ups = s.drain_updates();
        assert_eq!(ups.len(), 3, "enter + two patches");
        assert_eq!(ups[1].hp, 90);
        assert_eq!(ups[2].slime_kills, 1);
    }

    #[test]
    fn readers_get_copies() {
        let mut s = store();
        s.enter_match(PlayerId(1));
        let mut copy = s.stats(PlayerId(1)).expect("present");
        copy.hp = 1;
        assert_eq!(s.stats(PlayerId(1)).expect("present").hp, 100);
    }
}

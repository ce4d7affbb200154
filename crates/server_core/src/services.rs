//! Collaborator seams: entity instantiation, navigation, and the record
//! store for persisted bests. The sim depends on these traits only; the
//! in-proc defaults here keep tests and the headless runner self-contained.

use std::collections::HashMap;
use std::path::PathBuf;

use glam::Vec3;

use crate::actor::{SlimeKind, Transform};
use crate::pool::SpawnTicket;

/// Result of one creation attempt, delivered at a later poll. Carries the
/// requested kind/pose back so the caller can initialize without keeping a
/// side table of its own.
#[derive(Copy, Clone, Debug)]
pub struct SpawnCompletion {
    pub ticket: SpawnTicket,
    pub kind: SlimeKind,
    pub pose: Transform,
    pub ok: bool,
}

/// Asynchronously instantiates the visual/collision representation for a
/// spawned enemy. Completions may arrive arbitrarily late and may fail;
/// each `begin` produces exactly one completion.
pub trait SpawnService {
    fn begin(&mut self, kind: SlimeKind, pose: Transform) -> SpawnTicket;
    fn poll(&mut self) -> Vec<SpawnCompletion>;
}

/// Default in-proc spawner: every creation completes on the next poll.
/// `fail_budget` makes the first N creations fail, for exercising the
/// failure edge.
#[derive(Debug, Default)]
pub struct QueuedSpawner {
    next_ticket: u64,
    queued: Vec<SpawnCompletion>,
    pub fail_budget: u32,
}

impl QueuedSpawner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing_first(n: u32) -> Self {
        Self {
            fail_budget: n,
            ..Self::default()
        }
    }
}

impl SpawnService for QueuedSpawner {
    fn begin(&mut self, kind: SlimeKind, pose: Transform) -> SpawnTicket {
        let ticket = SpawnTicket(self.next_ticket);
        self.next_ticket += 1;
        let ok = if self.fail_budget > 0 {
            self.fail_budget -= 1;
            false
        } else {
            true
        };
        self.queued.push(SpawnCompletion {
            ticket,
            kind,
            pose,
            ok,
        });
        ticket
    }

    fn poll(&mut self) -> Vec<SpawnCompletion> {
        std::mem::take(&mut self.queued)
    }
}

/// Opaque walkability service; the real one queries the navigation mesh.
pub trait NavService {
    fn nearest_walkable(&self, target: Vec3, search_radius_m: f32) -> Option<Vec3>;
}

/// Identity nav: everywhere is walkable.
#[derive(Debug, Default)]
pub struct PassthroughNav;

impl NavService for PassthroughNav {
    fn nearest_walkable(&self, target: Vec3, _search_radius_m: f32) -> Option<Vec3> {
        Some(target)
    }
}

/// Key/value store for persisted records ("best wave" and friends).
pub trait RecordStore {
    fn read_u32(&self, key: &str) -> Option<u32>;
    fn write_u32(&mut self, key: &str, value: u32);
}

#[derive(Debug, Default)]
pub struct MemoryRecords(HashMap<String, u32>);

impl RecordStore for MemoryRecords {
    fn read_u32(&self, key: &str) -> Option<u32> {
        self.0.get(key).copied()
    }
    fn write_u32(&mut self, key: &str, value: u32) {
        self.0.insert(key.to_string(), value);
    }
}

/// File-backed records: a small JSON map, written through on every update.
/// I/O failures are logged and swallowed; records are best-effort.
#[derive(Debug)]
pub struct JsonFileRecords {
    path: PathBuf,
    cache: HashMap<String, u32>,
}

impl JsonFileRecords {
    #[must_use]
    pub fn open(path: PathBuf) -> Self {
        let cache = std::fs::read_to_string(&path)
            .ok()
            .and_then(|txt| serde_json::from_str::<HashMap<String, u32>>(&txt).ok())
            .unwrap_or_default();
        Self { path, cache }
    }

    fn save(&self) {
        match serde_json::to_string_pretty(&self.cache) {
            Ok(txt) => {
                if let Err(e) = std::fs::write(&self.path, txt) {
                    log::warn!("records: write {} failed: {e}", self.path.display());
                }
            }
            Err(e) => log::warn!("records: serialize failed: {e}"),
        }
    }
}

impl RecordStore for JsonFileRecords {
    fn read_u32(&self, key: &str) -> Option<u32> {
        self.cache.get(key).copied()
    }
    fn write_u32(&mut self, key: &str, value: u32) {
        self.cache.insert(key.to_string(), value);
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_spawner_completes_each_begin_once() {
        let mut sp = QueuedSpawner::new();
        let t0 = sp.begin(SlimeKind::Small, Transform::default());
        let t1 = sp.begin(SlimeKind::Large, Transform::default());
        let done = sp.poll();
        assert_eq!(done.len(), 2);
        assert_eq!(done[0].ticket, t0);
        assert_eq!(done[1].ticket, t1);
        assert!(done.iter().all(|c| c.ok));
        assert!(sp.poll().is_empty(), "completions are delivered once");
    }

    #[test]
    fn fail_budget_fails_then_recovers() {
        let mut sp = QueuedSpawner::failing_first(1);
        sp.begin(SlimeKind::Small, Transform::default());
        sp.begin(SlimeKind::Small, Transform::default());
        let done = sp.poll();
        assert!(!done[0].ok);
        assert!(done[1].ok);
    }

    #[test]
    fn memory_records_roundtrip() {
        let mut r = MemoryRecords::default();
        assert_eq!(r.read_u32("best_wave"), None);
        r.write_u32("best_wave", 7);
        assert_eq!(r.read_u32("best_wave"), Some(7));
    }
}

//! Per-enemy runtime state: health, the small action state machine, and
//! health-change observers.
//!
//! Death is the only transition owned here; movement/attack states are
//! commanded by the AI driver. A combatant whose hit points reach zero
//! enters `Death` exactly once and can never be damaged or healed again
//! until the pool re-activates it.

use glam::Vec3;

use crate::actor::{ActorId, Health, SlimeKind, Transform};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum AgentState {
    #[default]
    Idle,
    Move,
    Attack,
    Hit,
    Death,
}

/// Payload handed to health observers on every effective change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HealthSnapshot {
    pub current: i32,
    pub max: i32,
}

/// Deterministic unsubscribe handle returned by `subscribe_health`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ObserverId(pub u64);

type HealthCallback = Box<dyn FnMut(HealthSnapshot)>;

/// Explicit observer list; ids are handed out monotonically so unsubscribe
/// is unambiguous even after other observers are removed.
#[derive(Default)]
pub struct HealthObservers {
    next_id: u64,
    subs: Vec<(ObserverId, HealthCallback)>,
}

impl HealthObservers {
    pub fn subscribe(&mut self, cb: HealthCallback) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.subs.push((id, cb));
        id
    }

    /// Returns false when the handle was already removed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.subs.len();
        self.subs.retain(|(sid, _)| *sid != id);
        self.subs.len() != before
    }

    pub fn notify(&mut self, snap: HealthSnapshot) {
        for (_, cb) in &mut self.subs {
            cb(snap);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}

pub struct Combatant {
    pub id: ActorId,
    pub kind: SlimeKind,
    pub tr: Transform,
    pub hp: Health,
    pub state: AgentState,
    /// Damage dealt per melee swing (wave-scaled on activation).
    pub damage: i32,
    pub speed_mps: f32,
    pub attack_cooldown_s: f32,
    /// Allocated (in play) vs parked on the pool free list.
    pub active: bool,
    observers: HealthObservers,
}

impl std::fmt::Debug for Combatant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Combatant")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("hp", &self.hp)
            .field("state", &self.state)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Combatant {
    /// A parked shell; `activate` brings it into play.
    #[must_use]
    pub fn new(id: ActorId, kind: SlimeKind) -> Self {
        Self {
            id,
            kind,
            tr: Transform {
                radius: kind.base_radius_m(),
                ..Transform::default()
            },
            hp: Health { hp: 0, max: kind.base_hp() },
            state: AgentState::Idle,
            damage: kind.base_damage(),
            speed_mps: kind.base_speed_mps(),
            attack_cooldown_s: 0.0,
            active: false,
            observers: HealthObservers::default(),
        }
    }

    /// (Re-)initialize at a pose with wave-scaled stats. Used for fresh
    /// allocations, free-list reuse, and forced eviction alike.
    pub fn activate(&mut self, tr: Transform, hp_max: i32, damage: i32) {
        self.tr = tr;
        self.hp = Health {
            hp: hp_max.max(1),
            max: hp_max.max(1),
        };
        self.damage = damage.max(0);
        self.state = AgentState::Idle;
        self.attack_cooldown_s = 0.0;
        self.active = true;
    }

    /// Release hook: park the record. Observers stay subscribed; the record
    /// is recycled, not destroyed.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Eligible for targeting and collision.
    #[inline]
    #[must_use]
    pub fn targetable(&self) -> bool {
        self.active && self.hp.alive() && self.state != AgentState::Death
    }

    /// Commanded transition from the AI driver. Death is never entered this
    /// way, and once dead the machine only resets through `activate`.
    pub fn set_state(&mut self, next: AgentState) {
        if self.state == AgentState::Death || next == AgentState::Death {
            return;
        }
        self.state = next;
    }

    /// Apply damage, clamped at zero. No-op for non-positive amounts, when
    /// already at the floor, or when the clamp leaves health unchanged
    /// (duplicate messages). Returns true when health changed.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if amount <= 0 || self.state == AgentState::Death {
            return false;
        }
        let next = (self.hp.hp - amount).max(0);
        if next == self.hp.hp {
            return false;
        }
        self.hp.hp = next;
        let snap = HealthSnapshot {
            current: self.hp.hp,
            max: self.hp.max,
        };
        self.observers.notify(snap);
        if self.hp.hp == 0 {
            self.state = AgentState::Death;
        }
        true
    }

    /// Mirror of `apply_damage`, clamped at max. Dead combatants are never
    /// healed back.
    pub fn restore_health(&mut self, amount: i32) -> bool {
        if amount <= 0 || self.state == AgentState::Death {
            return false;
        }
        let next = (self.hp.hp + amount).min(self.hp.max);
        if next == self.hp.hp {
            return false;
        }
        self.hp.hp = next;
        self.observers.notify(HealthSnapshot {
            current: self.hp.hp,
            max: self.hp.max,
        });
        true
    }

    pub fn subscribe_health(&mut self, cb: HealthCallback) -> ObserverId {
        self.observers.subscribe(cb)
    }

    pub fn unsubscribe_health(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }
}

/// Flat store of combatant records; handles index by id lookup.
#[derive(Default)]
pub struct CombatantStore {
    next_id: u32,
    items: Vec<Combatant>,
}

impl CombatantStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parked shell and return its handle.
    pub fn create(&mut self, kind: SlimeKind) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.items.push(Combatant::new(id, kind));
        id
    }

    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Combatant> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Combatant> {
        self.items.iter_mut().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.items.iter_mut()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Combatant] {
        &mut self.items
    }

    /// Count of combatants currently eligible for targeting.
    #[must_use]
    pub fn targetable_count(&self) -> usize {
        self.items.iter().filter(|c| c.targetable()).count()
    }

    /// Iteration-ordered view used by cone queries; order is the tie-break.
    #[must_use]
    pub fn targetable_points(&self) -> Vec<(ActorId, Vec3)> {
        self.items
            .iter()
            .filter(|c| c.targetable())
            .map(|c| (c.id, c.tr.pos))
            .collect()
    }
}

//! Authoritative combat and wave-progression core.
//!
//! Single-threaded, tick-driven: commands queue between ticks and
//! `ServerState::step_authoritative` runs the ordered systems to
//! completion, so invariant-holding operations need ordering discipline
//! only, never locks. Asynchronous boundaries are limited to the spawn
//! service (pool creations) and the wave director's scheduled timers.

use std::collections::HashMap;

use glam::Vec3;

use data_runtime::configs::match_rules::MatchRulesCfg;
use data_runtime::configs::waves::WavePlanDb;
use data_runtime::configs::weapons::WeaponSpecDb;
use net_core::command::ClientCmd;
use net_core::snapshot::{
    CoreDestroyed, CoreUnderAttack, HitNotification, MatchEnded, SnapshotEncode, StatsUpdate,
    WaveStart,
};

pub mod actor;
pub mod combatant;
pub mod pool;
pub mod services;
pub mod stats;
pub mod systems;
pub mod targeting;
pub mod telemetry;
pub mod waves;
pub mod weapons;

pub use actor::{ActorId, Health, PlayerId, SlimeKind, Transform};
pub use combatant::{AgentState, Combatant, CombatantStore, HealthSnapshot, ObserverId};
pub use pool::{Allocation, EntityPool, PoolSlot, SpawnTicket};
pub use services::{
    JsonFileRecords, MemoryRecords, NavService, PassthroughNav, QueuedSpawner, RecordStore,
    SpawnCompletion, SpawnService,
};
pub use stats::{MatchStateStore, PlayerStats, StatsPatch};
pub use targeting::ConeQuery;
pub use waves::{MatchOutcome, SpawnRequest, WaveDirector, WaveEvent, WavePhase};
pub use weapons::{AttackRequest, WeaponKind};

use systems::slime_ai::{self, AiGoal, CorePoint, PlayerPoint};

pub const BEST_WAVE_KEY: &str = "best_wave";

/// Player entity mirrored from the client; hit points live in the stat
/// store, never here.
#[derive(Copy, Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub pos: Vec3,
    pub radius: f32,
}

/// Typed outbound message; encode at the transport edge.
#[derive(Clone, Debug)]
pub enum OutboundMsg {
    Hit(HitNotification),
    Stats(StatsUpdate),
    WaveStart(WaveStart),
    CoreUnderAttack(CoreUnderAttack),
    CoreDestroyed(CoreDestroyed),
    MatchEnded(MatchEnded),
}

impl OutboundMsg {
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Self::Hit(m) => m.encode(out),
            Self::Stats(m) => m.encode(out),
            Self::WaveStart(m) => m.encode(out),
            Self::CoreUnderAttack(m) => m.encode(out),
            Self::CoreDestroyed(m) => m.encode(out),
            Self::MatchEnded(m) => m.encode(out),
        }
    }
}

pub struct ServerState {
    pub combatants: CombatantStore,
    pub pool: EntityPool,
    pub stats: MatchStateStore,
    pub director: WaveDirector,
    pub players: Vec<Player>,
    weapons: WeaponSpecDb,
    rules: MatchRulesCfg,
    core_pos: Vec3,
    spawner: Box<dyn SpawnService>,
    nav: Box<dyn NavService>,
    records: Box<dyn RecordStore>,
    pending_attacks: Vec<AttackRequest>,
    spawn_meta: HashMap<SpawnTicket, SpawnRequest>,
    spawn_counter: u32,
    outbound: Vec<OutboundMsg>,
}

impl ServerState {
    /// Build from the shipped configs with in-proc default services.
    pub fn new(seed: u64) -> anyhow::Result<Self> {
        let weapons = WeaponSpecDb::load_default()?;
        let rules = MatchRulesCfg::load_default()?;
        let plans = WavePlanDb::load_default()?;
        Ok(Self::with_services(
            weapons,
            rules,
            &plans,
            seed,
            Box::new(QueuedSpawner::new()),
            Box::new(PassthroughNav),
            Box::new(MemoryRecords::default()),
        ))
    }

    /// Full constructor for tests and embedders that bring their own
    /// spawn/nav/record collaborators.
    #[must_use]
    pub fn with_services(
        weapons: WeaponSpecDb,
        rules: MatchRulesCfg,
        plans: &WavePlanDb,
        seed: u64,
        spawner: Box<dyn SpawnService>,
        nav: Box<dyn NavService>,
        records: Box<dyn RecordStore>,
    ) -> Self {
        let defaults = PlayerStats {
            hp: rules.player.hp_max,
            hp_max: rules.player.hp_max,
            defense: rules.player.defense,
            melee_level: rules.player.melee_level,
            ranged_level: rules.player.ranged_level,
            magic_level: rules.player.magic_level,
            slime_kills: 0,
            waves_survived: 0,
        };
        let director = WaveDirector::new(plans, &rules, seed);
        let pool = EntityPool::new([rules.pools.small, rules.pools.large, rules.pools.king]);
        Self {
            combatants: CombatantStore::new(),
            pool,
            stats: MatchStateStore::new(defaults),
            director,
            players: Vec::new(),
            weapons,
            rules,
            core_pos: Vec3::ZERO,
            spawner,
            nav,
            records,
            pending_attacks: Vec::new(),
            spawn_meta: HashMap::new(),
            spawn_counter: 0,
            outbound: Vec::new(),
        }
    }

    pub fn enter_player(&mut self, id: PlayerId, pos: Vec3) {
        self.stats.enter_match(id);
        self.players.push(Player {
            id,
            pos,
            radius: 0.7,
        });
    }

    pub fn exit_player(&mut self, id: PlayerId) {
        self.stats.exit_match(id);
        self.players.retain(|p| p.id != id);
    }

    /// Mirror a player position reported by its client.
    pub fn sync_player_pos(&mut self, id: PlayerId, pos: Vec3) {
        if let Some(p) = self.players.iter_mut().find(|p| p.id == id) {
            p.pos = pos;
        }
    }

    /// A player stepped into the wave trigger volume.
    pub fn enter_wave_trigger(&mut self) {
        self.director.on_trigger_enter();
    }

    pub fn enqueue_attack(&mut self, req: AttackRequest) {
        self.pending_attacks.push(req);
    }

    /// Decode-side intake: route a wire command into the queues.
    pub fn handle_client_cmd(&mut self, cmd: &ClientCmd) {
        match cmd {
            ClientCmd::Attack {
                player,
                weapon_entity,
                weapon,
                pos,
                dir,
                params,
            } => {
                let Some(kind) = WeaponKind::from_u8(*weapon) else {
                    log::warn!("attack with unknown weapon class {weapon}; dropped");
                    return;
                };
                self.enqueue_attack(AttackRequest {
                    player: PlayerId(*player),
                    weapon_entity: *weapon_entity,
                    weapon: kind,
                    origin: Vec3::from_array(*pos),
                    dir: Vec3::from_array(*dir),
                    params: *params,
                });
            }
            ClientCmd::CoreHit { damage } => self.director.core_hit(*damage),
        }
    }

    /// Messages produced since the last drain, in emission order.
    pub fn drain_outbound(&mut self) -> Vec<OutboundMsg> {
        std::mem::take(&mut self.outbound)
    }

    /// The resolved parameters a weapon entity of `kind` would forward with
    /// an attack gesture.
    #[must_use]
    pub fn weapon_params(&self, kind: WeaponKind) -> net_core::command::AttackParams {
        let s = match kind {
            WeaponKind::Melee => &self.weapons.melee,
            WeaponKind::Ranged => &self.weapons.ranged,
            WeaponKind::Magic => &self.weapons.magic,
        };
        net_core::command::AttackParams {
            range_m: s.range_m,
            arc_deg: s.arc_deg,
            vertical_tolerance_m: s.vertical_tolerance_m,
            max_targets: s.max_targets,
            splash_radius_m: s.splash_radius_m,
        }
    }

    /// Synchronous unscaled spawn at an explicit position, bypassing the
    /// spawn service. Used by scenario tooling and tests; wave spawns go
    /// through the director.
    pub fn spawn_slime_at(&mut self, kind: SlimeKind, pos: Vec3) -> Option<ActorId> {
        let req = SpawnRequest {
            kind,
            health_mul: 1.0,
            damage_mul: 1.0,
            scale_mul: 1.0,
        };
        let pose = Transform {
            pos,
            yaw: 0.0,
            radius: kind.base_radius_m(),
        };
        match self.pool.try_allocate(kind) {
            Allocation::Create => {
                let id = self.combatants.create(kind);
                self.pool.complete_creation(kind, id);
                self.init_combatant(id, &req, pose);
                Some(id)
            }
            Allocation::Reuse(id) => {
                self.init_combatant(id, &req, pose);
                Some(id)
            }
            Allocation::Evict(id) => {
                if let Some(c) = self.combatants.get_mut(id) {
                    c.deactivate();
                }
                self.init_combatant(id, &req, pose);
                Some(id)
            }
            Allocation::Skip => None,
        }
    }

    #[must_use]
    pub fn best_wave_record(&self) -> Option<u32> {
        self.records.read_u32(BEST_WAVE_KEY)
    }

    /// Run one authoritative tick: spawn completions, queued attacks,
    /// slime AI, wave progression, death sweep, outbound drain.
    pub fn step_authoritative(&mut self, dt: f32) {
        let t0 = std::time::Instant::now();
        self.apply_spawn_completions();
        self.resolve_attacks();
        self.drive_slimes(dt);
        self.update_waves(dt);
        self.sweep_deaths();
        self.collect_outbound();
        metrics::histogram!("tick.ms").record(t0.elapsed().as_secs_f64() * 1000.0);
    }

    fn apply_spawn_completions(&mut self) {
        for done in self.spawner.poll() {
            let Some(req) = self.spawn_meta.remove(&done.ticket) else {
                log::warn!("spawn completion with unknown ticket {:?}; dropped", done.ticket);
                continue;
            };
            if !done.ok {
                // Pending must come back exactly once per attempt or the
                // slot leaks capacity for the rest of the match.
                self.pool.creation_failed(done.kind);
                log::warn!("spawn of {} failed; capacity returned", done.kind.as_str());
                metrics::counter!("pool.spawn_failures_total").increment(1);
                continue;
            }
            let id = self.combatants.create(done.kind);
            self.pool.complete_creation(done.kind, id);
            self.init_combatant(id, &req, done.pose);
        }
    }

    fn init_combatant(&mut self, id: ActorId, req: &SpawnRequest, pose: Transform) {
        let kind = req.kind;
        let hp = (kind.base_hp() as f32 * req.health_mul).round() as i32;
        let damage = (kind.base_damage() as f32 * req.damage_mul).round() as i32;
        let mut pose = pose;
        pose.radius = kind.base_radius_m() * req.scale_mul.max(0.1);
        if let Some(c) = self.combatants.get_mut(id) {
            c.speed_mps = kind.base_speed_mps();
            c.activate(pose, hp.max(1), damage.max(0));
        }
    }

    fn resolve_attacks(&mut self) {
        if self.pending_attacks.is_empty() {
            return;
        }
        let reqs = std::mem::take(&mut self.pending_attacks);
        for req in reqs {
            let Some(rec) = self.stats.stats(req.player) else {
                log::warn!("attack from unknown player {:?}; skipped", req.player);
                continue;
            };
            if rec.hp <= 0 {
                continue;
            }
            let level = rec.weapon_level(req.weapon);
            let enemies = self.combatants.targetable_points();
            let players = self.live_player_points();
            let res = weapons::resolve(&req, &self.weapons, level, &enemies, &players);
            // A rejected attack (no valid target) is silent.
            for hit in &res.hits {
                let mut killed = false;
                if let Some(c) = self.combatants.get_mut(hit.target) {
                    if c.apply_damage(hit.damage) {
                        killed = c.state == AgentState::Death;
                        self.outbound.push(OutboundMsg::Hit(HitNotification {
                            target: hit.target.0,
                            hit_pos: hit.hit_pos.to_array(),
                            hit_normal: hit.hit_normal.to_array(),
                            source_player: req.player.0,
                            damage: hit.damage,
                            weapon: req.weapon.as_u8(),
                        }));
                    }
                }
                if killed {
                    self.stats.increment_slime_kills(req.player);
                    metrics::counter!("combat.slime_kills_total").increment(1);
                }
            }
            for (pid, heal) in &res.heals {
                self.stats.adjust_hp(*pid, *heal);
            }
        }
    }

    fn live_player_points(&self) -> Vec<(PlayerId, Vec3)> {
        self.players
            .iter()
            .filter(|p| self.stats.stats(p.id).map(|s| s.hp > 0).unwrap_or(false))
            .map(|p| (p.id, p.pos))
            .collect()
    }

    fn drive_slimes(&mut self, dt: f32) {
        let goal = match self.director.phase() {
            WavePhase::CoreTargeting => AiGoal::Core,
            _ => AiGoal::Players,
        };
        let players: Vec<PlayerPoint> = self
            .players
            .iter()
            .filter(|p| self.stats.stats(p.id).map(|s| s.hp > 0).unwrap_or(false))
            .map(|p| PlayerPoint {
                id: p.id,
                pos: p.pos,
                radius: p.radius,
            })
            .collect();
        let core = CorePoint {
            pos: self.core_pos,
            radius: self.rules.core.radius_m,
        };
        let cs = self.combatants.as_mut_slice();
        slime_ai::seek(cs, goal, &players, core, dt);
        slime_ai::resolve_collisions(cs);
        let hits = slime_ai::melee(cs, goal, &players, core);
        for (pid, damage) in hits.players {
            let defense = self.stats.stats(pid).map(|s| s.defense).unwrap_or(0);
            self.stats.adjust_hp(pid, -(damage - defense).max(1));
        }
        for damage in hits.core {
            self.director.core_hit(damage);
        }
    }

    fn update_waves(&mut self, dt: f32) {
        let active = self.combatants.targetable_count();
        let pending = self.pool.total_pending();
        let directives = self.director.update(dt, active, pending);
        for req in &directives.spawns {
            self.spawn_one(req);
        }
        if directives.force_kill_all {
            for c in self.combatants.iter_mut() {
                if c.targetable() {
                    let hp = c.hp.hp;
                    let _ = c.apply_damage(hp);
                }
            }
        }
        if let Some(wave) = directives.record_best_wave {
            let best = self.records.read_u32(BEST_WAVE_KEY).unwrap_or(0);
            if wave > best {
                self.records.write_u32(BEST_WAVE_KEY, wave);
            }
        }
        if let Some(wave) = directives.waves_survived {
            for id in self.stats.player_ids() {
                self.stats.set_wave_progress(id, wave);
            }
        }
    }

    fn spawn_one(&mut self, req: &SpawnRequest) {
        let pose = self.spawn_pose(req);
        match self.pool.try_allocate(req.kind) {
            Allocation::Create => {
                let ticket = self.spawner.begin(req.kind, pose);
                self.spawn_meta.insert(ticket, *req);
            }
            Allocation::Reuse(id) => self.init_combatant(id, req, pose),
            Allocation::Evict(id) => {
                // Forced circular reuse: run the release hook, then
                // re-initialize in place. This is recycling, not death.
                if let Some(c) = self.combatants.get_mut(id) {
                    c.deactivate();
                }
                metrics::counter!("pool.evictions_total").increment(1);
                self.init_combatant(id, req, pose);
            }
            Allocation::Skip => {
                log::warn!(
                    "pool: {} slot saturated with pending creations; spawn skipped",
                    req.kind.as_str()
                );
                metrics::counter!("pool.spawn_skips_total").increment(1);
            }
        }
    }

    fn spawn_pose(&mut self, req: &SpawnRequest) -> Transform {
        // Golden-angle walk around the spawn ring spreads arrivals out.
        self.spawn_counter = self.spawn_counter.wrapping_add(1);
        let a = self.spawn_counter as f32 * 2.399_963;
        let ring = self.rules.spawn_ring_m;
        let want = self.core_pos + Vec3::new(ring * a.cos(), 0.0, ring * a.sin());
        let pos = self.nav.nearest_walkable(want, 5.0).unwrap_or(want);
        Transform {
            pos,
            yaw: (self.core_pos.x - pos.x).atan2(self.core_pos.z - pos.z),
            radius: req.kind.base_radius_m() * req.scale_mul.max(0.1),
        }
    }

    /// Dead-but-still-allocated combatants go back to the free list.
    fn sweep_deaths(&mut self) {
        let dead: Vec<(ActorId, SlimeKind)> = self
            .combatants
            .iter()
            .filter(|c| c.active && c.state == AgentState::Death)
            .map(|c| (c.id, c.kind))
            .collect();
        for (id, kind) in dead {
            if self.pool.release(kind, id)
                && let Some(c) = self.combatants.get_mut(id)
            {
                c.deactivate();
            }
        }
    }

    fn collect_outbound(&mut self) {
        for u in self.stats.drain_updates() {
            self.outbound.push(OutboundMsg::Stats(u));
        }
        for ev in self.director.drain_events() {
            match ev {
                WaveEvent::WaveStart { wave, countdown_s } => self
                    .outbound
                    .push(OutboundMsg::WaveStart(WaveStart { wave, countdown_s })),
                WaveEvent::CoreUnderAttack { hp, max } => self
                    .outbound
                    .push(OutboundMsg::CoreUnderAttack(CoreUnderAttack { hp, max })),
                WaveEvent::CoreDestroyed => {
                    self.outbound.push(OutboundMsg::CoreDestroyed(CoreDestroyed));
                }
                WaveEvent::MatchEnded(outcome) => {
                    self.outbound.push(OutboundMsg::MatchEnded(MatchEnded {
                        victory: outcome == MatchOutcome::Victory,
                    }));
                }
            }
        }
    }
}

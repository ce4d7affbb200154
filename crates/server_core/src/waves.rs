//! Wave sequencing, core hit points, and match-end detection.
//!
//! The director owns a monotonic clock and a flat timer list. Every timer
//! is stamped with the epoch current at scheduling time; beginning or
//! ending a wave bumps the epoch, so a timer that outlives its wave fires
//! as a no-op instead of corrupting a later wave's state.
//!
//! The director never touches the pool or the stat store directly: `update`
//! returns directives (spawn rolls, force-kill, records to persist) for the
//! caller to apply, which keeps the machine deterministic and testable.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use data_runtime::configs::match_rules::MatchRulesCfg;
use data_runtime::configs::waves::WavePlanDb;

use crate::actor::SlimeKind;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WavePhase {
    Ready,
    WaveRunning,
    CoreTargeting,
    WaveEnd,
    MatchEnd,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    Victory,
    Defeat,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum WaveEvent {
    WaveStart { wave: u32, countdown_s: f32 },
    CoreUnderAttack { hp: i32, max: i32 },
    CoreDestroyed,
    MatchEnded(MatchOutcome),
}

/// One enemy to spawn, with the wave's scaling baked in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpawnRequest {
    pub kind: SlimeKind,
    pub health_mul: f32,
    pub damage_mul: f32,
    pub scale_mul: f32,
}

/// Side effects for the caller to apply after `update`.
#[derive(Clone, Debug, Default)]
pub struct WaveDirectives {
    pub spawns: Vec<SpawnRequest>,
    pub force_kill_all: bool,
    pub record_best_wave: Option<u32>,
    pub waves_survived: Option<u32>,
}

#[derive(Copy, Clone, Debug)]
enum TimerKind {
    WaveStart(u32),
    WaveDuration,
    SpawnTick,
}

#[derive(Copy, Clone, Debug)]
struct Timer {
    fire_at_s: f64,
    epoch: u64,
    kind: TimerKind,
}

/// Runtime copy of one wave plan with kinds parsed up front.
#[derive(Clone, Debug)]
struct PlanRt {
    wave: u32,
    composition: Vec<(SlimeKind, f32)>,
    spawn_interval_s: f32,
    duration_s: f32,
    health_mul: f32,
    damage_mul: f32,
    scale_mul: f32,
}

pub struct WaveDirector {
    plans: Vec<PlanRt>,
    final_wave: u32,
    phase: WavePhase,
    wave: u32,
    epoch: u64,
    clock_s: f64,
    timers: Vec<Timer>,
    core_hp: i32,
    core_hp_max: i32,
    start_delay_s: f32,
    rng: ChaCha8Rng,
    spawned_this_wave: u32,
    outcome: Option<MatchOutcome>,
    force_kill_pending: bool,
    events: Vec<WaveEvent>,
}

impl WaveDirector {
    #[must_use]
    pub fn new(plans: &WavePlanDb, rules: &MatchRulesCfg, seed: u64) -> Self {
        let mut rt = Vec::with_capacity(plans.waves.len());
        for p in &plans.waves {
            let mut composition = Vec::with_capacity(p.composition.len());
            for e in &p.composition {
                match SlimeKind::parse(&e.kind) {
                    Some(kind) if e.weight > 0.0 => composition.push((kind, e.weight)),
                    Some(_) => {}
                    None => {
                        log::warn!("wave {}: unknown enemy kind '{}'; skipped", p.wave, e.kind);
                    }
                }
            }
            rt.push(PlanRt {
                wave: p.wave,
                composition,
                spawn_interval_s: p.spawn_interval_s.max(0.1),
                duration_s: p.duration_s.max(1.0),
                health_mul: p.health_mul,
                damage_mul: p.damage_mul,
                scale_mul: p.scale_mul,
            });
        }
        let final_wave = rt.iter().map(|p| p.wave).max().unwrap_or(0);
        Self {
            plans: rt,
            final_wave,
            phase: WavePhase::Ready,
            wave: 0,
            epoch: 0,
            clock_s: 0.0,
            timers: Vec::new(),
            core_hp: rules.core.hp.max(1),
            core_hp_max: rules.core.hp.max(1),
            start_delay_s: rules.wave_start_delay_s.max(0.0),
            rng: ChaCha8Rng::seed_from_u64(seed),
            spawned_this_wave: 0,
            outcome: None,
            force_kill_pending: false,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.wave
    }
    #[must_use]
    pub fn core_hp(&self) -> (i32, i32) {
        (self.core_hp, self.core_hp_max)
    }
    #[must_use]
    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    pub fn drain_events(&mut self) -> Vec<WaveEvent> {
        std::mem::take(&mut self.events)
    }

    /// A player entered the wave trigger. Only meaningful in Ready.
    pub fn on_trigger_enter(&mut self) {
        if self.phase != WavePhase::Ready {
            return;
        }
        if self.final_wave == 0 {
            log::warn!("wave trigger entered but no waves are configured; skipped");
            return;
        }
        self.schedule_wave_start(1);
    }

    /// Incoming core damage. Zero hit points end the match in defeat.
    pub fn core_hit(&mut self, damage: i32) {
        if damage <= 0 || self.phase == WavePhase::MatchEnd || self.core_hp == 0 {
            return;
        }
        self.core_hp = (self.core_hp - damage).max(0);
        self.events.push(WaveEvent::CoreUnderAttack {
            hp: self.core_hp,
            max: self.core_hp_max,
        });
        if self.core_hp == 0 {
            self.events.push(WaveEvent::CoreDestroyed);
            self.end_match(MatchOutcome::Defeat);
            self.force_kill_pending = true;
        }
    }

    /// Advance the clock, fire due timers, and check wave-clear. The caller
    /// reports how many enemies are live and how many creations are still
    /// in flight.
    pub fn update(&mut self, dt: f32, active_enemies: usize, pending_spawns: usize) -> WaveDirectives {
        let mut out = WaveDirectives::default();
        if self.force_kill_pending {
            self.force_kill_pending = false;
            out.force_kill_all = true;
            // Defeat: the wave in progress was not survived.
            out.waves_survived = Some(self.wave.saturating_sub(1));
        }
        if self.phase == WavePhase::MatchEnd {
            return out;
        }
        self.clock_s += f64::from(dt.max(0.0));

        // Fire due timers; scheduling during the drain pushes new entries,
        // which wait until the next update.
        let due: Vec<Timer> = {
            let clock = self.clock_s;
            let (fire, keep): (Vec<Timer>, Vec<Timer>) =
                self.timers.drain(..).partition(|t| t.fire_at_s <= clock);
            self.timers = keep;
            fire
        };
        for timer in due {
            if timer.epoch != self.epoch {
                // Stale: scheduled for a wave that is no longer current.
                metrics::counter!("waves.stale_timers_total").increment(1);
                continue;
            }
            match timer.kind {
                TimerKind::WaveStart(n) => {
                    if matches!(self.phase, WavePhase::Ready | WavePhase::WaveEnd) {
                        self.begin_wave(n, &mut out);
                    }
                }
                TimerKind::WaveDuration => {
                    if self.phase == WavePhase::WaveRunning {
                        log::info!("wave {}: time up, enemies redirect to the core", self.wave);
                        self.phase = WavePhase::CoreTargeting;
                    }
                }
                TimerKind::SpawnTick => {
                    if self.phase == WavePhase::WaveRunning {
                        if let Some(req) = self.roll_spawn() {
                            out.spawns.push(req);
                            self.spawned_this_wave += 1;
                        }
                        let interval = self.current_plan().map(|p| p.spawn_interval_s).unwrap_or(2.0);
                        self.timers.push(Timer {
                            fire_at_s: self.clock_s + f64::from(interval),
                            epoch: self.epoch,
                            kind: TimerKind::SpawnTick,
                        });
                    }
                }
            }
        }

        // Wave clear: both combat phases exit only at zero live enemies,
        // with nothing still spawning in.
        if matches!(self.phase, WavePhase::WaveRunning | WavePhase::CoreTargeting)
            && self.spawned_this_wave > 0
            && active_enemies == 0
            && pending_spawns == 0
        {
            self.end_wave(&mut out);
        }
        out
    }

    fn schedule_wave_start(&mut self, wave: u32) {
        self.timers.push(Timer {
            fire_at_s: self.clock_s + f64::from(self.start_delay_s),
            epoch: self.epoch,
            kind: TimerKind::WaveStart(wave),
        });
        self.events.push(WaveEvent::WaveStart {
            wave,
            countdown_s: self.start_delay_s,
        });
    }

    fn begin_wave(&mut self, wave: u32, out: &mut WaveDirectives) {
        self.wave = wave;
        self.epoch += 1;
        self.phase = WavePhase::WaveRunning;
        self.spawned_this_wave = 0;
        let Some(plan) = self.current_plan().cloned() else {
            log::warn!("wave {wave} has no plan; ending match as victory");
            self.end_match(MatchOutcome::Victory);
            return;
        };
        log::info!("wave {wave} running for {:.0}s", plan.duration_s);
        metrics::counter!("waves.started_total").increment(1);
        self.timers.push(Timer {
            fire_at_s: self.clock_s + f64::from(plan.duration_s),
            epoch: self.epoch,
            kind: TimerKind::WaveDuration,
        });
        // First spawn lands immediately; the cadence timer takes over after.
        if let Some(req) = self.roll_spawn() {
            out.spawns.push(req);
            self.spawned_this_wave += 1;
        }
        self.timers.push(Timer {
            fire_at_s: self.clock_s + f64::from(plan.spawn_interval_s),
            epoch: self.epoch,
            kind: TimerKind::SpawnTick,
        });
    }

    fn end_wave(&mut self, out: &mut WaveDirectives) {
        log::info!("wave {} cleared", self.wave);
        out.record_best_wave = Some(self.wave);
        out.waves_survived = Some(self.wave);
        self.epoch += 1;
        if self.wave >= self.final_wave {
            self.end_match(MatchOutcome::Victory);
        } else {
            self.phase = WavePhase::WaveEnd;
            self.schedule_wave_start(self.wave + 1);
        }
    }

    fn end_match(&mut self, outcome: MatchOutcome) {
        self.phase = WavePhase::MatchEnd;
        self.epoch += 1;
        self.outcome = Some(outcome);
        self.events.push(WaveEvent::MatchEnded(outcome));
        log::info!("match ended: {outcome:?}");
    }

    fn current_plan(&self) -> Option<&PlanRt> {
        self.plans.iter().find(|p| p.wave == self.wave)
    }

    /// Weighted roll over the current wave's composition table.
    fn roll_spawn(&mut self) -> Option<SpawnRequest> {
        let plan = self.current_plan()?.clone();
        if plan.composition.is_empty() {
            return None;
        }
        let total: f32 = plan.composition.iter().map(|(_, w)| w).sum();
        let mut pick = self.rng.random::<f32>() * total;
        let mut chosen = plan.composition[plan.composition.len() - 1].0;
        for &(kind, w) in &plan.composition {
            if pick < w {
                chosen = kind;
                break;
            }
            pick -= w;
        }
        Some(SpawnRequest {
            kind: chosen,
            health_mul: plan.health_mul,
            damage_mul: plan.damage_mul,
            scale_mul: plan.scale_mul,
        })
    }
}

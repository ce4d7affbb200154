//! Headless authoritative match runner.
//!
//! Drives a full co-op survival match on a fixed tick with scripted player
//! attacks, printing wave progress and the final result. Useful for tuning
//! wave plans and for soak-testing the sim without a client.

use anyhow::Result;
use clap::Parser;
use glam::Vec3;
use server_core::{
    AttackRequest, MatchOutcome, OutboundMsg, PlayerId, ServerState, WavePhase, WeaponKind,
};

#[derive(Parser, Debug)]
#[command(name = "coreward", about = "Headless co-op wave-survival match runner")]
struct Args {
    /// RNG seed for wave composition rolls.
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Number of simulated players.
    #[arg(long, default_value_t = 2)]
    players: u32,
    /// Fixed tick length in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u32,
    /// Wall-clock cap on the simulated match.
    #[arg(long, default_value_t = 900)]
    max_secs: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let telemetry_cfg = data_runtime::configs::telemetry::load_default()?;
    let _guard = server_core::telemetry::init_telemetry(&telemetry_cfg)?;

    let mut srv = ServerState::new(args.seed)?;
    let players = args.players.max(1);
    for i in 0..players {
        let a = i as f32 / players as f32 * std::f32::consts::TAU;
        srv.enter_player(
            PlayerId(i + 1),
            Vec3::new(3.0 * a.cos(), 0.6, 3.0 * a.sin()),
        );
    }
    srv.enter_wave_trigger();

    let dt = args.tick_ms.max(1) as f32 / 1000.0;
    let steps = (u64::from(args.max_secs) * 1000 / u64::from(args.tick_ms.max(1))) as u32;
    let classes = [WeaponKind::Melee, WeaponKind::Ranged, WeaponKind::Magic];
    let swing_every = (500 / args.tick_ms.max(1)).max(1); // ~2 swings/s/player

    // Local replication loop: framed message bytes, as a client would see.
    let (tx, rx) = net_core::channel::channel();

    let mut elapsed_s = 0.0f32;
    for step in 0..steps {
        if step % swing_every == 0 {
            script_attacks(&mut srv, &classes, step);
        }
        srv.step_authoritative(dt);
        elapsed_s += dt;
        for msg in srv.drain_outbound() {
            if let OutboundMsg::WaveStart(w) = &msg {
                println!(
                    "[match] wave {} starting in {:.1}s (t={elapsed_s:.1}s)",
                    w.wave, w.countdown_s
                );
            }
            let mut payload = Vec::new();
            msg.encode(&mut payload);
            let mut framed = Vec::new();
            net_core::frame::write_msg(&mut framed, &payload);
            let _ = tx.try_send(framed);
        }
        if srv.director.phase() == WavePhase::MatchEnd {
            break;
        }
    }
    println!("[match] replicated {} messages", rx.drain().len());

    match srv.director.outcome() {
        Some(MatchOutcome::Victory) => {
            println!(
                "[match] result: VICTORY after wave {} at t={elapsed_s:.1}s",
                srv.director.wave()
            );
        }
        Some(MatchOutcome::Defeat) => {
            println!(
                "[match] result: CORE DESTROYED on wave {} at t={elapsed_s:.1}s",
                srv.director.wave()
            );
        }
        None => println!("[match] result: TIME LIMIT at t={elapsed_s:.1}s"),
    }
    for p in &srv.players {
        if let Some(rec) = srv.stats.stats(p.id) {
            println!(
                "[match] player {}: hp {}/{} kills {} waves {}",
                p.id.0, rec.hp, rec.hp_max, rec.slime_kills, rec.waves_survived
            );
        }
    }
    if let Some(best) = srv.best_wave_record() {
        println!("[match] best wave record: {best}");
    }
    Ok(())
}

/// Each player swings at the nearest live slime, cycling weapon classes so
/// all three resolution paths get exercised.
fn script_attacks(srv: &mut ServerState, classes: &[WeaponKind], step: u32) {
    let targets = srv.combatants.targetable_points();
    if targets.is_empty() {
        return;
    }
    let players: Vec<_> = srv.players.clone();
    for (i, p) in players.iter().enumerate() {
        let alive = srv.stats.stats(p.id).map(|s| s.hp > 0).unwrap_or(false);
        if !alive {
            continue;
        }
        let Some((_, nearest)) = targets
            .iter()
            .map(|&(id, pos)| (id, pos))
            .min_by(|a, b| {
                let da = (a.1 - p.pos).length_squared();
                let db = (b.1 - p.pos).length_squared();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
        else {
            continue;
        };
        let weapon = classes[(step as usize / 8 + i) % classes.len()];
        let dir = nearest - p.pos;
        srv.enqueue_attack(AttackRequest {
            player: p.id,
            weapon_entity: 100 + p.id.0,
            weapon,
            origin: p.pos,
            dir,
            params: srv.weapon_params(weapon),
        });
    }
}

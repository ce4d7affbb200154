#![allow(clippy::unwrap_used)]

use data_runtime::configs::match_rules::MatchRulesCfg;
use data_runtime::configs::waves::{CompositionEntry, WavePlan, WavePlanDb};
use data_runtime::configs::weapons::WeaponSpecDb;
use glam::vec3;
use server_core::{
    MatchOutcome, MemoryRecords, OutboundMsg, PassthroughNav, PlayerId, QueuedSpawner, ServerState,
    WavePhase,
};

fn one_wave_server() -> ServerState {
    // Single long wave with a slow cadence: only the opening spawn lands
    // before the test clears the field.
    let plans = WavePlanDb {
        waves: vec![WavePlan {
            wave: 1,
            composition: vec![CompositionEntry {
                kind: "small".into(),
                weight: 1.0,
            }],
            spawn_interval_s: 120.0,
            duration_s: 120.0,
            health_mul: 1.0,
            damage_mul: 1.0,
            scale_mul: 1.0,
        }],
    };
    let rules = MatchRulesCfg {
        wave_start_delay_s: 0.5,
        ..MatchRulesCfg::default()
    };
    ServerState::with_services(
        WeaponSpecDb::builtin(),
        rules,
        &plans,
        11,
        Box::new(QueuedSpawner::new()),
        Box::new(PassthroughNav),
        Box::new(MemoryRecords::default()),
    )
}

#[test]
fn clearing_the_final_wave_ends_the_match_in_victory() {
    let mut s = one_wave_server();
    s.enter_player(PlayerId(1), vec3(0.0, 0.6, 0.0));
    s.enter_wave_trigger();

    // Run until the opening spawn is live.
    let mut guard = 0;
    while s.combatants.targetable_count() == 0 {
        s.step_authoritative(0.25);
        guard += 1;
        assert!(guard < 100, "wave 1 never produced a live slime");
    }
    assert_eq!(s.director.phase(), WavePhase::WaveRunning);

    // Clear the field; the next ticks must settle into victory, not wave 2.
    for c in s.combatants.iter_mut() {
        if c.targetable() {
            let hp = c.hp.hp;
            let _ = c.apply_damage(hp);
        }
    }
    for _ in 0..8 {
        s.step_authoritative(0.25);
    }

    assert_eq!(s.director.phase(), WavePhase::MatchEnd);
    assert_eq!(s.director.outcome(), Some(MatchOutcome::Victory));
    assert_eq!(s.best_wave_record(), Some(1), "best wave persisted");
    assert_eq!(
        s.stats.stats(PlayerId(1)).unwrap().waves_survived,
        1,
        "wave progress recorded on the player"
    );
    let msgs = s.drain_outbound();
    assert!(
        msgs.iter()
            .any(|m| matches!(m, OutboundMsg::MatchEnded(e) if e.victory)),
        "victory notification produced"
    );
}

#![allow(clippy::unwrap_used)]

use glam::vec3;
use net_core::command::AttackParams;
use server_core::{AttackRequest, OutboundMsg, PlayerId, ServerState, SlimeKind, WeaponKind};

fn melee(player: u32) -> AttackRequest {
    AttackRequest {
        player: PlayerId(player),
        weapon_entity: 1,
        weapon: WeaponKind::Melee,
        origin: vec3(0.0, 0.6, 0.0),
        dir: vec3(0.0, 0.0, 1.0),
        params: AttackParams {
            range_m: 3.0,
            arc_deg: 90.0,
            vertical_tolerance_m: 1.5,
            max_targets: 4,
            splash_radius_m: 0.0,
        },
    }
}

#[test]
fn killing_a_slime_scores_the_attacker_and_frees_the_handle() {
    let mut s = ServerState::new(7).unwrap();
    s.enter_player(PlayerId(1), vec3(0.0, 0.6, 0.0));
    let slime = s
        .spawn_slime_at(SlimeKind::Small, vec3(0.0, 0.6, 2.5))
        .unwrap();
    let _ = s.drain_outbound();

    // Small slimes have 20 hp; level-1 melee does 6 per sweep.
    let mut ticks = 0;
    while s.combatants.get(slime).unwrap().targetable() {
        s.enqueue_attack(melee(1));
        s.step_authoritative(0.016);
        ticks += 1;
        assert!(ticks < 20, "slime should die within a few sweeps");
    }

    assert_eq!(ticks, 4, "20 hp / 6 damage lands on the fourth sweep");
    let rec = s.stats.stats(PlayerId(1)).unwrap();
    assert_eq!(rec.slime_kills, 1);
    assert_eq!(
        s.pool.slot(SlimeKind::Small).free_len(),
        1,
        "dead slime goes back to the free list"
    );
    assert_eq!(s.pool.slot(SlimeKind::Small).allocated_len(), 0);

    let msgs = s.drain_outbound();
    let hit_count = msgs
        .iter()
        .filter(|m| matches!(m, OutboundMsg::Hit(_)))
        .count();
    assert_eq!(hit_count, 4, "one hit notification per effective sweep");
    assert!(
        msgs.iter()
            .any(|m| matches!(m, OutboundMsg::Stats(u) if u.slime_kills == 1)),
        "kill counter update reaches the owning player"
    );
}

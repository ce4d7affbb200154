#![allow(clippy::unwrap_used)]

use glam::vec3;
use net_core::command::AttackParams;
use server_core::{AttackRequest, PlayerId, ServerState, SlimeKind, WeaponKind};

#[test]
fn melee_cone_hits_front_enemy_not_closer_back_enemy() {
    let mut s = ServerState::new(7).unwrap();
    s.enter_player(PlayerId(1), vec3(0.0, 0.6, 0.0));
    let front = s
        .spawn_slime_at(SlimeKind::Small, vec3(0.0, 0.6, 2.0))
        .unwrap();
    let behind = s
        .spawn_slime_at(SlimeKind::Small, vec3(0.0, 0.6, -1.0))
        .unwrap();
    let front_hp0 = s.combatants.get(front).unwrap().hp.hp;
    let behind_hp0 = s.combatants.get(behind).unwrap().hp.hp;

    s.enqueue_attack(AttackRequest {
        player: PlayerId(1),
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
    });
    s.step_authoritative(0.016);

    let front_hp1 = s.combatants.get(front).unwrap().hp.hp;
    let behind_hp1 = s.combatants.get(behind).unwrap().hp.hp;
    assert!(
        front_hp1 < front_hp0,
        "enemy in front at distance 2 takes the sweep ({front_hp0} -> {front_hp1})"
    );
    assert_eq!(
        behind_hp1, behind_hp0,
        "enemy behind at distance 1 is outside the cone"
    );
}

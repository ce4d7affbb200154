#![allow(clippy::unwrap_used)]

use glam::vec3;
use net_core::command::AttackParams;
use server_core::{AttackRequest, PlayerId, ServerState, SlimeKind, WeaponKind};

#[test]
fn ranged_shot_damages_direct_target_fully_and_splashes_neighbors() {
    let mut s = ServerState::new(7).unwrap();
    s.enter_player(PlayerId(1), vec3(0.0, 0.6, 0.0));
    let direct = s
        .spawn_slime_at(SlimeKind::Small, vec3(0.0, 0.6, 4.0))
        .unwrap();
    let neighbor = s
        .spawn_slime_at(SlimeKind::Small, vec3(1.0, 0.6, 4.0))
        .unwrap();
    let far = s
        .spawn_slime_at(SlimeKind::Small, vec3(0.0, 0.6, 9.0))
        .unwrap();
    let hp0 = s.combatants.get(direct).unwrap().hp.hp;

    let params = AttackParams {
        range_m: 12.0,
        arc_deg: 30.0,
        vertical_tolerance_m: 2.0,
        max_targets: 1,
        splash_radius_m: 1.5,
    };
    s.enqueue_attack(AttackRequest {
        player: PlayerId(1),
        weapon_entity: 2,
        weapon: WeaponKind::Ranged,
        origin: vec3(0.0, 0.6, 0.0),
        dir: vec3(0.0, 0.0, 1.0),
        params,
    });
    s.step_authoritative(0.016);

    // Level-1 ranged direct damage is 8, splash is 2 (data/config/weapons.toml).
    assert_eq!(s.combatants.get(direct).unwrap().hp.hp, hp0 - 8);
    assert_eq!(
        s.combatants.get(neighbor).unwrap().hp.hp,
        hp0 - 2,
        "neighbor within 1.5m of the impact takes splash only"
    );
    assert_eq!(
        s.combatants.get(far).unwrap().hp.hp,
        hp0,
        "beyond the splash radius nothing happens"
    );
}

#![allow(clippy::unwrap_used)]

use glam::vec3;
use server_core::{ServerState, SlimeKind};

#[test]
fn saturated_pool_recycles_the_oldest_instance_in_place() {
    let mut s = ServerState::new(7).unwrap();
    // Kings are capped at 2 by the shipped match rules.
    let limit = s.pool.slot(SlimeKind::King).limit();
    assert_eq!(limit, 2);

    let first = s
        .spawn_slime_at(SlimeKind::King, vec3(5.0, 0.0, 0.0))
        .unwrap();
    let second = s
        .spawn_slime_at(SlimeKind::King, vec3(-5.0, 0.0, 0.0))
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(s.pool.slot(SlimeKind::King).allocated_len(), 2);
    assert_eq!(s.pool.slot(SlimeKind::King).free_len(), 0);

    // Third spawn with everything allocated: the least-recently-allocated
    // handle is recycled at the new pose, not destroyed.
    let third = s
        .spawn_slime_at(SlimeKind::King, vec3(0.0, 0.0, 9.0))
        .unwrap();
    assert_eq!(third, first, "oldest handle is reused");
    assert_eq!(s.pool.slot(SlimeKind::King).allocated_len(), 2);
    let c = s.combatants.get(third).unwrap();
    assert!(c.targetable());
    assert_eq!(c.tr.pos, vec3(0.0, 0.0, 9.0));
    assert_eq!(c.hp.hp, c.hp.max, "recycled instance is fully re-initialized");

    // A fourth spawn now recycles the other instance.
    let fourth = s
        .spawn_slime_at(SlimeKind::King, vec3(0.0, 0.0, -9.0))
        .unwrap();
    assert_eq!(fourth, second, "eviction refreshes recency");
    assert!(s.pool.invariant_holds());
}

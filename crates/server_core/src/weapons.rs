//! Server-side interpretation of attack requests.
//!
//! The three weapon behaviors are a closed set dispatched by `match`; they
//! share the cone query and differ only in how they fan damage out from it.
//! Resolution is pure: it reads positions and specs and returns the hits
//! and heals for the caller to apply through the stat store / combatants.

use glam::{Vec2, Vec3};

use data_runtime::configs::weapons::{WeaponSpec, WeaponSpecDb};
use net_core::command::AttackParams;

use crate::actor::{ActorId, PlayerId};
use crate::targeting::ConeQuery;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WeaponKind {
    Melee,
    Ranged,
    Magic,
}

impl WeaponKind {
    #[must_use]
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Melee),
            1 => Some(Self::Ranged),
            2 => Some(Self::Magic),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Melee => 0,
            Self::Ranged => 1,
            Self::Magic => 2,
        }
    }
}

/// One attack gesture, validated and consumed exactly once.
#[derive(Clone, Debug)]
pub struct AttackRequest {
    pub player: PlayerId,
    /// Weapon entity id, carried for logging/idempotence only.
    pub weapon_entity: u32,
    pub weapon: WeaponKind,
    pub origin: Vec3,
    pub dir: Vec3,
    pub params: AttackParams,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EnemyHit {
    pub target: ActorId,
    pub damage: i32,
    pub hit_pos: Vec3,
    pub hit_normal: Vec3,
}

#[derive(Clone, Debug, Default)]
pub struct AttackResolution {
    pub hits: Vec<EnemyHit>,
    pub heals: Vec<(PlayerId, i32)>,
}

/// Damage for a 1-based level. Levels past the end of the table extrapolate
/// by adding the overshoot to the last entry.
#[must_use]
pub fn damage_for_level(table: &[i32], level: u32) -> i32 {
    let Some(&last) = table.last() else { return 0 };
    let idx = level.max(1) as usize - 1;
    if idx < table.len() {
        table[idx]
    } else {
        last + (idx - (table.len() - 1)) as i32
    }
}

/// Horizontal unit vector from the hit position back toward the attack
/// origin; zero when they coincide.
fn hit_normal(origin: Vec3, hit_pos: Vec3) -> Vec3 {
    let flat = Vec2::new(origin.x - hit_pos.x, origin.z - hit_pos.z);
    if flat.length_squared() <= 1e-8 {
        return Vec3::ZERO;
    }
    let n = flat.normalize();
    Vec3::new(n.x, 0.0, n.y)
}

/// Actors within `radius` of `center`, ascending by distance, excluding
/// `exclude`, truncated to `cap`.
fn within_radius(
    center: Vec3,
    radius: f32,
    exclude: Option<ActorId>,
    cap: usize,
    candidates: &[(ActorId, Vec3)],
) -> Vec<(ActorId, Vec3, f32)> {
    let r2 = radius * radius;
    let mut out: Vec<(ActorId, Vec3, f32)> = candidates
        .iter()
        .filter(|(id, _)| Some(*id) != exclude)
        .filter_map(|&(id, pos)| {
            let dx = pos.x - center.x;
            let dz = pos.z - center.z;
            let d2 = dx * dx + dz * dz;
            (d2 <= r2).then_some((id, pos, d2))
        })
        .collect();
    out.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));
    out.truncate(cap);
    out
}

/// Resolve one attack request against the current enemy/player positions.
///
/// `enemies` must already be filtered to targetable combatants in store
/// order; `players` to live players. Both are snapshots: resolution never
/// mutates game state itself.
#[must_use]
pub fn resolve(
    req: &AttackRequest,
    db: &WeaponSpecDb,
    level: u32,
    enemies: &[(ActorId, Vec3)],
    players: &[(PlayerId, Vec3)],
) -> AttackResolution {
    let spec: &WeaponSpec = match req.weapon {
        WeaponKind::Melee => &db.melee,
        WeaponKind::Ranged => &db.ranged,
        WeaponKind::Magic => &db.magic,
    };
    let p = &req.params;
    let Some(cone) = ConeQuery::new(
        req.origin,
        req.dir,
        p.range_m,
        p.arc_deg,
        p.vertical_tolerance_m,
        p.max_targets,
    ) else {
        log::debug!(
            "attack from player {:?} rejected: no horizontal facing (weapon entity {})",
            req.player,
            req.weapon_entity
        );
        return AttackResolution::default();
    };
    let damage = damage_for_level(&spec.damage_by_level, level);
    let mut out = AttackResolution::default();

    match req.weapon {
        WeaponKind::Melee => {
            for (id, _d2) in cone.targets(enemies.iter().copied()) {
                let pos = pos_of(enemies, id);
                out.hits.push(EnemyHit {
                    target: id,
                    damage,
                    hit_pos: pos,
                    hit_normal: hit_normal(req.origin, pos),
                });
            }
        }
        WeaponKind::Ranged => {
            let Some((direct, _)) = cone.closest(enemies.iter().copied()) else {
                return out;
            };
            let impact = pos_of(enemies, direct);
            out.hits.push(EnemyHit {
                target: direct,
                damage,
                hit_pos: impact,
                hit_normal: hit_normal(req.origin, impact),
            });
            let splash_r = p.splash_radius_m.max(0.0);
            if splash_r > 0.0 && spec.splash_damage > 0 {
                for (id, pos, _) in within_radius(
                    impact,
                    splash_r,
                    Some(direct),
                    spec.max_enemies_affected as usize,
                    enemies,
                ) {
                    out.hits.push(EnemyHit {
                        target: id,
                        damage: spec.splash_damage,
                        hit_pos: pos,
                        hit_normal: hit_normal(impact, pos),
                    });
                }
            }
        }
        WeaponKind::Magic => {
            // The closest cone target only anchors the burst; every enemy in
            // the radius (anchor included) takes the area damage once.
            let Some((anchor, _)) = cone.closest(enemies.iter().copied()) else {
                return out;
            };
            let center = pos_of(enemies, anchor);
            let burst_r = p.splash_radius_m.max(0.0);
            for (id, pos, _) in within_radius(
                center,
                burst_r,
                None,
                spec.max_enemies_affected as usize,
                enemies,
            ) {
                out.hits.push(EnemyHit {
                    target: id,
                    damage,
                    hit_pos: pos,
                    hit_normal: hit_normal(center, pos),
                });
            }
            let heal = damage_for_level(&spec.heal_by_level, level);
            if heal > 0 {
                let r2 = burst_r * burst_r;
                let mut healed = 0u32;
                for &(pid, pos) in players {
                    if healed >= spec.max_players_healed {
                        break;
                    }
                    let dx = pos.x - center.x;
                    let dz = pos.z - center.z;
                    if dx * dx + dz * dz <= r2 {
                        out.heals.push((pid, heal));
                        healed += 1;
                    }
                }
            }
        }
    }
    out
}

fn pos_of(enemies: &[(ActorId, Vec3)], id: ActorId) -> Vec3 {
    enemies
        .iter()
        .find(|(e, _)| *e == id)
        .map(|(_, p)| *p)
        .unwrap_or(Vec3::ZERO)
}

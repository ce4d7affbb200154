//! Slime movement and contact-melee driver.
//!
//! Operates over plain slices so the functions are easy to test without
//! the full server state. While a wave runs, slimes chase the nearest live
//! player; once the wave flips to core-targeting they converge on the
//! defended objective instead. Melee swings come back as hit lists for the
//! caller to route through the stat store / wave director.

use glam::Vec3;

use crate::actor::PlayerId;
use crate::combatant::{AgentState, Combatant};

const MELEE_PAD_M: f32 = 0.35;
const ATTACK_COOLDOWN_S: f32 = 1.5;

/// What the slimes are converging on this tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AiGoal {
    Players,
    Core,
}

#[derive(Copy, Clone, Debug)]
pub struct PlayerPoint {
    pub id: PlayerId,
    pub pos: Vec3,
    pub radius: f32,
}

#[derive(Copy, Clone, Debug)]
pub struct CorePoint {
    pub pos: Vec3,
    pub radius: f32,
}

#[derive(Debug, Default)]
pub struct MeleeHits {
    pub players: Vec<(PlayerId, i32)>,
    pub core: Vec<i32>,
}

fn nearest_xz(from: Vec3, points: &[PlayerPoint]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, p) in points.iter().enumerate() {
        let dx = p.pos.x - from.x;
        let dz = p.pos.z - from.z;
        let d2 = dx * dx + dz * dz;
        if best.map(|(_, b)| d2 < b).unwrap_or(true) {
            best = Some((i, d2));
        }
    }
    best
}

/// Move each live slime toward its goal and tick cooldowns.
pub fn seek(
    combatants: &mut [Combatant],
    goal: AiGoal,
    players: &[PlayerPoint],
    core: CorePoint,
    dt: f32,
) {
    for c in combatants.iter_mut() {
        if !c.targetable() {
            continue;
        }
        c.attack_cooldown_s = (c.attack_cooldown_s - dt).max(0.0);
        let (target_pos, target_radius) = match goal {
            AiGoal::Core => (core.pos, core.radius),
            AiGoal::Players => match nearest_xz(c.tr.pos, players) {
                Some((i, _)) => (players[i].pos, players[i].radius),
                None => {
                    c.set_state(AgentState::Idle);
                    continue;
                }
            },
        };
        let to = Vec3::new(target_pos.x - c.tr.pos.x, 0.0, target_pos.z - c.tr.pos.z);
        let dist = to.length();
        let contact = c.tr.radius + target_radius + MELEE_PAD_M;
        if dist > contact + 0.02 {
            let step = (c.speed_mps * dt).min(dist - contact);
            if step > 1e-4 {
                c.tr.pos += to.normalize_or_zero() * step;
                c.tr.yaw = to.x.atan2(to.z);
                c.set_state(AgentState::Move);
            }
        } else if c.state == AgentState::Move {
            c.set_state(AgentState::Idle);
        }
    }
}

/// Pairwise XZ push-back so slimes don't stack on one point.
pub fn resolve_collisions(combatants: &mut [Combatant]) {
    let n = combatants.len();
    for i in 0..n {
        if !combatants[i].targetable() {
            continue;
        }
        for j in (i + 1)..n {
            if !combatants[j].targetable() {
                continue;
            }
            let (pi, pj) = (combatants[i].tr.pos, combatants[j].tr.pos);
            let mut dx = pj.x - pi.x;
            let mut dz = pj.z - pi.z;
            let d2 = dx * dx + dz * dz;
            let min_d = combatants[i].tr.radius + combatants[j].tr.radius;
            if d2 < min_d * min_d {
                let d = d2.sqrt().max(1e-4);
                dx /= d;
                dz /= d;
                let push = (min_d - d) * 0.5;
                combatants[i].tr.pos.x -= dx * push;
                combatants[i].tr.pos.z -= dz * push;
                combatants[j].tr.pos.x += dx * push;
                combatants[j].tr.pos.z += dz * push;
            }
        }
    }
}

/// Swing at the goal when in contact and off cooldown.
pub fn melee(
    combatants: &mut [Combatant],
    goal: AiGoal,
    players: &[PlayerPoint],
    core: CorePoint,
) -> MeleeHits {
    let mut hits = MeleeHits::default();
    for c in combatants.iter_mut() {
        if !c.targetable() || c.attack_cooldown_s > 0.0 {
            continue;
        }
        let (target_pos, target_radius, player) = match goal {
            AiGoal::Core => (core.pos, core.radius, None),
            AiGoal::Players => match nearest_xz(c.tr.pos, players) {
                Some((i, _)) => (players[i].pos, players[i].radius, Some(players[i].id)),
                None => continue,
            },
        };
        let dx = target_pos.x - c.tr.pos.x;
        let dz = target_pos.z - c.tr.pos.z;
        let dist = (dx * dx + dz * dz).sqrt();
        let reach = c.tr.radius + target_radius + MELEE_PAD_M;
        if dist <= reach + 0.05 {
            match player {
                Some(id) => hits.players.push((id, c.damage)),
                None => hits.core.push(c.damage),
            }
            c.attack_cooldown_s = ATTACK_COOLDOWN_S;
            c.set_state(AgentState::Attack);
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorId, SlimeKind, Transform};

    fn slime_at(id: u32, pos: Vec3) -> Combatant {
        let mut c = Combatant::new(ActorId(id), SlimeKind::Small);
        c.activate(
            Transform {
                pos,
                yaw: 0.0,
                radius: 0.6,
            },
            20,
            5,
        );
        c
    }

    fn core() -> CorePoint {
        CorePoint {
            pos: Vec3::new(0.0, 0.0, 30.0),
            radius: 1.6,
        }
    }

    #[test]
    fn seeks_nearest_player_and_hits_on_contact() {
        let mut slimes = vec![slime_at(1, Vec3::new(-3.0, 0.0, 0.0))];
        let players = vec![PlayerPoint {
            id: PlayerId(1),
            pos: Vec3::ZERO,
            radius: 0.7,
        }];
        seek(&mut slimes, AiGoal::Players, &players, core(), 0.5);
        assert!(slimes[0].tr.pos.x > -3.0, "moved toward the player");
        assert_eq!(slimes[0].state, AgentState::Move);
        // Teleport into contact and swing.
        slimes[0].tr.pos = Vec3::new(-1.0, 0.0, 0.0);
        let hits = melee(&mut slimes, AiGoal::Players, &players, core());
        assert_eq!(hits.players, vec![(PlayerId(1), 5)]);
        assert!(hits.core.is_empty());
        assert_eq!(slimes[0].state, AgentState::Attack);
        // Cooldown gates the next swing.
        let hits = melee(&mut slimes, AiGoal::Players, &players, core());
        assert!(hits.players.is_empty());
    }

    #[test]
    fn core_goal_redirects_movement_and_damage() {
        let mut slimes = vec![slime_at(1, Vec3::new(0.0, 0.0, 28.0))];
        let players = vec![PlayerPoint {
            id: PlayerId(1),
            pos: Vec3::ZERO,
            radius: 0.7,
        }];
        let hits = melee(&mut slimes, AiGoal::Core, &players, core());
        assert_eq!(hits.core, vec![5], "in reach of the core");
        assert!(hits.players.is_empty());
    }

    #[test]
    fn dead_slimes_neither_move_nor_swing() {
        let mut slimes = vec![slime_at(1, Vec3::new(-1.0, 0.0, 0.0))];
        slimes[0].apply_damage(999);
        let players = vec![PlayerPoint {
            id: PlayerId(1),
            pos: Vec3::ZERO,
            radius: 0.7,
        }];
        let before = slimes[0].tr.pos;
        seek(&mut slimes, AiGoal::Players, &players, core(), 0.5);
        assert_eq!(slimes[0].tr.pos, before);
        let hits = melee(&mut slimes, AiGoal::Players, &players, core());
        assert!(hits.players.is_empty());
    }

    #[test]
    fn overlapping_slimes_get_pushed_apart() {
        let mut slimes = vec![
            slime_at(1, Vec3::new(0.0, 0.0, 0.0)),
            slime_at(2, Vec3::new(0.1, 0.0, 0.0)),
        ];
        resolve_collisions(&mut slimes);
        let dx = slimes[1].tr.pos.x - slimes[0].tr.pos.x;
        assert!(dx > 0.1, "overlap reduced: {dx}");
    }
}

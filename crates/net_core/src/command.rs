//! Client->server commands (authoritative input/actions).
//! Minimal binary encoding with a leading tag distinct from notifications.

use crate::snapshot::{SnapshotDecode, take, take_u8};

pub const TAG_CLIENT_CMD: u8 = 0xC1;

/// Resolved attack parameters forwarded by the weapon's input wrapper.
///
/// The server re-normalizes all of these before use; the wire carries what
/// the weapon entity was configured with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackParams {
    pub range_m: f32,
    pub arc_deg: f32,
    pub vertical_tolerance_m: f32,
    pub max_targets: u32,
    pub splash_radius_m: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientCmd {
    Attack {
        player: u32,
        weapon_entity: u32,
        weapon: u8,
        pos: [f32; 3],
        dir: [f32; 3],
        params: AttackParams,
    },
    CoreHit {
        damage: i32,
    },
}

impl ClientCmd {
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_CLIENT_CMD);
        match self {
            ClientCmd::Attack {
                player,
                weapon_entity,
                weapon,
                pos,
                dir,
                params,
            } => {
                out.push(0);
                out.extend_from_slice(&player.to_le_bytes());
                out.extend_from_slice(&weapon_entity.to_le_bytes());
                out.push(*weapon);
                for c in pos {
                    out.extend_from_slice(&c.to_le_bytes());
                }
                for c in dir {
                    out.extend_from_slice(&c.to_le_bytes());
                }
                out.extend_from_slice(&params.range_m.to_le_bytes());
                out.extend_from_slice(&params.arc_deg.to_le_bytes());
                out.extend_from_slice(&params.vertical_tolerance_m.to_le_bytes());
                out.extend_from_slice(&params.max_targets.to_le_bytes());
                out.extend_from_slice(&params.splash_radius_m.to_le_bytes());
            }
            ClientCmd::CoreHit { damage } => {
                out.push(1);
                out.extend_from_slice(&damage.to_le_bytes());
            }
        }
    }
}

impl SnapshotDecode for ClientCmd {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        use anyhow::bail;
        if take_u8(inp)? != TAG_CLIENT_CMD {
            bail!("not a client cmd tag");
        }
        let kind = take_u8(inp)?;
        match kind {
            0 => {
                let player = u32::from_le_bytes(take::<4>(inp)?);
                let weapon_entity = u32::from_le_bytes(take::<4>(inp)?);
                let weapon = take_u8(inp)?;
                let mut pos = [0.0f32; 3];
                for v in &mut pos {
                    *v = f32::from_le_bytes(take::<4>(inp)?);
                }
                let mut dir = [0.0f32; 3];
                for v in &mut dir {
                    *v = f32::from_le_bytes(take::<4>(inp)?);
                }
                let params = AttackParams {
                    range_m: f32::from_le_bytes(take::<4>(inp)?),
                    arc_deg: f32::from_le_bytes(take::<4>(inp)?),
                    vertical_tolerance_m: f32::from_le_bytes(take::<4>(inp)?),
                    max_targets: u32::from_le_bytes(take::<4>(inp)?),
                    splash_radius_m: f32::from_le_bytes(take::<4>(inp)?),
                };
                Ok(Self::Attack {
                    player,
                    weapon_entity,
                    weapon,
                    pos,
                    dir,
                    params,
                })
            }
            1 => Ok(Self::CoreHit {
                damage: i32::from_le_bytes(take::<4>(inp)?),
            }),
            k => bail!("unknown client cmd kind: {k}"),
        }
    }
}

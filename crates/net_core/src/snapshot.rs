//! Server->client notification messages and their encode/decode traits.
//!
//! Encoding stays deliberately simple: a tag byte followed by fixed-width
//! little-endian fields. Later phases can swap in deltas without changing
//! the traits.

/// Types implementing encoding write themselves into a byte buffer.
pub trait SnapshotEncode {
    fn encode(&self, out: &mut Vec<u8>);
}

/// Types implementing decoding reconstruct themselves from a byte slice.
pub trait SnapshotDecode: Sized {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self>;
}

/// Consume exactly `N` bytes from the front of `inp`.
pub(crate) fn take<const N: usize>(inp: &mut &[u8]) -> anyhow::Result<[u8; N]> {
    if inp.len() < N {
        anyhow::bail!("short read");
    }
    let (a, b) = inp.split_at(N);
    *inp = b;
    let mut buf = [0u8; N];
    buf.copy_from_slice(a);
    Ok(buf)
}

pub(crate) fn take_u8(inp: &mut &[u8]) -> anyhow::Result<u8> {
    let b = inp
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("short read"))?;
    *inp = &inp[1..];
    Ok(b)
}

pub const TAG_HIT: u8 = 0xA1;
pub const TAG_STATS: u8 = 0xA2;
pub const TAG_WAVE_START: u8 = 0xA3;
pub const TAG_CORE_UNDER_ATTACK: u8 = 0xA4;
pub const TAG_CORE_DESTROYED: u8 = 0xA5;
pub const TAG_MATCH_ENDED: u8 = 0xA6;

/// Delivered to a hit combatant so the client can play impact feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitNotification {
    pub target: u32,
    pub hit_pos: [f32; 3],
    pub hit_normal: [f32; 3],
    pub source_player: u32,
    pub damage: i32,
    pub weapon: u8,
}

impl SnapshotEncode for HitNotification {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_HIT);
        out.extend_from_slice(&self.target.to_le_bytes());
        for c in &self.hit_pos {
            out.extend_from_slice(&c.to_le_bytes());
        }
        for c in &self.hit_normal {
            out.extend_from_slice(&c.to_le_bytes());
        }
        out.extend_from_slice(&self.source_player.to_le_bytes());
        out.extend_from_slice(&self.damage.to_le_bytes());
        out.push(self.weapon);
    }
}

impl SnapshotDecode for HitNotification {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        if take_u8(inp)? != TAG_HIT {
            anyhow::bail!("not a hit notification");
        }
        let target = u32::from_le_bytes(take::<4>(inp)?);
        let mut hit_pos = [0.0f32; 3];
        for v in &mut hit_pos {
            *v = f32::from_le_bytes(take::<4>(inp)?);
        }
        let mut hit_normal = [0.0f32; 3];
        for v in &mut hit_normal {
            *v = f32::from_le_bytes(take::<4>(inp)?);
        }
        let source_player = u32::from_le_bytes(take::<4>(inp)?);
        let damage = i32::from_le_bytes(take::<4>(inp)?);
        let weapon = take_u8(inp)?;
        Ok(Self {
            target,
            hit_pos,
            hit_normal,
            source_player,
            damage,
            weapon,
        })
    }
}

/// Authoritative stat record pushed to the owning player after every patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsUpdate {
    pub player: u32,
    pub hp: i32,
    pub hp_max: i32,
    pub defense: i32,
    pub melee_level: u32,
    pub ranged_level: u32,
    pub magic_level: u32,
    pub slime_kills: u32,
    pub waves_survived: u32,
}

impl SnapshotEncode for StatsUpdate {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_STATS);
        out.extend_from_slice(&self.player.to_le_bytes());
        out.extend_from_slice(&self.hp.to_le_bytes());
        out.extend_from_slice(&self.hp_max.to_le_bytes());
        out.extend_from_slice(&self.defense.to_le_bytes());
        out.extend_from_slice(&self.melee_level.to_le_bytes());
        out.extend_from_slice(&self.ranged_level.to_le_bytes());
        out.extend_from_slice(&self.magic_level.to_le_bytes());
        out.extend_from_slice(&self.slime_kills.to_le_bytes());
        out.extend_from_slice(&self.waves_survived.to_le_bytes());
    }
}

impl SnapshotDecode for StatsUpdate {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        if take_u8(inp)? != TAG_STATS {
            anyhow::bail!("not a stats update");
        }
        Ok(Self {
            player: u32::from_le_bytes(take::<4>(inp)?),
            hp: i32::from_le_bytes(take::<4>(inp)?),
            hp_max: i32::from_le_bytes(take::<4>(inp)?),
            defense: i32::from_le_bytes(take::<4>(inp)?),
            melee_level: u32::from_le_bytes(take::<4>(inp)?),
            ranged_level: u32::from_le_bytes(take::<4>(inp)?),
            magic_level: u32::from_le_bytes(take::<4>(inp)?),
            slime_kills: u32::from_le_bytes(take::<4>(inp)?),
            waves_survived: u32::from_le_bytes(take::<4>(inp)?),
        })
    }
}

/// Announces an upcoming wave with its countdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveStart {
    pub wave: u32,
    pub countdown_s: f32,
}

impl SnapshotEncode for WaveStart {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_WAVE_START);
        out.extend_from_slice(&self.wave.to_le_bytes());
        out.extend_from_slice(&self.countdown_s.to_le_bytes());
    }
}

impl SnapshotDecode for WaveStart {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        if take_u8(inp)? != TAG_WAVE_START {
            anyhow::bail!("not a wave start");
        }
        Ok(Self {
            wave: u32::from_le_bytes(take::<4>(inp)?),
            countdown_s: f32::from_le_bytes(take::<4>(inp)?),
        })
    }
}

/// Core hit-point change broadcast while the objective is taking damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreUnderAttack {
    pub hp: i32,
    pub max: i32,
}

impl SnapshotEncode for CoreUnderAttack {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_CORE_UNDER_ATTACK);
        out.extend_from_slice(&self.hp.to_le_bytes());
        out.extend_from_slice(&self.max.to_le_bytes());
    }
}

impl SnapshotDecode for CoreUnderAttack {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        if take_u8(inp)? != TAG_CORE_UNDER_ATTACK {
            anyhow::bail!("not a core-under-attack");
        }
        Ok(Self {
            hp: i32::from_le_bytes(take::<4>(inp)?),
            max: i32::from_le_bytes(take::<4>(inp)?),
        })
    }
}

/// Terminal match result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchEnded {
    pub victory: bool,
}

impl SnapshotEncode for MatchEnded {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_MATCH_ENDED);
        out.push(u8::from(self.victory));
    }
}

impl SnapshotDecode for MatchEnded {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        if take_u8(inp)? != TAG_MATCH_ENDED {
            anyhow::bail!("not a match-ended");
        }
        Ok(Self {
            victory: take_u8(inp)? != 0,
        })
    }
}

/// Terminal defeat notification; carries no fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreDestroyed;

impl SnapshotEncode for CoreDestroyed {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(TAG_CORE_DESTROYED);
    }
}

impl SnapshotDecode for CoreDestroyed {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        if take_u8(inp)? != TAG_CORE_DESTROYED {
            anyhow::bail!("not a core-destroyed");
        }
        Ok(Self)
    }
}

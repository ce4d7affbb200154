#![allow(clippy::unwrap_used)]

use net_core::snapshot::{
    CoreDestroyed, CoreUnderAttack, HitNotification, MatchEnded, SnapshotDecode, SnapshotEncode,
    StatsUpdate, WaveStart,
};

#[test]
fn hit_notification_roundtrip() {
    let msg = HitNotification {
        target: 42,
        hit_pos: [1.0, 0.6, -3.5],
        hit_normal: [0.0, 0.0, 1.0],
        source_player: 7,
        damage: 12,
        weapon: 1,
    };
    let mut buf = Vec::new();
    msg.encode(&mut buf);
    let mut slice = &buf[..];
    let got = HitNotification::decode(&mut slice).unwrap();
    assert_eq!(got, msg);
    assert!(slice.is_empty(), "decode should consume the payload");
}

#[test]
fn stats_update_roundtrip() {
    let msg = StatsUpdate {
        player: 3,
        hp: 55,
        hp_max: 100,
        defense: 4,
        melee_level: 2,
        ranged_level: 1,
        magic_level: 9,
        slime_kills: 120,
        waves_survived: 8,
    };
    let mut buf = Vec::new();
    msg.encode(&mut buf);
    let got = StatsUpdate::decode(&mut &buf[..]).unwrap();
    assert_eq!(got, msg);
}

#[test]
fn wave_and_core_roundtrips() {
    let mut buf = Vec::new();
    WaveStart {
        wave: 5,
        countdown_s: 3.0,
    }
    .encode(&mut buf);
    let ws = WaveStart::decode(&mut &buf[..]).unwrap();
    assert_eq!(ws.wave, 5);

    buf.clear();
    CoreUnderAttack { hp: 90, max: 100 }.encode(&mut buf);
    let cu = CoreUnderAttack::decode(&mut &buf[..]).unwrap();
    assert_eq!(cu.hp, 90);

    buf.clear();
    CoreDestroyed.encode(&mut buf);
    assert!(CoreDestroyed::decode(&mut &buf[..]).is_ok());

    buf.clear();
    MatchEnded { victory: true }.encode(&mut buf);
    let me = MatchEnded::decode(&mut &buf[..]).unwrap();
    assert!(me.victory);
}

#[test]
fn decode_rejects_wrong_tag() {
    let mut buf = Vec::new();
    CoreDestroyed.encode(&mut buf);
    assert!(StatsUpdate::decode(&mut &buf[..]).is_err());
}

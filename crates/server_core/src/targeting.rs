//! Cone queries over live combatants: the one spatial filter shared by all
//! three weapon behaviors.
//!
//! All distances are horizontal (XZ); the vertical axis only participates
//! through the tolerance band. Ties at equal distance keep the caller's
//! iteration order, so results are deterministic for a given store order.

use glam::{Vec2, Vec3};

use crate::actor::ActorId;

#[derive(Copy, Clone, Debug)]
pub struct ConeQuery {
    origin: Vec3,
    /// Unit forward on the XZ plane.
    forward_xz: Vec2,
    range: f32,
    /// Half-angle cosine precomputed from the clamped arc.
    cos_half_arc: f32,
    vertical_tolerance: f32,
    max_targets: usize,
}

impl ConeQuery {
    /// Build a query, normalizing every parameter. Returns `None` when the
    /// facing direction has no horizontal component — nothing is "in front"
    /// of a straight-down look.
    #[must_use]
    pub fn new(
        origin: Vec3,
        forward: Vec3,
        range: f32,
        arc_deg: f32,
        vertical_tolerance: f32,
        max_targets: u32,
    ) -> Option<Self> {
        let flat = Vec2::new(forward.x, forward.z);
        if flat.length_squared() <= 1e-8 {
            return None;
        }
        let arc = arc_deg.clamp(1.0, 180.0);
        Some(Self {
            origin,
            forward_xz: flat.normalize(),
            range: range.max(0.0),
            cos_half_arc: (arc.to_radians() * 0.5).cos(),
            vertical_tolerance: vertical_tolerance.max(0.0),
            max_targets: max_targets.max(1) as usize,
        })
    }

    /// Admission test; returns the horizontal squared distance on success.
    fn admit(&self, pos: Vec3) -> Option<f32> {
        let dy = pos.y - self.origin.y;
        if dy.abs() > self.vertical_tolerance {
            return None;
        }
        let flat = Vec2::new(pos.x - self.origin.x, pos.z - self.origin.z);
        let d2 = flat.length_squared();
        if d2 > self.range * self.range {
            return None;
        }
        // A candidate at the origin is always in front.
        if d2 <= f32::EPSILON {
            return Some(0.0);
        }
        let dot = (flat / d2.sqrt()).dot(self.forward_xz);
        if dot < self.cos_half_arc {
            return None;
        }
        Some(d2)
    }

    /// All admitted candidates, ascending by distance, truncated to
    /// `max_targets`. The sort is stable: equal distances keep iteration
    /// order.
    #[must_use]
    pub fn targets<I>(&self, candidates: I) -> Vec<(ActorId, f32)>
    where
        I: IntoIterator<Item = (ActorId, Vec3)>,
    {
        let mut out: Vec<(ActorId, f32)> = candidates
            .into_iter()
            .filter_map(|(id, pos)| self.admit(pos).map(|d2| (id, d2)))
            .collect();
        out.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        out.truncate(self.max_targets);
        out
    }

    /// Single closest admitted candidate; short-circuits once a candidate
    /// sits exactly at the origin, since nothing can beat distance zero.
    #[must_use]
    pub fn closest<I>(&self, candidates: I) -> Option<(ActorId, f32)>
    where
        I: IntoIterator<Item = (ActorId, Vec3)>,
    {
        let mut best: Option<(ActorId, f32)> = None;
        for (id, pos) in candidates {
            let Some(d2) = self.admit(pos) else { continue };
            if d2 == 0.0 {
                return Some((id, 0.0));
            }
            if best.map(|(_, b)| d2 < b).unwrap_or(true) {
                best = Some((id, d2));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[(ActorId, f32)]) -> Vec<u32> {
        v.iter().map(|(id, _)| id.0).collect()
    }

    #[test]
    fn zero_horizontal_facing_rejects_the_query() {
        assert!(ConeQuery::new(Vec3::ZERO, Vec3::Y, 5.0, 90.0, 1.0, 4).is_none());
    }

    #[test]
    fn behind_is_never_returned() {
        let q = ConeQuery::new(Vec3::ZERO, Vec3::Z, 5.0, 90.0, 1.0, 8).expect("facing");
        let got = q.targets(vec![
            (ActorId(1), Vec3::new(0.0, 0.0, 2.0)),  // front
            (ActorId(2), Vec3::new(0.0, 0.0, -1.0)), // behind, closer
        ]);
        assert_eq!(ids(&got), vec![1]);
    }

    #[test]
    fn sorted_ascending_and_truncated() {
        let q = ConeQuery::new(Vec3::ZERO, Vec3::Z, 10.0, 120.0, 1.0, 2).expect("facing");
        let got = q.targets(vec![
            (ActorId(1), Vec3::new(0.0, 0.0, 6.0)),
            (ActorId(2), Vec3::new(0.0, 0.0, 2.0)),
            (ActorId(3), Vec3::new(0.0, 0.0, 4.0)),
        ]);
        assert_eq!(ids(&got), vec![2, 3], "nearest two, nearest first");
    }

    #[test]
    fn equal_distances_keep_iteration_order() {
        let q = ConeQuery::new(Vec3::ZERO, Vec3::Z, 10.0, 120.0, 1.0, 8).expect("facing");
        let got = q.targets(vec![
            (ActorId(7), Vec3::new(1.0, 0.0, 2.0)),
            (ActorId(3), Vec3::new(-1.0, 0.0, 2.0)),
        ]);
        assert_eq!(ids(&got), vec![7, 3]);
    }

    #[test]
    fn vertical_tolerance_band() {
        let q = ConeQuery::new(Vec3::ZERO, Vec3::Z, 10.0, 90.0, 1.5, 8).expect("facing");
        let got = q.targets(vec![
            (ActorId(1), Vec3::new(0.0, 1.0, 3.0)),
            (ActorId(2), Vec3::new(0.0, 2.0, 3.0)), // above the band
        ]);
        assert_eq!(ids(&got), vec![1]);
    }

    #[test]
    fn candidate_at_origin_counts_as_in_front_and_short_circuits() {
        let q = ConeQuery::new(Vec3::ZERO, Vec3::Z, 5.0, 1.0, 1.0, 8).expect("facing");
        let got = q.closest(vec![
            (ActorId(1), Vec3::new(0.0, 0.0, 1.0)),
            (ActorId(2), Vec3::ZERO),
            (ActorId(3), Vec3::new(0.0, 0.0, 0.5)),
        ]);
        assert_eq!(got, Some((ActorId(2), 0.0)));
    }

    #[test]
    fn arc_clamp_admits_side_targets_at_wide_angles() {
        // 360 clamps to 180: anything not strictly behind is admitted.
        let q = ConeQuery::new(Vec3::ZERO, Vec3::Z, 5.0, 360.0, 1.0, 8).expect("facing");
        let got = q.targets(vec![(ActorId(1), Vec3::new(3.0, 0.0, 0.0))]);
        assert_eq!(ids(&got), vec![1]);
    }
}

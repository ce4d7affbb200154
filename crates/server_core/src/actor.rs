//! Ids, kind tags and small value types shared by the server systems.

use glam::Vec3;

/// Opaque handle for a pooled enemy instance. Stable for the lifetime of the
/// match; pools recycle the backing record, they never drop it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActorId(pub u32);

/// Stable id of a connected player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlayerId(pub u32);

/// Enemy kind tag, set at creation time and checked by equality — never by
/// type inspection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlimeKind {
    Small,
    Large,
    King,
}

impl SlimeKind {
    pub const COUNT: usize = 3;
    pub const ALL: [SlimeKind; Self::COUNT] = [Self::Small, Self::Large, Self::King];

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Small => 0,
            Self::Large => 1,
            Self::King => 2,
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "small" => Some(Self::Small),
            "large" => Some(Self::Large),
            "king" => Some(Self::King),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Large => "large",
            Self::King => "king",
        }
    }

    /// Unscaled baseline stats; wave plans multiply on top of these.
    #[must_use]
    pub fn base_hp(self) -> i32 {
        match self {
            Self::Small => 20,
            Self::Large => 60,
            Self::King => 220,
        }
    }

    #[must_use]
    pub fn base_damage(self) -> i32 {
        match self {
            Self::Small => 5,
            Self::Large => 12,
            Self::King => 25,
        }
    }

    #[must_use]
    pub fn base_radius_m(self) -> f32 {
        match self {
            Self::Small => 0.6,
            Self::Large => 1.0,
            Self::King => 1.8,
        }
    }

    #[must_use]
    pub fn base_speed_mps(self) -> f32 {
        match self {
            Self::Small => 2.4,
            Self::Large => 1.6,
            Self::King => 1.1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Health {
    pub hp: i32,
    pub max: i32,
}

impl Health {
    #[inline]
    #[must_use]
    pub fn alive(&self) -> bool {
        self.hp > 0
    }
    #[inline]
    pub fn clamp(&mut self) {
        if self.hp > self.max {
            self.hp = self.max;
        }
        if self.hp < 0 {
            self.hp = 0;
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Transform {
    pub pos: Vec3,
    pub yaw: f32,
    pub radius: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            yaw: 0.0,
            radius: 0.5,
        }
    }
}

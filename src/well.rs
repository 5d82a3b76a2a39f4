use {
    crate::*,
    glam::I64Vec2,
    static_assertions::const_assert,
    std::collections::HashSet,
};

/// A per-column description of the topmost settled terrain: the distance from the running max
/// height down to each column's highest settled cell, saturating at `MAX_DEPTH`.
///
/// The saturation keeps the space of distinct profiles finite, so a simulation must revisit a
/// (catalog phase, jet phase, profile) triple after boundedly many settled units.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SurfaceProfile([i64; Well::WIDTH as usize]);

impl SurfaceProfile {
    /// Deep enough that terrain below the lookback window can't affect where a falling unit comes
    /// to rest.
    pub const MAX_DEPTH: i64 = 64_i64;
}

/// The well: settled material over integer coordinates, bounded by walls at `x == -1` and
/// `x == WIDTH`, and by the floor at `y == 0`. Rows `y >= 1` are occupiable.
pub struct Well {
    settled: HashSet<I64Vec2>,
    column_tops: [i64; Self::WIDTH as usize],
    max_height: i64,
}

// The occupancy set is an unordered sparse map, so dropping rows far below the surface is purely
// a memory optimization. The retained window must cover the profile lookback.
const_assert!(Well::RETAINED_DEPTH > SurfaceProfile::MAX_DEPTH);

impl Well {
    pub const WIDTH: i64 = 7_i64;
    const COMPACT_TRIGGER_LEN: usize = 1_usize << 14_u32;
    const RETAINED_DEPTH: i64 = 1_i64 << 10_i64;

    pub fn new() -> Self {
        Self {
            settled: HashSet::new(),
            column_tops: [0_i64; Self::WIDTH as usize],
            max_height: 0_i64,
        }
    }

    /// Whether a point collides with settled material, the walls, or the floor.
    pub fn is_occupied(&self, pos: I64Vec2) -> bool {
        pos.y <= 0_i64
            || pos.x < 0_i64
            || pos.x >= Self::WIDTH
            || self.settled.contains(&pos)
    }

    /// The highest settled row, 0 while the well is empty.
    #[inline]
    pub fn max_height(&self) -> i64 {
        self.max_height
    }

    /// Commits an already-positioned unit's points as settled material.
    ///
    /// The caller guarantees every point is an unoccupied in-bounds position.
    pub fn settle(&mut self, unit: &Unit) {
        for point in unit.points().iter().copied() {
            self.settled.insert(point);

            let column_top: &mut i64 = &mut self.column_tops[point.x as usize];

            *column_top = (*column_top).max(point.y);
            self.max_height = self.max_height.max(point.y);
        }

        if self.settled.len() >= Self::COMPACT_TRIGGER_LEN {
            self.compact();
        }
    }

    pub fn surface_profile(&self) -> SurfaceProfile {
        let mut depths: [i64; Self::WIDTH as usize] = [0_i64; Self::WIDTH as usize];

        for (depth, column_top) in depths.iter_mut().zip(self.column_tops.iter().copied()) {
            *depth = (self.max_height - column_top).min(SurfaceProfile::MAX_DEPTH);
        }

        SurfaceProfile(depths)
    }

    fn compact(&mut self) {
        let horizon: i64 = self.max_height - Self::RETAINED_DEPTH;

        self.settled.retain(|point: &I64Vec2| point.y > horizon);
    }
}

impl Default for Well {
    fn default() -> Self {
        Self::new()
    }
}

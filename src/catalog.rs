use {
    glam::I64Vec2,
    strum::{EnumCount, EnumIter, IntoEnumIterator},
};

/// The five reference unit shapes, in spawn order.
#[derive(Clone, Copy, Debug, Default, EnumCount, EnumIter, PartialEq)]
#[repr(usize)]
pub enum UnitKind {
    #[default]
    HorizontalLine,
    Plus,
    RightAngle,
    VerticalLine,
    Square,
}

impl UnitKind {
    const POINTS: [&'static [I64Vec2]; UnitKind::COUNT] = [
        &[
            I64Vec2::new(0_i64, 0_i64),
            I64Vec2::new(1_i64, 0_i64),
            I64Vec2::new(2_i64, 0_i64),
            I64Vec2::new(3_i64, 0_i64),
        ],
        &[
            I64Vec2::new(1_i64, 0_i64),
            I64Vec2::new(0_i64, 1_i64),
            I64Vec2::new(1_i64, 1_i64),
            I64Vec2::new(2_i64, 1_i64),
            I64Vec2::new(1_i64, 2_i64),
        ],
        &[
            I64Vec2::new(0_i64, 0_i64),
            I64Vec2::new(1_i64, 0_i64),
            I64Vec2::new(2_i64, 0_i64),
            I64Vec2::new(2_i64, 1_i64),
            I64Vec2::new(2_i64, 2_i64),
        ],
        &[
            I64Vec2::new(0_i64, 0_i64),
            I64Vec2::new(0_i64, 1_i64),
            I64Vec2::new(0_i64, 2_i64),
            I64Vec2::new(0_i64, 3_i64),
        ],
        &[
            I64Vec2::new(0_i64, 0_i64),
            I64Vec2::new(1_i64, 0_i64),
            I64Vec2::new(0_i64, 1_i64),
            I64Vec2::new(1_i64, 1_i64),
        ],
    ];
    pub const MAX_WIDTH: i64 = Self::max_extent(false);
    pub const MAX_HEIGHT: i64 = Self::max_extent(true);

    pub const fn points(self) -> &'static [I64Vec2] {
        Self::POINTS[self as usize]
    }

    const fn max_extent(vertical: bool) -> i64 {
        let mut max_coordinate: i64 = 0_i64;
        let mut kind_index: usize = 0_usize;

        while kind_index < Self::COUNT {
            let points: &[I64Vec2] = Self::POINTS[kind_index];
            let mut point_index: usize = 0_usize;

            while point_index < points.len() {
                let point: I64Vec2 = points[point_index];
                let coordinate: i64 = if vertical { point.y } else { point.x };

                if coordinate > max_coordinate {
                    max_coordinate = coordinate;
                }

                point_index += 1_usize;
            }

            kind_index += 1_usize;
        }

        max_coordinate + 1_i64
    }
}

/// A rigid falling shape: an immutable set of points at a canonical origin, with non-negative
/// coordinates and its bottom-left corner touching both axes.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    points: Vec<I64Vec2>,
}

impl Unit {
    pub fn new(points: Vec<I64Vec2>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[I64Vec2] {
        &self.points
    }

    /// The highest occupied row, relative to the unit's origin.
    pub fn top(&self) -> i64 {
        self.points
            .iter()
            .map(|point: &I64Vec2| point.y)
            .max()
            .unwrap_or_default()
    }

    pub fn translated(&self, offset: I64Vec2) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|point: &I64Vec2| *point + offset)
                .collect(),
        }
    }
}

impl From<UnitKind> for Unit {
    fn from(unit_kind: UnitKind) -> Self {
        Self {
            points: unit_kind.points().to_vec(),
        }
    }
}

/// An ordered sequence of units, spawned cyclically by an ever-increasing counter.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog(Vec<Unit>);

impl Catalog {
    pub fn new(units: Vec<Unit>) -> Self {
        Self(units)
    }

    /// The reference catalog: all `UnitKind`s in spawn order.
    pub fn reference() -> Self {
        Self(UnitKind::iter().map(Unit::from).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The catalog index for the given spawn counter.
    ///
    /// The catalog must be non-empty.
    pub fn phase(&self, units_spawned: u64) -> usize {
        (units_spawned % self.0.len() as u64) as usize
    }

    pub fn unit(&self, units_spawned: u64) -> &Unit {
        &self.0[self.phase(units_spawned)]
    }
}

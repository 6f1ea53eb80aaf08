//! Multi-resolution spatial index over triangle footprints.
//!
//! The index is a fixed-depth quadtree over the tile's `(u, v)` square. Level
//! `l` splits the square into cells of `2^(15 - l)` units, so level 15 cells
//! are one unit wide and level 10 cells are 32 units wide. Each triangle is
//! assigned to exactly one level, picked from the size of its bounding box,
//! and registered in every cell of that level its bounding box overlaps.
//! Lookups return candidates only: callers still test containment.

use crate::vertices::Vertices;

/// Coarsest level held by the index.
pub const MIN_LEVEL: u8 = 10;
/// Finest level held by the index.
pub const MAX_LEVEL: u8 = 15;

/// Width of a cell at `level`, in `(u, v)` units.
#[must_use]
pub const fn cell_size(level: u8) -> u32 {
    1 << (MAX_LEVEL - level)
}

/// Number of cells along each axis at `level`.
#[must_use]
pub const fn cells_per_side(level: u8) -> u32 {
    1 << level
}

/// Level for a triangle whose bounding box is `size` units on its longer side.
///
/// Computes `15 - ceil(log2(size))` clamped to `10..=15`. Sizes 0 and 1 both
/// land at level 15.
#[must_use]
pub fn level_for_size(size: u32) -> u8 {
    let ceil_log2 = if size <= 1 {
        0
    } else {
        u32::BITS - (size - 1).leading_zeros()
    };
    let level = u32::from(MAX_LEVEL).saturating_sub(ceil_log2);
    level.clamp(u32::from(MIN_LEVEL), u32::from(MAX_LEVEL)) as u8
}

/// Axis-aligned footprint of a triangle in `(u, v)` space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub min_u: u16,
    pub min_v: u16,
    pub max_u: u16,
    pub max_v: u16,
}

impl Footprint {
    /// Bounding box of the triangle `[a, b, c]`.
    #[must_use]
    pub fn of_triangle(vertices: &Vertices, triangle: [u32; 3]) -> Self {
        let [a, b, c] = triangle.map(|i| i as usize);
        Self {
            min_u: vertices.u[a].min(vertices.u[b]).min(vertices.u[c]),
            min_v: vertices.v[a].min(vertices.v[b]).min(vertices.v[c]),
            max_u: vertices.u[a].max(vertices.u[b]).max(vertices.u[c]),
            max_v: vertices.v[a].max(vertices.v[b]).max(vertices.v[c]),
        }
    }

    /// Length of the longer side.
    #[must_use]
    pub fn size(&self) -> u32 {
        u32::from(self.max_u - self.min_u).max(u32::from(self.max_v - self.min_v))
    }
}

/// A triangle's registration in one row of cells: cells `min_x..=max_x` of
/// row `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowSpan {
    y: u32,
    min_x: u32,
    max_x: u32,
    triangle_id: u32,
}

/// Spatial index from quadtree cell to the triangles overlapping it.
///
/// A triangle covers a rectangle of cells at its level. The rectangle is
/// stored as one span per cell row rather than one entry per cell, so a
/// triangle as wide as the tile costs 1024 spans at level 10, not a million
/// cells.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    /// Row spans per level, indexed by `level - MIN_LEVEL` and sorted by
    /// `(y, min_x, triangle_id)`.
    levels: [Vec<RowSpan>; (MAX_LEVEL - MIN_LEVEL + 1) as usize],
    /// Assigned level of every triangle, indexed by triangle id.
    triangle_levels: Vec<u8>,
}

impl SpatialIndex {
    /// Build the index over a decoded triangle list.
    ///
    /// `indices` must hold whole triangles whose ids are valid for
    /// `vertices`.
    #[must_use]
    pub fn build(vertices: &Vertices, indices: &[u32]) -> Self {
        let mut index = Self {
            triangle_levels: Vec::with_capacity(indices.len() / 3),
            ..Self::default()
        };

        for (triangle_id, triangle) in indices.chunks_exact(3).enumerate() {
            let footprint = Footprint::of_triangle(vertices, [triangle[0], triangle[1], triangle[2]]);
            index.insert(triangle_id as u32, footprint);
        }

        for spans in &mut index.levels {
            spans.sort_unstable_by_key(|span| (span.y, span.min_x, span.triangle_id));
            spans.shrink_to_fit();
        }

        index
    }

    fn insert(&mut self, triangle_id: u32, footprint: Footprint) {
        let level = level_for_size(footprint.size());
        let size = cell_size(level);
        let spans = &mut self.levels[usize::from(level - MIN_LEVEL)];

        let (min_x, max_x) = (
            u32::from(footprint.min_u) / size,
            u32::from(footprint.max_u) / size,
        );
        for y in u32::from(footprint.min_v) / size..=u32::from(footprint.max_v) / size {
            spans.push(RowSpan {
                y,
                min_x,
                max_x,
                triangle_id,
            });
        }

        self.triangle_levels.push(level);
    }

    /// Triangles registered in cell `(x, y)` at `level`, in ascending order
    /// of the leftmost cell they cover.
    ///
    /// Out-of-range levels and cell coordinates are clamped to the nearest
    /// valid value. The result is a candidate set that may contain triangles
    /// that do not cover any given point of the cell.
    pub fn lookup(&self, level: i32, x: i64, y: i64) -> impl Iterator<Item = u32> + '_ {
        let level = level.clamp(i32::from(MIN_LEVEL), i32::from(MAX_LEVEL)) as u8;
        let max_cell = i64::from(cells_per_side(level) - 1);
        let x = x.clamp(0, max_cell) as u32;
        let y = y.clamp(0, max_cell) as u32;

        let spans = &self.levels[usize::from(level - MIN_LEVEL)];
        let start = spans.partition_point(|span| span.y < y);
        let end = spans.partition_point(|span| span.y <= y);

        spans[start..end]
            .iter()
            .take_while(move |span| span.min_x <= x)
            .filter(move |span| span.max_x >= x)
            .map(|span| span.triangle_id)
    }

    /// Candidate triangles for the point `(u, v)` at `level`.
    pub fn candidates(&self, level: u8, u: f64, v: f64) -> impl Iterator<Item = u32> + '_ {
        let size = f64::from(cell_size(level));
        self.lookup(
            i32::from(level),
            (u / size).floor() as i64,
            (v / size).floor() as i64,
        )
    }

    /// Level a triangle was assigned to, if the id is valid.
    #[must_use]
    pub fn triangle_level(&self, triangle_id: u32) -> Option<u8> {
        self.triangle_levels.get(triangle_id as usize).copied()
    }

    /// Number of triangles in the index.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangle_levels.len()
    }

    /// Number of stored row spans across all levels.
    #[must_use]
    pub fn span_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }
}

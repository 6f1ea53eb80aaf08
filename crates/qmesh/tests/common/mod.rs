//! A small quantized-mesh encoder for building test tiles.

#![allow(dead_code)]

use qmesh::TileKey;
use qmesh::geo::geodetic_to_ecef;
use qmesh::tiling::{GeodeticTilingScheme, TilingScheme};

pub const MAX: u16 = 32767;

/// Route `tracing` output through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn zigzag_encode(delta: i32) -> u16 {
    ((delta << 1) ^ (delta >> 31)) as u16
}

/// Builds the bytes of a regular grid tile.
///
/// Vertices are numbered in order of first use by the triangle list, as the
/// high-water-mark coding requires.
pub struct TileBuilder {
    key: TileKey,
    min_height: f32,
    max_height: f32,
    u: Vec<u16>,
    v: Vec<u16>,
    height: Vec<u16>,
    indices: Vec<u32>,
}

impl TileBuilder {
    /// A grid of `divisions` by `divisions` cells over the tile `key`, with
    /// quantized heights from `height(u, v)`.
    pub fn grid(key: TileKey, divisions: u16, height: impl Fn(u16, u16) -> u16) -> Self {
        let coordinate = |i: u16| (u32::from(i) * u32::from(MAX) / u32::from(divisions)) as u16;
        let side = u32::from(divisions) + 1;
        let id = |i: u16, j: u16| u32::from(j) * side + u32::from(i);

        let mut triangles = Vec::new();
        for j in 0..divisions {
            for i in 0..divisions {
                let (sw, se, nw, ne) = (id(i, j), id(i + 1, j), id(i, j + 1), id(i + 1, j + 1));
                triangles.extend([sw, se, ne, sw, ne, nw]);
            }
        }

        // Renumber by first appearance.
        let mut order = vec![u32::MAX; (side * side) as usize];
        let mut next = 0;
        let mut builder = Self {
            key,
            min_height: 0.0,
            max_height: f32::from(MAX),
            u: Vec::new(),
            v: Vec::new(),
            height: Vec::new(),
            indices: Vec::with_capacity(triangles.len()),
        };
        for grid_id in triangles {
            let slot = &mut order[grid_id as usize];
            if *slot == u32::MAX {
                *slot = next;
                next += 1;
                let (i, j) = ((grid_id % side) as u16, (grid_id / side) as u16);
                let (u, v) = (coordinate(i), coordinate(j));
                builder.u.push(u);
                builder.v.push(v);
                builder.height.push(height(u, v));
            }
            builder.indices.push(*slot);
        }
        builder
    }

    /// Height range in meters covered by the quantized heights.
    pub fn heights(mut self, min_height: f32, max_height: f32) -> Self {
        self.min_height = min_height;
        self.max_height = max_height;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.u.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// `(u, v, height)` of every vertex.
    pub fn vertices(&self) -> Vec<(u16, u16, u16)> {
        (0..self.u.len())
            .map(|i| (self.u[i], self.v[i], self.height[i]))
            .collect()
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        // Header: the center sits in the middle of the tile.
        let bounds = GeodeticTilingScheme.tile_bounds(self.key);
        let center = geodetic_to_ecef(
            (bounds.south + bounds.north) / 2.0,
            (bounds.west + bounds.east) / 2.0,
            0.0,
        );
        for value in center.to_array() {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&self.min_height.to_le_bytes());
        bytes.extend_from_slice(&self.max_height.to_le_bytes());
        for value in center.to_array() {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&10_000.0f64.to_le_bytes());
        for value in center.to_array() {
            bytes.extend_from_slice(&value.to_le_bytes());
        }

        // Vertices.
        bytes.extend_from_slice(&(self.u.len() as u32).to_le_bytes());
        for run in [&self.u, &self.v, &self.height] {
            let mut previous = 0i32;
            for &value in run {
                let value = i32::from(value);
                bytes.extend_from_slice(&zigzag_encode(value - previous).to_le_bytes());
                previous = value;
            }
        }

        // Triangles, high-water-mark coded.
        bytes.extend_from_slice(&(self.triangle_count() as u32).to_le_bytes());
        let mut highest = 0u32;
        for &index in &self.indices {
            let code = highest - index;
            if code == 0 {
                highest += 1;
            }
            bytes.extend_from_slice(&(code as u16).to_le_bytes());
        }

        // Edges, in stream order west, south, east, north.
        let west: Vec<u32> = self.ids_where(|u, _| u == 0);
        let south: Vec<u32> = self.ids_where(|_, v| v == 0);
        let east: Vec<u32> = self.ids_where(|u, _| u == MAX);
        let north: Vec<u32> = self.ids_where(|_, v| v == MAX);
        for edge in [west, south, east, north] {
            bytes.extend_from_slice(&(edge.len() as u32).to_le_bytes());
            for index in edge {
                bytes.extend_from_slice(&(index as u16).to_le_bytes());
            }
        }

        bytes
    }

    fn ids_where(&self, predicate: impl Fn(u16, u16) -> bool) -> Vec<u32> {
        // Reverse order so the decoder has to sort.
        (0..self.u.len() as u32)
            .rev()
            .filter(|&i| predicate(self.u[i as usize], self.v[i as usize]))
            .collect()
    }
}

/// Tile-local `(u, v)` to `(lat, lon)` under the geodetic scheme.
pub fn uv_to_lat_lon(key: TileKey, u: f64, v: f64) -> (f64, f64) {
    GeodeticTilingScheme.uv_to_lat_lon(key, u, v)
}

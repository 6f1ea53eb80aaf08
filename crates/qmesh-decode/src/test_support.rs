//! Encoders used to build tiles in tests.

use crate::header::TileHeader;
use crate::indices::IndexWidth;

pub fn zigzag_encode(delta: i32) -> u16 {
    ((delta << 1) ^ (delta >> 31)) as u16
}

pub fn high_water_mark_encode(indices: &[u32]) -> Vec<u32> {
    let mut highest = 0;
    indices
        .iter()
        .map(|&index| {
            let code = highest - index;
            if code == 0 {
                highest += 1;
            }
            code
        })
        .collect()
}

/// Appends tile sections to a byte buffer.
#[derive(Debug, Default)]
pub struct TileWriter {
    bytes: Vec<u8>,
}

impl TileWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    fn f64(&mut self, value: f64) {
        self.raw(&value.to_le_bytes());
    }

    fn index(&mut self, width: IndexWidth, value: u32) {
        match width {
            IndexWidth::U16 => self.raw(&(value as u16).to_le_bytes()),
            IndexWidth::U32 => self.raw(&value.to_le_bytes()),
        }
    }

    pub fn header(&mut self, header: &TileHeader) {
        for value in header.center.to_array() {
            self.f64(value);
        }
        self.raw(&header.min_height.to_le_bytes());
        self.raw(&header.max_height.to_le_bytes());
        for value in header.bounding_sphere.center.to_array() {
            self.f64(value);
        }
        self.f64(header.bounding_sphere.radius);
        for value in header.horizon_occlusion_point.to_array() {
            self.f64(value);
        }
    }

    pub fn vertices(&mut self, u: &[u16], v: &[u16], height: &[u16]) {
        self.raw(&(u.len() as u32).to_le_bytes());
        for run in [u, v, height] {
            let mut previous = 0i32;
            for &value in run {
                let value = i32::from(value);
                self.raw(&zigzag_encode(value - previous).to_le_bytes());
                previous = value;
            }
        }
    }

    pub fn triangles(&mut self, vertex_count: usize, indices: &[u32]) {
        let width = IndexWidth::for_vertex_count(vertex_count);
        while self.bytes.len() % width.size() != 0 {
            self.bytes.push(0);
        }
        self.raw(&((indices.len() / 3) as u32).to_le_bytes());
        for code in high_water_mark_encode(indices) {
            self.index(width, code);
        }
    }

    pub fn edge_block(&mut self, vertex_count: usize, indices: &[u32]) {
        let width = IndexWidth::for_vertex_count(vertex_count);
        self.raw(&(indices.len() as u32).to_le_bytes());
        for &index in indices {
            self.index(width, index);
        }
    }

    pub fn extension(&mut self, id: u8, data: &[u8]) {
        self.raw(&[id]);
        self.raw(&(data.len() as u32).to_le_bytes());
        self.raw(data);
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

//! Terrain tile configuration.

use std::fmt;
use std::sync::Arc;

use crate::datum::GeoidModel;
use crate::tiling::{GeodeticTilingScheme, TilingScheme};

/// Default distance, in `(u, v)` units, a query may fall outside the tile and
/// still be clamped onto it.
pub const DEFAULT_EDGE_TOLERANCE: f64 = 1e-6;

/// Collaborators and tolerances shared by terrain tiles.
///
/// Cloning is cheap; tiles of one dataset normally share a single config.
#[derive(Clone)]
pub struct TerrainConfig {
    pub tiling: Arc<dyn TilingScheme>,
    /// Geoid used for height-above-ellipsoid queries. HAE queries return NaN
    /// when this is `None`.
    pub geoid: Option<Arc<dyn GeoidModel>>,
    pub edge_tolerance: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tiling: Arc::new(GeodeticTilingScheme),
            geoid: None,
            edge_tolerance: DEFAULT_EDGE_TOLERANCE,
        }
    }
}

impl TerrainConfig {
    #[must_use]
    pub fn with_tiling(mut self, tiling: impl TilingScheme + 'static) -> Self {
        self.tiling = Arc::new(tiling);
        self
    }

    #[must_use]
    pub fn with_geoid(mut self, geoid: impl GeoidModel + 'static) -> Self {
        self.geoid = Some(Arc::new(geoid));
        self
    }

    #[must_use]
    pub fn with_edge_tolerance(mut self, edge_tolerance: f64) -> Self {
        self.edge_tolerance = edge_tolerance.max(0.0);
        self
    }
}

impl fmt::Debug for TerrainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerrainConfig")
            .field("geoid", &self.geoid.is_some())
            .field("edge_tolerance", &self.edge_tolerance)
            .finish_non_exhaustive()
    }
}

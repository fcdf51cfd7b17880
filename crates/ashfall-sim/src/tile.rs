//! Static level geometry.
//!
//! Tiles are immutable once placed. The simulation never indexes them
//! spatially beyond a margin cull; callers hand the resolver a frame's worth of
//! nearby tiles through [`GeometrySource`].

use std::str::FromStr;

use ashfall_common::{ConfigError, Rect};
use serde::{Deserialize, Serialize};

/// Orientation of a diagonal slope tile.
///
/// Every slope is a floor ramp, solid below the diagonal. `Ascend*` names the
/// side the surface climbs toward; `Descend*` names the side it drops toward,
/// so `DescendRight` is the ramp `AscendLeft` describes from the other end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeOrientation {
    /// Surface climbs toward negative x
    AscendLeft,
    /// Surface climbs toward positive x
    AscendRight,
    /// Surface drops toward negative x
    DescendLeft,
    /// Surface drops toward positive x
    DescendRight,
}

impl SlopeOrientation {
    /// Whether the surface is highest at the tile's right edge.
    #[must_use]
    pub const fn rises_right(self) -> bool {
        matches!(self, Self::AscendRight | Self::DescendLeft)
    }

    /// Y of the slope surface at `x` (clamped into the tile's span).
    ///
    /// For a right-rising ramp this is `bottom - (x - left)` on a square tile;
    /// left-rising ramps mirror it. Non-square tiles scale the run by
    /// `height / width`.
    #[must_use]
    pub fn surface_y(self, rect: &Rect, x: f32) -> f32 {
        let x = x.clamp(rect.x, rect.right());
        let rise = if rect.width > 0.0 {
            rect.height / rect.width
        } else {
            1.0
        };
        if self.rises_right() {
            rect.bottom() - (x - rect.x) * rise
        } else {
            rect.bottom() - (rect.right() - x) * rise
        }
    }
}

impl FromStr for SlopeOrientation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascend_left" => Ok(Self::AscendLeft),
            "ascend_right" => Ok(Self::AscendRight),
            "descend_left" => Ok(Self::DescendLeft),
            "descend_right" => Ok(Self::DescendRight),
            other => Err(ConfigError::InvalidTileOrientation(other.to_string())),
        }
    }
}

/// Collision category of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Blocks from every side
    Solid,
    /// Blocks only actors falling onto it from above
    OneWay,
    /// 45-degree ramp
    Slope(SlopeOrientation),
}

impl TileKind {
    /// Whether the ground check treats this tile as standable.
    #[must_use]
    pub const fn is_ground(self) -> bool {
        matches!(self, Self::Solid | Self::OneWay)
    }
}

/// A placed piece of static geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Collision category
    pub kind: TileKind,
    /// Bounding box
    pub rect: Rect,
}

impl Tile {
    /// Creates a tile.
    #[must_use]
    pub const fn new(kind: TileKind, rect: Rect) -> Self {
        Self { kind, rect }
    }

    /// Solid block.
    #[must_use]
    pub const fn solid(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(TileKind::Solid, Rect::new(x, y, width, height))
    }

    /// One-way platform.
    #[must_use]
    pub const fn one_way(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(TileKind::OneWay, Rect::new(x, y, width, height))
    }

    /// Diagonal slope.
    #[must_use]
    pub const fn slope(orientation: SlopeOrientation, x: f32, y: f32, size: f32) -> Self {
        Self::new(TileKind::Slope(orientation), Rect::new(x, y, size, size))
    }
}

/// Tile description as it appears in level data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSpec {
    /// `solid`, `one_way` or `slope`
    pub kind: String,
    /// Required for slopes
    #[serde(default)]
    pub orientation: Option<String>,
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl TryFrom<TileSpec> for Tile {
    type Error = ConfigError;

    fn try_from(spec: TileSpec) -> Result<Self, Self::Error> {
        let kind = match spec.kind.as_str() {
            "solid" => TileKind::Solid,
            "one_way" => TileKind::OneWay,
            "slope" => {
                let orientation = spec.orientation.as_deref().unwrap_or_default();
                TileKind::Slope(orientation.parse()?)
            },
            other => return Err(ConfigError::UnknownTileKind(other.to_string())),
        };
        Ok(Self::new(
            kind,
            Rect::new(spec.x, spec.y, spec.width, spec.height),
        ))
    }
}

/// Source of the tiles near an actor.
///
/// Implementations must return tiles in insertion order; the resolver decides
/// the iteration order from there.
pub trait GeometrySource {
    /// Tiles that may touch `bounds` this tick.
    fn nearby_tiles(&self, bounds: &Rect) -> Vec<Tile>;
}

/// Flat list of tiles culled by a fixed margin around the query bounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileLayer {
    tiles: Vec<Tile>,
    margin: f32,
}

#[derive(Deserialize)]
struct TileFile {
    #[serde(default)]
    tile: Vec<TileSpec>,
}

impl TileLayer {
    /// Creates an empty layer with the given culling margin.
    #[must_use]
    pub fn new(margin: f32) -> Self {
        Self {
            tiles: Vec::new(),
            margin,
        }
    }

    /// Margin added around query bounds before culling.
    #[must_use]
    pub fn margin(&self) -> f32 {
        self.margin
    }

    /// Replaces the culling margin.
    pub fn set_margin(&mut self, margin: f32) {
        self.margin = margin;
    }

    /// Appends a tile. Later tiles win ties under reverse-insertion order.
    pub fn push(&mut self, tile: Tile) {
        self.tiles.push(tile);
    }

    /// Adds a tile (builder form).
    #[must_use]
    pub fn with(mut self, tile: Tile) -> Self {
        self.push(tile);
        self
    }

    /// All tiles in insertion order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True if the layer holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Parses `[[tile]]` entries from TOML.
    pub fn from_toml_str(content: &str, margin: f32) -> Result<Self, ConfigError> {
        let file: TileFile = toml::from_str(content)?;
        let mut layer = Self::new(margin);
        for spec in file.tile {
            layer.push(Tile::try_from(spec)?);
        }
        Ok(layer)
    }
}

impl GeometrySource for TileLayer {
    fn nearby_tiles(&self, bounds: &Rect) -> Vec<Tile> {
        let area = bounds.expanded(self.margin);
        self.tiles
            .iter()
            .filter(|tile| tile.rect.intersects(&area))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope_surface_ascend_right() {
        let rect = Rect::new(0.0, 0.0, 32.0, 32.0);
        let slope = SlopeOrientation::AscendRight;
        assert_eq!(slope.surface_y(&rect, 0.0), 32.0);
        assert_eq!(slope.surface_y(&rect, 16.0), 16.0);
        assert_eq!(slope.surface_y(&rect, 32.0), 0.0);
    }

    #[test]
    fn test_slope_surface_mirrors() {
        let rect = Rect::new(0.0, 0.0, 32.0, 32.0);
        assert_eq!(SlopeOrientation::AscendLeft.surface_y(&rect, 8.0), 8.0);
        assert_eq!(SlopeOrientation::DescendRight.surface_y(&rect, 8.0), 8.0);
        assert_eq!(SlopeOrientation::DescendLeft.surface_y(&rect, 8.0), 24.0);
    }

    #[test]
    fn test_descend_names_mirror_ascend() {
        let rect = Rect::new(0.0, 0.0, 32.0, 32.0);
        for x in [0.0, 5.0, 16.0, 31.0] {
            assert_eq!(
                SlopeOrientation::DescendRight.surface_y(&rect, x),
                SlopeOrientation::AscendLeft.surface_y(&rect, x)
            );
            assert_eq!(
                SlopeOrientation::DescendLeft.surface_y(&rect, x),
                SlopeOrientation::AscendRight.surface_y(&rect, x)
            );
        }
    }

    #[test]
    fn test_slope_surface_clamps_outside_span() {
        let rect = Rect::new(10.0, 0.0, 32.0, 32.0);
        assert_eq!(SlopeOrientation::AscendRight.surface_y(&rect, -50.0), 32.0);
    }

    #[test]
    fn test_orientation_parse() {
        assert_eq!(
            "descend_left".parse::<SlopeOrientation>().ok(),
            Some(SlopeOrientation::DescendLeft)
        );
        assert!(matches!(
            "sideways".parse::<SlopeOrientation>(),
            Err(ConfigError::InvalidTileOrientation(_))
        ));
    }

    #[test]
    fn test_tile_spec_conversion() {
        let spec = TileSpec {
            kind: "slope".into(),
            orientation: Some("ascend_left".into()),
            x: 0.0,
            y: 0.0,
            width: 16.0,
            height: 16.0,
        };
        let tile = Tile::try_from(spec).expect("valid slope");
        assert_eq!(tile.kind, TileKind::Slope(SlopeOrientation::AscendLeft));
    }

    #[test]
    fn test_slope_without_orientation_fails() {
        let spec = TileSpec {
            kind: "slope".into(),
            orientation: None,
            x: 0.0,
            y: 0.0,
            width: 16.0,
            height: 16.0,
        };
        assert!(matches!(
            Tile::try_from(spec),
            Err(ConfigError::InvalidTileOrientation(_))
        ));
    }

    #[test]
    fn test_unknown_kind_fails() {
        let content = r#"
            [[tile]]
            kind = "lava"
            x = 0.0
            y = 0.0
            width = 32.0
            height = 32.0
        "#;
        assert!(matches!(
            TileLayer::from_toml_str(content, 32.0),
            Err(ConfigError::UnknownTileKind(_))
        ));
    }

    #[test]
    fn test_layer_culls_far_tiles() {
        let layer = TileLayer::new(16.0)
            .with(Tile::solid(0.0, 40.0, 32.0, 32.0))
            .with(Tile::solid(500.0, 40.0, 32.0, 32.0))
            .with(Tile::one_way(32.0, 40.0, 32.0, 8.0));

        let nearby = layer.nearby_tiles(&Rect::new(10.0, 0.0, 32.0, 32.0));
        assert_eq!(nearby.len(), 2);
        assert_eq!(nearby[0].kind, TileKind::Solid);
        assert_eq!(nearby[1].kind, TileKind::OneWay);
    }
}

//! Tile collision resolution.
//!
//! Each nearby tile is checked in a fixed sequence, every correction applying
//! on top of the previous one:
//! 1. ground check (Solid/OneWay) clears `falling`
//! 2. bottom band lands on Solid, or on OneWay while `vel_y >= 0`
//! 3. horizontal band pushes out of Solid
//! 4. top band bumps the underside of Solid
//! 5. slopes snap the feet to the diagonal while not rising
//!
//! Because corrections accumulate, the result depends on tile order; see
//! [`TileOrder`].

use ashfall_common::Rect;
use serde::{Deserialize, Serialize};

use crate::hitbox::{bottom_band, ground_check_band, horizontal_band, top_band};
use crate::physics::{Body, PhysicsConfig};
use crate::tile::{SlopeOrientation, Tile, TileKind};

/// Slack used when comparing an edge against where it was last tick.
const CONTACT_EPSILON: f32 = 0.01;

/// Order in which a frame's tiles are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileOrder {
    /// Most recently placed tile first
    #[default]
    ReverseInsertion,
    /// Closest tile centre first; equal distances fall back to reverse insertion
    NearestFirst,
}

/// What the resolver touched this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contact {
    /// Ground check found something to stand on
    pub grounded: bool,
    /// Feet were snapped onto a tile top
    pub landed: bool,
    /// Head was pushed below a tile
    pub ceiling: bool,
    /// Pushed out of a wall
    pub wall: bool,
    /// Snapped to a slope surface
    pub slope: bool,
    /// Landing cancelled a knockback
    pub ended_knockback: bool,
}

/// Returns `tiles` in resolution order.
#[must_use]
pub fn ordered_tiles(bounds: &Rect, tiles: &[Tile], order: TileOrder) -> Vec<Tile> {
    let mut ordered: Vec<Tile> = tiles.iter().rev().copied().collect();
    if order == TileOrder::NearestFirst {
        // Stable sort keeps reverse insertion for ties.
        ordered.sort_by(|a, b| {
            bounds
                .center_distance_sq(&a.rect)
                .total_cmp(&bounds.center_distance_sq(&b.rect))
        });
    }
    ordered
}

/// Resolves a moved body against nearby tiles.
pub fn resolve(body: &mut Body, tiles: &[Tile], config: &PhysicsConfig) -> Contact {
    let mut contact = Contact::default();
    for tile in ordered_tiles(&body.bounds(), tiles, config.tile_order) {
        resolve_tile(body, &tile, config, &mut contact);
    }
    contact
}

fn resolve_tile(body: &mut Body, tile: &Tile, config: &PhysicsConfig, contact: &mut Contact) {
    match tile.kind {
        TileKind::Slope(orientation) => {
            resolve_slope(body, &tile.rect, orientation, config, contact);
        },
        kind if kind.is_ground() => resolve_block(body, tile, config, contact),
        _ => {},
    }
}

fn resolve_block(body: &mut Body, tile: &Tile, config: &PhysicsConfig, contact: &mut Contact) {
    let rect = &tile.rect;
    if ground_check_band(&body.bounds(), config.ground_check_height).intersects(rect) {
        body.falling = false;
        contact.grounded = true;
    }

    let blocks_feet = tile.kind == TileKind::Solid || body.vel_y >= 0.0;
    if blocks_feet && landing_sweep(body).intersects(rect) && crossed_top_edge(body, rect) {
        land(body, rect.y, contact);
    }

    if tile.kind != TileKind::Solid {
        return;
    }

    let band = horizontal_band(&body.bounds(), body.vel_x);
    if band.intersects(rect) {
        if body.x - rect.x < 0.0 {
            body.x = rect.x - band.width;
        } else {
            body.x = rect.right();
        }
        contact.wall = true;
    }

    if top_band(&body.bounds()).intersects(rect) && crossed_bottom_edge(body, rect) {
        body.y = rect.bottom();
        body.vel_y = 0.0;
        contact.ceiling = true;
    }
}

/// Bottom band stretched up to where the feet were last tick, so a fall at
/// terminal velocity cannot skip a platform thinner than one tick of travel.
fn landing_sweep(body: &Body) -> Rect {
    let band = bottom_band(&body.bounds());
    let top = band.y.min(body.prev_bounds().bottom());
    Rect::new(band.x, top, band.width, band.bottom() - top)
}

/// The tile's top edge was reached this tick (from above) or sits inside the
/// bottom band. Walls reaching past the band are left to the horizontal check.
fn crossed_top_edge(body: &Body, rect: &Rect) -> bool {
    let band = bottom_band(&body.bounds());
    body.prev_bounds().bottom() <= rect.y + CONTACT_EPSILON || band.y <= rect.y
}

/// Mirror of [`crossed_top_edge`] for ceilings.
fn crossed_bottom_edge(body: &Body, rect: &Rect) -> bool {
    let band = top_band(&body.bounds());
    body.prev_y >= rect.bottom() - CONTACT_EPSILON || band.bottom() >= rect.bottom()
}

fn land(body: &mut Body, surface_y: f32, contact: &mut Contact) {
    body.y = surface_y - body.height as f32;
    body.vel_y = 0.0;
    body.jumping = false;
    body.falling = false;
    contact.landed = true;
    contact.grounded = true;
    if body.knocked_back {
        body.knocked_back = false;
        body.vel_x = 0.0;
        contact.ended_knockback = true;
    }
}

fn resolve_slope(
    body: &mut Body,
    rect: &Rect,
    orientation: SlopeOrientation,
    config: &PhysicsConfig,
    contact: &mut Contact,
) {
    let bounds = body.bounds();
    let foot_x = bounds.center_x();
    if body.vel_y < 0.0 || !rect.spans_x(foot_x) {
        return;
    }

    let surface = orientation.surface_y(rect, foot_x);
    let feet = bounds.bottom();
    if feet < surface - config.slope_snap {
        return;
    }

    let prev = body.prev_bounds();
    let prev_surface = orientation.surface_y(rect, prev.center_x());
    let was_above = prev.bottom() <= prev_surface + config.slope_snap;
    let shallow = feet - surface <= bounds.height / 5.0;
    if !(was_above || shallow) {
        return;
    }

    land(body, surface, contact);
    contact.slope = true;
}

//! Actor kinematics.
//!
//! This module provides the per-tick motion integration for actors:
//! gravity with a terminal velocity clamp, position advance, facing
//! tracking, and the hand-off to the collision resolver.

use ashfall_common::{Direction, Rect};
use serde::{Deserialize, Serialize};

use crate::collision::{self, Contact, TileOrder};
use crate::tile::Tile;

/// Physics tuning shared by every actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Added to vertical velocity every tick (positive = down)
    pub gravity: f32,
    /// Maximum downward velocity
    pub terminal_velocity: f32,
    /// Thickness of the ground-check strip below the feet
    pub ground_check_height: f32,
    /// How far above a slope surface the feet may hover and still snap down
    pub slope_snap: f32,
    /// Order in which nearby tiles are resolved
    pub tile_order: TileOrder,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.9,
            terminal_velocity: 15.0,
            ground_check_height: 1.0,
            slope_snap: 6.0,
            tile_order: TileOrder::default(),
        }
    }
}

/// Kinematic state of an actor.
///
/// The motion flags are independent: an actor can be airborne, knocked back
/// and invulnerable at the same time, so they are not folded into one enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Position before the last integration step
    pub prev_x: f32,
    /// Position before the last integration step
    pub prev_y: f32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Horizontal velocity per tick
    pub vel_x: f32,
    /// Vertical velocity per tick (positive = down)
    pub vel_y: f32,
    /// Facing
    pub direction: Direction,
    /// Not supported by ground this tick
    pub falling: bool,
    /// Rising from a jump; cleared on landing
    pub jumping: bool,
    /// Moving under an imposed knockback velocity; cleared on landing
    pub knocked_back: bool,
    /// Multiplier on gravity (0 for projectiles and effects)
    pub gravity_scale: f32,
}

impl Body {
    /// Creates a resting body at a spawn point.
    #[must_use]
    pub fn new(x: f32, y: f32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            prev_x: x,
            prev_y: y,
            width,
            height,
            vel_x: 0.0,
            vel_y: 0.0,
            direction: Direction::Right,
            falling: true,
            jumping: false,
            knocked_back: false,
            gravity_scale: 1.0,
        }
    }

    /// Sets the initial velocity.
    #[must_use]
    pub fn with_velocity(mut self, vel_x: f32, vel_y: f32) -> Self {
        self.vel_x = vel_x;
        self.vel_y = vel_y;
        if let Some(direction) = Direction::from_velocity(vel_x) {
            self.direction = direction;
        }
        self
    }

    /// Sets the facing.
    #[must_use]
    pub fn facing(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the gravity multiplier.
    #[must_use]
    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Current bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width as f32, self.height as f32)
    }

    /// Bounds before the last integration step.
    #[must_use]
    pub fn prev_bounds(&self) -> Rect {
        Rect::new(
            self.prev_x,
            self.prev_y,
            self.width as f32,
            self.height as f32,
        )
    }

    /// Whether the body is standing on something.
    #[must_use]
    pub fn is_grounded(&self) -> bool {
        !self.falling
    }
}

/// Applies gravity and advances the position by one tick.
///
/// Facing follows horizontal velocity unless the body is being knocked back,
/// so a struck actor keeps looking at whoever hit it.
pub fn integrate(body: &mut Body, config: &PhysicsConfig) {
    if body.gravity_scale != 0.0 {
        body.vel_y = (body.vel_y + config.gravity * body.gravity_scale)
            .min(config.terminal_velocity);
        body.falling = true;
    }

    body.prev_x = body.x;
    body.prev_y = body.y;
    body.x += body.vel_x;
    body.y += body.vel_y;

    if !body.knocked_back {
        if let Some(direction) = Direction::from_velocity(body.vel_x) {
            body.direction = direction;
        }
    }
}

/// Integrates one tick and resolves the result against nearby tiles.
pub fn step_body(body: &mut Body, tiles: &[Tile], config: &PhysicsConfig) -> Contact {
    integrate(body, config);
    collision::resolve(body, tiles, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_config_default() {
        let config = PhysicsConfig::default();
        assert_eq!(config.gravity, 0.9);
        assert_eq!(config.terminal_velocity, 15.0);
    }

    #[test]
    fn test_integrate_applies_gravity() {
        let config = PhysicsConfig::default();
        let mut body = Body::new(0.0, 0.0, 16, 16);

        integrate(&mut body, &config);
        assert_eq!(body.vel_y, 0.9);
        assert_eq!(body.y, 0.9);
        assert_eq!(body.prev_y, 0.0);
        assert!(body.falling);
    }

    #[test]
    fn test_terminal_velocity_clamp() {
        let config = PhysicsConfig::default();
        let mut body = Body::new(0.0, 0.0, 16, 16).with_velocity(0.0, 14.8);

        integrate(&mut body, &config);
        assert_eq!(body.vel_y, 15.0);
    }

    #[test]
    fn test_zero_gravity_scale() {
        let config = PhysicsConfig::default();
        let mut body = Body::new(0.0, 0.0, 8, 8)
            .with_velocity(6.0, 0.0)
            .with_gravity_scale(0.0);

        integrate(&mut body, &config);
        assert_eq!(body.vel_y, 0.0);
        assert_eq!(body.x, 6.0);
    }

    #[test]
    fn test_direction_tracks_velocity() {
        let config = PhysicsConfig::default();
        let mut body = Body::new(0.0, 0.0, 16, 16).with_velocity(-2.0, 0.0);

        integrate(&mut body, &config);
        assert_eq!(body.direction, Direction::Left);
    }

    #[test]
    fn test_knockback_keeps_facing() {
        let config = PhysicsConfig::default();
        let mut body = Body::new(0.0, 0.0, 16, 16).facing(Direction::Right);
        body.knocked_back = true;
        body.vel_x = -5.0;

        integrate(&mut body, &config);
        assert_eq!(body.direction, Direction::Right);
    }

    #[test]
    fn test_bounds() {
        let body = Body::new(10.0, 20.0, 32, 48);
        assert_eq!(body.bounds(), Rect::new(10.0, 20.0, 32.0, 48.0));
    }
}

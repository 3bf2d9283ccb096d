//! Gaze detection: is the user's view currently on the fire?
//!
//! Re-evaluated once per frame from the camera pose. A configurable
//! dead-zone metric provides a cheap reject before the physics cast; the
//! cast itself (and any occlusion) lives behind [`PhysicsQuery`], outside
//! the core. Missing camera, anchor, or projector all fail closed.

use glam::{Vec2, Vec3};

/// Camera pose sampled by the host each frame.
#[derive(Debug, Clone, Copy)]
pub struct CameraPose {
    pub position: Vec3,
    pub forward: Vec3,
}

/// Axis-aligned world bounds of the gaze volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Nearest point inside or on the bounds.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }
}

/// Result of a host-side ray or sphere cast.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// True when the hit collider is the gaze volume or a descendant of it.
    pub gaze_volume: bool,
    pub point: Vec3,
}

/// Synchronous, side-effect-free physics queries provided by the host.
pub trait PhysicsQuery {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;
    fn sphere_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        max_distance: f32,
    ) -> Option<RayHit>;
}

/// World-to-viewport projection provided by the host camera subsystem.
pub trait ViewProjector {
    /// Normalized viewport coordinates in [0, 1]; `None` when the point is
    /// behind the camera.
    fn world_to_viewport(&self, world: Vec3) -> Option<Vec2>;
    fn viewport_size_px(&self) -> Vec2;
}

/// Dead-zone tolerance metric, chosen once at configuration time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeadZone {
    /// Angular cone around the camera forward axis.
    Degrees(f32),
    /// Radius around viewport center in normalized viewport units.
    ViewportRadius(f32),
    /// Radius around screen center in pixels.
    Pixels(f32),
}

#[derive(Debug, Clone, Copy)]
pub struct GazeConfig {
    pub dead_zone: DeadZone,
    pub max_ray_distance: f32,
    /// Sphere-cast radius for a softer cone; `None` uses a plain ray.
    pub cast_radius: Option<f32>,
    /// Fallback anchor height bias inside the gaze volume bounds
    /// (0 = floor, 1 = top).
    pub anchor_bias: f32,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            dead_zone: DeadZone::Degrees(crate::constants::DEAD_ZONE_DEGREES),
            max_ray_distance: crate::constants::MAX_RAY_DISTANCE,
            cast_radius: None,
            anchor_bias: crate::constants::ANCHOR_HEIGHT_BIAS,
        }
    }
}

/// Deterministic fallback anchor: biased toward the bottom of the volume,
/// because the geometric center of a tall fire volume sits above the visual
/// mass of the flame.
pub fn anchor_point(bounds: &Bounds, bias: f32) -> Vec3 {
    let c = bounds.center();
    let y = crate::blend::lerp(bounds.min.y, bounds.max.y, bias);
    bounds.closest_point(Vec3::new(c.x, y, c.z))
}

/// Per-frame gaze evaluation. The only retained state is the previous
/// result, kept for edge logging.
pub struct GazeTracker {
    config: GazeConfig,
    last_looking: bool,
    warned_projector: bool,
}

impl GazeTracker {
    pub fn new(config: GazeConfig) -> Self {
        Self {
            config: GazeConfig {
                max_ray_distance: config.max_ray_distance.max(0.0),
                anchor_bias: config.anchor_bias.clamp(0.0, 1.0),
                ..config
            },
            last_looking: false,
            warned_projector: false,
        }
    }

    pub fn config(&self) -> &GazeConfig {
        &self.config
    }

    /// Evaluates the looking signal for this frame. Fail-closed: any missing
    /// collaborator yields `false`, never an error.
    pub fn evaluate(
        &mut self,
        camera: Option<&CameraPose>,
        anchor: Option<Vec3>,
        physics: Option<&dyn PhysicsQuery>,
        projector: Option<&dyn ViewProjector>,
    ) -> bool {
        let looking = self.evaluate_inner(camera, anchor, physics, projector);
        if looking != self.last_looking {
            log::debug!("[gaze] looking -> {looking}");
            self.last_looking = looking;
        }
        looking
    }

    fn evaluate_inner(
        &mut self,
        camera: Option<&CameraPose>,
        anchor: Option<Vec3>,
        physics: Option<&dyn PhysicsQuery>,
        projector: Option<&dyn ViewProjector>,
    ) -> bool {
        let (Some(camera), Some(anchor)) = (camera, anchor) else {
            return false;
        };
        let forward = camera.forward.normalize_or_zero();
        if forward == Vec3::ZERO {
            return false;
        }

        // Cheap reject before any physics query.
        let to_anchor = anchor - camera.position;
        if !self.within_dead_zone(forward, anchor, to_anchor, projector) {
            return false;
        }

        match physics {
            Some(physics) => {
                let hit = match self.config.cast_radius {
                    Some(radius) => physics.sphere_cast(
                        camera.position,
                        forward,
                        radius,
                        self.config.max_ray_distance,
                    ),
                    None => physics.raycast(camera.position, forward, self.config.max_ray_distance),
                };
                hit.is_some_and(|h| h.gaze_volume)
            }
            // No gaze volume configured: pure distance check, no occlusion.
            None => to_anchor.length() <= self.config.max_ray_distance,
        }
    }

    fn within_dead_zone(
        &mut self,
        forward: Vec3,
        anchor: Vec3,
        to_anchor: Vec3,
        projector: Option<&dyn ViewProjector>,
    ) -> bool {
        match self.config.dead_zone {
            DeadZone::Degrees(max_degrees) => {
                let dir = to_anchor.normalize_or_zero();
                if dir == Vec3::ZERO {
                    // Camera sits on the anchor; the angle is undefined, so
                    // let the cast decide.
                    return true;
                }
                let cos = forward.dot(dir).clamp(-1.0, 1.0);
                cos.acos().to_degrees() <= max_degrees.max(0.0)
            }
            DeadZone::ViewportRadius(radius) => {
                let Some(projector) = projector else {
                    self.warn_projector();
                    return false;
                };
                match projector.world_to_viewport(anchor) {
                    Some(uv) => uv.distance(Vec2::splat(0.5)) <= radius.max(0.0),
                    None => false,
                }
            }
            DeadZone::Pixels(radius) => {
                let Some(projector) = projector else {
                    self.warn_projector();
                    return false;
                };
                match projector.world_to_viewport(anchor) {
                    Some(uv) => {
                        let size = projector.viewport_size_px();
                        let px = uv * size;
                        px.distance(size * 0.5) <= radius.max(0.0)
                    }
                    None => false,
                }
            }
        }
    }

    fn warn_projector(&mut self) {
        if !self.warned_projector {
            log::warn!("[gaze] viewport dead zone configured but no projector bound");
            self.warned_projector = true;
        }
    }
}

//! Projectile lifecycle: movement integration, lifetime failsafe and
//! collision-driven destruction.
//!
//! Player shots, enemy shots and fired hazards all carry a [`Projectile`].
//! Behaviour differences are a small closed set: [`ProjectileKind`] selects the
//! variant and [`ProjectileCaps`] toggles the optional rules.  A hazard
//! projectile only flies; its lifetime and collisions with actors are owned by
//! [`crate::hazard`].
//!
//! ## Systems
//!
//! | System | Phase | Purpose |
//! |--------|-------|---------|
//! | [`projectile_collision_system`] | dispatch | world and enemy hits |
//! | [`projectile_motion_system`] | projectiles | gravity + velocity integration |
//! | [`projectile_lifetime_system`] | projectiles | failsafe destruction |

use crate::config::ProjectileTuning;
use crate::enemy::{damage_enemy, Enemy};
use crate::registry::{Bounds, Category, PendingDestroy};
use crate::signals::Signals;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashSet;

// ── Components ─────────────────────────────────────────────────────────────────

/// Which side fired the projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    Bullet,
    /// A fired radial hazard; see [`crate::hazard::BlackHole`].
    Hazard,
}

/// Optional rules a projectile opts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileCaps {
    /// Destroyed once `age >= lifetime`, whatever else happened.
    pub auto_destroy: bool,
    pub destroy_on_enemy: bool,
    pub destroy_on_world: bool,
    /// Rotate the transform to face the travel direction.
    pub correct_rotation: bool,
}

impl Default for ProjectileCaps {
    fn default() -> Self {
        Self {
            auto_destroy: true,
            destroy_on_enemy: true,
            destroy_on_world: true,
            correct_rotation: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestroyShake {
    pub duration: f32,
    pub intensity: Vec2,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Projectile {
    pub side: Side,
    pub kind: ProjectileKind,
    pub damage: f32,
    pub knockback: Vec2,
    /// Added to the vertical direction component over time (scaled by 1/10).
    pub gravity: f32,
    pub shot_speed: f32,
    pub lifetime: f32,
    pub age: f32,
    /// Travel direction; its length scales the speed once gravity bends it.
    pub direction: Vec2,
    /// Velocity applied on the last tick.
    pub velocity: Vec2,
    pub caps: ProjectileCaps,
    pub destroy_shake: Option<DestroyShake>,
    /// Named visual effect requested on destruction.
    pub destroy_effect: Option<String>,
}

impl Projectile {
    pub fn from_tuning(tuning: &ProjectileTuning, side: Side) -> Self {
        Self {
            side,
            kind: ProjectileKind::Bullet,
            damage: tuning.damage,
            knockback: Vec2::from_array(tuning.knockback),
            gravity: 0.0,
            shot_speed: tuning.shot_speed,
            lifetime: tuning.lifetime,
            age: 0.0,
            direction: Vec2::ZERO,
            velocity: Vec2::ZERO,
            caps: ProjectileCaps::default(),
            destroy_shake: None,
            destroy_effect: None,
        }
    }

    pub fn with_shake(mut self, tuning: &ProjectileTuning) -> Self {
        self.destroy_shake = Some(DestroyShake {
            duration: tuning.shake_duration,
            intensity: Vec2::from_array(tuning.shake_intensity),
        });
        self
    }

    pub fn with_effect(mut self, name: impl Into<String>) -> Self {
        self.destroy_effect = Some(name.into());
        self
    }

    /// Set the travel direction.  Ignored once a direction has been set.
    pub fn initialize(&mut self, direction: Vec2) -> bool {
        if self.direction != Vec2::ZERO {
            return false;
        }
        self.direction = direction;
        true
    }

    /// Advance one tick and return the displacement to apply.
    pub fn integrate(&mut self, dt: f32) -> Vec2 {
        self.age += dt;
        self.direction.y += self.gravity * dt / 10.0;
        self.velocity = self.direction * self.shot_speed;
        self.velocity * dt
    }

    #[inline]
    pub fn expired(&self) -> bool {
        self.age >= self.lifetime
    }

    /// Whether the lifetime failsafe applies to this projectile.
    pub fn uses_failsafe(&self) -> bool {
        self.kind == ProjectileKind::Bullet && self.caps.auto_destroy
    }
}

/// Level geometry that can stop projectiles.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct WorldBoundary {
    /// Boundaries that scroll with auto-run sections; projectiles pass through.
    pub running: bool,
}

// ── Destruction ────────────────────────────────────────────────────────────────

/// Destroy a projectile with its configured feedback: optional camera shake,
/// optional named effect, then the explosion and the destruction request.
pub fn destroy_projectile(
    commands: &mut Commands,
    signals: &mut Signals,
    entity: Entity,
    projectile: &Projectile,
    position: Vec2,
) {
    if let Some(shake) = projectile.destroy_shake {
        signals.shake(shake.duration, shake.intensity);
    }
    if let Some(effect) = &projectile.destroy_effect {
        signals.effect(effect.clone(), position);
    }
    signals.explode(entity, position, projectile.velocity);
    signals.destroy(commands, entity);
}

// ── Spawn ──────────────────────────────────────────────────────────────────────

/// Spawn a projectile travelling along `direction`.
pub fn spawn_projectile(
    commands: &mut Commands,
    mut projectile: Projectile,
    position: Vec2,
    direction: Vec2,
    radius: f32,
) -> Entity {
    projectile.initialize(direction);
    commands
        .spawn((
            projectile,
            Category::Projectile,
            Bounds::Circle { radius },
            RigidBody::KinematicPositionBased,
            Collider::ball(radius),
            Sensor,
            ActiveEvents::COLLISION_EVENTS,
            ActiveCollisionTypes::default() | ActiveCollisionTypes::KINEMATIC_STATIC,
            Transform::from_translation(position.extend(0.0)),
        ))
        .id()
}

// ── Systems ────────────────────────────────────────────────────────────────────

pub fn projectile_motion_system(
    time: Res<Time>,
    mut q: Query<(&mut Projectile, &mut Transform), Without<PendingDestroy>>,
) {
    let dt = time.delta_secs();
    for (mut projectile, mut transform) in q.iter_mut() {
        let step = projectile.integrate(dt);
        transform.translation += step.extend(0.0);
        if projectile.caps.correct_rotation && projectile.direction != Vec2::ZERO {
            let angle = projectile.direction.y.atan2(projectile.direction.x);
            transform.rotation = Quat::from_rotation_z(angle);
        }
    }
}

/// Failsafe: destroy auto-destroying bullets at the end of their lifetime.
pub fn projectile_lifetime_system(
    mut commands: Commands,
    mut signals: Signals,
    q: Query<(Entity, &Projectile, &Transform), Without<PendingDestroy>>,
) {
    for (entity, projectile, transform) in q.iter() {
        if projectile.uses_failsafe() && projectile.expired() {
            destroy_projectile(
                &mut commands,
                &mut signals,
                entity,
                projectile,
                transform.translation.truncate(),
            );
        }
    }
}

/// Resolve projectile contacts with world geometry and with enemies.
///
/// Hostile shots against the player are resolved by the player's damage path
/// (`crate::player::combat`), which also runs their destroy-on-enemy check.
pub fn projectile_collision_system(
    mut commands: Commands,
    mut signals: Signals,
    mut collision_events: MessageReader<CollisionEvent>,
    projectiles: Query<(&Projectile, &Transform), Without<PendingDestroy>>,
    boundaries: Query<&WorldBoundary>,
    mut enemies: Query<(&mut Enemy, &Transform), Without<PendingDestroy>>,
) {
    let mut spent: HashSet<Entity> = HashSet::new();

    for event in collision_events.read() {
        let CollisionEvent::Started(e1, e2, _) = event else {
            continue;
        };
        let (shot, other) = if projectiles.contains(*e1) {
            (*e1, *e2)
        } else if projectiles.contains(*e2) {
            (*e2, *e1)
        } else {
            continue;
        };
        if spent.contains(&shot) {
            continue;
        }
        let Ok((projectile, transform)) = projectiles.get(shot) else {
            continue;
        };
        let position = transform.translation.truncate();

        if let Ok(boundary) = boundaries.get(other) {
            if !boundary.running && projectile.caps.destroy_on_world {
                destroy_projectile(&mut commands, &mut signals, shot, projectile, position);
                spent.insert(shot);
            }
            continue;
        }

        if projectile.kind != ProjectileKind::Bullet || projectile.side != Side::Player {
            continue;
        }
        let Ok((mut enemy, enemy_transform)) = enemies.get_mut(other) else {
            continue;
        };
        damage_enemy(
            &mut commands,
            &mut signals,
            other,
            &mut enemy,
            enemy_transform.translation.truncate(),
            shot,
            projectile.damage,
        );
        if projectile.caps.destroy_on_enemy {
            destroy_projectile(&mut commands, &mut signals, shot, projectile, position);
            spent.insert(shot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{add_signals, CameraShakeRequested, EnemyKilled, VisualEffectRequested};
    use bevy::ecs::message::Messages;

    fn collision_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        add_signals(&mut app);
        app.add_message::<CollisionEvent>();
        app.add_systems(Update, projectile_collision_system);
        app
    }

    fn started(app: &mut App, a: Entity, b: Entity) {
        app.world_mut().write_message(CollisionEvent::Started(
            a,
            b,
            bevy_rapier2d::rapier::geometry::CollisionEventFlags::empty(),
        ));
    }

    fn bullet(side: Side) -> Projectile {
        let mut p = Projectile::from_tuning(&ProjectileTuning::default(), side);
        p.initialize(Vec2::X);
        p
    }

    #[test]
    fn initialize_keeps_first_direction() {
        let mut p = Projectile::from_tuning(&ProjectileTuning::default(), Side::Player);
        assert!(p.initialize(Vec2::X));
        assert!(!p.initialize(Vec2::Y));
        assert_eq!(p.direction, Vec2::X);
    }

    #[test]
    fn gravity_bends_direction_over_time() {
        let mut p = bullet(Side::Player);
        p.gravity = -10.0;
        let step = p.integrate(0.5);
        // dir.y = -10 * 0.5 / 10 = -0.5
        assert!((p.direction.y + 0.5).abs() < 1e-6);
        assert!((step - Vec2::new(7.5, -3.75)).length() < 1e-4);
    }

    #[test]
    fn hazard_kind_skips_failsafe() {
        let mut p = bullet(Side::Player);
        assert!(p.uses_failsafe());
        p.kind = ProjectileKind::Hazard;
        assert!(!p.uses_failsafe());
    }

    #[test]
    fn expired_bullet_is_destroyed_by_failsafe() {
        let mut app = App::new();
        add_signals(&mut app);
        app.add_systems(Update, projectile_lifetime_system);

        let mut p = bullet(Side::Enemy).with_effect("spark");
        p.age = p.lifetime;
        let shot = app.world_mut().spawn((p, Transform::default())).id();

        app.update();

        assert!(app.world().get::<PendingDestroy>(shot).is_some());
        assert_eq!(
            app.world()
                .resource::<Messages<VisualEffectRequested>>()
                .len(),
            1
        );
    }

    #[test]
    fn world_hit_destroys_and_shakes() {
        let mut app = collision_app();
        let shot = app
            .world_mut()
            .spawn((
                bullet(Side::Player).with_shake(&ProjectileTuning::default()),
                Transform::default(),
            ))
            .id();
        let wall = app.world_mut().spawn(WorldBoundary::default()).id();
        started(&mut app, wall, shot);

        app.update();

        assert!(app.world().get::<PendingDestroy>(shot).is_some());
        assert_eq!(
            app.world().resource::<Messages<CameraShakeRequested>>().len(),
            1
        );
    }

    #[test]
    fn running_boundary_is_ignored() {
        let mut app = collision_app();
        let shot = app
            .world_mut()
            .spawn((bullet(Side::Player), Transform::default()))
            .id();
        let wall = app
            .world_mut()
            .spawn(WorldBoundary { running: true })
            .id();
        started(&mut app, shot, wall);

        app.update();

        assert!(app.world().get::<PendingDestroy>(shot).is_none());
    }

    #[test]
    fn player_shot_damages_enemy_and_is_spent() {
        let mut app = collision_app();
        let shot = app
            .world_mut()
            .spawn((bullet(Side::Player), Transform::default()))
            .id();
        let enemy = app
            .world_mut()
            .spawn((Enemy::new(4.0, 1.0, Vec2::ONE), Transform::default()))
            .id();
        started(&mut app, enemy, shot);

        app.update();

        assert!(app.world().get::<PendingDestroy>(shot).is_some());
        assert!(app.world().get::<PendingDestroy>(enemy).is_some());
        assert_eq!(app.world().resource::<Messages<EnemyKilled>>().len(), 1);
    }

    #[test]
    fn hostile_shot_passes_through_enemies() {
        let mut app = collision_app();
        let shot = app
            .world_mut()
            .spawn((bullet(Side::Enemy), Transform::default()))
            .id();
        let enemy = app
            .world_mut()
            .spawn((Enemy::new(4.0, 1.0, Vec2::ONE), Transform::default()))
            .id();
        started(&mut app, shot, enemy);

        app.update();

        assert!(app.world().get::<PendingDestroy>(shot).is_none());
        assert_eq!(app.world().get::<Enemy>(enemy).map(|e| e.health), Some(4.0));
    }
}

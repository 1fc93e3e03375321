//! Entity categories, bounding volumes, zones and deferred destruction.
//!
//! Gameplay entities carry a [`Category`] so hazards can classify whatever
//! they touch without knowing the concrete component set.  [`EntityRegistry`]
//! is the read side: a [`SystemParam`] over every live categorised entity.
//! Destruction is never immediate: [`request_destroy`] tags the entity with
//! [`PendingDestroy`] (which hides it from every registry query straight away)
//! and [`despawn_pending_system`] removes it at the start of the next fixed tick,
//! so nothing is despawned while another system is iterating it.

use crate::signals::DestroyRequested;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// Category tag used for zone classification.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Enemy,
    Projectile,
    Pickup,
    Particle,
    Player,
}

/// Bounding volume centred on the entity's transform.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    Circle { radius: f32 },
    Box { half_extents: Vec2 },
}

/// A circular region of influence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub center: Vec2,
    pub radius: f32,
}

impl Zone {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }

    pub fn scaled(&self, multiplier: f32) -> Zone {
        Zone {
            center: self.center,
            radius: self.radius * multiplier,
        }
    }
}

/// Marker for entities whose destruction has been requested.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct PendingDestroy;

/// Read-only view of one live categorised entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySnapshot {
    pub entity: Entity,
    pub category: Category,
    pub center: Vec2,
    pub bounds: Option<Bounds>,
}

/// Query surface over every live categorised entity.
///
/// Cost is linear in the number of live entities per call.
#[derive(SystemParam)]
pub struct EntityRegistry<'w, 's> {
    live: Query<
        'w,
        's,
        (
            Entity,
            &'static Category,
            &'static Transform,
            Option<&'static Bounds>,
        ),
        Without<PendingDestroy>,
    >,
}

impl EntityRegistry<'_, '_> {
    pub fn of(&self, category: Category) -> impl Iterator<Item = EntitySnapshot> + '_ {
        self.live
            .iter()
            .filter(move |(_, c, _, _)| **c == category)
            .map(|(entity, category, transform, bounds)| EntitySnapshot {
                entity,
                category: *category,
                center: transform.translation.truncate(),
                bounds: bounds.copied(),
            })
    }

    /// Live entities of `category` whose centre lies inside `zone`.
    pub fn within(
        &self,
        category: Category,
        zone: Zone,
    ) -> impl Iterator<Item = EntitySnapshot> + '_ {
        self.of(category)
            .filter(move |snapshot| zone.contains_point(snapshot.center))
    }

    pub fn get(&self, entity: Entity) -> Option<EntitySnapshot> {
        self.live
            .get(entity)
            .ok()
            .map(|(entity, category, transform, bounds)| EntitySnapshot {
                entity,
                category: *category,
                center: transform.translation.truncate(),
                bounds: bounds.copied(),
            })
    }

    #[inline]
    pub fn is_live(&self, entity: Entity) -> bool {
        self.live.contains(entity)
    }
}

/// Mark `entity` for destruction and announce it.
///
/// Safe to call for an entity that was already despawned.
pub fn request_destroy(
    commands: &mut Commands,
    destroyed: &mut MessageWriter<DestroyRequested>,
    entity: Entity,
) {
    if let Ok(mut entity_commands) = commands.get_entity(entity) {
        entity_commands.try_insert(PendingDestroy);
    }
    destroyed.write(DestroyRequested { entity });
}

/// Despawn every entity whose destruction was requested in an earlier tick.
pub fn despawn_pending_system(mut commands: Commands, q: Query<Entity, With<PendingDestroy>>) {
    for entity in q.iter() {
        commands.entity(entity).try_despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_contains_boundary_point() {
        let zone = Zone::new(Vec2::new(1.0, 1.0), 2.0);
        assert!(zone.contains_point(Vec2::new(3.0, 1.0)));
        assert!(!zone.contains_point(Vec2::new(3.01, 1.0)));
    }

    #[test]
    fn pending_entities_disappear_from_registry() {
        #[derive(Resource, Default)]
        struct Seen(Vec<Entity>);

        fn collect(registry: EntityRegistry, mut seen: ResMut<Seen>) {
            seen.0 = registry.of(Category::Enemy).map(|s| s.entity).collect();
        }

        let mut app = App::new();
        app.init_resource::<Seen>();
        app.add_systems(Update, collect);

        let live = app
            .world_mut()
            .spawn((Category::Enemy, Transform::default()))
            .id();
        app.world_mut().spawn((
            Category::Enemy,
            Transform::default(),
            PendingDestroy,
        ));
        app.world_mut()
            .spawn((Category::Pickup, Transform::default()));

        app.update();

        assert_eq!(app.world().resource::<Seen>().0, vec![live]);
    }

    #[test]
    fn despawn_pending_removes_marked_entities() {
        let mut app = App::new();
        app.add_systems(Update, despawn_pending_system);
        let keep = app.world_mut().spawn(Category::Enemy).id();
        let gone = app.world_mut().spawn((Category::Enemy, PendingDestroy)).id();

        app.update();

        assert!(app.world().get_entity(keep).is_ok());
        assert!(app.world().get_entity(gone).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn inner_zone_containment_implies_outer(
                x in -20.0f32..20.0,
                y in -20.0f32..20.0,
                inner in 0.1f32..5.0,
                extra in 0.01f32..10.0,
            ) {
                let inner_zone = Zone::new(Vec2::ZERO, inner);
                let outer_zone = Zone::new(Vec2::ZERO, inner + extra);
                let p = Vec2::new(x, y);
                if inner_zone.contains_point(p) {
                    prop_assert!(outer_zone.contains_point(p));
                }
            }
        }
    }
}

//! Outbound signals.
//!
//! Everything the simulation asks of the outside world (effects, camera,
//! animation, visibility, destruction bookkeeping, UI) is a Bevy [`Message`].
//! Presentation layers read them with a `MessageReader`; nothing in the core
//! waits on an answer.  [`Signals`] bundles the writers that most gameplay
//! systems need so their parameter lists stay short.

use crate::registry::request_destroy;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// An entity has been marked for destruction and will be despawned at the
/// start of the next fixed tick.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestroyRequested {
    pub entity: Entity,
}

/// Spawn a named one-shot visual effect at a position.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct VisualEffectRequested {
    pub name: String,
    pub position: Vec2,
}

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct CameraShakeRequested {
    pub duration: f32,
    pub intensity: Vec2,
}

/// Fire a named animation trigger on an entity's animator.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct AnimationTriggered {
    pub entity: Entity,
    pub name: &'static str,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityChanged {
    pub entity: Entity,
    pub visible: bool,
}

/// How much of an entity the explosion effect should break off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExplosionPortion {
    Full,
    /// Fraction in `(0, 1]` of the visual to shatter, used for chip damage.
    Partial(f32),
}

/// Request the generic "explode into particles" effect for an entity.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ExplosionRequested {
    pub source: Entity,
    pub position: Vec2,
    pub velocity: Vec2,
    pub portion: ExplosionPortion,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDied {
    pub player: Entity,
}

/// Score changed; `delta` is the amount actually applied after clamping.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChanged {
    pub score: u32,
    pub delta: i64,
    pub combo: u32,
}

/// An enemy took damage through its normal damage entry point.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct EnemyDamaged {
    pub enemy: Entity,
    pub source: Entity,
    pub amount: f32,
}

/// An enemy died; carries what kill scoring needs.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct EnemyKilled {
    pub enemy: Entity,
    pub max_health: f32,
    pub damage: f32,
}

/// Writers for the signals shared by most gameplay systems.
#[derive(SystemParam)]
pub struct Signals<'w> {
    pub destroyed: MessageWriter<'w, DestroyRequested>,
    pub effects: MessageWriter<'w, VisualEffectRequested>,
    pub shakes: MessageWriter<'w, CameraShakeRequested>,
    pub explosions: MessageWriter<'w, ExplosionRequested>,
    pub animations: MessageWriter<'w, AnimationTriggered>,
    pub enemy_damaged: MessageWriter<'w, EnemyDamaged>,
    pub enemy_killed: MessageWriter<'w, EnemyKilled>,
}

impl Signals<'_> {
    /// Mark `entity` for destruction; see [`request_destroy`].
    pub fn destroy(&mut self, commands: &mut Commands, entity: Entity) {
        request_destroy(commands, &mut self.destroyed, entity);
    }

    pub fn explode(&mut self, source: Entity, position: Vec2, velocity: Vec2) {
        self.explosions.write(ExplosionRequested {
            source,
            position,
            velocity,
            portion: ExplosionPortion::Full,
        });
    }

    pub fn explode_partial(&mut self, source: Entity, position: Vec2, velocity: Vec2, portion: f32) {
        self.explosions.write(ExplosionRequested {
            source,
            position,
            velocity,
            portion: ExplosionPortion::Partial(portion),
        });
    }

    pub fn effect(&mut self, name: impl Into<String>, position: Vec2) {
        self.effects.write(VisualEffectRequested {
            name: name.into(),
            position,
        });
    }

    pub fn shake(&mut self, duration: f32, intensity: Vec2) {
        self.shakes.write(CameraShakeRequested {
            duration,
            intensity,
        });
    }

    pub fn animate(&mut self, entity: Entity, name: &'static str) {
        self.animations.write(AnimationTriggered { entity, name });
    }
}

/// Register every signal type.
pub fn add_signals(app: &mut App) {
    app.add_message::<DestroyRequested>()
        .add_message::<VisualEffectRequested>()
        .add_message::<CameraShakeRequested>()
        .add_message::<AnimationTriggered>()
        .add_message::<VisibilityChanged>()
        .add_message::<ExplosionRequested>()
        .add_message::<PlayerDied>()
        .add_message::<ScoreChanged>()
        .add_message::<EnemyDamaged>()
        .add_message::<EnemyKilled>();
}

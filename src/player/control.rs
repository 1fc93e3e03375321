//! Player input and movement.
//!
//! ## Pipeline
//!
//! 1. [`keyboard_to_intent_system`] (variable rate): translates keys into [`PlayerIntent`].
//! 2. [`sample_player_input_system`] (variable rate): copies the intent into
//!    the player's [`HeldInput`] unless input is locked, latches jumps, drives
//!    animation flags and alternate idle animations.
//! 3. [`player_movement_system`] (fixed): go-to-point steering, jump, horizontal
//!    easing, gravity, and the character-controller translation.
//!
//! The **input abstraction layer** (`PlayerIntent` → `HeldInput`) makes the
//! movement logic fully testable: tests fill `HeldInput` directly and step only
//! the fixed schedule.

use super::state::{
    roll_idle_wait, Dead, GoToPoint, HeldInput, IdleAnimations, InputLock, Player,
    PlayerAnimationState, PlayerIntent, PlayerMotion,
};
use crate::config::{PlayerTuning, SimConfig};
use crate::signals::Signals;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

// ── Pure helpers ───────────────────────────────────────────────────────────────

/// Take-off speed reaching `jump_height` under `gravity`.
pub fn jump_speed(tuning: &PlayerTuning) -> f32 {
    (2.0 * tuning.jump_height * -tuning.gravity).max(0.0).sqrt()
}

/// Horizontal speed the player eases toward this tick.
pub fn target_speed(
    held: &HeldInput,
    motion: &PlayerMotion,
    going_to_point: bool,
    tuning: &PlayerTuning,
) -> f32 {
    let speed = if held.run {
        if motion.continuously_running && !going_to_point {
            tuning.continuous_run_speed
        } else {
            tuning.run_speed
        }
    } else {
        tuning.walk_speed
    };
    held.direction() * speed * motion.speed_multiplier
}

/// Steer toward the go-to-point target.  Returns `true` once the walk is over
/// (target x reached or crossed, or cancelled).
pub fn steer_to_point(x: f32, goto: &mut GoToPoint, held: &mut HeldInput) -> bool {
    if goto.cancelled {
        return true;
    }
    if x < goto.target.x && !held.left {
        held.right = true;
    } else if x > goto.target.x && !held.right {
        held.left = true;
    } else {
        goto.cancelled = true;
    }
    goto.cancelled
}

// ── Variable-rate input ────────────────────────────────────────────────────────

/// Translate keyboard state into [`PlayerIntent`].
///
/// - `A`/`←` and `D`/`→`: move
/// - `Shift`: run
/// - `Space`/`W`/`↑`: jump
/// - `J`: fire toward the facing side
pub fn keyboard_to_intent_system(keys: Res<ButtonInput<KeyCode>>, mut intent: ResMut<PlayerIntent>) {
    intent.left = keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]);
    intent.right = keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]);
    intent.run = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    intent.jump = keys.any_just_pressed([KeyCode::Space, KeyCode::KeyW, KeyCode::ArrowUp]);
    intent.fire = keys.pressed(KeyCode::KeyJ);
    if intent.right {
        intent.aim = Vec2::X;
    } else if intent.left {
        intent.aim = Vec2::NEG_X;
    }
}

/// Copy the frame's intent into the player's held input.
pub fn sample_player_input_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    intent: Res<PlayerIntent>,
    mut signals: Signals,
    mut q: Query<
        (
            Entity,
            &InputLock,
            &mut HeldInput,
            &PlayerMotion,
            &mut PlayerAnimationState,
            Option<&mut IdleAnimations>,
        ),
        (With<Player>, Without<Dead>),
    >,
) {
    let dt = time.delta_secs();
    let mut rng = rand::thread_rng();

    for (entity, lock, mut held, motion, mut anim, idle) in q.iter_mut() {
        if !lock.disabled {
            held.left = intent.left;
            held.right = intent.right;
            held.fire = intent.fire;
            held.aim_right = intent.aim.x >= 0.0;
            held.run = intent.run && !intent.fire;
            if intent.jump && motion.grounded {
                held.jump = true;
            }
        }
        held.run = (held.run && (held.left || held.right)) || motion.continuously_running;

        anim.walking = held.left || held.right;
        anim.running = held.run;
        anim.grounded = motion.grounded;
        anim.falling = motion.velocity.y < 0.0;

        let Some(mut idle) = idle else {
            continue;
        };
        if held.left || held.right || held.jump || held.fire {
            idle.timer = 0.0;
            continue;
        }
        idle.timer += dt;
        if idle.timer >= idle.wait && !idle.names.is_empty() {
            let name = idle.names[rng.gen_range(0..idle.names.len())];
            signals.animate(entity, name);
            idle.timer = 0.0;
            idle.wait = roll_idle_wait(&config.player, &mut rng);
        }
    }
}

// ── Fixed-rate movement ────────────────────────────────────────────────────────

/// Integrate player movement for one fixed tick.
///
/// Ground contact comes from the Rapier character controller's output when the
/// player has one, otherwise from `PlayerMotion::grounded` as last written.
/// The resulting displacement goes to the controller's `translation`, or
/// straight onto the transform when there is no controller.  Dead players
/// are left where they fell.
#[allow(clippy::type_complexity)]
pub fn player_movement_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<SimConfig>,
    mut signals: Signals,
    mut q: Query<
        (
            Entity,
            &mut PlayerMotion,
            &mut HeldInput,
            &mut InputLock,
            Option<&mut GoToPoint>,
            &mut Transform,
            Option<&mut KinematicCharacterController>,
            Option<&KinematicCharacterControllerOutput>,
        ),
        (With<Player>, Without<Dead>),
    >,
) {
    let dt = time.delta_secs();
    let tuning = &config.player;

    for (entity, mut motion, mut held, mut lock, goto, mut transform, controller, output) in
        q.iter_mut()
    {
        if let Some(output) = output {
            motion.grounded = output.grounded;
        }
        if motion.grounded {
            motion.velocity.y = 0.0;
        }

        let mut going_to_point = false;
        if let Some(mut goto) = goto {
            if !goto.engaged {
                lock.disable(&mut held);
                goto.engaged = true;
            }
            going_to_point = true;
            if lock.disabled && steer_to_point(transform.translation.x, &mut goto, &mut held) {
                motion.facing_right = goto.face_right;
                held.reset();
                if !goto.keep_inertia {
                    motion.velocity.x = 0.0;
                }
                if goto.auto_enable_input {
                    lock.enable(&mut held);
                }
                commands.entity(entity).remove::<GoToPoint>();
                going_to_point = false;
            }
        }

        if held.fire {
            motion.facing_right = held.aim_right;
        } else if motion.continuously_running || held.right {
            motion.facing_right = true;
        } else if held.left {
            motion.facing_right = false;
        }

        if held.jump && motion.grounded {
            if !motion.in_no_jump_zone() {
                motion.velocity.y = jump_speed(tuning);
                signals.animate(entity, "Jump");
            }
            held.jump = false;
        }

        let damping = if motion.grounded {
            tuning.ground_damping
        } else {
            tuning.in_air_damping
        };
        let target = target_speed(&held, &motion, going_to_point, tuning);
        let t = (dt * damping).min(1.0);
        motion.velocity.x += (target - motion.velocity.x) * t;
        motion.velocity.y += tuning.gravity * dt;

        let step = motion.velocity * dt;
        match controller {
            Some(mut controller) => controller.translation = Some(step),
            None => transform.translation += step.extend(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_reaches_configured_height() {
        let tuning = PlayerTuning::default();
        let v = jump_speed(&tuning);
        // Apex height v² / (2·|g|).
        let apex = v * v / (2.0 * -tuning.gravity);
        assert!((apex - tuning.jump_height).abs() < 1e-4);
    }

    #[test]
    fn run_uses_continuous_speed_only_off_script() {
        let tuning = PlayerTuning::default();
        let held = HeldInput {
            right: true,
            run: true,
            ..HeldInput::default()
        };
        let motion = PlayerMotion {
            continuously_running: true,
            ..PlayerMotion::default()
        };
        assert_eq!(
            target_speed(&held, &motion, false, &tuning),
            tuning.continuous_run_speed
        );
        assert_eq!(target_speed(&held, &motion, true, &tuning), tuning.run_speed);
    }

    #[test]
    fn speed_multiplier_scales_walk() {
        let tuning = PlayerTuning::default();
        let held = HeldInput {
            left: true,
            ..HeldInput::default()
        };
        let motion = PlayerMotion {
            speed_multiplier: 2.0,
            ..PlayerMotion::default()
        };
        assert_eq!(
            target_speed(&held, &motion, false, &tuning),
            -2.0 * tuning.walk_speed
        );
    }

    #[test]
    fn steering_stops_after_crossing_target() {
        let mut goto = GoToPoint::new(Vec2::new(10.0, 0.0), false, true, false);
        let mut held = HeldInput::default();
        assert!(!steer_to_point(0.0, &mut goto, &mut held));
        assert!(held.right);
        assert!(!steer_to_point(9.9, &mut goto, &mut held));
        // Overshoot: still holding right, so neither branch applies.
        assert!(steer_to_point(10.2, &mut goto, &mut held));
    }

    #[test]
    fn cancelled_walk_ends_immediately() {
        let mut goto = GoToPoint::new(Vec2::new(10.0, 0.0), true, true, false);
        goto.cancel();
        let mut held = HeldInput::default();
        assert!(steer_to_point(0.0, &mut goto, &mut held));
        assert!(!held.right);
    }
}

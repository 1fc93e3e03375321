//! Cutscene-style input lock.
//!
//! Scripted sequences take control of the player with a [`CutsceneCommand`]:
//! `Start` optionally locks input, `End` optionally hands it back.  Starting a
//! running cutscene or ending one that is not running is a scripting bug; it
//! is logged and ignored.

use crate::player::{Dead, HeldInput, InputLock, Player};
use crate::signals::Signals;
use bevy::prelude::*;

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cutscene {
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutsceneCommandKind {
    Start { disable_input: bool },
    End { enable_input: bool },
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutsceneCommand {
    pub cutscene: Entity,
    pub kind: CutsceneCommandKind,
}

pub fn cutscene_system(
    mut commands_in: MessageReader<CutsceneCommand>,
    mut signals: Signals,
    mut cutscenes: Query<&mut Cutscene>,
    mut players: Query<(&mut InputLock, &mut HeldInput), (With<Player>, Without<Dead>)>,
) {
    for command in commands_in.read() {
        let Ok(mut cutscene) = cutscenes.get_mut(command.cutscene) else {
            warn!("Cutscene command for unknown entity {}", command.cutscene);
            continue;
        };
        match command.kind {
            CutsceneCommandKind::Start { disable_input } => {
                if cutscene.active {
                    error!("Cutscene {} started while already running", command.cutscene);
                    continue;
                }
                cutscene.active = true;
                signals.animate(command.cutscene, "Start");
                if disable_input {
                    for (mut lock, mut held) in players.iter_mut() {
                        lock.disable(&mut held);
                    }
                }
            }
            CutsceneCommandKind::End { enable_input } => {
                if !cutscene.active {
                    error!("Cutscene {} ended while not running", command.cutscene);
                    continue;
                }
                cutscene.active = false;
                signals.animate(command.cutscene, "End");
                if enable_input {
                    for (mut lock, mut held) in players.iter_mut() {
                        if lock.disabled {
                            lock.enable(&mut held);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{add_signals, AnimationTriggered};
    use bevy::ecs::message::Messages;

    fn app() -> App {
        let mut app = App::new();
        add_signals(&mut app);
        app.add_message::<CutsceneCommand>();
        app.add_systems(Update, cutscene_system);
        app
    }

    fn send(app: &mut App, cutscene: Entity, kind: CutsceneCommandKind) {
        app.world_mut()
            .write_message(CutsceneCommand { cutscene, kind });
    }

    #[test]
    fn start_locks_and_end_unlocks_input() {
        let mut app = app();
        let player = app
            .world_mut()
            .spawn((
                Player,
                InputLock::default(),
                HeldInput {
                    right: true,
                    ..HeldInput::default()
                },
            ))
            .id();
        let scene = app.world_mut().spawn(Cutscene::default()).id();

        send(&mut app, scene, CutsceneCommandKind::Start { disable_input: true });
        app.update();
        assert!(app.world().get::<InputLock>(player).unwrap().disabled);
        assert!(!app.world().get::<HeldInput>(player).unwrap().right);

        send(&mut app, scene, CutsceneCommandKind::End { enable_input: true });
        app.update();
        assert!(!app.world().get::<InputLock>(player).unwrap().disabled);
        assert!(!app.world().get::<Cutscene>(scene).unwrap().active);
    }

    #[test]
    fn restarting_a_running_cutscene_is_ignored() {
        let mut app = app();
        let scene = app.world_mut().spawn(Cutscene::default()).id();

        send(&mut app, scene, CutsceneCommandKind::Start { disable_input: false });
        send(&mut app, scene, CutsceneCommandKind::Start { disable_input: false });
        app.update();

        assert!(app.world().get::<Cutscene>(scene).unwrap().active);
        assert_eq!(app.world().resource::<Messages<AnimationTriggered>>().len(), 1);
    }

    #[test]
    fn ending_an_idle_cutscene_is_ignored() {
        let mut app = app();
        let scene = app.world_mut().spawn(Cutscene::default()).id();

        send(&mut app, scene, CutsceneCommandKind::End { enable_input: true });
        app.update();

        assert!(app.world().resource::<Messages<AnimationTriggered>>().is_empty());
    }
}

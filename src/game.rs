use crate::GameState;
use bevy::prelude::*;
use bevy_2048::{client::Client, input::Key, settings::ClientSettings, ClientError};
use std::time::Instant;

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, start_client)
            .add_systems(
                Update,
                (read_input, pump_client, track_game_over)
                    .chain()
                    .run_if(resource_exists::<GameClient>),
            )
            .add_systems(
                Update,
                restart_game
                    .run_if(in_state(GameState::GameOver))
                    .run_if(resource_exists::<GameClient>),
            );
    }
}

#[derive(Resource, Deref, DerefMut)]
pub struct GameClient(pub Client);

fn start_client(mut commands: Commands, settings: Res<ClientSettings>) {
    match Client::start(&settings) {
        Ok(client) => {
            info!("connecting to {}", settings.endpoint);
            commands.insert_resource(GameClient(client));
        }
        Err(e) => error!("could not start game client: {}", e),
    }
}

fn key_for(code: KeyCode) -> Key {
    match code {
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::KeyA => Key::Char('a'),
        KeyCode::KeyW => Key::Char('w'),
        KeyCode::KeyD => Key::Char('d'),
        KeyCode::KeyS => Key::Char('s'),
        _ => Key::Other,
    }
}

fn read_input(mut client: ResMut<GameClient>, keys: Res<ButtonInput<KeyCode>>) {
    let now = Instant::now();

    for &code in keys.get_just_pressed() {
        report(client.key_down(key_for(code), now));
    }

    // any released key asks for a resync
    if keys.get_just_released().next().is_some() {
        report(client.key_up(now));
    }
}

fn report(result: Result<(), ClientError>) {
    match result {
        Ok(()) => {}
        Err(ClientError::SessionEnded) => debug!("game is over, press space for a new one"),
        Err(e) => warn!("{}", e),
    }
}

fn pump_client(mut client: ResMut<GameClient>) {
    client.pump(Instant::now());
}

fn track_game_over(
    client: Res<GameClient>,
    game_state: Res<State<GameState>>,
    mut next_game_state: ResMut<NextState<GameState>>,
) {
    let ended = client.session().is_ended();
    match game_state.get() {
        GameState::InGame if ended => next_game_state.set(GameState::GameOver),
        GameState::GameOver if !ended => next_game_state.set(GameState::InGame),
        _ => {}
    }
}

fn restart_game(mut client: ResMut<GameClient>, keys: Res<ButtonInput<KeyCode>>) {
    if keys.just_pressed(KeyCode::Space) {
        client.restart();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_2048::board::Direction;

    #[test]
    fn arrows_and_wasd_reach_the_same_directions() {
        let pairs = [
            (KeyCode::ArrowLeft, KeyCode::KeyA, Direction::Left),
            (KeyCode::ArrowUp, KeyCode::KeyW, Direction::Up),
            (KeyCode::ArrowRight, KeyCode::KeyD, Direction::Right),
            (KeyCode::ArrowDown, KeyCode::KeyS, Direction::Down),
        ];
        for (arrow, letter, direction) in pairs {
            assert_eq!(key_for(arrow).direction(), Some(direction));
            assert_eq!(key_for(letter).direction(), Some(direction));
        }
        assert_eq!(key_for(KeyCode::Space).direction(), None);
    }
}

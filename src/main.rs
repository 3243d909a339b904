use bevy::{input::common_conditions::input_toggle_active, prelude::*};
use bevy_2048::settings::ClientSettings;
use bevy_inspector_egui::quick::ResourceInspectorPlugin;

mod game;
mod ui;

#[derive(States, Default, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GameState {
    #[default]
    InGame,
    GameOver,
}

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "2048".to_string(),
                    canvas: Some("#bevy".to_string()),
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            }),
            ui::UiPlugin,
            game::GamePlugin,
        ))
        .register_type::<ClientSettings>()
        .add_plugins(
            ResourceInspectorPlugin::<ClientSettings>::default()
                .run_if(input_toggle_active(false, KeyCode::F1)),
        )
        .insert_resource(ClearColor(Color::srgb(0.1, 0.1, 0.1)))
        .insert_resource(ClientSettings::from_env())
        .init_state::<GameState>()
        .run();
}

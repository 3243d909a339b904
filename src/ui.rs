use crate::game::GameClient;
use bevy::{ecs::system::SystemParam, prelude::*};
use bevy_2048::{
    board::BOARD_SIZE,
    render::{RenderTarget, TileStyle},
    theme::{self, Rgb},
};

const TILE_PX: f32 = 96.0;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_page)
            .add_systems(Update, draw_frame.run_if(resource_exists::<GameClient>));
    }
}

#[derive(Component)]
struct Tile {
    row: usize,
    col: usize,
}

#[derive(Component)]
struct TileLabel {
    row: usize,
    col: usize,
}

#[derive(Component)]
struct MessageText;

#[derive(Component)]
struct ScoreText;

#[derive(Component)]
struct Backdrop;

fn color(rgb: Rgb) -> Color {
    Color::srgb_u8(rgb.0, rgb.1, rgb.2)
}

fn setup_page(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.spawn(Camera2d);

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                row_gap: Val::Px(12.0),
                ..default()
            },
            ImageNode::new(asset_server.load(theme::DEFAULT_THEME)),
            Backdrop,
        ))
        .with_children(|page| {
            page.spawn((
                Text::new("2048"),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::BLACK),
            ));

            page.spawn((
                Text::new("Score: 0"),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::BLACK),
                ScoreText,
            ));

            page.spawn((
                Node {
                    display: Display::Grid,
                    grid_template_columns: RepeatedGridTrack::px(BOARD_SIZE as u16, TILE_PX),
                    grid_template_rows: RepeatedGridTrack::px(BOARD_SIZE as u16, TILE_PX),
                    column_gap: Val::Px(8.0),
                    row_gap: Val::Px(8.0),
                    padding: UiRect::all(Val::Px(8.0)),
                    ..default()
                },
                BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
            ))
            .with_children(|grid| {
                for row in 0..BOARD_SIZE {
                    for col in 0..BOARD_SIZE {
                        grid.spawn((
                            Node {
                                justify_content: JustifyContent::Center,
                                align_items: AlignItems::Center,
                                ..default()
                            },
                            BackgroundColor(color(theme::EMPTY_BACKGROUND)),
                            BorderRadius::all(Val::Px(6.0)),
                            Tile { row, col },
                        ))
                        .with_child((
                            Text::new(""),
                            TextFont {
                                font_size: theme::BASE_FONT_PX as f32,
                                ..default()
                            },
                            TextColor(color(theme::EMPTY_TEXT)),
                            TileLabel { row, col },
                        ));
                    }
                }
            });

            page.spawn((
                Text::new(""),
                TextFont {
                    font_size: 28.0,
                    ..default()
                },
                TextColor(Color::BLACK),
                MessageText,
            ));
        });
}

/// The page as a [`RenderTarget`].
#[derive(SystemParam)]
struct Page<'w, 's> {
    tiles: Query<'w, 's, (&'static Tile, &'static mut BackgroundColor)>,
    labels: Query<
        'w,
        's,
        (
            &'static TileLabel,
            &'static mut Text,
            &'static mut TextColor,
            &'static mut TextFont,
        ),
    >,
    message: Query<
        'w,
        's,
        (&'static mut Text, &'static mut TextColor),
        (With<MessageText>, Without<TileLabel>),
    >,
    score: Query<
        'w,
        's,
        &'static mut Text,
        (With<ScoreText>, Without<TileLabel>, Without<MessageText>),
    >,
    backdrop: Query<'w, 's, &'static mut ImageNode, With<Backdrop>>,
    asset_server: Res<'w, AssetServer>,
}

impl RenderTarget for Page<'_, '_> {
    fn set_cell(&mut self, row: usize, col: usize, style: &TileStyle) {
        for (tile, mut background) in self.tiles.iter_mut() {
            if tile.row == row && tile.col == col {
                background.0 = color(style.background);
            }
        }
        for (label, mut text, mut text_color, mut font) in self.labels.iter_mut() {
            if label.row == row && label.col == col {
                text.0 = style.text.clone();
                text_color.0 = color(style.text_color);
                font.font_size = style.font_px as f32;
            }
        }
    }

    fn set_message(&mut self, message: &str, rgb: Rgb) {
        for (mut text, mut text_color) in self.message.iter_mut() {
            text.0 = message.to_string();
            text_color.0 = color(rgb);
        }
    }

    fn clear_message(&mut self) {
        for (mut text, _) in self.message.iter_mut() {
            text.0.clear();
        }
    }

    fn set_background(&mut self, asset: &str) {
        for mut image in self.backdrop.iter_mut() {
            image.image = self.asset_server.load(asset.to_owned());
        }
    }

    fn set_score(&mut self, score: u64) {
        for mut text in self.score.iter_mut() {
            text.0 = format!("Score: {}", score);
        }
    }
}

fn draw_frame(mut client: ResMut<GameClient>, mut page: Page) {
    if let Some(frame) = client.take_frame() {
        frame.apply(&mut page);
    }
}

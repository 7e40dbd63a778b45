use bevy::prelude::*;
use bevy::window::WindowResolution;

use loopvale::shared::*;
use loopvale::world::LoadedMap;
use loopvale::{
    ClockPlugin, DataPlugin, DialoguePlugin, InputPlugin, NpcPlugin, PlayerPlugin, UiPlugin,
    WorldPlugin,
};

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Loopvale".to_string(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        resizable: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .init_state::<GameState>()
        .init_resource::<LoopClock>()
        .init_resource::<Inventory>()
        .init_resource::<GameFlags>()
        .init_resource::<SpawnPoint>()
        .init_resource::<DialogueCatalog>()
        .init_resource::<LoadedMap>()
        .add_event::<LoopResetEvent>()
        .add_event::<DialogueEndEvent>()
        .add_plugins((
            InputPlugin,
            DataPlugin,
            ClockPlugin,
            DialoguePlugin,
            WorldPlugin,
            PlayerPlugin,
            NpcPlugin,
            UiPlugin,
        ))
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

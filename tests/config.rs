//! Загрузка и проверка конфигурации

use dungeongen::config::{MapStyle, Palette, StyleName};
use dungeongen::{
    Dungeon, DungeonError, DungeonLayout, DungeonParams, LayoutTemplate, RoomLayout, RoomStrategy,
};

#[test]
fn empty_toml_gives_defaults() {
    let params = DungeonParams::from_toml_str("").unwrap();
    assert_eq!(params, DungeonParams::default());
    assert_eq!(params.n_rows, 39);
    assert_eq!(params.room_layout, RoomLayout::Strategy(RoomStrategy::Scattered));
    assert_eq!(params.add_stairs, 2);
}

#[test]
fn full_config_is_parsed() {
    let toml = r##"
        seed = 4
        n_rows = 28
        n_cols = 30
        dungeon_layout = "Cross"
        room_min = 3
        room_max = 7
        room_layout = "Packed"
        corridor_layout = 80
        remove_deadends = 100
        add_stairs = 3
        max_door = 2
        map_style = "Black"
        cell_size = 12
    "##;
    let params = DungeonParams::from_toml_str(toml).unwrap();
    assert_eq!(params.seed, 4);
    assert_eq!((params.n_rows, params.n_cols), (28, 30));
    assert_eq!(
        params.dungeon_layout,
        DungeonLayout::Template(LayoutTemplate::Cross)
    );
    assert_eq!(params.room_layout, RoomLayout::Strategy(RoomStrategy::Packed));
    assert_eq!(params.corridor_layout, 80);
    assert_eq!(params.remove_deadends, 100);
    assert_eq!(params.max_door, 2);
    assert_eq!(params.map_style, MapStyle::Named(StyleName::Black));
    assert!(params.validate().is_ok());
}

#[test]
fn room_count_and_custom_mask() {
    let toml = r#"
        room_layout = 12
        dungeon_layout = [[true, false], [true, true]]
    "#;
    let params = DungeonParams::from_toml_str(toml).unwrap();
    assert_eq!(params.room_layout, RoomLayout::Count(12));
    assert_eq!(
        params.dungeon_layout,
        DungeonLayout::Mask(vec![vec![true, false], vec![true, true]])
    );
    assert!(Dungeon::generate(&params).is_ok());
}

#[test]
fn custom_palette_table() {
    let toml = r##"
        [map_style]
        background = "#101010"
        wall = "#202020"
        fill = "#303030"
        open = "#f0f0f0"
        open_grid = "#e0e0e0"
        door = "#aa0000"
    "##;
    let params = DungeonParams::from_toml_str(toml).unwrap();
    let palette: Palette = params.map_style.palette();
    assert_eq!(palette.door_color(), "#aa0000");
    assert_eq!(palette.stair_color(), "#202020");
    assert!(params.validate().is_ok());
}

#[test]
fn unknown_layout_is_a_parse_error() {
    let err = DungeonParams::from_toml_str(r#"dungeon_layout = "Spiral""#).unwrap_err();
    assert!(matches!(err, DungeonError::Toml(_)));
}

#[test]
fn invalid_values_are_rejected_before_generation() {
    let cases = [
        "n_rows = 1",
        "room_min = 0",
        "room_min = 9\nroom_max = 3",
        "corridor_layout = 101",
        "remove_deadends = 150",
        "dungeon_layout = [[true, false], [true]]",
        "cell_size = 0",
        "[map_style]\nbackground = \"red\"\nwall = \"#000000\"\nfill = \"#000000\"\nopen = \"#ffffff\"\nopen_grid = \"#cccccc\"",
    ];
    for case in cases {
        let params = DungeonParams::from_toml_str(case).unwrap();
        assert!(
            matches!(params.validate(), Err(DungeonError::InvalidConfig(_))),
            "accepted: {case}"
        );
        assert!(Dungeon::generate(&params).is_err(), "generated: {case}");
    }
}

#[test]
fn config_file_round_trip() {
    let path = std::env::temp_dir().join(format!("dungeongen-{}.toml", std::process::id()));
    std::fs::write(&path, "seed = 77\nadd_stairs = 0\n").unwrap();
    let params = DungeonParams::from_toml_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(params.seed, 77);
    assert_eq!(params.add_stairs, 0);

    let missing = DungeonParams::from_toml_file(path.with_extension("missing"));
    assert!(matches!(missing, Err(DungeonError::Io(_))));
}

mod common;

use tilegen_core::{
    build_headless_app, generate_map, load_map_presets_from_env, render_ascii, GeneratedMap,
    GroundTileType, LayerKind, MapPresets, TerrainSettings, TileCensus, TilePalette, EMPTY_TILE,
};

#[test]
fn app_generates_map_on_startup() {
    let preset = MapPresets::builtin()
        .get("skerry")
        .cloned()
        .expect("skerry preset");
    let mut app = build_headless_app(TerrainSettings {
        preset,
        seed: Some(11),
    });
    // Startup runs on the first update.
    app.update();

    let map = app.world.resource::<GeneratedMap>();
    assert_eq!(map.seed, 11);
    assert_eq!((map.width, map.height), (24, 12));
    assert!(map.layer(LayerKind::Ground).is_some());
}

#[test]
fn every_builtin_preset_generates_and_renders() {
    let presets = MapPresets::builtin();
    for id in presets.ids() {
        let preset = presets.get(id).unwrap();
        let map = generate_map(preset, Some(3)).unwrap_or_else(|e| panic!("{id}: {e}"));

        let ground = map.layer(LayerKind::Ground).expect("ground layer");
        assert!(
            ground.cells().iter().all(|&c| c != EMPTY_TILE),
            "{id}: ground has unpainted cells"
        );

        let palette = if preset.palette.is_empty() {
            TilePalette::standard()
        } else {
            TilePalette::from_entries(&preset.palette).unwrap()
        };
        let text = render_ascii(&map, &palette);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), map.height as usize, "{id}");
        assert!(lines.iter().all(|l| l.chars().count() == map.width as usize), "{id}");

        let census = TileCensus::from_grid(ground);
        let total: usize = census.iter().map(|(_, n)| n).sum();
        assert_eq!(total, (map.width * map.height) as usize);
    }
}

#[test]
fn presets_load_from_env_override() -> anyhow::Result<()> {
    common::ensure_test_presets();
    let (presets, path) = load_map_presets_from_env();
    assert_eq!(path, Some(common::fixture_presets_path()));
    assert_eq!(presets.ids(), common::fixture_preset_ids()?);

    let preset = presets
        .get(common::FIXTURE_PRESET_ID)
        .ok_or_else(|| anyhow::anyhow!("fixture preset missing"))?;
    let map = generate_map(preset, None)?;
    assert_eq!(map.seed, 77);

    let ground = map
        .layer(LayerKind::Ground)
        .ok_or_else(|| anyhow::anyhow!("ground layer missing"))?;
    let census = TileCensus::from_grid(ground);
    assert_eq!(census.count(EMPTY_TILE), 0);
    let water = census.count(GroundTileType::DeepWater.code())
        + census.count(GroundTileType::River.code());
    assert!(water > 0);
    Ok(())
}

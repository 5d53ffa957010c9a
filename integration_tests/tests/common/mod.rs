use std::path::PathBuf;
use std::sync::Once;

static INIT: Once = Once::new();

pub const FIXTURE_PRESET_ID: &str = "fixture_lake";

pub fn fixture_presets_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("test_map_presets.json")
}

/// Preset ids listed in the fixture file, sorted.
pub fn fixture_preset_ids() -> anyhow::Result<Vec<String>> {
    let contents = std::fs::read_to_string(fixture_presets_path())?;
    let parsed: serde_json::Value = serde_json::from_str(&contents)?;
    let mut ids: Vec<String> = parsed["presets"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("fixture has no `presets` array"))?
        .iter()
        .filter_map(|p| p["id"].as_str().map(str::to_owned))
        .collect();
    ids.sort_unstable();
    Ok(ids)
}

pub fn ensure_test_presets() {
    INIT.call_once(|| {
        let presets_path = fixture_presets_path();

        debug_assert!(
            presets_path.exists(),
            "missing test map presets at {}",
            presets_path.display()
        );

        std::env::set_var("MAP_PRESETS_PATH", &presets_path);
    });
}

mod common;

use common::*;
use ore_heatmap::heatmap_state::{
    config::ConfigError,
    coordinates::ChunkKey,
    scanning::ChunkScanOutcome,
    slot::SlotSelection,
    HeatmapState,
};

fn sparse_config(dir: &std::path::Path) -> ore_heatmap::heatmap_state::config::HeatmapConfig {
    let mut config = config_in(dir);
    config.slots = [
        vec!["minecraft:diamond_ore".to_string()],
        Vec::new(),
        vec!["#c:ores".to_string()],
        vec!["   ".to_string()],
        Vec::new(),
    ];
    config.active_slot = 0;
    config
}

#[test]
fn cycling_skips_unconfigured_slots() {
    let dir = tempfile::tempdir().unwrap();
    let mut heatmap = HeatmapState::new(sparse_config(dir.path()));
    let mut renderer = RecordingRenderer::new();

    assert_eq!(heatmap.selection(), SlotSelection::Off);
    assert_eq!(heatmap.cycle_slot(&mut renderer), SlotSelection::Slot(slot(1)));
    assert_eq!(heatmap.cycle_slot(&mut renderer), SlotSelection::Slot(slot(3)));
    assert_eq!(heatmap.cycle_slot(&mut renderer), SlotSelection::Off);
    assert_eq!(heatmap.config().active_slot, 0);
}

#[test]
fn cycling_with_nothing_configured_stays_off() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.slots = Default::default();
    let mut heatmap = HeatmapState::new(config);
    let mut renderer = RecordingRenderer::new();

    assert_eq!(heatmap.selection(), SlotSelection::Off);
    assert_eq!(heatmap.cycle_slot(&mut renderer), SlotSelection::Off);
}

#[test]
fn persisted_unconfigured_slot_starts_off() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = sparse_config(dir.path());
    config.active_slot = 2;
    let heatmap = HeatmapState::new(config);

    assert_eq!(heatmap.selection(), SlotSelection::Off);
    assert_eq!(heatmap.config().active_slot, 0);
}

#[test]
fn selecting_an_unconfigured_slot_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let mut heatmap = HeatmapState::new(sparse_config(dir.path()));
    let mut renderer = RecordingRenderer::new();

    heatmap.select_slot(SlotSelection::Slot(slot(3)), &mut renderer);
    let kept = heatmap.select_slot(SlotSelection::Slot(slot(2)), &mut renderer);

    assert_eq!(kept, SlotSelection::Slot(slot(3)));
    assert_eq!(heatmap.config().active_slot, 3);
}

#[test]
fn switching_off_retracts_overlays_and_suspends_scanning() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = sparse_config(dir.path());
    config.active_slot = 1;
    let mut heatmap = HeatmapState::new(config);
    let host = ScriptedHost::singleplayer("off");
    let key = ChunkKey::new(0, 0);
    let mut world = MockWorld::new();
    world.load(key).fill(key, "minecraft:diamond_ore", 3);
    let mut renderer = RecordingRenderer::new();

    run_update(&mut heatmap, &host, &world, &mut renderer);
    assert_eq!(renderer.live.len(), 1);

    heatmap.select_slot(SlotSelection::Off, &mut renderer);
    assert!(renderer.live.is_empty());
    assert!(heatmap.overlays().is_empty());
    assert!(heatmap.rescan_job().is_none());

    let other = ChunkKey::new(1, 0);
    world.load(other).fill(other, "minecraft:diamond_ore", 5);
    let trigger = heatmap.scan_trigger();
    assert_eq!(
        trigger.on_chunk_available(&world, &host.source, &overworld(), other),
        ChunkScanOutcome::Ignored
    );

    run_update(&mut heatmap, &host, &world, &mut renderer);
    assert!(renderer.live.is_empty());
    assert!(heatmap.slot_counts(slot(1), &overworld()).get(&other).is_none());
}

#[test]
fn entering_a_slot_renders_its_cache_right_away() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = sparse_config(dir.path());
    config.active_slot = 1;
    let mut heatmap = HeatmapState::new(config);
    let host = ScriptedHost::singleplayer("switch");
    let key = ChunkKey::new(0, 0);
    let mut world = MockWorld::new();
    world
        .tag("c:ores", &["minecraft:iron_ore"])
        .load(key)
        .fill(key, "minecraft:diamond_ore", 2)
        .fill_layer(key, 10, "minecraft:iron_ore", 30);
    let mut renderer = RecordingRenderer::new();

    heatmap.tick(&host, &world, &mut renderer);
    let trigger = heatmap.scan_trigger();
    trigger.on_chunk_available(&world, &host.source, &overworld(), key);
    run_update(&mut heatmap, &host, &world, &mut renderer);
    assert_eq!(renderer.style_of(key).unwrap().label, "Ores: 2 blocks");

    heatmap.select_slot(SlotSelection::Slot(slot(3)), &mut renderer);

    assert_eq!(heatmap.running_max(), 30);
    assert_eq!(renderer.style_of(key).unwrap().label, "Ores: 30 blocks");
}

#[test]
fn disabling_clears_overlays_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let mut heatmap = HeatmapState::new(with_slot(config_in(dir.path()), 1, &["minecraft:diamond_ore"]));
    let host = ScriptedHost::singleplayer("toggle");
    let key = ChunkKey::new(0, 0);
    let mut world = MockWorld::new();
    world.load(key).fill(key, "minecraft:diamond_ore", 3);
    let mut renderer = RecordingRenderer::new();

    run_update(&mut heatmap, &host, &world, &mut renderer);
    assert_eq!(renderer.live.len(), 1);

    assert!(!heatmap.toggle_enabled(&mut renderer));
    assert!(renderer.live.is_empty());
    assert!(heatmap.rescan_job().is_none());
    assert!(!heatmap.config().enabled);

    assert!(heatmap.toggle_enabled(&mut renderer));
    assert_eq!(renderer.live.len(), 1);
}

#[test]
fn invalid_entries_are_rejected_without_changes() {
    let dir = tempfile::tempdir().unwrap();
    let mut heatmap = HeatmapState::new(sparse_config(dir.path()));
    let mut renderer = RecordingRenderer::new();
    let before = heatmap.tracked_set(slot(1));

    let result = heatmap.update_slot_configuration(
        slot(1),
        vec!["minecraft:gold_ore".to_string(), "Minecraft:Gold".to_string()],
        &mut renderer,
    );

    assert!(matches!(result, Err(ConfigError::InvalidEntry { .. })));
    assert_eq!(heatmap.tracked_set(slot(1)), before);
}

#[test]
fn emptying_the_active_slot_switches_off() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = sparse_config(dir.path());
    config.active_slot = 1;
    let mut heatmap = HeatmapState::new(config);
    let mut renderer = RecordingRenderer::new();

    heatmap
        .update_slot_configuration(slot(1), vec![String::new()], &mut renderer)
        .unwrap();

    assert_eq!(heatmap.selection(), SlotSelection::Off);
    assert!(!heatmap.tracked_set(slot(1)).is_configured());
}

#[test]
fn overlay_failures_do_not_stop_the_tick() {
    let dir = tempfile::tempdir().unwrap();
    let mut heatmap = HeatmapState::new(with_slot(config_in(dir.path()), 1, &["minecraft:diamond_ore"]));
    let host = ScriptedHost::singleplayer("failing");
    let mut world = MockWorld::new();
    for key in [ChunkKey::new(0, 0), ChunkKey::new(1, 0)] {
        world.load(key).fill(key, "minecraft:diamond_ore", 2);
    }
    let mut renderer = RecordingRenderer::new();
    renderer
        .failing
        .insert(ore_heatmap::heatmap_state::overlay::OverlayId::for_chunk(ChunkKey::new(1, 0)));

    run_update(&mut heatmap, &host, &world, &mut renderer);

    assert_eq!(renderer.live.len(), 1);
    assert!(renderer.style_of(ChunkKey::new(0, 0)).is_some());
    assert!(heatmap.overlays().get(ChunkKey::new(1, 0)).is_none());

    renderer.failing.clear();
    run_update(&mut heatmap, &host, &world, &mut renderer);
    assert_eq!(renderer.live.len(), 2);
}

#[test]
fn applied_config_invalidates_only_changed_slots() {
    let dir = tempfile::tempdir().unwrap();
    let config = with_slot(config_in(dir.path()), 1, &["minecraft:diamond_ore"]);
    let mut heatmap = HeatmapState::new(with_slot(config, 2, &["minecraft:gold_ore"]));
    let host = ScriptedHost::singleplayer("refresh");
    let key = ChunkKey::new(0, 0);
    let mut world = MockWorld::new();
    world
        .load(key)
        .fill(key, "minecraft:diamond_ore", 3)
        .fill_layer(key, 20, "minecraft:gold_ore", 2);
    let mut renderer = RecordingRenderer::new();

    heatmap.tick(&host, &world, &mut renderer);
    heatmap
        .scan_trigger()
        .on_chunk_available(&world, &host.source, &overworld(), key);
    heatmap.save_all();
    let identity = heatmap.world_identity().unwrap().clone();
    let diamond_file = heatmap.cache_store().slot_file_path(&identity, slot(1));
    let gold_file = heatmap.cache_store().slot_file_path(&identity, slot(2));
    let diamond_before = std::fs::read_to_string(&diamond_file).unwrap();
    assert!(gold_file.exists());

    let refreshed = with_slot(heatmap.config().clone(), 2, &["minecraft:coal_ore"]);
    heatmap.apply_config(refreshed, &mut renderer).unwrap();

    assert!(heatmap.slot_counts(slot(2), &overworld()).is_empty());
    assert!(!gold_file.exists());
    assert!(heatmap
        .tracked_set(slot(2))
        .exact_ids()
        .contains(&id("minecraft:coal_ore")));
    assert_eq!(heatmap.slot_counts(slot(1), &overworld()).get(&key), Some(&3));
    assert_eq!(std::fs::read_to_string(&diamond_file).unwrap(), diamond_before);
    assert_eq!(heatmap.selection(), SlotSelection::Slot(slot(1)));
}

#[test]
fn applied_config_moves_the_cache_root() {
    let old_root = tempfile::tempdir().unwrap();
    let new_root = tempfile::tempdir().unwrap();
    let mut heatmap = HeatmapState::new(with_slot(
        config_in(old_root.path()),
        1,
        &["minecraft:diamond_ore"],
    ));
    let host = ScriptedHost::singleplayer("moved");
    let key = ChunkKey::new(0, 0);
    let mut world = MockWorld::new();
    world.load(key).fill(key, "minecraft:diamond_ore", 5);
    let mut renderer = RecordingRenderer::new();

    heatmap.tick(&host, &world, &mut renderer);
    let identity = heatmap.world_identity().unwrap().clone();
    let old_file = heatmap.cache_store().slot_file_path(&identity, slot(1));
    assert!(!old_file.exists());

    let mut refreshed = heatmap.config().clone();
    refreshed.cache_dir = new_root.path().to_path_buf();
    heatmap.apply_config(refreshed, &mut renderer).unwrap();

    // flushed under the old root before switching
    assert!(old_file.exists());
    assert_eq!(heatmap.cache_store().root(), new_root.path());

    heatmap.save_all();
    let new_file = heatmap.cache_store().slot_file_path(&identity, slot(1));
    assert!(new_file.starts_with(new_root.path()));
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(new_file).unwrap()).unwrap();
    assert_eq!(saved[OVERWORLD]["0,0"], 5);
}

#[test]
fn invalid_config_is_rejected_without_changes() {
    let dir = tempfile::tempdir().unwrap();
    let mut heatmap = HeatmapState::new(sparse_config(dir.path()));
    let mut renderer = RecordingRenderer::new();
    let before = heatmap.config().clone();

    let mut out_of_range = before.clone();
    out_of_range.scan_radius = 0;
    out_of_range.active_slot = 1;
    assert!(matches!(
        heatmap.apply_config(out_of_range, &mut renderer),
        Err(ConfigError::OutOfRange { field: "scan_radius", .. })
    ));

    let bad_entry = with_slot(before.clone(), 2, &["gold_ore"]);
    assert!(matches!(
        heatmap.apply_config(bad_entry, &mut renderer),
        Err(ConfigError::InvalidEntry { .. })
    ));

    assert_eq!(heatmap.config(), &before);
    assert_eq!(heatmap.selection(), SlotSelection::Off);
    assert!(!heatmap.tracked_set(slot(2)).is_configured());
}

#[test]
fn applied_config_sets_slot_and_switch() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = sparse_config(dir.path());
    config.active_slot = 1;
    let mut heatmap = HeatmapState::new(config);
    let host = ScriptedHost::singleplayer("apply");
    let key = ChunkKey::new(0, 0);
    let mut world = MockWorld::new();
    world.load(key).fill(key, "minecraft:diamond_ore", 2);
    let mut renderer = RecordingRenderer::new();

    run_update(&mut heatmap, &host, &world, &mut renderer);
    assert_eq!(renderer.live.len(), 1);

    let mut refreshed = heatmap.config().clone();
    refreshed.active_slot = 3;
    refreshed.enabled = false;
    heatmap.apply_config(refreshed, &mut renderer).unwrap();

    assert_eq!(heatmap.selection(), SlotSelection::Slot(slot(3)));
    assert!(!heatmap.is_enabled());
    assert!(renderer.live.is_empty());

    // slot 2 tracks nothing, so the request is refused
    let mut refreshed = heatmap.config().clone();
    refreshed.active_slot = 2;
    refreshed.enabled = true;
    heatmap.apply_config(refreshed, &mut renderer).unwrap();

    assert_eq!(heatmap.selection(), SlotSelection::Slot(slot(3)));
    assert_eq!(heatmap.config().active_slot, 3);
    assert!(heatmap.is_enabled());
}

#[test]
fn out_of_range_settings_are_clamped_on_start() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = with_slot(config_in(dir.path()), 1, &["minecraft:diamond_ore"]);
    config.scan_radius = u32::MAX;
    config.update_interval_ticks = 0;
    let mut heatmap = HeatmapState::new(config);
    let host = ScriptedHost::singleplayer("clamped");
    let key = ChunkKey::new(0, 0);
    let mut world = MockWorld::new();
    world.load(key).fill(key, "minecraft:diamond_ore", 4);
    let mut renderer = RecordingRenderer::new();

    assert_eq!(heatmap.config().scan_radius, 8);
    assert_eq!(heatmap.config().update_interval_ticks, 20);

    heatmap.tick(&host, &world, &mut renderer);
    assert!(renderer.live.is_empty());

    for _ in 1..20 {
        heatmap.tick(&host, &world, &mut renderer);
    }
    assert_eq!(renderer.live.len(), 1);
    assert_eq!(heatmap.visible_radius(), 8);
}

mod common;

use common::*;
use ore_heatmap::heatmap_state::{
    color::{COLOR_HIGH, COLOR_MID},
    coordinates::ChunkKey,
    overlay::OVERLAY_Y,
    scanning::ChunkScanOutcome,
    HeatmapState,
};

fn diamond_config(dir: &std::path::Path) -> ore_heatmap::heatmap_state::config::HeatmapConfig {
    with_slot(config_in(dir), 1, &["minecraft:diamond_ore"])
}

#[test]
fn seven_matches_render_one_high_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let mut heatmap = HeatmapState::new(diamond_config(dir.path()));
    let host = ScriptedHost::singleplayer("e2e");
    let mut world = MockWorld::new();
    world
        .load(ChunkKey::new(0, 0))
        .fill(ChunkKey::new(0, 0), "minecraft:diamond_ore", 7);
    let mut renderer = RecordingRenderer::new();

    run_update(&mut heatmap, &host, &world, &mut renderer);

    let counts = heatmap.slot_counts(slot(1), &overworld());
    assert_eq!(counts.len(), 1);
    assert_eq!(counts.get(&"0,0".parse::<ChunkKey>().unwrap()), Some(&7));
    assert_eq!(heatmap.running_max(), 7);

    assert_eq!(renderer.live.len(), 1);
    let style = renderer.style_of(ChunkKey::new(0, 0)).unwrap();
    assert_eq!(style.fill_color, COLOR_HIGH);
    assert!((style.fill_opacity - heatmap.config().overlay_opacity).abs() < 1e-6);
    assert_eq!(style.label, "Ores: 7 blocks");
}

#[test]
fn overlay_footprint_covers_the_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let mut heatmap = HeatmapState::new(diamond_config(dir.path()));
    let mut host = ScriptedHost::singleplayer("footprint");
    host.position = cgmath::Point3::new(-8.0, 64.0, 40.0);
    let key = ChunkKey::new(-1, 2);
    let mut world = MockWorld::new();
    world.load(key).fill(key, "minecraft:diamond_ore", 3);
    let mut renderer = RecordingRenderer::new();

    run_update(&mut heatmap, &host, &world, &mut renderer);

    let (shape, _) = renderer.live.values().next().unwrap();
    assert_eq!(shape.dimension, overworld());
    assert_eq!(shape.polygon[0], cgmath::Point3::new(-16, OVERLAY_Y, 48));
    assert_eq!(shape.polygon[2], cgmath::Point3::new(0, OVERLAY_Y, 32));
    assert_eq!(shape.polygon[3], cgmath::Point3::new(-16, OVERLAY_Y, 32));
}

#[test]
fn chunks_without_matches_count_zero_and_draw_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut heatmap = HeatmapState::new(diamond_config(dir.path()));
    let host = ScriptedHost::singleplayer("zero");
    let mut world = MockWorld::new();
    world
        .load(ChunkKey::new(0, 0))
        .fill(ChunkKey::new(0, 0), "minecraft:stone", 40)
        .load(ChunkKey::new(1, 0));
    let mut renderer = RecordingRenderer::new();

    run_update(&mut heatmap, &host, &world, &mut renderer);

    let counts = heatmap.slot_counts(slot(1), &overworld());
    assert_eq!(counts.get(&ChunkKey::new(0, 0)), Some(&0));
    assert_eq!(counts.get(&ChunkKey::new(1, 0)), Some(&0));
    assert!(renderer.live.is_empty());
    assert_eq!(heatmap.running_max(), 1);
}

#[test]
fn degenerate_running_max_renders_the_mid_color() {
    let dir = tempfile::tempdir().unwrap();
    let mut heatmap = HeatmapState::new(diamond_config(dir.path()));
    let host = ScriptedHost::singleplayer("single");
    let mut world = MockWorld::new();
    world
        .load(ChunkKey::new(0, 0))
        .fill(ChunkKey::new(0, 0), "minecraft:diamond_ore", 1);
    let mut renderer = RecordingRenderer::new();

    run_update(&mut heatmap, &host, &world, &mut renderer);

    assert_eq!(heatmap.running_max(), 1);
    assert_eq!(renderer.style_of(ChunkKey::new(0, 0)).unwrap().fill_color, COLOR_MID);
}

#[test]
fn tag_entries_match_through_the_world() {
    let dir = tempfile::tempdir().unwrap();
    let config = with_slot(config_in(dir.path()), 1, &["#c:ores", "minecraft:gold_ore"]);
    let mut heatmap = HeatmapState::new(config);
    let host = ScriptedHost::singleplayer("tags");
    let key = ChunkKey::new(0, 0);
    let mut world = MockWorld::new();
    world
        .tag("c:ores", &["minecraft:iron_ore", "minecraft:gold_ore"])
        .load(key)
        .fill(key, "minecraft:iron_ore", 5)
        .fill_layer(key, 20, "minecraft:gold_ore", 4)
        .fill_layer(key, 21, "minecraft:stone", 9);
    let mut renderer = RecordingRenderer::new();

    run_update(&mut heatmap, &host, &world, &mut renderer);

    // gold matches both the tag and the exact id but counts once
    assert_eq!(heatmap.slot_counts(slot(1), &overworld()).get(&key), Some(&9));
}

#[test]
fn chunk_load_events_scan_every_configured_slot() {
    let dir = tempfile::tempdir().unwrap();
    let config = with_slot(config_in(dir.path()), 2, &["minecraft:gold_ore"]);
    let mut heatmap = HeatmapState::new(with_slot(config, 1, &["minecraft:diamond_ore"]));
    let host = ScriptedHost::singleplayer("events");
    let mut world = MockWorld::new();
    let mut renderer = RecordingRenderer::new();
    let trigger = heatmap.scan_trigger();

    heatmap.tick(&host, &world, &mut renderer);

    let key = ChunkKey::new(2, 1);
    world
        .load(key)
        .fill(key, "minecraft:diamond_ore", 12)
        .fill_layer(key, 30, "minecraft:gold_ore", 2);
    let outcome = trigger.on_chunk_available(&world, &host.source, &overworld(), key);

    assert_eq!(outcome, ChunkScanOutcome::Scanned { slots: 5 });
    assert_eq!(heatmap.slot_counts(slot(1), &overworld()).get(&key), Some(&12));
    assert_eq!(heatmap.slot_counts(slot(2), &overworld()).get(&key), Some(&2));
    assert_eq!(heatmap.running_max(), 12);

    // cached chunks are trusted on later load events
    assert_eq!(
        trigger.on_chunk_available(&world, &host.source, &overworld(), key),
        ChunkScanOutcome::Scanned { slots: 0 }
    );
}

#[test]
fn events_before_a_world_is_joined_are_deferred_then_drained() {
    let dir = tempfile::tempdir().unwrap();
    let mut heatmap = HeatmapState::new(diamond_config(dir.path()));
    let host = ScriptedHost::singleplayer("deferred");
    let key = ChunkKey::new(0, 0);
    let mut world = MockWorld::new();
    world.load(key).fill(key, "minecraft:diamond_ore", 4);
    let mut renderer = RecordingRenderer::new();

    let trigger = heatmap.scan_trigger();
    assert_eq!(
        trigger.on_chunk_available(&world, &host.source, &overworld(), key),
        ChunkScanOutcome::Deferred
    );
    assert!(heatmap.slot_counts(slot(1), &overworld()).is_empty());

    heatmap.tick(&host, &world, &mut renderer);

    assert_eq!(heatmap.slot_counts(slot(1), &overworld()).get(&key), Some(&4));
}

#[test]
fn minimap_zoom_shrinks_the_rendered_disc() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = diamond_config(dir.path());
    config.scan_radius = 8;
    let mut heatmap = HeatmapState::new(config);
    let mut host = ScriptedHost::singleplayer("zoom");
    let mut world = MockWorld::new();
    for key in ChunkKey::disc(ChunkKey::new(0, 0), 6) {
        world.load(key).fill(key, "minecraft:diamond_ore", 2);
    }
    let mut renderer = RecordingRenderer::new();

    for _ in 0..10 {
        run_update(&mut heatmap, &host, &world, &mut renderer);
    }
    assert_eq!(renderer.live.len(), ChunkKey::disc(ChunkKey::new(0, 0), 6).len());

    // (128 >> 2) / 16 + 1 = 3 chunks
    host.zoom = Some(2);
    run_update(&mut heatmap, &host, &world, &mut renderer);
    assert_eq!(heatmap.visible_radius(), 3);
    assert_eq!(renderer.live.len(), ChunkKey::disc(ChunkKey::new(0, 0), 3).len());
}

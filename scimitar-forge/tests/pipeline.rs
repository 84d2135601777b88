//! End-to-end pipeline behavior: decompression, resource extraction, bulk runs.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use scimitar_forge::{Forge, ForgeConfig, Pipeline};
use scimitar_rdb::Game;
use scimitar_resources::TextureOutcome;

use common::{
    deflate_unit, lz4_unit, odyssey_mesh_payload, odyssey_texture_payload, write_forge,
    FixtureUnit,
};

fn pipeline_in(dir: &std::path::Path) -> Pipeline {
    Pipeline::new(ForgeConfig::default().with_temp_dir(dir.join("scratch"))).unwrap()
}

#[tokio::test]
async fn decompress_entry_round_trips_both_families() {
    let dir = tempfile::tempdir().unwrap();
    let original = b"payload payload payload payload payload".to_vec();

    for (game, unit) in [
        (Game::Odyssey, deflate_unit(&original)),
        (Game::Steep, lz4_unit(&original)),
    ] {
        let path = dir.path().join(format!("{}.forge", game.extension()));
        write_forge(&path, &[FixtureUnit::named(0x01, "unit", unit)]);

        let forge = Arc::new(Forge::open(&path, game, ForgeConfig::default()).unwrap());
        let pipeline = pipeline_in(dir.path());
        let entry = forge.entry_by_name("unit").unwrap();
        assert_eq!(
            pipeline.decompress_entry(&forge, &entry).await.unwrap(),
            original
        );
    }
}

#[tokio::test]
async fn uncompressed_units_pass_through() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.forge");
    let plain = b"no raw-data block here at all".to_vec();
    write_forge(&path, &[FixtureUnit::named(0x01, "plain", plain.clone())]);

    let forge = Arc::new(Forge::open(&path, Game::Odyssey, ForgeConfig::default()).unwrap());
    let pipeline = pipeline_in(dir.path());
    let entry = forge.entry_by_name("plain").unwrap();
    assert_eq!(pipeline.decompress_entry(&forge, &entry).await.unwrap(), plain);
}

#[tokio::test]
async fn decompress_to_temp_uses_game_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.forge");
    let original = b"unit destined for the scratch directory".to_vec();
    write_forge(
        &path,
        &[FixtureUnit::named(0x01, "chest", deflate_unit(&original))],
    );

    let forge = Arc::new(Forge::open(&path, Game::Origins, ForgeConfig::default()).unwrap());
    let pipeline = pipeline_in(dir.path());
    let entry = forge.entry_by_name("chest").unwrap();

    let out = pipeline
        .decompress_entry_to_temp(&forge, &entry)
        .await
        .unwrap();
    assert_eq!(out.file_name().unwrap(), "chest.acor");
    assert_eq!(std::fs::read(&out).unwrap(), original);
}

#[tokio::test]
async fn meshes_extract_through_a_compressed_unit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesh.forge");
    write_forge(
        &path,
        &[FixtureUnit::named(
            0x01,
            "rock",
            deflate_unit(&odyssey_mesh_payload()),
        )],
    );

    let forge = Arc::new(Forge::open(&path, Game::Odyssey, ForgeConfig::default()).unwrap());
    let pipeline = pipeline_in(dir.path());
    let entry = forge.entry_by_name("rock").unwrap();

    let meshes = pipeline.extract_entry_meshes(&forge, &entry).await.unwrap();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].vertex_count(), 3);
    assert_eq!(meshes[0].face_count(), 1);

    let obj = meshes[0].to_obj();
    assert!(obj.starts_with("o mesh_0\n"));
    assert!(obj.contains("f 1 2 3"));
}

#[tokio::test]
async fn missing_resource_is_typed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.forge");
    write_forge(
        &path,
        &[FixtureUnit::named(
            0x01,
            "noise",
            deflate_unit(&[0x5Au8; 256]),
        )],
    );

    let forge = Arc::new(Forge::open(&path, Game::Odyssey, ForgeConfig::default()).unwrap());
    let pipeline = pipeline_in(dir.path());
    let entry = forge.entry_by_name("noise").unwrap();

    assert!(matches!(
        pipeline.extract_entry_meshes(&forge, &entry).await,
        Err(scimitar_forge::Error::ResourceMissing(
            scimitar_resources::ResourceKind::Mesh
        ))
    ));
}

#[tokio::test]
async fn textures_extract_and_convert_through_a_compressed_unit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tex.forge");
    write_forge(
        &path,
        &[FixtureUnit::named(
            0x01,
            "stone",
            deflate_unit(&odyssey_texture_payload()),
        )],
    );

    let forge = Arc::new(Forge::open(&path, Game::Odyssey, ForgeConfig::default()).unwrap());
    let pipeline = pipeline_in(dir.path());
    let entry = forge.entry_by_name("stone").unwrap();

    match pipeline.extract_entry_texture(&forge, &entry).await.unwrap() {
        TextureOutcome::Converted { surface, image } => {
            assert!(surface.is_file());
            assert!(image.is_file());
            assert_eq!(surface.extension().unwrap(), "dds");
            assert_eq!(image.extension().unwrap(), "png");
        }
        other => panic!("expected conversion, got {other:?}"),
    }
}

#[tokio::test]
async fn texture_sets_list_member_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("set.forge");

    let mut payload = Vec::new();
    payload.extend_from_slice(&scimitar_resources::ResourceKind::TextureSet.marker());
    payload.extend_from_slice(&2u32.to_le_bytes());
    payload.extend_from_slice(&0x100u64.to_le_bytes());
    payload.extend_from_slice(&0x200u64.to_le_bytes());

    write_forge(
        &path,
        &[FixtureUnit::named(0x01, "set", deflate_unit(&payload))],
    );

    let forge = Arc::new(Forge::open(&path, Game::Odyssey, ForgeConfig::default()).unwrap());
    let pipeline = pipeline_in(dir.path());
    let entry = forge.entry_by_name("set").unwrap();

    assert_eq!(
        pipeline
            .extract_entry_texture_set(&forge, &entry)
            .await
            .unwrap(),
        vec![0x100, 0x200]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn bulk_extraction_isolates_failures() {
    common::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bulk.forge");
    write_forge(
        &path,
        &[
            FixtureUnit::named(0x01, "first", deflate_unit(b"first unit contents")),
            FixtureUnit {
                file_id: 0x02,
                name: Some("broken"),
                data: deflate_unit(b"never readable"),
                index_offset_override: Some(9_999_999),
                index_size_override: None,
            },
            FixtureUnit::named(0x03, "third", deflate_unit(b"third unit contents")),
        ],
    );

    let forge = Arc::new(Forge::open(&path, Game::Odyssey, ForgeConfig::default()).unwrap());
    let pipeline = pipeline_in(dir.path());
    let dest = dir.path().join("out");

    let report = pipeline.extract_all(&forge, &dest).await.unwrap();
    assert_eq!(report.written, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(!report.is_complete());
    assert_eq!(report.failures[0].0, "broken");

    assert_eq!(std::fs::read(dest.join("first")).unwrap(), b"first unit contents");
    assert_eq!(std::fs::read(dest.join("third")).unwrap(), b"third unit contents");
    assert!(!dest.join("broken").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn path_syntax_in_entry_names_stays_inside_the_destination() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("names.forge");
    write_forge(
        &path,
        &[
            FixtureUnit::named(0x01, "../breakout", deflate_unit(b"relative name contents")),
            FixtureUnit::named(0x02, "/etc/absolute", deflate_unit(b"absolute name contents")),
        ],
    );

    let forge = Arc::new(Forge::open(&path, Game::Odyssey, ForgeConfig::default()).unwrap());
    let pipeline = pipeline_in(dir.path());
    let dest = dir.path().join("deep").join("out");

    let report = pipeline.extract_all(&forge, &dest).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(
        std::fs::read(dest.join("breakout")).unwrap(),
        b"relative name contents"
    );
    assert_eq!(
        std::fs::read(dest.join("absolute")).unwrap(),
        b"absolute name contents"
    );
    // Nothing escaped past the destination directory.
    assert!(!dir.path().join("deep").join("breakout").exists());
    assert!(!std::path::Path::new("/etc/absolute").exists());

    // The scratch path for a decompressed unit is confined the same way.
    let entry = forge.entry_by_name("../breakout").unwrap();
    let out = pipeline.decompress_entry_to_temp(&forge, &entry).await.unwrap();
    assert_eq!(out.file_name().unwrap(), "breakout.acod");
    assert_eq!(out.parent().unwrap(), pipeline.config().temp_dir);
}

#[tokio::test(flavor = "multi_thread")]
async fn bulk_extraction_of_a_clean_container_is_complete() {
    common::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clean.forge");
    write_forge(
        &path,
        &[
            FixtureUnit::named(0x01, "a", lz4_unit(b"alpha alpha alpha")),
            FixtureUnit::named(0x02, "b", lz4_unit(b"bravo bravo bravo")),
        ],
    );

    let forge = Arc::new(Forge::open(&path, Game::Steep, ForgeConfig::default()).unwrap());
    let pipeline = pipeline_in(dir.path());
    let dest = dir.path().join("out");

    let report = pipeline.extract_all(&forge, &dest).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.written, 2);
    assert_eq!(std::fs::read(dest.join("a")).unwrap(), b"alpha alpha alpha");
}

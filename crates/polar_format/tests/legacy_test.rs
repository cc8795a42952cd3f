//! Integration tests for reading older format revisions.
//!
//! Each test hand-assembles a world the way the writer of that revision did.

use polar_format::bytes::ByteWriter;
use polar_format::nbt::{write_named_root, write_root};
use polar_format::palette::{bits_per_entry, pack};
use polar_format::section::{BLOCK_CAPACITY, LIGHT_LEN};
use polar_format::version::{
    VERSION_DATA_CONVERTER, VERSION_DEPRECATED_ENTITIES, VERSION_IMPROVED_LIGHT, VERSION_MINESTOM_NBT_READ_BREAK,
    VERSION_SHORT_GRASS, VERSION_UNIFIED_LIGHT, VERSION_USERDATA_OPT_BLOCK_ENT_NBT, VERSION_WORLD_USERDATA,
};
use polar_format::{
    decode_legacy_entities, read_schematic_offset, read_world, read_world_with_converter, write_schematic_offset,
    write_world, DataConverter, Light, LightContent, NbtCompound, NbtTag, LATEST_VERSION, MAGIC,
};

fn container(version: u16, data_version: Option<i32>, payload: &[u8]) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    writer.write_u32(MAGIC);
    writer.write_u16(version);
    if let Some(data_version) = data_version {
        writer.write_var_int(data_version);
    }
    writer.write_u8(0);
    writer.write_length(payload.len());
    writer.write_bytes(payload);
    writer.into_inner()
}

/// Two-section world header with one chunk at (5, -2).
fn payload_start(world_user_data: Option<&[u8]>) -> ByteWriter {
    let mut writer = ByteWriter::new();
    writer.write_i8(0);
    writer.write_i8(1);
    if let Some(data) = world_user_data {
        writer.write_byte_array(data);
    }
    writer.write_length(1);
    writer.write_var_int(5);
    writer.write_var_int(-2);
    writer
}

fn write_palettes(writer: &mut ByteWriter, blocks: &[&str]) {
    writer.write_u8(0);
    writer.write_string_array(blocks);
    if blocks.len() > 1 {
        let data: Vec<u32> = (0..BLOCK_CAPACITY).map(|i| (i % blocks.len()) as u32).collect();
        writer.write_long_array(&pack(&data, bits_per_entry(blocks.len())));
    }
    writer.write_string_array(&["minecraft:plains"]);
}

fn chest_data() -> NbtCompound {
    let mut data = NbtCompound::new();
    data.insert("Lock", NbtTag::String("key".into()));
    data
}

#[test]
fn test_version_1_unified_light_and_named_tags() {
    let mut payload = payload_start(None);
    write_palettes(&mut payload, &["minecraft:stone", "minecraft:grass"]);
    payload.write_u8(1);
    payload.write_bytes(&[0x11; LIGHT_LEN]);
    payload.write_bytes(&[0xFF; LIGHT_LEN]);
    payload.write_u8(1);

    payload.write_length(1);
    payload.write_i32(polar_format::block_index(1, 2, 3));
    payload.write_optional_string(Some("minecraft:chest"));
    write_named_root(&mut payload, "", &chest_data()).unwrap();
    payload.write_i32(0);

    let world = read_world(&container(VERSION_UNIFIED_LIGHT, None, payload.as_slice())).unwrap();
    assert_eq!(world.version(), VERSION_UNIFIED_LIGHT);
    assert!(world.user_data().is_empty());

    let chunk = world.chunk_at(5, -2).unwrap();
    let section = &chunk.sections()[0];
    assert_eq!(section.block_palette(), ["minecraft:stone", "short_grass"]);
    assert_eq!(section.block_at(1, 0, 0), Some("short_grass"));
    assert_eq!(section.block_light().data().map(|d| d[0]), Some(0x11));
    assert_eq!(section.sky_light().data().map(|d| d[LIGHT_LEN - 1]), Some(0xFF));
    assert!(chunk.sections()[1].is_empty());

    let chest = &chunk.block_entities()[0];
    assert_eq!(chest.position(), (1, 2, 3));
    assert_eq!(chest.id(), Some("minecraft:chest"));
    assert_eq!(chest.data(), Some(&chest_data()));
    assert!(chunk.user_data().is_empty());
}

#[test]
fn test_version_2_split_light_flags() {
    let mut payload = payload_start(None);
    write_palettes(&mut payload, &["minecraft:dirt"]);
    payload.write_u8(1);
    payload.write_bytes(&[0x22; LIGHT_LEN]);
    payload.write_u8(0);
    payload.write_u8(1);

    payload.write_length(1);
    payload.write_i32(0);
    payload.write_optional_string(None);
    write_named_root(&mut payload, "root", &NbtCompound::new()).unwrap();
    payload.write_i32(0);

    let world = read_world(&container(VERSION_USERDATA_OPT_BLOCK_ENT_NBT, None, payload.as_slice())).unwrap();
    let chunk = world.chunk_at(5, -2).unwrap();
    let section = &chunk.sections()[0];
    assert_eq!(section.block_light().content(), LightContent::Present);
    assert_eq!(*section.sky_light(), Light::Missing);
    assert_eq!(chunk.block_entities()[0].data(), Some(&NbtCompound::new()));
}

#[test]
fn test_version_0_matches_version_1_layout() {
    let mut payload = payload_start(None);
    write_palettes(&mut payload, &["minecraft:grass"]);
    payload.write_u8(0);
    payload.write_u8(1);

    payload.write_length(1);
    payload.write_i32(polar_format::block_index(4, 60, 4));
    payload.write_optional_string(Some("minecraft:chest"));
    write_named_root(&mut payload, "", &chest_data()).unwrap();
    payload.write_i32(0);

    let world = read_world(&container(0, None, payload.as_slice())).unwrap();
    assert_eq!(world.version(), 0);
    assert!(world.user_data().is_empty());

    let chunk = world.chunk_at(5, -2).unwrap();
    let section = &chunk.sections()[0];
    assert_eq!(section.block_palette(), ["short_grass"]);
    assert_eq!(*section.block_light(), Light::Missing);
    assert_eq!(*section.sky_light(), Light::Missing);
    assert_eq!(chunk.block_entities()[0].position(), (4, 60, 4));
    assert_eq!(chunk.block_entities()[0].data(), Some(&chest_data()));
    assert!(chunk.user_data().is_empty());
}

#[test]
fn test_version_3_presence_byte_with_named_tags() {
    let mut payload = payload_start(None);
    write_palettes(&mut payload, &["minecraft:stone", "minecraft:grass"]);
    payload.write_u8(0);
    payload.write_u8(1);
    payload.write_bytes(&[0x33; LIGHT_LEN]);
    payload.write_u8(1);

    payload.write_length(2);
    payload.write_i32(0);
    payload.write_optional_string(Some("minecraft:chest"));
    payload.write_bool(true);
    write_named_root(&mut payload, "BlockEntityTag", &chest_data()).unwrap();
    payload.write_i32(polar_format::block_index(2, -1, 2));
    payload.write_optional_string(Some("minecraft:sign"));
    payload.write_bool(false);

    payload.write_i32(0);
    payload.write_byte_array(&[7]);

    let bytes = container(VERSION_MINESTOM_NBT_READ_BREAK, None, payload.as_slice());
    let world = read_world(&bytes).unwrap();
    assert_eq!(world.version(), VERSION_MINESTOM_NBT_READ_BREAK);

    let chunk = world.chunk_at(5, -2).unwrap();
    let section = &chunk.sections()[0];
    assert_eq!(section.block_palette(), ["minecraft:stone", "short_grass"]);
    assert_eq!(*section.block_light(), Light::Missing);
    assert_eq!(section.sky_light().data().map(|d| d[5]), Some(0x33));

    assert_eq!(chunk.block_entities()[0].data(), Some(&chest_data()));
    assert_eq!(chunk.block_entities()[1].id(), Some("minecraft:sign"));
    assert_eq!(chunk.block_entities()[1].data(), None);
    assert_eq!(chunk.block_entities()[1].position(), (2, -1, 2));
    assert_eq!(chunk.user_data(), &[7]);

    // A nameless root is not what version 3 wrote.
    let mut nameless = payload_start(None);
    write_palettes(&mut nameless, &["minecraft:stone"]);
    nameless.write_u8(0);
    nameless.write_u8(0);
    nameless.write_u8(1);
    nameless.write_length(1);
    nameless.write_i32(0);
    nameless.write_optional_string(None);
    nameless.write_bool(true);
    write_root(&mut nameless, &chest_data()).unwrap();
    nameless.write_i32(0);
    nameless.write_byte_array(&[]);
    assert!(read_world(&container(VERSION_MINESTOM_NBT_READ_BREAK, None, nameless.as_slice())).is_err());
}

#[test]
fn test_version_4_optional_nameless_tags_and_chunk_user_data() {
    let mut payload = payload_start(None);
    write_palettes(&mut payload, &["minecraft:grass", "minecraft:tall_grass"]);
    payload.write_u8(0);
    payload.write_u8(0);
    payload.write_u8(1);

    payload.write_length(2);
    payload.write_i32(0);
    payload.write_optional_string(Some("minecraft:chest"));
    payload.write_bool(true);
    write_root(&mut payload, &chest_data()).unwrap();
    payload.write_i32(polar_format::block_index(0, -5, 0));
    payload.write_optional_string(None);
    payload.write_bool(false);

    payload.write_i32(0);
    payload.write_byte_array(&[9, 9]);

    let world = read_world(&container(VERSION_WORLD_USERDATA, None, payload.as_slice())).unwrap();
    let chunk = world.chunk_at(5, -2).unwrap();
    assert_eq!(chunk.sections()[0].block_palette(), ["short_grass", "minecraft:tall_grass"]);
    assert_eq!(chunk.block_entities()[0].data(), Some(&chest_data()));
    assert_eq!(chunk.block_entities()[1].data(), None);
    assert_eq!(chunk.block_entities()[1].position(), (0, -5, 0));
    assert_eq!(chunk.user_data(), &[9, 9]);
}

#[test]
fn test_version_5_world_user_data() {
    let offset = write_schematic_offset(1, 2, 3);
    let mut payload = payload_start(Some(offset.as_slice()));
    write_palettes(&mut payload, &["grass"]);
    payload.write_u8(0);
    payload.write_u8(0);
    payload.write_u8(1);
    payload.write_length(0);
    payload.write_i32(0);
    payload.write_byte_array(&[]);

    let world = read_world(&container(VERSION_SHORT_GRASS, None, payload.as_slice())).unwrap();
    assert_eq!(read_schematic_offset(&world.user_data()).unwrap(), Some((1, 2, 3)));
    let chunk = world.chunk_at(5, -2).unwrap();
    assert_eq!(chunk.sections()[0].block_palette(), ["short_grass"]);
}

#[test]
fn test_version_6_keeps_grass_and_reads_data_version() {
    let mut payload = payload_start(Some(&[][..]));
    write_palettes(&mut payload, &["minecraft:grass"]);
    payload.write_u8(0);
    payload.write_u8(0);
    payload.write_u8(1);
    payload.write_length(0);
    payload.write_i32(0);
    payload.write_byte_array(&[]);

    let world = read_world(&container(VERSION_DATA_CONVERTER, Some(3700), payload.as_slice())).unwrap();
    assert_eq!(world.data_version(), 3700);
    let chunk = world.chunk_at(5, -2).unwrap();
    assert_eq!(chunk.sections()[0].block_palette(), ["minecraft:grass"]);
}

#[test]
fn test_version_8_entities_move_into_user_data() {
    let mut payload = payload_start(Some(&[][..]));
    write_palettes(&mut payload, &["minecraft:stone"]);
    payload.write_u8(2);
    payload.write_u8(0);
    payload.write_u8(1);
    payload.write_length(0);

    payload.write_length(1);
    payload.write_f64(0.5);
    payload.write_f64(70.0);
    payload.write_f64(-0.5);
    payload.write_f32(45.0);
    payload.write_f32(0.0);
    payload.write_byte_array(&[10, 0]);

    payload.write_i32(1);
    payload.write_long_array(&pack(&[4u32; 256], 5));
    payload.write_byte_array(&[1, 2, 3]);

    let world = read_world(&container(VERSION_DEPRECATED_ENTITIES, Some(3700), payload.as_slice())).unwrap();
    assert_eq!(world.version(), VERSION_DEPRECATED_ENTITIES);

    let chunk = world.chunk_at(5, -2).unwrap();
    assert_eq!(*chunk.sections()[0].block_light(), Light::Full);
    assert_eq!(chunk.heightmap(0), Some(&[4u32; 256][..]));

    let entities = decode_legacy_entities(chunk.user_data()).unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!((entities[0].x, entities[0].y, entities[0].z), (0.5, 70.0, -0.5));
    assert_eq!(entities[0].yaw, 45.0);
    assert_eq!(entities[0].bytes, vec![10, 0]);

    // Re-saving upgrades to the latest revision and keeps the blob.
    let upgraded = read_world(&write_world(&world).unwrap()).unwrap();
    assert_eq!(upgraded.version(), LATEST_VERSION);
    assert_eq!(upgraded.chunk_at(5, -2).unwrap().user_data(), chunk.user_data());
}

struct RenamingConverter;

impl DataConverter for RenamingConverter {
    fn default_data_version(&self) -> i32 {
        100
    }

    fn current_data_version(&self) -> i32 {
        200
    }

    fn convert_block_palette(&self, palette: &mut [String], from_version: i32, to_version: i32) {
        assert_eq!((from_version, to_version), (150, 200));
        for entry in palette.iter_mut() {
            if entry == "old:block" {
                *entry = "new:block".to_owned();
            }
        }
    }

    fn convert_block_entity(&self, id: String, mut data: NbtCompound, _: i32, _: i32) -> (String, NbtCompound) {
        if id == "old:chest" {
            data.insert("converted", NbtTag::Byte(1));
            return ("new:chest".to_owned(), data);
        }
        (id, data)
    }
}

#[test]
fn test_outdated_data_version_is_converted() {
    let mut payload = payload_start(Some(&[][..]));
    write_palettes(&mut payload, &["old:block", "minecraft:air"]);
    payload.write_u8(0);
    payload.write_u8(0);
    payload.write_u8(1);

    payload.write_length(2);
    payload.write_i32(0);
    payload.write_optional_string(Some("old:chest"));
    payload.write_bool(false);
    payload.write_i32(1);
    payload.write_optional_string(None);
    payload.write_bool(false);

    payload.write_i32(0);
    payload.write_byte_array(&[]);

    let bytes = container(VERSION_IMPROVED_LIGHT, Some(150), payload.as_slice());
    let world = read_world_with_converter(&bytes, &RenamingConverter).unwrap();
    assert_eq!(world.data_version(), 200);

    let chunk = world.chunk_at(5, -2).unwrap();
    assert_eq!(chunk.sections()[0].block_palette(), ["new:block", "minecraft:air"]);

    let chest = &chunk.block_entities()[0];
    assert_eq!(chest.id(), Some("new:chest"));
    assert_eq!(chest.data().and_then(|d| d.get::<_, i8>("converted").ok()), Some(1));

    let bare = &chunk.block_entities()[1];
    assert_eq!(bare.id(), None);
    assert_eq!(bare.data(), None);
}

struct SuffixConverter;

impl DataConverter for SuffixConverter {
    fn default_data_version(&self) -> i32 {
        1
    }

    fn current_data_version(&self) -> i32 {
        2
    }

    fn convert_block_palette(&self, palette: &mut [String], _: i32, _: i32) {
        for entry in palette.iter_mut() {
            entry.push_str("_v2");
        }
    }

    fn convert_block_entity(&self, id: String, data: NbtCompound, _: i32, _: i32) -> (String, NbtCompound) {
        (id, data)
    }
}

#[test]
fn test_converted_palette_keeps_stored_length() {
    let mut payload = payload_start(Some(&[][..]));
    write_palettes(&mut payload, &["a", "b", "c"]);
    payload.write_u8(0);
    payload.write_u8(0);
    payload.write_u8(1);
    payload.write_length(0);
    payload.write_i32(0);
    payload.write_byte_array(&[]);

    let bytes = container(VERSION_IMPROVED_LIGHT, Some(1), payload.as_slice());
    let world = read_world_with_converter(&bytes, &SuffixConverter).unwrap();
    let chunk = world.chunk_at(5, -2).unwrap();
    let section = &chunk.sections()[0];
    assert_eq!(section.block_palette(), ["a_v2", "b_v2", "c_v2"]);
    assert_eq!(section.block_at(2, 0, 0), Some("c_v2"));
}

#[test]
fn test_pre_data_version_files_use_converter_default() {
    let mut payload = payload_start(Some(&[][..]));
    write_palettes(&mut payload, &["minecraft:stone"]);
    payload.write_u8(0);
    payload.write_u8(0);
    payload.write_u8(1);
    payload.write_length(0);
    payload.write_i32(0);
    payload.write_byte_array(&[]);

    let world = read_world(&container(VERSION_SHORT_GRASS, None, payload.as_slice())).unwrap();
    assert_eq!(world.data_version(), polar_format::converter::NOOP_DATA_VERSION);
}

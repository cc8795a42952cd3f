//! Integration tests for whole-world write/read round trips.

use polar_format::section::{BIOME_CAPACITY, BLOCK_CAPACITY, LIGHT_LEN};
use polar_format::{
    read_schematic_offset, read_world, write_schematic_offset, write_world, BlockEntity, CompressionType, Light,
    NbtCompound, NbtList, NbtTag, PolarChunk, PolarSection, PolarWorld,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn palette(len: usize, prefix: &str) -> Vec<String> {
    (0..len).map(|i| format!("{prefix}:entry_{i}")).collect()
}

fn random_section(rng: &mut StdRng, block_palette_len: usize) -> PolarSection {
    let blocks = palette(block_palette_len, "minecraft");
    let block_data = (block_palette_len > 1)
        .then(|| (0..BLOCK_CAPACITY).map(|_| rng.gen_range(0..block_palette_len as u32)).collect());

    let biome_len = rng.gen_range(1..=5usize);
    let biomes = palette(biome_len, "biome");
    let biome_data =
        (biome_len > 1).then(|| (0..BIOME_CAPACITY).map(|_| rng.gen_range(0..biome_len as u32)).collect());

    let mut light = [0u8; LIGHT_LEN];
    rng.fill(&mut light[..]);

    PolarSection::new(blocks, block_data, biomes, biome_data)
        .unwrap()
        .with_block_light(Light::present(light))
        .with_sky_light(if rng.gen_bool(0.5) { Light::Full } else { Light::Empty })
}

fn random_world(seed: u64) -> PolarWorld {
    let mut rng = StdRng::seed_from_u64(seed);
    let world = PolarWorld::new(-2, 5).unwrap();
    world.set_user_data(write_schematic_offset(10, -64, 3));

    for (i, palette_len) in [1usize, 2, 17, 4096].into_iter().enumerate() {
        let x = i as i32 - 2;
        let z = -(i as i32) * 7;
        let mut sections = vec![PolarSection::default(); world.section_count()];
        sections[i] = random_section(&mut rng, palette_len);
        if palette_len == 1 {
            sections[i + 1] = PolarSection::uniform("minecraft:bedrock", "minecraft:plains");
        }

        let mut data = NbtCompound::new();
        data.insert("Items", NbtTag::List(NbtList::new()));
        data.insert("CustomName", NbtTag::String(format!("chest {i}")));

        let heights: Vec<u32> = (0..256).map(|_| rng.gen_range(0..128)).collect();
        let chunk = PolarChunk::new(x, z, sections)
            .with_block_entities(vec![
                BlockEntity::new(3, -30, 9, Some("minecraft:chest".into()), Some(data)),
                BlockEntity::new(15, 100, 15, None, None),
            ])
            .with_heightmap(0, heights)
            .unwrap()
            .with_user_data(vec![i as u8; i * 3]);
        world.update_chunk_at(x, z, chunk).unwrap();
    }
    world
}

fn assert_same_chunks(a: &PolarWorld, b: &PolarWorld) {
    assert_eq!(a.chunk_count(), b.chunk_count(), "chunk count differs");
    for (x, z) in a.chunk_keys() {
        let left = a.chunk_at(x, z).unwrap();
        let right = b.chunk_at(x, z).unwrap_or_else(|| panic!("chunk ({x}, {z}) missing"));
        assert_eq!(*left, *right, "chunk ({x}, {z}) differs");
    }
}

#[test]
fn test_scenario_stone_and_air() {
    let world = PolarWorld::new(-4, 19).unwrap();
    assert_eq!(world.section_count(), 24);

    let mut block_data = vec![1u32; BLOCK_CAPACITY];
    block_data[0] = 0;
    let section = PolarSection::new(
        vec!["minecraft:stone".into(), "minecraft:air".into()],
        Some(block_data.clone()),
        vec!["minecraft:plains".into()],
        None,
    )
    .unwrap();

    let mut sections = vec![PolarSection::default(); 24];
    sections[4] = section;
    world.update_chunk_at(0, 0, PolarChunk::new(0, 0, sections)).unwrap();

    let loaded = read_world(&write_world(&world).unwrap()).unwrap();
    let chunk = loaded.chunk_at(0, 0).expect("chunk must survive");
    let decoded = &chunk.sections()[4];
    assert_eq!(decoded.block_palette(), ["minecraft:stone", "minecraft:air"]);
    assert_eq!(decoded.block_data(), Some(block_data.as_slice()));
    assert!(!decoded.is_empty());
    assert_eq!(decoded.block_at(0, 0, 0), Some("minecraft:stone"));
    assert_eq!(decoded.block_at(0, 1, 0), Some("minecraft:air"));
    assert!(chunk.sections().iter().enumerate().all(|(i, s)| i == 4 || s.is_empty()));
}

#[test]
fn test_empty_chunk_dropped() {
    let world = PolarWorld::blank();
    world.update_chunk_at(0, 0, PolarChunk::blank(0, 0, 24)).unwrap();
    let mut sections = vec![PolarSection::default(); 24];
    sections[0] = PolarSection::uniform("minecraft:stone", "minecraft:plains");
    world.update_chunk_at(1, 0, PolarChunk::new(1, 0, sections)).unwrap();
    assert_eq!(world.chunk_count(), 2);
    assert_eq!(world.non_empty_chunk_count(), 1);

    let loaded = read_world(&write_world(&world).unwrap()).unwrap();
    assert!(loaded.chunk_at(0, 0).is_none(), "empty chunk must be dropped");
    assert!(loaded.chunk_at(1, 0).is_some());
    assert_eq!(loaded.chunk_count(), 1);
}

#[test]
fn test_random_world_roundtrip_both_compressions() {
    for compression in [CompressionType::Zstd, CompressionType::None] {
        let world = random_world(0x5EED);
        world.set_compression(compression);

        let bytes = write_world(&world).unwrap();
        let loaded = read_world(&bytes).unwrap();

        assert_eq!(loaded.compression(), compression);
        assert_eq!(loaded.min_section(), -2);
        assert_eq!(loaded.max_section(), 5);
        assert_eq!(loaded.data_version(), world.data_version());
        assert_eq!(loaded.user_data(), world.user_data());
        assert_eq!(read_schematic_offset(&loaded.user_data()).unwrap(), Some((10, -64, 3)));
        assert_same_chunks(&world, &loaded);
    }
}

#[test]
fn test_rewrite_is_stable() {
    let world = random_world(7);
    world.set_compression(CompressionType::None);
    let first = write_world(&world).unwrap();
    let second = write_world(&read_world(&first).unwrap()).unwrap();
    // Chunk order follows map iteration, so compare decoded content.
    assert_eq!(first.len(), second.len());
    assert_same_chunks(&read_world(&first).unwrap(), &read_world(&second).unwrap());
}

#[test]
fn test_zstd_shrinks_uniform_world() {
    let world = PolarWorld::blank();
    for x in 0..16 {
        let mut sections = vec![PolarSection::default(); 24];
        for section in sections.iter_mut().take(8) {
            *section = PolarSection::uniform("minecraft:stone", "minecraft:plains");
        }
        world.update_chunk_at(x, 0, PolarChunk::new(x, 0, sections)).unwrap();
    }

    world.set_compression(CompressionType::None);
    let raw = write_world(&world).unwrap();
    world.set_compression(CompressionType::Zstd);
    let packed = write_world(&world).unwrap();
    assert!(packed.len() < raw.len(), "zstd {} vs raw {}", packed.len(), raw.len());
    assert_same_chunks(&read_world(&packed).unwrap(), &world);
}

//! Integration tests for map plane, level and picture assembly

use wolfx::{
    decode_picture_table, decompress_level, decompress_map_plane, AssetSource, GameVersion,
    HuffmanNode, HuffmanTree, LevelChunks, MapPlane, PicSize, WolfError, HUFFMAN_NODE_COUNT,
    HUFFMAN_ROOT,
};

const TAG: u16 = 0xABCD;

/// 2x2 plane [5, 5, 5, 6]: Carmack literals around RLEW [8, TAG, 3, 5, 6]
const PLANE_HEX: &str = "0a000800cdab030005000600";

/// 2x2 plane [5, 5, 5, 5]: RLEW [8, 5, 5, 5, 5] with the last three words
/// Carmack-coded as a near copy one word back
const PLANE_COPY_HEX: &str = "0a000800050003a701";

/// Codes: 0x00 = 0, 0x01 = 10, 0x02 = 110, 0x04 = 111
fn small_tree() -> HuffmanTree {
    let mut nodes = [HuffmanNode::default(); HUFFMAN_NODE_COUNT];
    nodes[0] = HuffmanNode::new(0x02, 0x04);
    nodes[1] = HuffmanNode::new(0x01, 0x100);
    nodes[HUFFMAN_ROOT] = HuffmanNode::new(0x00, 0x101);
    HuffmanTree::from_nodes(nodes)
}

fn dict_bytes(tree: &HuffmanTree) -> Vec<u8> {
    let mut dict = Vec::with_capacity(1024);
    for node in tree.nodes() {
        dict.extend_from_slice(&node.node_0.to_le_bytes());
        dict.extend_from_slice(&node.node_1.to_le_bytes());
    }
    dict.extend_from_slice(&[0, 0, 0, 0]);
    dict
}

/// Pack codes of the small tree LSB-first, prefixed with the expanded length
fn encode_small(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::new();
    for &b in bytes {
        match b {
            0 => bits.push(false),
            1 => bits.extend([true, false]),
            2 => bits.extend([true, true, false]),
            4 => bits.extend([true, true, true]),
            _ => panic!("byte {b} has no code"),
        }
    }
    let mut chunk = (bytes.len() as u32).to_le_bytes().to_vec();
    for group in bits.chunks(8) {
        let byte = group
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &bit)| acc | ((bit as u8) << i));
        chunk.push(byte);
    }
    chunk
}

#[test]
fn test_two_stage_map_plane() {
    let chunk = hex::decode(PLANE_HEX).unwrap();
    let plane = decompress_map_plane(&chunk, chunk.len(), 2, 2, TAG).unwrap();
    assert_eq!(plane.words, vec![5, 5, 5, 6]);
    assert_eq!(plane.get(0, 1), Some(5));
    assert_eq!(plane.get(1, 1), Some(6));
}

#[test]
fn test_map_plane_with_carmack_copy() {
    let chunk = hex::decode(PLANE_COPY_HEX).unwrap();
    let plane = decompress_map_plane(&chunk, chunk.len(), 2, 2, TAG).unwrap();
    assert_eq!(plane.words, vec![5, 5, 5, 5]);
}

#[test]
fn test_map_plane_ignores_bytes_past_declared_length() {
    let mut chunk = hex::decode(PLANE_HEX).unwrap();
    let declared = chunk.len();
    chunk.extend_from_slice(&[0xFF; 16]);
    let plane = decompress_map_plane(&chunk, declared, 2, 2, TAG).unwrap();
    assert_eq!(plane.words, vec![5, 5, 5, 6]);
}

#[test]
fn test_map_plane_wrong_tag_fails() {
    // Without the tag the run header reads as literals and the stream runs dry.
    let chunk = hex::decode(PLANE_HEX).unwrap();
    let result = decompress_map_plane(&chunk, chunk.len(), 3, 3, 0x1234);
    assert!(matches!(result, Err(WolfError::TruncatedInput { .. })));
}

#[test]
fn test_level_assembly() {
    let plane = hex::decode(PLANE_HEX).unwrap();
    let copy = hex::decode(PLANE_COPY_HEX).unwrap();
    let chunks = LevelChunks {
        planes: [&plane[..], &copy[..], &plane[..]],
        carmack_lengths: [plane.len(), copy.len(), plane.len()],
        width: 2,
        height: 2,
    };

    let level = decompress_level(&chunks, TAG);
    assert!(level.is_complete());
    assert_eq!(level.plane(MapPlane::Objects).unwrap().words, vec![5, 5, 5, 5]);

    let session = AssetSource::new(GameVersion::WL1);
    let again = session.decompress_level(&chunks);
    assert_eq!(again.plane(MapPlane::Logic), level.plane(MapPlane::Logic));
}

#[test]
fn test_picture_table_and_pictures() {
    let tree = small_tree();

    let mut table = Vec::new();
    for _ in 0..GameVersion::WL6.pic_count() {
        table.extend_from_slice(&[0x04, 0x00, 0x02, 0x00]);
    }
    let table_chunk = encode_small(&table);

    let sizes = decode_picture_table(&tree, &table_chunk, 132).unwrap();
    assert_eq!(sizes.len(), 132);
    assert!(sizes.iter().all(|s| *s == PicSize::new(4, 2)));

    let mut source = AssetSource::new(GameVersion::WL6);
    source.load_huffman_tree(&dict_bytes(&tree)[..]).unwrap();
    source.load_picture_table(&table_chunk).unwrap();

    // Planar 4x2: plane p holds texels of column p.
    let planar = [0, 1, 1, 2, 2, 0, 0, 1];
    let picture = source
        .decompress_picture(GameVersion::WL6.pic_start(), &encode_small(&planar))
        .unwrap();
    assert_eq!((picture.width, picture.height), (4, 2));
    assert_eq!(picture.texels, planar);
    assert_eq!(picture.to_linear().unwrap(), vec![0, 1, 2, 0, 1, 2, 0, 1]);

    let vga = picture.to_vga_bytes();
    assert_eq!(&vga[..4], &[4, 0, 2, 0]);
    assert_eq!(&vga[4..], &planar);
}

#[test]
fn test_picture_size_mismatch_reported() {
    let tree = small_tree();
    let mut table = Vec::new();
    for _ in 0..132 {
        table.extend_from_slice(&[0x02, 0x00, 0x02, 0x00]);
    }

    let mut source = AssetSource::new(GameVersion::WL3);
    source.set_huffman_tree(tree);
    source.load_picture_table(&encode_small(&table)).unwrap();

    let result = source.decompress_picture(10, &encode_small(&[1, 1, 1]));
    assert!(matches!(
        result,
        Err(WolfError::PictureSizeMismatch {
            expected: 4,
            actual: 3
        })
    ));
}

#[test]
fn test_batch_extraction_reports_failures() {
    let tree = small_tree();
    let mut table = Vec::new();
    for _ in 0..132 {
        table.extend_from_slice(&[0x01, 0x00, 0x01, 0x00]);
    }

    let mut source = AssetSource::new(GameVersion::WL6);
    source.set_huffman_tree(tree);
    source.load_picture_table(&encode_small(&table)).unwrap();

    let one = encode_small(&[2]);
    let two = encode_small(&[2, 2]);
    let batch = source.extract_pictures([(3, &one[..]), (4, &two[..]), (5, &one[..])]);

    assert_eq!(batch.failed, vec![4]);
    assert_eq!(batch.pictures.len(), 2);
    assert_eq!(batch.pictures[1].1.texels, vec![2]);
}

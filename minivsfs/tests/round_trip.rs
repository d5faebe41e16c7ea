//! End-to-end tests driving the builder and adder pipelines through actual
//! files on disk, the way the two CLI binaries use them.

use std::fs;

use minivsfs::inspector::inspect;
use minivsfs::{add_file, build, BuildParams};
use minivsfs_core::MiniVsfsError;
use tempfile::tempdir;

fn build_180_128() -> Vec<u8> {
    build(BuildParams {
        size_kib: 180,
        inode_count: 128,
    })
    .unwrap()
}

#[test]
fn builder_produces_exact_layout_for_180kib_128_inodes() {
    let bytes = build_180_128();
    assert_eq!(bytes.len(), 184_320);

    // inode bitmap byte 0 = 0x01, data bitmap byte 0 = 0x01
    assert_eq!(bytes[4096], 0x01);
    assert_eq!(bytes[2 * 4096], 0x01);

    // root inode at offset 3*4096: mode (u16 LE), links (u16 LE), size_bytes (u64 LE at +12)
    let root_off = 3 * 4096;
    assert_eq!(u16::from_le_bytes([bytes[root_off], bytes[root_off + 1]]), 0o040000);
    assert_eq!(u16::from_le_bytes([bytes[root_off + 2], bytes[root_off + 3]]), 2);
    let size = u64::from_le_bytes(bytes[root_off + 12..root_off + 20].try_into().unwrap());
    assert_eq!(size, 128);
    let direct0 = u32::from_le_bytes(bytes[root_off + 44..root_off + 48].try_into().unwrap());
    assert_eq!(direct0, 7);

    // block 7 holds "." then ".."
    let block7 = &bytes[7 * 4096..8 * 4096];
    assert_eq!(u32::from_le_bytes(block7[0..4].try_into().unwrap()), 1);
    assert_eq!(block7[4], 2); // DIRENT_TYPE_DIR
    assert_eq!(u32::from_le_bytes(block7[64..68].try_into().unwrap()), 1);
    assert_eq!(block7[68], 2);
}

#[test]
fn adder_writes_file_into_root_directory() {
    let dir = tempdir().unwrap();
    let a_img = dir.path().join("a.img");
    fs::write(&a_img, build_180_128()).unwrap();

    let host_file = dir.path().join("hello.txt");
    fs::write(&host_file, b"Hello, MVSF!\n").unwrap();

    let image_bytes = fs::read(&a_img).unwrap();
    let file_bytes = fs::read(&host_file).unwrap();
    let out = add_file(image_bytes, "hello.txt", &file_bytes).unwrap();

    // inode bitmap byte 0 = 0x03, data bitmap byte 0 = 0x03
    assert_eq!(out[4096], 0x03);
    assert_eq!(out[2 * 4096], 0x03);

    // inode slot 1 (inode #2) at offset 3*4096 + 128
    let slot1 = 3 * 4096 + 128;
    assert_eq!(u16::from_le_bytes([out[slot1], out[slot1 + 1]]), 0o100000);
    assert_eq!(u16::from_le_bytes([out[slot1 + 2], out[slot1 + 3]]), 1);
    let size = u64::from_le_bytes(out[slot1 + 12..slot1 + 20].try_into().unwrap());
    assert_eq!(size, 13);
    let direct0 = u32::from_le_bytes(out[slot1 + 44..slot1 + 48].try_into().unwrap());
    assert_eq!(direct0, 8);

    // block 8 carries the payload, zero-padded
    let block8 = &out[8 * 4096..9 * 4096];
    assert_eq!(&block8[0..13], b"Hello, MVSF!\n");
    assert!(block8[13..].iter().all(|&b| b == 0));

    // root's third dirent (block 7, offset 128)
    let dirent3 = &out[7 * 4096 + 128..7 * 4096 + 192];
    assert_eq!(u32::from_le_bytes(dirent3[0..4].try_into().unwrap()), 2);
    assert_eq!(dirent3[4], 1); // DIRENT_TYPE_REG
    let name_end = dirent3[5..63].iter().position(|&b| b == 0).unwrap_or(58);
    assert_eq!(&dirent3[5..5 + name_end], b"hello.txt");

    // root inode size_bytes becomes 192
    let root_off = 3 * 4096;
    let root_size = u64::from_le_bytes(out[root_off + 12..root_off + 20].try_into().unwrap());
    assert_eq!(root_size, 192);

    let report = inspect(out).unwrap();
    assert!(report.is_consistent());
}

#[test]
fn adder_rejects_file_too_large_and_writes_nothing() {
    let image_bytes = build_180_128();
    let too_big = vec![0xAAu8; 50 * 1024]; // 50 KiB needs 13 blocks > 12
    let err = add_file(image_bytes, "big.bin", &too_big).unwrap_err();
    assert!(matches!(err, MiniVsfsError::FileTooLarge { .. }));
}

#[test]
fn two_successive_adds_both_become_visible() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.img");
    let b = dir.path().join("b.img");
    let c = dir.path().join("c.img");

    fs::write(&a, build_180_128()).unwrap();

    let first = add_file(fs::read(&a).unwrap(), "one.txt", b"one").unwrap();
    fs::write(&b, &first).unwrap();

    let second = add_file(fs::read(&b).unwrap(), "two.txt", b"two").unwrap();
    fs::write(&c, &second).unwrap();

    let final_bytes = fs::read(&c).unwrap();
    assert_eq!(final_bytes[4096], 0x07); // root + two files
    let root_off = 3 * 4096;
    let root_size = u64::from_le_bytes(final_bytes[root_off + 12..root_off + 20].try_into().unwrap());
    assert_eq!(root_size, 256);

    let report = inspect(final_bytes).unwrap();
    assert!(report.is_consistent());
    assert_eq!(report.root_entries.len(), 4);
}

#[test]
fn builder_rejects_size_not_a_multiple_of_four() {
    let err = build(BuildParams {
        size_kib: 179,
        inode_count: 128,
    })
    .unwrap_err();
    assert!(matches!(err, MiniVsfsError::Configuration(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn corrupted_superblock_is_rejected_as_bad_image() {
    let mut bytes = build_180_128();
    bytes[10] ^= 0xFF; // flip a byte inside the superblock's covered range
    let err = add_file(bytes, "x.txt", b"x").unwrap_err();
    assert!(matches!(err, MiniVsfsError::BadImage(_)));
    assert_eq!(err.exit_code(), 1);
}

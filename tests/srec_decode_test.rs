// End-to-end decode of S-record fixture files
use srecimage::{ErrorKind, SrecConfig, SrecFile, WriteBounds};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/data");
    path.push(name);
    path
}

fn load(name: &str) -> SrecFile {
    SrecFile::open(&fixture(name), &SrecConfig::default())
        .unwrap_or_else(|e| panic!("failed to decode {}: {}", name, e))
}

#[test]
fn test_image_size_matches_last_record() {
    for name in ["hello.s19", "flash.s37", "gap.s19"] {
        let srec = load(name);
        let last = srec.data_records().last().unwrap();
        assert_eq!(
            srec.bytes().len(),
            (srec.end_address() - srec.start_address()) as usize + last.data().len(),
            "{}",
            name
        );
    }
}

#[test]
fn test_every_record_reads_back() {
    for name in ["hello.s19", "flash.s37", "gap.s19"] {
        let srec = load(name);
        for rec in srec.data_records() {
            let got = srec.image().read(rec.address(), rec.data().len()).unwrap();
            assert_eq!(got, rec.data(), "{} record at 0x{:08X}", name, rec.address());
        }
    }
}

#[test]
fn test_uncovered_bytes_are_fill() {
    let srec = load("gap.s19");
    let covered = |offset: usize| {
        srec.data_records().iter().any(|rec| {
            let start = (rec.address() - srec.start_address()) as usize;
            offset >= start && offset < start + rec.data().len()
        })
    };
    for (offset, b) in srec.bytes().iter().enumerate() {
        if !covered(offset) {
            assert_eq!(*b, 0xFF, "offset {}", offset);
        }
    }
    assert_eq!(srec.bytes().iter().filter(|b| **b == 0xFF).count(), 12);
}

#[test]
fn test_s3_file_with_header_and_footer() {
    let srec = load("flash.s37");
    assert_eq!(srec.header().unwrap().text(), "HDR");
    assert_eq!(srec.start_address(), 0x0800_0000);
    assert_eq!(srec.end_address(), 0x0800_0004);
    assert_eq!(srec.bytes(), &[0x10, 0x20, 0x30, 0x40, 0x50, 0x60]);
    assert_eq!(srec.footer().unwrap().entry_address(), 0x0800_0000);
    assert!(srec.verify_checksums().is_ok());
}

#[test]
fn test_descending_file_rejected() {
    let err = SrecFile::open(&fixture("descending.s19"), &SrecConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Ordering);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = SrecFile::open(&fixture("nope.s19"), &SrecConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_patch_outside_range() {
    let mut srec = load("gap.s19");
    let before = srec.bytes().to_vec();
    assert_eq!(srec.set_bytes(0x0011, &[0]).unwrap_err().kind(), ErrorKind::Range);

    let mut flash = load("flash.s37");
    assert_eq!(
        flash.set_bytes(0x07FF_FFFF, &[0]).unwrap_err().kind(),
        ErrorKind::Range
    );
    assert_eq!(srec.bytes(), &before[..]);
}

#[test]
fn test_patch_changes_only_target_bytes() {
    let mut srec = load("hello.s19");
    let before = srec.bytes().to_vec();
    srec.set_bytes(0x0038, b"HELLO").unwrap();
    let after = srec.bytes();
    assert_eq!(&after[0x38..0x3D], b"HELLO");
    assert_eq!(&after[..0x38], &before[..0x38]);
    assert_eq!(&after[0x3D..], &before[0x3D..]);
}

#[test]
fn test_strict_config_file() {
    let config = SrecConfig::load(&fixture("strict.toml")).unwrap();
    assert_eq!(config.write_bounds, WriteBounds::Strict);
    assert_eq!(config.fill_byte, 0x00);

    let mut srec = SrecFile::open(&fixture("gap.s19"), &config).unwrap();
    assert_eq!(srec.bytes()[4], 0x00);
    // Last record starts at end_address, so strict mode allows one byte there
    srec.set_bytes(0x0010, &[0xAA]).unwrap();
    assert_eq!(srec.set_bytes(0x0010, &[0xAA, 0xBB]).unwrap_err().kind(), ErrorKind::Range);
}

#[test]
fn test_bytes_does_not_mutate() {
    let srec = load("hello.s19");
    assert_eq!(srec.bytes(), srec.bytes());
    assert_eq!(srec.bytes().to_vec(), srec.clone().into_image().into_bytes());
}

#[test]
fn test_non_utf8_input_is_format_error() {
    let input: &[u8] = b"S107000001020304EE\nS10700100506\xFF708CE\n";
    let err = SrecFile::parse(input, &SrecConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(err.to_string().contains("line 2"), "{}", err);
    assert!(err.to_string().contains("data field"), "{}", err);
}

#[test]
fn test_read_past_buffer_is_range_error() {
    let srec = load("gap.s19");
    let err = srec
        .image()
        .read(srec.start_address() + 1, usize::MAX)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
}

#[test]
fn test_max_image_size_from_config() {
    let config = SrecConfig::from_toml_str("max_image_size = 0x10").unwrap();
    let err = SrecFile::open(&fixture("gap.s19"), &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
    assert!(SrecFile::open(&fixture("hello.s19"), &config).is_err());

    let config = SrecConfig::from_toml_str("max_image_size = 0x14").unwrap();
    assert_eq!(SrecFile::open(&fixture("gap.s19"), &config).unwrap().bytes().len(), 0x14);
}

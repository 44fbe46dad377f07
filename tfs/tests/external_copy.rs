//! Copying bytes in from the host filesystem.

use std::{env, fs as host_fs, path::PathBuf, process};

use tfs::{FileSystem, FsParams, OpenFlags};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/file_to_copy.txt");

fn read_all(fs: &FileSystem, path: &str, buf: &mut [u8]) -> usize {
    let fh = fs.open(path, OpenFlags::empty()).unwrap();
    let n = fs.read(fh, buf).unwrap();
    fs.close(fh).unwrap();
    n
}

#[test]
fn copy_is_idempotent() {
    let fs = FileSystem::new(FsParams::default()).unwrap();

    assert_eq!(fs.copy_from_external(FIXTURE, "/f1").unwrap(), 4);
    let mut buf = [0; 40];
    assert_eq!(read_all(&fs, "/f1", &mut buf), 4);
    assert_eq!(&buf[..4], b"BBB!");

    // a repeat copy overwrites rather than appends
    assert_eq!(fs.copy_from_external(FIXTURE, "/f1").unwrap(), 4);
    assert_eq!(read_all(&fs, "/f1", &mut buf), 4);
    assert_eq!(&buf[..4], b"BBB!");
}

#[test]
fn an_oversized_source_is_clamped_to_one_block() {
    let fs = FileSystem::new(FsParams::default()).unwrap();
    let block_size = fs.params().block_size;

    let src: PathBuf = env::temp_dir().join(format!("tfs-oversized-{}", process::id()));
    host_fs::write(&src, vec![b'x'; block_size + 123]).unwrap();

    let copied = fs.copy_from_external(&src, "/clamped").unwrap();
    host_fs::remove_file(&src).unwrap();
    assert_eq!(copied, block_size);

    let mut buf = vec![0; block_size + 16];
    assert_eq!(read_all(&fs, "/clamped", &mut buf), block_size);
    assert!(buf[..block_size].iter().all(|&b| b == b'x'));
}

#[test]
fn a_missing_source_is_an_error() {
    let fs = FileSystem::new(FsParams::default()).unwrap();
    let missing = env::temp_dir().join(format!("tfs-no-such-file-{}", process::id()));
    assert!(fs.copy_from_external(&missing, "/f1").is_err());
    // the destination was still created by the open
    let fh = fs.open("/f1", OpenFlags::empty()).unwrap();
    fs.close(fh).unwrap();
}

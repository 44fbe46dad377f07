//! Single-threaded behavior of the file operations.

use tfs::{FileSystem, FsParams, OpenFlags, TfsError};

fn new_fs() -> FileSystem {
    FileSystem::new(FsParams::default()).unwrap()
}

#[test]
fn write_then_read_round_trips() {
    let fs = new_fs();

    let fh = fs.open("/f1", OpenFlags::CREATE).unwrap();
    assert_eq!(fs.write(fh, b"content").unwrap(), 7);
    fs.close(fh).unwrap();

    let fh = fs.open("/f1", OpenFlags::empty()).unwrap();
    let mut buf = [0; 16];
    assert_eq!(fs.read(fh, &mut buf).unwrap(), 7);
    assert_eq!(&buf[..7], b"content");
    // a second read is at end-of-file
    assert_eq!(fs.read(fh, &mut buf).unwrap(), 0);
    fs.close(fh).unwrap();
}

#[test]
fn open_without_create_requires_the_file() {
    let fs = new_fs();
    assert!(matches!(
        fs.open("/missing", OpenFlags::empty()),
        Err(TfsError::NotFound)
    ));
}

#[test]
fn invalid_pathnames_are_rejected() {
    let fs = new_fs();
    for path in ["", "/", "no-slash"] {
        assert!(matches!(
            fs.open(path, OpenFlags::CREATE),
            Err(TfsError::InvalidPathName)
        ));
    }
}

#[test]
fn handles_are_dense_and_die_on_close() {
    let fs = new_fs();
    let fh = fs.open("/f1", OpenFlags::CREATE).unwrap();
    assert!(fh.as_index() < fs.params().max_open_files_count);
    fs.close(fh).unwrap();
    assert!(matches!(fs.close(fh), Err(TfsError::BadFileHandle(_))));
    let mut buf = [0; 1];
    assert!(matches!(
        fs.read(fh, &mut buf),
        Err(TfsError::BadFileHandle(_))
    ));
}

#[test]
fn trunc_discards_contents() {
    let fs = new_fs();
    let fh = fs.open("/f1", OpenFlags::CREATE).unwrap();
    fs.write(fh, b"old contents").unwrap();
    fs.close(fh).unwrap();

    let fh = fs.open("/f1", OpenFlags::TRUNC).unwrap();
    let mut buf = [0; 16];
    assert_eq!(fs.read(fh, &mut buf).unwrap(), 0);
    fs.close(fh).unwrap();
}

#[test]
fn append_starts_at_the_current_size() {
    let fs = new_fs();
    let fh = fs.open("/f1", OpenFlags::CREATE).unwrap();
    fs.write(fh, b"abc").unwrap();
    fs.close(fh).unwrap();

    let fh = fs.open("/f1", OpenFlags::APPEND).unwrap();
    fs.write(fh, b"def").unwrap();
    fs.close(fh).unwrap();

    let fh = fs.open("/f1", OpenFlags::empty()).unwrap();
    let mut buf = [0; 8];
    assert_eq!(fs.read(fh, &mut buf).unwrap(), 6);
    assert_eq!(&buf[..6], b"abcdef");
    fs.close(fh).unwrap();
}

#[test]
fn a_file_never_outgrows_one_block() {
    let fs = new_fs();
    let block_size = fs.params().block_size;
    let payload = vec![7; block_size + 100];

    let fh = fs.open("/big", OpenFlags::CREATE).unwrap();
    assert_eq!(fs.write(fh, &payload).unwrap(), block_size);
    assert_eq!(fs.write(fh, &payload).unwrap(), 0);
    fs.close(fh).unwrap();
}

#[test]
fn plain_open_overwrites_from_offset_zero() {
    let fs = new_fs();
    let fh = fs.open("/f1", OpenFlags::CREATE).unwrap();
    fs.write(fh, b"AAAA").unwrap();
    fs.close(fh).unwrap();

    let fh = fs.open("/f1", OpenFlags::empty()).unwrap();
    fs.write(fh, b"BB").unwrap();
    fs.close(fh).unwrap();

    let fh = fs.open("/f1", OpenFlags::empty()).unwrap();
    let mut buf = [0; 8];
    assert_eq!(fs.read(fh, &mut buf).unwrap(), 4);
    assert_eq!(&buf[..4], b"BBAA");
    fs.close(fh).unwrap();
}

#[test]
fn hard_link_shares_the_inode() {
    let fs = new_fs();
    let fh = fs.open("/f1", OpenFlags::CREATE).unwrap();
    fs.write(fh, b"shared").unwrap();
    fs.close(fh).unwrap();

    fs.link("/f1", "/l1").unwrap();
    fs.unlink("/f1").unwrap();

    // the contents survive while a link remains
    let fh = fs.open("/l1", OpenFlags::empty()).unwrap();
    let mut buf = [0; 8];
    assert_eq!(fs.read(fh, &mut buf).unwrap(), 6);
    assert_eq!(&buf[..6], b"shared");
    fs.close(fh).unwrap();

    fs.unlink("/l1").unwrap();
    assert!(matches!(
        fs.open("/l1", OpenFlags::empty()),
        Err(TfsError::NotFound)
    ));
}

#[test]
fn hard_linking_a_symlink_fails() {
    let fs = new_fs();
    let fh = fs.open("/f1", OpenFlags::CREATE).unwrap();
    fs.close(fh).unwrap();
    fs.sym_link("/f1", "/s1").unwrap();

    assert!(matches!(
        fs.link("/s1", "/h1"),
        Err(TfsError::HardLinkToSymlink)
    ));
    // the failed link left no directory entry behind
    assert!(matches!(
        fs.open("/h1", OpenFlags::empty()),
        Err(TfsError::NotFound)
    ));
}

#[test]
fn sym_link_requires_a_live_target() {
    let fs = new_fs();
    assert!(matches!(
        fs.sym_link("/nope", "/s1"),
        Err(TfsError::NotFound)
    ));
}

#[test]
fn opening_a_dangling_symlink_fails() {
    let fs = new_fs();
    let fh = fs.open("/f1", OpenFlags::CREATE).unwrap();
    fs.close(fh).unwrap();
    fs.sym_link("/f1", "/s1").unwrap();
    fs.unlink("/f1").unwrap();

    assert!(matches!(
        fs.open("/s1", OpenFlags::empty()),
        Err(TfsError::NotFound)
    ));
}

#[test]
fn unlink_while_open_revokes_the_handle() {
    let fs = new_fs();
    let fh = fs.open("/f1", OpenFlags::CREATE).unwrap();
    fs.write(fh, b"doomed").unwrap();

    fs.unlink("/f1").unwrap();

    let other = fs.open("/f1", OpenFlags::empty());
    assert!(matches!(other, Err(TfsError::NotFound)));
    let mut buf = [0; 4];
    assert!(matches!(
        fs.read(fh, &mut buf),
        Err(TfsError::HandleRevoked(..))
    ));
    // the handle itself is still open until closed
    fs.close(fh).unwrap();
}

#[test]
fn unlinking_a_symlink_leaves_the_target_alone() {
    let fs = new_fs();
    let fh = fs.open("/f1", OpenFlags::CREATE).unwrap();
    fs.write(fh, b"kept").unwrap();
    fs.close(fh).unwrap();
    fs.sym_link("/f1", "/s1").unwrap();

    fs.unlink("/s1").unwrap();

    assert!(matches!(
        fs.open("/s1", OpenFlags::empty()),
        Err(TfsError::NotFound)
    ));
    let fh = fs.open("/f1", OpenFlags::empty()).unwrap();
    let mut buf = [0; 4];
    assert_eq!(fs.read(fh, &mut buf).unwrap(), 4);
    assert_eq!(&buf, b"kept");
    fs.close(fh).unwrap();
}

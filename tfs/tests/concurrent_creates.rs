//! Racing creates must each claim their own inode and directory entry.

use std::thread;

use tfs::{FileSystem, FsParams, OpenFlags, TfsError};

#[test]
fn one_create_per_thread_fills_the_directory() {
    let _ = env_logger::builder().is_test(true).try_init();

    let params = FsParams {
        max_inode_count: 1025,
        max_open_files_count: 1025,
        ..FsParams::default()
    };
    // at the default block size the root directory holds 23 entries
    let fan_out = params.max_dir_entries();
    assert_eq!(fan_out, 23);

    let fs = FileSystem::new(params).unwrap();

    thread::scope(|s| {
        for i in 0..fan_out {
            let fs = &fs;
            s.spawn(move || {
                let fh = fs
                    .open(&format!("/l{i}"), OpenFlags::CREATE)
                    .unwrap_or_else(|err| panic!("creating /l{i}: {err}"));
                fs.close(fh).unwrap();
            });
        }
    });

    // every name landed
    for i in 0..fan_out {
        let fh = fs.open(&format!("/l{i}"), OpenFlags::empty()).unwrap();
        fs.close(fh).unwrap();
    }

    // the directory is now full
    assert!(matches!(
        fs.open("/overTheLimit", OpenFlags::CREATE),
        Err(TfsError::DirectoryFull)
    ));
}

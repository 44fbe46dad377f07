//! Racing appenders: every byte lands, exactly filling the block.

use std::thread;

use tfs::{FileSystem, FsParams, OpenFlags};

const NUM_THREADS: usize = 1024;

#[test]
fn appenders_fill_the_block_byte_by_byte() {
    let _ = env_logger::builder().is_test(true).try_init();

    let params = FsParams {
        max_open_files_count: 1025,
        ..FsParams::default()
    };
    let block_size = params.block_size;
    let fs = FileSystem::new(params).unwrap();

    let fh = fs.open("/file", OpenFlags::CREATE).unwrap();
    fs.close(fh).unwrap();

    thread::scope(|s| {
        for _ in 0..NUM_THREADS {
            let fs = &fs;
            s.spawn(move || {
                let fh = fs.open("/file", OpenFlags::APPEND).unwrap();
                fs.write(fh, b"1").unwrap();
                fs.close(fh).unwrap();
            });
        }
    });

    // size reached min(NUM_THREADS, block_size); the block is full
    let fh = fs.open("/file", OpenFlags::APPEND).unwrap();
    assert_eq!(fs.write(fh, b"1").unwrap(), 0);
    fs.close(fh).unwrap();

    let fh = fs.open("/file", OpenFlags::empty()).unwrap();
    let mut buf = vec![0; block_size + 1];
    assert_eq!(fs.read(fh, &mut buf).unwrap(), usize::min(NUM_THREADS, block_size));
    assert!(buf[..block_size].iter().all(|&b| b == b'1'));
    fs.close(fh).unwrap();
}

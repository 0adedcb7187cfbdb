#![no_main]

use std::io::{Read, Write};

use libfuzzer_sys::fuzz_target;
use upload_spool::{InMemoryCreator, UploadedFileCreator};

fuzz_target!(|data: &[u8]| {
    let mut upload = InMemoryCreator
        .create("fuzz", "fuzz.bin", Some(data.len() as u64))
        .expect("create");

    upload.contents().expect("contents").write_all(data).expect("write");
    assert_eq!(upload.current_len().expect("current_len"), data.len() as u64);

    upload.finish().expect("finish");

    let mut read_back = Vec::new();
    upload
        .contents()
        .expect("contents")
        .read_to_end(&mut read_back)
        .expect("read");
    assert_eq!(read_back, data);

    upload.dispose();
    upload.dispose();
});

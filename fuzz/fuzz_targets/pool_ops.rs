#![no_main]

use arbitrary::Arbitrary;
use classpool::{Buffer, BytesPool};
use libfuzzer_sys::fuzz_target;

/// One step of a fuzzed script against a shared `BytesPool` and a handful of
/// live handles. Handle indices are taken modulo however many handles are
/// currently live, so every input is replayable without the fuzzer needing
/// to understand how many `get`s have succeeded so far.
#[derive(Debug, Arbitrary)]
enum Op {
    GetBytes { size: u16 },
    GetBuffer { reserved: u8, required: u16 },
    AddRef { handle: u8 },
    DecRef { handle: u8 },
    SetSize { handle: u8, new_size: u16 },
    ResetSize { handle: u8 },
    Reset,
}

#[derive(Debug, Arbitrary)]
struct Script {
    ops: Vec<Op>,
}

enum Handle {
    Bytes(classpool::Block),
    Buffer(Buffer),
}

fuzz_target!(|script: Script| {
    let bytes_pool = BytesPool::with_default_classes(4).expect("default classes are valid");
    let mut handles: Vec<Handle> = Vec::new();

    for op in script.ops {
        match op {
            Op::GetBytes { size } => {
                handles.push(Handle::Bytes(bytes_pool.get(size as usize)));
            }
            Op::GetBuffer { reserved, required } => {
                let buf = classpool::default_buffer_pool().get(reserved as usize, required as usize);
                handles.push(Handle::Buffer(buf));
            }
            Op::AddRef { handle } => {
                if let Some(h) = pick(&handles, handle) {
                    match h {
                        Handle::Bytes(b) => b.add_ref(),
                        Handle::Buffer(b) => b.add_ref(),
                    }
                }
            }
            Op::DecRef { handle } => {
                if !handles.is_empty() {
                    let idx = handle as usize % handles.len();
                    let removed = handles.remove(idx);
                    match removed {
                        Handle::Bytes(b) => b.dec_ref(),
                        Handle::Buffer(b) => b.dec_ref(),
                    }
                }
            }
            Op::SetSize { handle, new_size } => {
                if let Some(Handle::Buffer(b)) = pick(&handles, handle) {
                    if b.original_len() > 0 {
                        let bounded = (new_size as usize % b.original_len()) + 1;
                        b.set_size(bounded);
                    }
                }
            }
            Op::ResetSize { handle } => {
                if let Some(Handle::Buffer(b)) = pick(&handles, handle) {
                    b.reset_size();
                }
            }
            Op::Reset => {
                bytes_pool.reset();
            }
        }
    }

    // Drain everything still live so refcounts always settle back to zero.
    for h in handles {
        match h {
            Handle::Bytes(b) => b.dec_ref(),
            Handle::Buffer(b) => b.dec_ref(),
        }
    }
});

fn pick(handles: &[Handle], index: u8) -> Option<&Handle> {
    if handles.is_empty() {
        None
    } else {
        handles.get(index as usize % handles.len())
    }
}

use mockall::mock;
use sicsim_core::machine::Device;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

mock! {
    pub ByteDevice {}
    impl Device for ByteDevice {
        fn name(&self) -> &str;
        fn is_ready(&mut self) -> bool;
        fn read(&mut self, buf: &mut [u8]) -> usize;
        fn write(&mut self, data: &[u8]) -> usize;
        fn close(&mut self);
    }
}

/// In-memory device: reads drain a fixed input, writes land in a shared buffer.
pub struct BufferDevice {
    name: String,
    input: VecDeque<u8>,
    output: Arc<Mutex<Vec<u8>>>,
    ready: bool,
}

impl BufferDevice {
    pub fn new(name: &str, input: &[u8]) -> Self {
        Self {
            name: name.to_owned(),
            input: input.iter().copied().collect(),
            output: Arc::new(Mutex::new(Vec::new())),
            ready: true,
        }
    }

    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    /// Handle to everything written so far.
    pub fn output(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.output)
    }
}

impl Device for BufferDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_ready(&mut self) -> bool {
        self.ready
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        for slot in buf.iter_mut() {
            match self.input.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    fn write(&mut self, data: &[u8]) -> usize {
        self.output.lock().unwrap().extend_from_slice(data);
        data.len()
    }
}

//! File-backed devices.
//!
//! Any device identifier that is not a console alias names a file in the device
//! directory. The file is opened lazily: read-only on the first RD, read-write (and
//! created if missing) on the first WD. Both directions share one stream position.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::machine::traits::Device;

/// A device backed by a host file.
#[derive(Debug)]
pub struct FileDevice {
    name: String,
    path: PathBuf,
    file: Option<File>,
    writable: bool,
}

impl FileDevice {
    /// Creates a device for `name` resolved inside `root`. Nothing is opened yet.
    pub fn new(name: &str, root: &Path) -> Self {
        Self {
            name: name.to_owned(),
            path: root.join(name),
            file: None,
            writable: false,
        }
    }

    /// Host path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&mut self, write: bool) -> Option<&mut File> {
        if self.file.is_some() && (self.writable || !write) {
            return self.file.as_mut();
        }

        let position = self
            .file
            .as_mut()
            .and_then(|f| f.stream_position().ok())
            .unwrap_or(0);

        let opened = OpenOptions::new()
            .read(true)
            .write(write)
            .create(write)
            .truncate(false)
            .open(&self.path)
            .and_then(|mut f| f.seek(SeekFrom::Start(position)).map(|_| f));

        match opened {
            Ok(f) => {
                tracing::debug!(device = %self.name, path = %self.path.display(), write, "device opened");
                self.file = Some(f);
                self.writable = write;
                self.file.as_mut()
            }
            Err(e) => {
                tracing::warn!(device = %self.name, path = %self.path.display(), error = %e, "cannot open device");
                None
            }
        }
    }
}

impl Device for FileDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_ready(&mut self) -> bool {
        if self.file.is_some() {
            return true;
        }
        fs::metadata(&self.path).is_ok_and(|m| m.is_file() && !m.permissions().readonly())
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let name = self.name.clone();
        let Some(file) = self.open(false) else {
            return 0;
        };
        file.read(buf).unwrap_or_else(|e| {
            tracing::warn!(device = %name, error = %e, "device read failed");
            0
        })
    }

    fn write(&mut self, data: &[u8]) -> usize {
        let name = self.name.clone();
        let Some(file) = self.open(true) else {
            return 0;
        };
        match file.write_all(data).and_then(|()| file.flush()) {
            Ok(()) => data.len(),
            Err(e) => {
                tracing::warn!(device = %name, error = %e, "device write failed");
                0
            }
        }
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            tracing::debug!(device = %self.name, "device closed");
        }
        self.writable = false;
    }
}

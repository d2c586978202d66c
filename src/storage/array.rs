//! Incremental JSON array output.
//!
//! Elements are serialized one at a time, so an array of any size can be
//! written while holding a single element in memory. The layout is one
//! element per line:
//!
//! ```text
//! [
//! {...},
//! {...}
//! ]
//! ```

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

/// Streams a JSON array into any writer.
///
/// The closing bracket is written exactly once: by [`close`](Self::close),
/// or on drop if the writer was abandoned, so the output always parses.
pub struct JsonArrayWriter<W: Write> {
    inner: W,
    count: usize,
    closed: bool,
}

impl<W: Write> JsonArrayWriter<W> {
    /// Start an array by writing its opening bracket.
    pub fn new(mut inner: W) -> io::Result<Self> {
        inner.write_all(b"[")?;
        Ok(Self {
            inner,
            count: 0,
            closed: false,
        })
    }

    /// Append one element.
    pub fn push<T: Serialize + ?Sized>(&mut self, item: &T) -> Result<()> {
        if self.closed {
            return Err(io::Error::other("JSON array is already closed").into());
        }
        let separator: &[u8] = if self.count == 0 { b"\n" } else { b",\n" };
        self.inner.write_all(separator)?;
        serde_json::to_writer(&mut self.inner, item)?;
        self.count += 1;
        Ok(())
    }

    /// Write the closing bracket and flush. Later calls are no-ops.
    pub fn close(&mut self) -> io::Result<usize> {
        if !self.closed {
            self.closed = true;
            let tail: &[u8] = if self.count == 0 { b"]\n" } else { b"\n]\n" };
            self.inner.write_all(tail)?;
            self.inner.flush()?;
        }
        Ok(self.count)
    }

    /// Borrow the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}

impl<W: Write> Drop for JsonArrayWriter<W> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                log::error!("Failed to close JSON array after {} elements: {}", self.count, e);
            }
        }
    }
}

/// A JSON array file that only appears at its target path once complete.
///
/// Elements stream into `<target>.partial`; [`commit`](Self::commit) closes
/// the array and renames it into place. If the value is dropped instead,
/// the partial file is closed (still valid JSON) and the target is left
/// untouched.
pub struct ArrayFile {
    writer: JsonArrayWriter<BufWriter<File>>,
    partial: PathBuf,
    target: PathBuf,
}

impl ArrayFile {
    /// Create the partial file, making parent directories as needed.
    pub fn create(target: impl Into<PathBuf>) -> Result<Self> {
        let target = target.into();
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let partial = partial_path(&target);
        let file = File::create(&partial)?;
        Ok(Self {
            writer: JsonArrayWriter::new(BufWriter::new(file))?,
            partial,
            target,
        })
    }

    pub fn push<T: Serialize + ?Sized>(&mut self, item: &T) -> Result<()> {
        self.writer.push(item)
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Close the array and move it to its target path.
    pub fn commit(mut self) -> Result<usize> {
        let count = self.writer.close()?;
        fs::rename(&self.partial, &self.target)?;
        Ok(count)
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".partial");
    PathBuf::from(name)
}

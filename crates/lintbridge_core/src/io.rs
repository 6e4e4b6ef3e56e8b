//! Host I/O port.
//!
//! Everything the orchestrator does to the outside world goes through
//! [`HostIo`]: reading sources, writing autofixed files, the structured
//! output channel and the side channel for per-file failures.

use std::collections::HashMap;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use parking_lot::Mutex;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for host I/O operations.
pub trait HostIo: Send + Sync {
    /// Reads a source file. This is the only suspending operation.
    fn read_to_string<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, io::Result<String>>;

    /// Writes a file in place.
    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Writes one chunk to the output channel and flushes it.
    fn write_stdout(&self, chunk: &[u8]) -> io::Result<()>;

    /// Reports a message on the side channel.
    fn report(&self, message: &str);
}

/// The real process environment.
#[derive(Debug, Default)]
pub struct SystemIo;

impl SystemIo {
    pub const fn new() -> Self {
        Self
    }
}

impl HostIo for SystemIo {
    fn read_to_string<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, io::Result<String>> {
        Box::pin(async move { tokio::fs::read_to_string(path).await })
    }

    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn write_stdout(&self, chunk: &[u8]) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(chunk)?;
        stdout.flush()
    }

    fn report(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// An in-memory host.
///
/// Files live in a map, and everything written to the output and side
/// channels is captured for inspection.
#[derive(Debug, Default)]
pub struct MemoryIo {
    files: Mutex<HashMap<PathBuf, String>>,
    delays: HashMap<PathBuf, Duration>,
    read_only: bool,
    stdout: Mutex<Vec<Vec<u8>>>,
    stdout_broken: bool,
    reports: Mutex<Vec<String>>,
}

impl MemoryIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file.
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.lock().insert(path.into(), contents.into());
        self
    }

    /// Delays reads of `path`, to control completion order.
    pub fn with_read_delay(mut self, path: impl Into<PathBuf>, delay: Duration) -> Self {
        self.delays.insert(path.into(), delay);
        self
    }

    /// Makes every file write fail.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Makes every output write fail.
    pub fn with_broken_stdout(mut self) -> Self {
        self.stdout_broken = true;
        self
    }

    /// Current contents of a file.
    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().get(path.as_ref()).cloned()
    }

    /// Everything written to the output channel, concatenated.
    pub fn stdout(&self) -> Vec<u8> {
        self.stdout.lock().concat()
    }

    /// The output channel as text.
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout()).into_owned()
    }

    /// The individual writes made to the output channel.
    pub fn stdout_chunks(&self) -> Vec<Vec<u8>> {
        self.stdout.lock().clone()
    }

    /// Messages reported on the side channel.
    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().clone()
    }
}

impl HostIo for MemoryIo {
    fn read_to_string<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, io::Result<String>> {
        Box::pin(async move {
            if let Some(delay) = self.delays.get(path) {
                tokio::time::sleep(*delay).await;
            }
            let contents = self.files.lock().get(path).cloned();
            contents.ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("No such file: {}", path.display()),
                )
            })
        })
    }

    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        if self.read_only {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("Read-only file system: {}", path.display()),
            ));
        }
        self.files
            .lock()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn write_stdout(&self, chunk: &[u8]) -> io::Result<()> {
        if self.stdout_broken {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"));
        }
        self.stdout.lock().push(chunk.to_vec());
        Ok(())
    }

    fn report(&self, message: &str) {
        self.reports.lock().push(message.to_string());
    }
}

/// [`Write`] over the output channel of a host.
///
/// Every `write` call becomes one flushed host write.
pub(crate) struct HostStdout<'a> {
    io: &'a dyn HostIo,
}

impl<'a> HostStdout<'a> {
    pub(crate) fn new(io: &'a dyn HostIo) -> Self {
        Self { io }
    }
}

impl Write for HostStdout<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.io.write_stdout(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

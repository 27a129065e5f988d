//! Logging initialization for the bootstrapper.
//!
//! Boot logs go to two sinks at once: a JSON file at a fixed path, opened
//! in append mode so restarts never lose earlier boots, and a compact
//! stderr mirror that lands on the instance serial console.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Append-mode boot log writer.
struct BootLogWriter {
    file: File,
}

impl BootLogWriter {
    fn open(path: &Path) -> io::Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl Write for BootLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Thread-safe writer wrapper.
struct SharedWriter(Mutex<BootLogWriter>);

impl Write for &SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for &'static SharedWriter {
    type Writer = &'static SharedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        *self
    }
}

/// Initialize dual-sink logging.
pub fn init(log_path: &str) -> anyhow::Result<()> {
    let writer = BootLogWriter::open(Path::new(log_path))?;

    // Leak to get 'static lifetime (the bootstrapper runs for the lifetime
    // of the process)
    let shared: &'static SharedWriter = Box::leak(Box::new(SharedWriter(Mutex::new(writer))));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(shared)
        .with_filter(filter);

    // Console mirror for the serial log
    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn boot_log_appends_across_reopens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("boot.log");

        let mut first = BootLogWriter::open(&path).unwrap();
        first.write_all(b"boot one\n").unwrap();
        first.flush().unwrap();
        drop(first);

        // Simulates a restart: the second boot must not clobber the first
        let mut second = BootLogWriter::open(&path).unwrap();
        second.write_all(b"boot two\n").unwrap();
        second.flush().unwrap();
        drop(second);

        let mut contents = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "boot one\nboot two\n");
    }

    #[test]
    fn boot_log_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("boot.log");

        let mut writer = BootLogWriter::open(&path).unwrap();
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();

        assert!(path.exists());
    }
}

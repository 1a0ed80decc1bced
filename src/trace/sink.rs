//! Trace record sink.
//!
//! The decoded trace is the program's product and goes to its own
//! destination, never through the diagnostic logger. Each record is emitted
//! as a single write so concurrent sessions cannot interleave lines.

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::core::config::Settings;
use crate::{Error, Result};

enum SinkTarget {
    Stdout,
    File(std::fs::File),
    Memory(Vec<u8>),
}

/// Shared, line-atomic sink for formatted trace records.
pub struct TraceSink {
    target: Mutex<SinkTarget>,
}

impl TraceSink {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let target = match &settings.outfile {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| Error::Config(format!("cannot open {}: {}", path, e)))?;
                SinkTarget::File(file)
            }
            None => SinkTarget::Stdout,
        };
        Ok(Self {
            target: Mutex::new(target),
        })
    }

    /// In-memory sink for tests and embedding.
    pub fn memory() -> Self {
        Self {
            target: Mutex::new(SinkTarget::Memory(Vec::new())),
        }
    }

    /// Emit one complete record as a single write.
    pub fn emit(&self, record: &str) {
        let mut line = String::with_capacity(record.len() + 1);
        line.push_str(record);
        line.push('\n');
        let mut target = self.target.lock().expect("trace sink poisoned");
        let result = match &mut *target {
            SinkTarget::Stdout => std::io::stdout().write_all(line.as_bytes()),
            SinkTarget::File(file) => file.write_all(line.as_bytes()),
            SinkTarget::Memory(buf) => {
                buf.extend_from_slice(line.as_bytes());
                Ok(())
            }
        };
        if let Err(e) = result {
            tracing::error!("trace sink write failed: {}", e);
        }
    }

    /// Everything emitted so far; memory sinks only.
    pub fn contents(&self) -> String {
        match &*self.target.lock().expect("trace sink poisoned") {
            SinkTarget::Memory(buf) => String::from_utf8_lossy(buf).into_owned(),
            _ => panic!("contents() is only for memory sinks"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_lines() {
        let sink = TraceSink::memory();
        sink.emit("first record");
        sink.emit("second record");
        assert_eq!(sink.contents(), "first record\nsecond record\n");
    }
}

use chrono::Local;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Default number of log entries to keep in memory
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// A log entry with timestamp and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, target: &str, message: String) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S.%3f").to_string(),
            level: level.to_string().to_uppercase(),
            target: target.to_string(),
            message,
        }
    }

    /// Parse a line written by the compact fmt layer: "LEVEL target: message"
    pub fn from_compact_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (level, rest) = [
            Level::TRACE,
            Level::DEBUG,
            Level::INFO,
            Level::WARN,
            Level::ERROR,
        ]
        .into_iter()
        .find_map(|level| {
            line.strip_prefix(level.as_str())
                .and_then(|rest| rest.strip_prefix(' '))
                .map(|rest| (level, rest.trim_start()))
        })
        .unwrap_or((Level::INFO, line));

        let (target, message) = match rest.split_once(": ") {
            Some((target, message)) if !target.contains(' ') => (target, message.trim()),
            _ => ("general", rest),
        };

        Some(Self::new(level, target, message.to_string()))
    }

    /// Format for display in the `log` command
    pub fn format_for_display(&self) -> String {
        format!(
            "[{}] {} [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }
}

/// Bounded, shareable buffer of recent log entries
#[derive(Clone, Debug)]
pub struct LogRingBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl Default for LogRingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl LogRingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        // A panic while holding the lock leaves the deque intact
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(count);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Writer that feeds formatted tracing output into a ring buffer
#[derive(Clone)]
pub struct RingBufferWriter {
    buffer: LogRingBuffer,
}

impl RingBufferWriter {
    pub fn new(buffer: LogRingBuffer) -> Self {
        Self { buffer }
    }
}

impl std::io::Write for RingBufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        for line in text.lines() {
            if let Some(entry) = LogEntry::from_compact_line(line) {
                self.buffer.push(entry);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RingBufferWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global tracing subscriber, writing into a ring buffer.
///
/// `RUST_LOG` wins over `default_filter` when set. Returns an error if a
/// global subscriber is already installed.
pub fn init_tracing(default_filter: &str, capacity: usize) -> anyhow::Result<LogRingBuffer> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let buffer = LogRingBuffer::new(capacity);
    let writer = RingBufferWriter::new(buffer.clone());

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .without_time()
        .compact();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(target: "system", "Tracing initialized");

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ring_buffer_capacity() {
        let buffer = LogRingBuffer::new(2);
        for i in 0..3 {
            buffer.push(LogEntry::new(Level::INFO, "test", format!("msg {}", i)));
        }
        assert_eq!(buffer.len(), 2);
        let recent = buffer.get_recent(10);
        assert_eq!(recent[0].message, "msg 1");
        assert_eq!(recent[1].message, "msg 2");
        assert_eq!(buffer.get_recent(1)[0].message, "msg 2");
    }

    #[test]
    fn test_parse_compact_line() {
        let entry = LogEntry::from_compact_line(" INFO sheet_viewer::data: Loading dataset").unwrap();
        assert_eq!(entry.level, "INFO");
        assert_eq!(entry.target, "sheet_viewer::data");
        assert_eq!(entry.message, "Loading dataset");

        let entry = LogEntry::from_compact_line("no level here").unwrap();
        assert_eq!(entry.level, "INFO");
        assert_eq!(entry.target, "general");

        assert!(LogEntry::from_compact_line("   ").is_none());
    }

    #[test]
    fn test_writer_splits_lines() {
        let buffer = LogRingBuffer::default();
        let mut writer = RingBufferWriter::new(buffer.clone());
        writer
            .write_all(b"WARN a: first\nDEBUG b: second\n")
            .unwrap();
        let entries = buffer.get_recent(5);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, "WARN");
        assert_eq!(entries[1].target, "b");
    }
}

use chrono::Local;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Maximum number of log entries to keep in memory
const MAX_LOG_ENTRIES: usize = 1000;

/// A log entry with timestamp and message
#[derive(Debug, Clone, PartialEq)]
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

    /// Format for display in the log pane and the log file
    pub fn format_for_display(&self) -> String {
        format!(
            "[{}] {} [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }
}

/// Thread-safe ring buffer for log entries
#[derive(Clone, Default)]
pub struct LogRingBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogRingBuffer {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES))),
        }
    }

    pub fn push(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() >= MAX_LOG_ENTRIES {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }

    /// The last `count` entries, oldest first
    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().rev().take(count).rev().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split a compact-format line ("LEVEL target: message") into its parts
pub fn parse_compact_line(line: &str) -> (Level, &str, &str) {
    let line = line.trim();
    let levels = [
        ("TRACE ", Level::TRACE),
        ("DEBUG ", Level::DEBUG),
        ("INFO ", Level::INFO),
        ("WARN ", Level::WARN),
        ("ERROR ", Level::ERROR),
    ];

    let Some((level, rest)) = levels
        .iter()
        .find_map(|(prefix, level)| line.strip_prefix(prefix).map(|rest| (*level, rest.trim_start())))
    else {
        return (Level::INFO, "general", line);
    };

    match rest.split_once(':') {
        // A target never contains spaces
        Some((target, message)) if !target.contains(' ') => (level, target, message.trim()),
        _ => (level, "general", rest),
    }
}

/// Writer that feeds formatted log lines into the ring buffer and the log file.
///
/// The file is best effort: write and flush failures are dropped so logging
/// never fails the caller and the ring buffer always gets the entry.
#[derive(Clone)]
pub struct LogWriter {
    buffer: LogRingBuffer,
    file: Option<Arc<Mutex<File>>>,
}

impl LogWriter {
    pub fn new(buffer: LogRingBuffer, file: Option<File>) -> Self {
        Self {
            buffer,
            file: file.map(|f| Arc::new(Mutex::new(f))),
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = std::str::from_utf8(buf) {
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                let (level, target, message) = parse_compact_line(line);
                let entry = LogEntry::new(level, target, message.to_string());

                if let Some(file) = &self.file {
                    if let Ok(mut file) = file.lock() {
                        let _ = writeln!(file, "{}", entry.format_for_display());
                    }
                }
                self.buffer.push(entry);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static LOG_BUFFER: OnceLock<LogRingBuffer> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

fn get_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("style-search")
        .join("logs")
}

/// Create a timestamped log file and point `latest.log` at it
fn open_log_file() -> Option<(File, PathBuf)> {
    let log_dir = get_log_dir();
    std::fs::create_dir_all(&log_dir).ok()?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("style-search_{}.log", timestamp));

    #[cfg(unix)]
    {
        let latest_path = log_dir.join("latest.log");
        let _ = std::fs::remove_file(&latest_path);
        let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok()?;
    Some((file, log_path))
}

/// Get the global log buffer
pub fn get_log_buffer() -> Option<LogRingBuffer> {
    LOG_BUFFER.get().cloned()
}

/// Path of the current log file, if one could be opened
pub fn log_path() -> Option<&'static PathBuf> {
    LOG_PATH.get()
}

/// Install the tracing subscriber. Logs go to the ring buffer and a log file,
/// never to stdout, so the terminal UI stays clean.
pub fn init_tracing() -> LogRingBuffer {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let buffer = LOG_BUFFER.get_or_init(LogRingBuffer::new).clone();

    let file = open_log_file().map(|(file, path)| {
        LOG_PATH.set(path).ok();
        file
    });

    let fmt_layer = fmt::layer()
        .with_writer(LogWriter::new(buffer.clone(), file))
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .without_time() // LogEntry carries its own timestamp
        .compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
    {
        tracing::info!(target: "system", "Logging initialized");
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compact_line() {
        let (level, target, message) = parse_compact_line(" INFO session: Submitting #1");
        assert_eq!(level, Level::INFO);
        assert_eq!(target, "session");
        assert_eq!(message, "Submitting #1");

        let (level, target, message) = parse_compact_line("WARN  api: API error: 500");
        assert_eq!(level, Level::WARN);
        assert_eq!(target, "api");
        assert_eq!(message, "API error: 500");
    }

    #[test]
    fn test_parse_line_without_level() {
        let (level, target, message) = parse_compact_line("plain text");
        assert_eq!(level, Level::INFO);
        assert_eq!(target, "general");
        assert_eq!(message, "plain text");
    }

    #[test]
    fn test_ring_buffer_caps_entries() {
        let buffer = LogRingBuffer::new();
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            buffer.push(LogEntry::new(Level::DEBUG, "test", format!("entry {}", i)));
        }
        assert_eq!(buffer.len(), MAX_LOG_ENTRIES);

        let recent = buffer.get_recent(2);
        assert_eq!(recent[1].message, format!("entry {}", MAX_LOG_ENTRIES + 4));
    }

    #[test]
    fn test_writer_fills_buffer() {
        let buffer = LogRingBuffer::new();
        let mut writer = LogWriter::new(buffer.clone(), None);
        writer
            .write_all(b"DEBUG dispatch: Spawning request #2\n")
            .unwrap();

        let entries = buffer.get_recent(10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target, "dispatch");
        assert_eq!(entries[0].level, "DEBUG");
    }

    #[test]
    fn test_unwritable_file_still_fills_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readonly.log");
        File::create(&path).unwrap();
        let readonly = File::open(&path).unwrap();

        let buffer = LogRingBuffer::new();
        let mut writer = LogWriter::new(buffer.clone(), Some(readonly));
        writer.write_all(b"INFO api: Received 2 outfits\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.get_recent(1)[0].message, "Received 2 outfits");
    }
}

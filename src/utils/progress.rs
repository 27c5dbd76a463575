use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Byte counter for a single streaming upload.
///
/// The counter only moves forward and is clamped to the declared total, so
/// the rendered `transferred/total` line never runs past the end.
#[derive(Debug)]
pub struct Progress {
    transferred: AtomicU64,
    total: u64,
}

impl Progress {
    pub fn new(total: u64) -> Self {
        Self {
            transferred: AtomicU64::new(0),
            total,
        }
    }

    /// Record `n` more bytes and redraw the status line on stderr.
    pub fn advance(&self, n: u64) {
        let seen = self
            .transferred
            .fetch_add(n, Ordering::Relaxed)
            .saturating_add(n)
            .min(self.total);

        let mut stderr = std::io::stderr().lock();
        let _ = write!(
            stderr,
            "\rUploading {}/{}",
            format_ibytes(seen),
            format_ibytes(self.total)
        );
        let _ = stderr.flush();
    }

    /// Terminate the in-place status line once the stream is done.
    pub fn finish(&self) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr);
    }

    pub fn transferred(&self) -> u64 {
        self.transferred.load(Ordering::Relaxed).min(self.total)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Render a byte count in IEC units, e.g. `1.5 MiB`.
pub fn format_ibytes(n: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

//! Upload progress plumbing.
//!
//! The body streams through a counting `Read` wrapper on a worker
//! thread while the calling thread polls the shared byte counter and
//! drives a monotonic percentage callback. 100 is emitted exactly
//! once, after the request has succeeded.

use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::client::ApiError;

/// `Read` wrapper that counts bytes as they are consumed.
pub struct ProgressReader<R> {
    inner: R,
    sent: Arc<AtomicU64>,
}

impl<R: Read> ProgressReader<R> {
    pub fn new(inner: R, sent: Arc<AtomicU64>) -> Self {
        Self { inner, sent }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.sent.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

pub(crate) fn progress_pct(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent.saturating_mul(100)) / total).min(100) as u8
}

/// Run `op` on a worker thread while reporting percentage progress
/// from the shared counter. Progress is capped at 99 until `op`
/// returns Ok, then 100 is reported.
pub(crate) fn drive_progress<T: Send>(
    sent: Arc<AtomicU64>,
    total: u64,
    on_progress: &mut dyn FnMut(u8),
    op: impl FnOnce() -> Result<T, ApiError> + Send,
) -> Result<T, ApiError> {
    let mut last = 0u8;
    let joined = thread::scope(|scope| {
        let worker = scope.spawn(op);
        while !worker.is_finished() {
            let pct = progress_pct(sent.load(Ordering::Relaxed), total).min(99);
            if pct > last {
                last = pct;
                on_progress(pct);
            }
            thread::sleep(Duration::from_millis(25));
        }
        worker.join()
    });
    let out = joined.map_err(|_| ApiError::Network("upload worker panicked".into()))??;
    on_progress(100);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reader_counts_every_byte() {
        let sent = Arc::new(AtomicU64::new(0));
        let mut reader = ProgressReader::new(Cursor::new(vec![0u8; 4096]), Arc::clone(&sent));
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out.len(), 4096);
        assert_eq!(sent.load(Ordering::Relaxed), 4096);
    }

    #[test]
    fn test_pct_bounds() {
        assert_eq!(progress_pct(0, 200), 0);
        assert_eq!(progress_pct(100, 200), 50);
        assert_eq!(progress_pct(200, 200), 100);
        // Over-read never exceeds 100.
        assert_eq!(progress_pct(300, 200), 100);
        // Zero-byte body counts as done.
        assert_eq!(progress_pct(0, 0), 100);
    }

    #[test]
    fn test_drive_progress_monotonic_and_ends_at_100() {
        let sent = Arc::new(AtomicU64::new(0));
        let worker_sent = Arc::clone(&sent);
        let mut seen = Vec::new();
        drive_progress(Arc::clone(&sent), 1000, &mut |pct| seen.push(pct), move || {
            for _ in 0..10 {
                worker_sent.fetch_add(100, Ordering::Relaxed);
                thread::sleep(Duration::from_millis(10));
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1]), "progress must be strictly increasing: {:?}", seen);
    }

    #[test]
    fn test_drive_progress_failure_skips_100() {
        let sent = Arc::new(AtomicU64::new(0));
        let mut seen = Vec::new();
        let result: Result<(), ApiError> =
            drive_progress(Arc::clone(&sent), 1000, &mut |pct| seen.push(pct), || {
                Err(ApiError::Network("boom".into()))
            });
        assert!(result.is_err());
        assert!(!seen.contains(&100));
    }
}

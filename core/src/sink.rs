//! Durable record of successful addresses.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

type EchoFn = Box<dyn Fn(Ipv4Addr) + Send + Sync>;

/// Appends one address per line to `W`, flushing after every line so hits
/// survive an abrupt exit.
///
/// Writers are serialized through a mutex; the optional echo callback runs
/// under the same lock, so console echoes appear in file order.
pub struct ResultSink<W: Write> {
    out: Mutex<W>,
    on_record: Option<EchoFn>,
}

impl ResultSink<BufWriter<File>> {
    /// Creates or truncates `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> ResultSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            on_record: None,
        }
    }

    pub fn with_echo<F>(mut self, on_record: F) -> Self
    where
        F: Fn(Ipv4Addr) + Send + Sync + 'static,
    {
        self.on_record = Some(Box::new(on_record));
        self
    }

    pub fn record(&self, addr: Ipv4Addr) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{addr}")?;
        out.flush()?;
        if let Some(echo) = &self.on_record {
            echo(addr);
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Counts flushes so tests can check the write-then-flush contract.
    #[derive(Default)]
    struct Recording {
        buf: Vec<u8>,
        flushes: usize,
    }

    impl Write for Recording {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _data: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn record_writes_line_and_flushes() {
        let sink = ResultSink::new(Recording::default());
        sink.record(Ipv4Addr::new(1, 2, 3, 4)).unwrap();
        sink.record(Ipv4Addr::new(5, 6, 7, 8)).unwrap();

        let out = sink.into_inner();
        assert_eq!(String::from_utf8(out.buf).unwrap(), "1.2.3.4\n5.6.7.8\n");
        assert_eq!(out.flushes, 2);
    }

    #[test]
    fn echo_fires_per_record() {
        let echoed = Arc::new(AtomicUsize::new(0));
        let counter = echoed.clone();
        let sink = ResultSink::new(Vec::new()).with_echo(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sink.record(Ipv4Addr::new(10, 0, 0, 1)).unwrap();
        sink.record(Ipv4Addr::new(10, 0, 0, 2)).unwrap();
        assert_eq!(echoed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn write_error_is_returned_and_skips_echo() {
        let echoed = Arc::new(AtomicUsize::new(0));
        let counter = echoed.clone();
        let sink = ResultSink::new(Broken).with_echo(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(sink.record(Ipv4Addr::new(10, 0, 0, 1)).is_err());
        assert_eq!(echoed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn concurrent_records_do_not_tear() {
        let sink = Arc::new(ResultSink::new(Vec::new()));
        let handles: Vec<_> = (0..8u8)
            .map(|t| {
                let sink = sink.clone();
                thread::spawn(move || {
                    for i in 0..100u8 {
                        sink.record(Ipv4Addr::new(10, t, i, 1)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let sink = Arc::try_unwrap(sink).ok().unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 800);
        assert!(lines.iter().all(|line| line.parse::<Ipv4Addr>().is_ok()));
    }

    #[test]
    fn create_writes_to_file() {
        let path = std::env::temp_dir().join(format!("sniscan-sink-{}.txt", std::process::id()));
        let sink = ResultSink::create(&path).unwrap();
        sink.record(Ipv4Addr::new(9, 9, 9, 9)).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "9.9.9.9\n");
        drop(sink);
        let _ = std::fs::remove_file(&path);
    }
}

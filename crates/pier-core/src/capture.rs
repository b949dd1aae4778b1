use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;

/// Per-invocation capture of installer diagnostics.
///
/// Each capture owns a fresh append-only sink and a `tracing` dispatcher
/// writing into it. Scoping the dispatcher to the install future (via
/// `with_subscriber`) leaves the process-wide dispatcher untouched and
/// detaches the sink on every exit path, including panics.
pub struct LogCapture {
    sink: LogSink,
    dispatch: Dispatch,
}

impl LogCapture {
    pub fn new() -> Self {
        let sink = LogSink::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(sink.clone())
            .with_max_level(tracing::Level::INFO)
            .with_target(false)
            .with_ansi(false)
            .without_time()
            .finish();
        Self {
            sink,
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Dispatcher to scope over the installation future.
    pub fn dispatch(&self) -> Dispatch {
        self.dispatch.clone()
    }

    /// Everything written to the sink so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.sink.snapshot()).into_owned()
    }
}

impl Default for LogCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Default)]
struct LogSink(Arc<Mutex<Vec<u8>>>);

impl LogSink {
    fn snapshot(&self) -> Vec<u8> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Clone)]
struct SharedWriter {
    inner: Arc<RwLock<Option<std::fs::File>>>,
}

struct MultiWriter {
    inner: Arc<RwLock<Option<std::fs::File>>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedWriter {
    type Writer = MultiWriter;

    fn make_writer(&'a self) -> Self::Writer {
        MultiWriter {
            inner: self.inner.clone(),
        }
    }
}

impl Write for MultiWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = io::stderr().write(buf)?;
        if let Some(file) = &mut *self.inner.write().unwrap() {
            let _ = file.write_all(buf);
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = &mut *self.inner.write().unwrap() {
            let _ = file.flush();
        }
        Ok(())
    }
}

fn open_log_file(path: &Path) -> Option<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let _ = std::fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Install the global subscriber: env-filtered fmt output to stderr, echoed
/// to `log_file` when one is configured. `log` macros route through the
/// tracing bridge.
pub fn init(log_file: Option<&Path>) {
    let _ = tracing_log::LogTracer::init();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let writer = SharedWriter {
        inner: Arc::new(RwLock::new(log_file.and_then(open_log_file))),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .try_init();
}

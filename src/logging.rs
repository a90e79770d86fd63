use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::config::LoggingConfig;

/// Formats events as `LEVEL module::function [span::stack]: message key=value`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FunctionFormatter;

#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    function: Option<String>,
    fields: Vec<(String, String)>,
}

impl EventVisitor {
    fn store(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = Some(value),
            "function" => self.function = Some(value),
            other => self.fields.push((other.to_string(), value)),
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let raw = format!("{value:?}");
        let unquoted = raw
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .map(str::to_string)
            .unwrap_or(raw);
        self.store(field.name(), unquoted);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.store(field.name(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.store(field.name(), value.to_string());
    }
}

impl<S, N> FormatEvent<S, N> for FunctionFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        // Macros record the full function path; plain tracing calls only know the module.
        let location = visitor
            .function
            .as_deref()
            .or(metadata.module_path())
            .unwrap_or_else(|| metadata.target());
        write!(writer, "{} {location}", metadata.level())?;

        if let Some(scope) = ctx.event_scope() {
            let spans: Vec<&str> = scope.from_root().map(|span| span.name()).collect();
            if !spans.is_empty() {
                write!(writer, " [{}]", spans.join("::"))?;
            }
        }

        write!(writer, ":")?;
        if let Some(message) = visitor.message {
            write!(writer, " {message}")?;
        }
        for (name, value) in visitor.fields {
            write!(writer, " {name}={value}")?;
        }
        writeln!(writer)
    }
}

/// Resolve the filter: `RUST_LOG` first, then the configured level, then `info`.
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(config))
        .event_format(FunctionFormatter)
        .try_init();
}

#[macro_export]
#[doc(hidden)]
macro_rules! __log_function_path {
    () => {{
        fn __type_name_of<T>(_value: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = __type_name_of(|| {});
        match name.find("::{{closure") {
            Some(index) => &name[..index],
            None => name,
        }
    }};
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        tracing::trace!(function = %$crate::__log_function_path!(), $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        tracing::debug!(function = %$crate::__log_function_path!(), $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        tracing::info!(function = %$crate::__log_function_path!(), $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        tracing::warn!(function = %$crate::__log_function_path!(), $($arg)*);
    }};
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        tracing::error!(function = %$crate::__log_function_path!(), $($arg)*);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing::subscriber::DefaultGuard;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct BufferWriter {
        buffer: Arc<Mutex<String>>,
    }

    struct BufferGuard {
        buffer: Arc<Mutex<String>>,
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = BufferGuard;

        fn make_writer(&'a self) -> Self::Writer {
            BufferGuard {
                buffer: Arc::clone(&self.buffer),
            }
        }
    }

    impl Write for BufferGuard {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.buffer
                .lock()
                .unwrap()
                .push_str(&String::from_utf8_lossy(buf));
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture() -> (BufferWriter, DefaultGuard) {
        let writer = BufferWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_max_level(tracing::Level::TRACE)
            .event_format(FunctionFormatter)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (writer, guard)
    }

    #[test]
    fn macro_records_calling_function() {
        let (writer, guard) = capture();
        crate::log_info!("listening on {}", "0.0.0.0:8080");
        drop(guard);

        let output = writer.buffer.lock().unwrap().clone();
        assert!(output.starts_with("INFO"), "output was: {output:?}");
        assert!(
            output.contains("risk_service::logging::tests::macro_records_calling_function:"),
            "output missing function path: {output:?}"
        );
        assert!(output.contains("listening on 0.0.0.0:8080"), "{output:?}");
    }

    #[test]
    fn spans_and_extra_fields_are_rendered() {
        let (writer, guard) = capture();
        let span = tracing::info_span!("calculate");
        span.in_scope(|| {
            tracing::debug!(asset_id = "srv-1", risk = 12_i64, "computed");
        });
        drop(guard);

        let output = writer.buffer.lock().unwrap().clone();
        assert!(output.starts_with("DEBUG risk_service::logging::tests"), "{output:?}");
        assert!(output.contains("[calculate]:"), "{output:?}");
        assert!(output.contains("computed asset_id=srv-1 risk=12"), "{output:?}");
    }

    #[test]
    fn configured_level_is_used_as_fallback() {
        // RUST_LOG may be set in the test environment, so only check a valid filter is built.
        let filter = build_filter(&LoggingConfig {
            level: "debug".to_string(),
        });
        assert!(!filter.to_string().is_empty());
    }
}

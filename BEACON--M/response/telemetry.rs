use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use once_cell::sync::OnceCell;
use serde_json::Value;
use shared_event_bus::{EventPublisher, EventRecord};
use shared_logging::{JsonLogger, LogLevel, LogRecord, LogSink};
use tokio::runtime::{Handle, Runtime};

/// Builder for response telemetry sinks.
pub struct ResponseTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    min_level: LogLevel,
    sinks: Vec<Arc<dyn LogSink>>,
    event_publisher: Option<Arc<dyn EventPublisher>>,
}

impl ResponseTelemetryBuilder {
    /// Creates the builder.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            min_level: LogLevel::Debug,
            sinks: Vec::new(),
            event_publisher: None,
        }
    }

    /// Sets the JSON-lines log path.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Minimum level written to the log file.
    #[must_use]
    pub const fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Adds an extra sink (e.g. an in-memory logger).
    #[must_use]
    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Sets the event publisher.
    #[must_use]
    pub fn event_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.event_publisher = Some(publisher);
        self
    }

    /// Builds the telemetry handle.
    pub fn build(self) -> Result<ResponseTelemetry> {
        let mut sinks = self.sinks;
        if let Some(path) = self.log_path {
            sinks.push(Arc::new(JsonLogger::new(path)?.with_min_level(self.min_level)));
        }
        let event = self.event_publisher.map(EventHandle::new);
        Ok(ResponseTelemetry {
            inner: Arc::new(TelemetryInner {
                module: self.module,
                sinks,
                event,
            }),
        })
    }
}

/// Telemetry handle shared by the orchestrator and runtime.
#[derive(Clone)]
pub struct ResponseTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for ResponseTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseTelemetry")
            .field("module", &self.inner.module)
            .field("sinks", &self.inner.sinks.len())
            .field("events", &self.inner.event.is_some())
            .finish()
    }
}

struct TelemetryInner {
    module: String,
    sinks: Vec<Arc<dyn LogSink>>,
    event: Option<EventHandle>,
}

struct EventHandle {
    // Built on first use outside a tokio context. Dropping may happen inside one,
    // so shutdown never blocks.
    runtime: OnceCell<Runtime>,
    publisher: Arc<dyn EventPublisher>,
}

impl EventHandle {
    fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            runtime: OnceCell::new(),
            publisher,
        }
    }

    fn publish(&self, record: EventRecord) -> Result<()> {
        if let Ok(handle) = Handle::try_current() {
            let publisher = Arc::clone(&self.publisher);
            handle.spawn(async move {
                if let Err(err) = publisher.publish(record).await {
                    eprintln!("response event publish failed: {err:?}");
                }
            });
            Ok(())
        } else {
            let runtime = self.runtime.get_or_try_init(|| {
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
            runtime.block_on(self.publisher.publish(record))
        }
    }
}

impl Drop for EventHandle {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl ResponseTelemetry {
    /// Returns a builder.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> ResponseTelemetryBuilder {
        ResponseTelemetryBuilder::new(module)
    }

    /// Logs structured metadata, optionally tied to an incident.
    pub fn log(
        &self,
        level: LogLevel,
        message: &str,
        incident_id: Option<&str>,
        metadata: &Value,
    ) -> Result<()> {
        if self.inner.sinks.is_empty() {
            return Ok(());
        }
        let mut record = LogRecord::new(&self.inner.module, level, message).with_metadata(metadata);
        if let Some(id) = incident_id {
            record = record.for_incident(id);
        }
        for sink in &self.inner.sinks {
            sink.log(&record)?;
        }
        Ok(())
    }

    /// Emits an event on the bus.
    pub fn event(&self, event_type: &str, incident_id: Option<&str>, payload: Value) -> Result<()> {
        if let Some(handle) = &self.inner.event {
            let mut record = EventRecord::new(self.inner.module.clone(), event_type, payload);
            if let Some(id) = incident_id {
                record = record.for_incident(id);
            }
            handle.publish(record)?;
        }
        Ok(())
    }
}

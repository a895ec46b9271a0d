//! JSON-lines telemetry sink.
//!
//! Writes one [`TelemetryRecord`] per sensor tick as a single JSON line,
//! the same payload the dashboard consumes over MQTT.  Every other event
//! is ignored; pair it with [`LogEventSink`](super::log_sink::LogEventSink)
//! through [`Tee`](super::Tee) to keep the log stream.

use std::io::Write;

use log::warn;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

pub struct JsonTelemetrySink<W: Write> {
    out: W,
    write_errors: u32,
}

impl<W: Write> JsonTelemetrySink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            write_errors: 0,
        }
    }

    /// Number of records that could not be written.
    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for JsonTelemetrySink<W> {
    fn emit(&mut self, event: &AppEvent) {
        let AppEvent::Telemetry(record) = event else {
            return;
        };
        let written = serde_json::to_writer(&mut self.out, record)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            self.write_errors = self.write_errors.saturating_add(1);
            warn!("telemetry write failed: {}", e);
        }
    }
}

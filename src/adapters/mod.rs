//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements    | Connects to                   |
//! |--------------|---------------|-------------------------------|
//! | `simulated`  | SensorPort    | Seeded room model             |
//! | `indicator`  | IndicatorPort | Log output (LED / buzzer)     |
//! | `log_sink`   | EventSink     | Log output                    |
//! | `json_sink`  | EventSink     | JSON lines on any `Write`     |
//! | `time`       | (clock)       | `std::time::Instant`          |

pub mod indicator;
pub mod json_sink;
pub mod log_sink;
pub mod simulated;
pub mod time;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Fans one event stream out to two sinks.
pub struct Tee<A, B>(pub A, pub B);

impl<A: EventSink, B: EventSink> EventSink for Tee<A, B> {
    fn emit(&mut self, event: &AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

use std::collections::VecDeque;
use std::fmt;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Mirrors tracing events into the bounded line buffer behind the Logs
/// tab. Lines carry the same local `HH:MM:SS` clock the history list
/// uses, plus any structured fields recorded on the event.
pub struct DashLogLayer {
    buffer: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl DashLogLayer {
    pub fn new(buffer: Arc<Mutex<VecDeque<String>>>, capacity: usize) -> Self {
        Self { buffer, capacity }
    }

    fn push(&self, line: String) {
        if let Ok(mut buf) = self.buffer.lock() {
            while buf.len() >= self.capacity {
                if buf.pop_front().is_none() {
                    break;
                }
            }
            buf.push_back(line);
        }
    }
}

/// Collects the event message plus every other recorded field as
/// trailing `key=value` pairs.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }
}

fn format_line(clock: &str, level: &Level, target: &str, visitor: &LineVisitor) -> String {
    format!(
        "{} {:>5} {}: {}{}",
        clock, level, target, visitor.message, visitor.fields,
    )
}

impl<S: Subscriber> Layer<S> for DashLogLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        let clock = chrono::Local::now().format("%H:%M:%S").to_string();
        self.push(format_line(
            &clock,
            metadata.level(),
            metadata.target(),
            &visitor,
        ));
    }
}

use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("miyu.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("miyu.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("miyu.client.request_duration_seconds");

pub(crate) static STREAM_EVENTS: Counter = Counter::new("miyu.stream.events");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("miyu.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("miyu.stream.bytes");

pub(crate) static CHAT_TURNS: Counter = Counter::new("miyu.chat.turns");
pub(crate) static CHAT_TURN_ERRORS: Counter = Counter::new("miyu.chat.turn_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_EVENTS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);

    collector.register_counter(&CHAT_TURNS);
    collector.register_counter(&CHAT_TURN_ERRORS);
}

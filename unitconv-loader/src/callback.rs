//! Observer callbacks and a channel-backed observer

use tokio::sync::mpsc;
use serde::Serialize;
use unitconv_core::Unit;
use crate::NetworkAccessBehavior;

/// Receives display updates from the engine. Invoked synchronously during command processing.
pub trait ConverterCallback: Send + Sync {
    fn display_callback(&self, from: &str, to: &str);
    fn suggested_value_callback(&self, suggested: &[(String, Unit)]);
    fn max_digits_reached(&self);
}

/// Receives currency loader status.
pub trait CurrencyCallback: Send + Sync {
    fn currency_data_load_finished(&self, did_load: bool);
    fn currency_symbols_callback(&self, from: &str, to: &str);
    fn currency_ratios_callback(&self, ratio_equality: &str, accessible_ratio_equality: &str);
    fn currency_timestamp_callback(&self, timestamp: &str, is_week_old: bool);
    fn network_behavior_changed(&self, behavior: NetworkAccessBehavior);
}

/// Every callback as a value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ConverterEvent {
    Display { from: String, to: String },
    Suggested { values: Vec<(String, Unit)> },
    MaxDigitsReached,
    CurrencyDataLoadFinished { did_load: bool },
    CurrencySymbols { from: String, to: String },
    CurrencyRatios { ratio_equality: String, accessible_ratio_equality: String },
    CurrencyTimestamp { timestamp: String, is_week_old: bool },
    NetworkBehaviorChanged { behavior: NetworkAccessBehavior },
}

/// Observer that forwards every callback into an unbounded channel.
///
/// Sends after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<ConverterEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ConverterEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: ConverterEvent) {
        let _ = self.tx.send(event);
    }
}

impl ConverterCallback for EventSink {
    fn display_callback(&self, from: &str, to: &str) {
        self.send(ConverterEvent::Display { from: from.to_string(), to: to.to_string() });
    }

    fn suggested_value_callback(&self, suggested: &[(String, Unit)]) {
        self.send(ConverterEvent::Suggested { values: suggested.to_vec() });
    }

    fn max_digits_reached(&self) {
        self.send(ConverterEvent::MaxDigitsReached);
    }
}

impl CurrencyCallback for EventSink {
    fn currency_data_load_finished(&self, did_load: bool) {
        self.send(ConverterEvent::CurrencyDataLoadFinished { did_load });
    }

    fn currency_symbols_callback(&self, from: &str, to: &str) {
        self.send(ConverterEvent::CurrencySymbols { from: from.to_string(), to: to.to_string() });
    }

    fn currency_ratios_callback(&self, ratio_equality: &str, accessible_ratio_equality: &str) {
        self.send(ConverterEvent::CurrencyRatios {
            ratio_equality: ratio_equality.to_string(),
            accessible_ratio_equality: accessible_ratio_equality.to_string(),
        });
    }

    fn currency_timestamp_callback(&self, timestamp: &str, is_week_old: bool) {
        self.send(ConverterEvent::CurrencyTimestamp { timestamp: timestamp.to_string(), is_week_old });
    }

    fn network_behavior_changed(&self, behavior: NetworkAccessBehavior) {
        self.send(ConverterEvent::NetworkBehaviorChanged { behavior });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_forwards_in_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.display_callback("1", "2");
        sink.max_digits_reached();
        sink.currency_data_load_finished(true);

        assert_eq!(rx.try_recv().unwrap(), ConverterEvent::Display { from: "1".into(), to: "2".into() });
        assert_eq!(rx.try_recv().unwrap(), ConverterEvent::MaxDigitsReached);
        assert_eq!(rx.try_recv().unwrap(), ConverterEvent::CurrencyDataLoadFinished { did_load: true });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_sink_survives_dropped_receiver() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.network_behavior_changed(NetworkAccessBehavior::Offline);
    }
}

use crate::eventbus::{Flow, RecordListener};
use crate::metadata::DeviceMeta;
use crate::record::RawEvent;

/// Wraps a listener and filters records based on a user-supplied predicate.
pub struct FilteredListener {
    predicate: Box<dyn Fn(&RawEvent) -> bool>,
    inner: Box<dyn RecordListener>,
}

impl FilteredListener {
    pub fn new(
        predicate: impl Fn(&RawEvent) -> bool + 'static,
        inner: impl RecordListener + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            inner: Box::new(inner),
        }
    }
}

impl RecordListener for FilteredListener {
    fn on_record(&mut self, device: &DeviceMeta, record: &RawEvent) -> Flow {
        if (self.predicate)(record) {
            self.inner.on_record(device, record)
        } else {
            Flow::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::*;
    use crate::handlers::EscapeWatcher;

    #[test]
    fn predicate_gates_inner_listener() {
        let mut l = FilteredListener::new(|r| r.ty != EV_KEY, EscapeWatcher::new());
        let dev = DeviceMeta::new("x");
        assert_eq!(l.on_record(&dev, &RawEvent::new(EV_KEY, KEY_ESC, 1)), Flow::Continue);
    }
}

use super::RecordSink;
use crate::ring::{Consumer, RingBuffer};

/// Fans records out of a ring to every registered sink.
///
/// Each drain snapshots the ring's count once and removes no more than that,
/// so records inserted while draining wait for the next pass.
pub struct Dispatcher<T> {
    sinks: Vec<Box<dyn RecordSink<T>>>,
}

impl<T> Default for Dispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Dispatcher<T> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink<S: RecordSink<T> + 'static>(&mut self, sink: S) {
        self.sinks.push(Box::new(sink));
    }

    pub fn sink_names(&self) -> impl Iterator<Item = &str> {
        self.sinks.iter().map(|s| s.name())
    }

    #[inline]
    pub fn drain(&mut self, consumer: &mut Consumer<'_, '_, T>) -> DrainStats {
        let stats = self.drain_batch(consumer, usize::MAX);
        self.flush();
        stats
    }

    #[inline]
    pub fn drain_batch(&mut self, consumer: &mut Consumer<'_, '_, T>, limit: usize) -> DrainStats {
        let mut stats = DrainStats::default();
        let available = consumer.count().min(limit);
        for _ in 0..available {
            let Ok(record) = consumer.remove() else {
                break;
            };
            self.deliver(&record, &mut stats);
        }
        stats
    }

    #[inline]
    pub fn drain_exclusive(&mut self, ring: &mut RingBuffer<'_, T>) -> DrainStats {
        let mut stats = DrainStats::default();
        let available = ring.count();
        for _ in 0..available {
            let Ok(record) = ring.remove() else {
                break;
            };
            self.deliver(&record, &mut stats);
        }
        self.flush();
        stats
    }

    fn deliver(&mut self, record: &T, stats: &mut DrainStats) {
        stats.records_read += 1;
        for sink in &mut self.sinks {
            if sink.consume(record) {
                stats.records_delivered += 1;
            } else {
                stats.records_failed += 1;
            }
        }
    }

    fn flush(&mut self) {
        for sink in &mut self.sinks {
            sink.flush();
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainStats {
    pub records_read: u64,
    pub records_delivered: u64,
    pub records_failed: u64,
}

impl DrainStats {
    #[inline]
    pub fn success_rate(&self) -> f64 {
        let total = self.records_delivered + self.records_failed;
        if total == 0 {
            1.0
        } else {
            self.records_delivered as f64 / total as f64
        }
    }

    pub fn merge(&mut self, other: DrainStats) {
        self.records_read += other.records_read;
        self.records_delivered += other.records_delivered;
        self.records_failed += other.records_failed;
    }
}

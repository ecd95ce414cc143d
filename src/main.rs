use clap::Parser;
use refring::pool::PayloadPool;
use refring::record::Record;
use refring::ring::{RingError, SpscRingBuffer};
use refring::sink::{Dispatcher, DrainStats, RecordSink};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ScopedJoinHandle;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Feeds record references from an interrupt-style producer to a polling main loop.
#[derive(Debug, Parser)]
#[command(name = "refring", version)]
struct Args {
    /// Number of slots in the ring
    #[arg(long, default_value_t = 16)]
    capacity: usize,

    /// Records held in the payload pool
    #[arg(long, default_value_t = 64)]
    records: usize,

    /// Payload block size in bytes
    #[arg(long, default_value_t = 32)]
    block_size: usize,

    /// Microseconds between producer "interrupts"
    #[arg(long, default_value_t = 500)]
    interval_us: u64,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long)]
    duration_secs: Option<u64>,
}

struct TallySink {
    records: u64,
    bytes: u64,
}

impl<'r, 'p> RecordSink<&'r Record<'p>> for TallySink {
    fn consume(&mut self, record: &&'r Record<'p>) -> bool {
        self.records += 1;
        self.bytes += record.len() as u64;
        true
    }

    fn flush(&mut self) {
        tracing::trace!(records = self.records, bytes = self.bytes, "tally");
    }

    fn name(&self) -> &str {
        "tally"
    }
}

struct TraceSink;

impl<'r, 'p> RecordSink<&'r Record<'p>> for TraceSink {
    fn consume(&mut self, record: &&'r Record<'p>) -> bool {
        tracing::trace!(
            addr = record.addr,
            payload = %String::from_utf8_lossy(record.payload),
            "record"
        );
        true
    }

    fn name(&self) -> &str {
        "trace"
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn join_worker<T>(handle: ScopedJoinHandle<'_, T>, name: &'static str) -> Result<T, String> {
    handle.join().map_err(|_| {
        tracing::error!(worker = name, "worker thread panicked");
        format!("{} thread panicked", name)
    })
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(?args, "refring v{}", env!("CARGO_PKG_VERSION"));

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| format!("Failed to set Ctrl+C handler: {}", e))?;

    let mut pool = PayloadPool::new(args.block_size, args.records)?;
    for i in 0..args.records {
        let text = format!("reading-{i}");
        let len = text.len().min(args.block_size);
        pool.write(i, &text.as_bytes()[..len])?;
    }
    if let Err(e) = pool.pin() {
        tracing::warn!(error = %e, "could not pin payload pool, continuing unpinned");
    }

    let records: Vec<Record<'_>> = (0..args.records)
        .filter_map(|i| pool.record(i, 0x1000u16.wrapping_add(i as u16)))
        .collect();

    let mut slots = vec![None; args.capacity];
    let mut ring = SpscRingBuffer::new(&mut slots)?;
    let (mut producer, mut consumer) = ring.split();

    let mut dispatcher = Dispatcher::new();
    dispatcher.add_sink(TallySink { records: 0, bytes: 0 });
    dispatcher.add_sink(TraceSink);

    let interval = Duration::from_micros(args.interval_us);
    let deadline = args.duration_secs.map(|s| Instant::now() + Duration::from_secs(s));

    let (inserted, overruns, totals) = std::thread::scope(|scope| {
        let irq_running = running.clone();
        let records = &records;
        let irq = scope.spawn(move || {
            let mut inserted = 0u64;
            let mut overruns = 0u64;

            for record in records.iter().cycle() {
                if !irq_running.load(Ordering::Relaxed) {
                    break;
                }
                match producer.insert(record) {
                    Ok(()) => inserted += 1,
                    Err((RingError::Overflow { .. }, _)) => overruns += 1,
                    Err((e, _)) => tracing::error!(error = %e, "insert failed"),
                }
                std::thread::sleep(interval);
            }

            (inserted, overruns)
        });

        tracing::info!("Main loop running. Press Ctrl+C to stop");

        let mut totals = DrainStats::default();
        let mut last_report = Instant::now();

        loop {
            totals.merge(dispatcher.drain(&mut consumer));

            if deadline.is_some_and(|d| Instant::now() >= d) {
                running.store(false, Ordering::SeqCst);
            }
            if !running.load(Ordering::SeqCst) {
                break;
            }

            if last_report.elapsed() >= Duration::from_secs(2) {
                tracing::info!(
                    drained = totals.records_read,
                    occupied = consumer.count(),
                    free = consumer.free_count(),
                    "status"
                );
                last_report = Instant::now();
            }

            std::thread::sleep(Duration::from_millis(1));
        }

        let (inserted, overruns) = join_worker(irq, "producer")?;
        totals.merge(dispatcher.drain(&mut consumer));
        Ok::<_, String>((inserted, overruns, totals))
    })?;

    tracing::info!(
        inserted,
        overruns,
        drained = totals.records_read,
        success_rate = totals.success_rate(),
        "shutting down"
    );

    Ok(())
}

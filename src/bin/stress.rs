use clap::Parser;
use refring::pool::PayloadPool;
use refring::record::Record;
use refring::ring::SpscRingBuffer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ScopedJoinHandle;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// SPSC throughput run that checks every record comes out in insertion order.
#[derive(Debug, Parser)]
#[command(name = "stress")]
struct Args {
    /// Number of slots in the ring
    #[arg(long, default_value_t = 1024)]
    capacity: usize,

    /// Distinct records cycled through by the producer
    #[arg(long, default_value_t = 4096)]
    records: usize,

    /// Payload block size in bytes
    #[arg(long, default_value_t = 64)]
    block_size: usize,

    /// How long to run before stopping
    #[arg(long, default_value_t = 5)]
    duration_secs: u64,
}

#[derive(Debug, Default)]
struct ConsumerReport {
    removed: u64,
    out_of_order: u64,
    payload_bytes: u64,
}

/// Raises the writer-finished flag when the writer returns or unwinds, so the
/// reader never waits on a producer that is gone.
struct DoneOnDrop<'a>(&'a AtomicBool);

impl Drop for DoneOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
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

#[inline]
fn back_off() {
    unsafe {
        libc::sched_yield();
    }
}

fn join_worker<T>(handle: ScopedJoinHandle<'_, T>, name: &'static str) -> Result<T, String> {
    handle.join().map_err(|_| {
        tracing::error!(worker = name, "worker thread panicked");
        format!("{} thread panicked", name)
    })
}

/// Runs one writer and one reader over `ring` until `running` drops or
/// `deadline` passes. The reader only stops once the writer has finished and
/// the ring is drained, so every written record is accounted for.
fn pump<'r, 'p>(
    ring: &mut SpscRingBuffer<'_, &'r Record<'p>>,
    records: &'r [Record<'p>],
    running: &AtomicBool,
    deadline: Instant,
) -> Result<(u64, ConsumerReport), String> {
    if records.is_empty() {
        return Ok((0, ConsumerReport::default()));
    }

    let (mut prod, mut cons) = ring.split();
    let writer_done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        let done = &writer_done;

        let writer = scope.spawn(move || {
            let _done = DoneOnDrop(done);
            let mut count = 0u64;

            while running.load(Ordering::Relaxed) {
                let burst = prod.free_count();
                if burst == 0 {
                    back_off();
                    continue;
                }
                for _ in 0..burst {
                    let record = &records[count as usize % records.len()];
                    if prod.insert(record).is_err() {
                        break;
                    }
                    count += 1;
                }
            }

            count
        });

        let reader = scope.spawn(move || {
            let mut report = ConsumerReport::default();
            let mut expected = 0usize;

            loop {
                let available = cons.count();
                if available == 0 {
                    if done.load(Ordering::Acquire) && cons.is_empty() {
                        break;
                    }
                    back_off();
                    continue;
                }

                for _ in 0..available {
                    let Ok(record) = cons.remove() else {
                        break;
                    };
                    if !std::ptr::eq(record, &records[expected % records.len()]) {
                        report.out_of_order += 1;
                    }
                    report.payload_bytes += record.len() as u64;
                    report.removed += 1;
                    expected += 1;
                }
            }

            report
        });

        while running.load(Ordering::SeqCst) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        running.store(false, Ordering::SeqCst);

        let written = join_worker(writer, "writer")?;
        let report = join_worker(reader, "reader")?;
        Ok((written, report))
    })
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(?args, "SPSC refring stress test");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| format!("Failed to set Ctrl+C handler: {}", e))?;

    let mut pool = PayloadPool::new(args.block_size, args.records)?;
    for i in 0..args.records {
        let fill = [(i % 251) as u8; 8];
        let len = fill.len().min(args.block_size);
        pool.write(i, &fill[..len])?;
    }

    let records: Vec<Record<'_>> = (0..args.records)
        .filter_map(|i| pool.record(i, i as u16))
        .collect();

    let mut slots = vec![None; args.capacity];
    let mut ring = SpscRingBuffer::new(&mut slots)?;

    tracing::info!("Running for {} seconds...", args.duration_secs);
    let started = Instant::now();
    let deadline = started + Duration::from_secs(args.duration_secs);
    let (written, report) = pump(&mut ring, &records, &running, deadline)?;

    let elapsed = started.elapsed().as_secs_f64();
    tracing::info!(
        written,
        removed = report.removed,
        out_of_order = report.out_of_order,
        payload_mb = report.payload_bytes as f64 / 1024.0 / 1024.0,
        "Results"
    );
    tracing::info!(
        "Throughput: {:.2}M records/sec",
        written as f64 / elapsed / 1_000_000.0
    );

    if report.out_of_order > 0 || report.removed != written {
        return Err(format!(
            "FIFO violated: {} out of order, {} written vs {} removed",
            report.out_of_order, written, report.removed
        )
        .into());
    }

    Ok(())
}

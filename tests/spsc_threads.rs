use refring::pool::PayloadPool;
use refring::record::Record;
use refring::ring::{RingError, SpscRingBuffer};
use std::thread;

#[test]
fn producer_and_consumer_threads_preserve_fifo() {
    const TOTAL: u64 = 100_000;

    let mut slots = vec![None; 7];
    let mut ring = SpscRingBuffer::new(&mut slots).unwrap();
    let (mut tx, mut rx) = ring.split();

    thread::scope(|scope| {
        scope.spawn(move || {
            let mut next = 0u64;
            while next < TOTAL {
                match tx.insert(next) {
                    Ok(()) => next += 1,
                    Err((RingError::Overflow { .. }, _)) => thread::yield_now(),
                    Err((e, _)) => panic!("unexpected error: {e}"),
                }
            }
        });

        let consumer = scope.spawn(move || {
            let mut expected = 0u64;
            while expected < TOTAL {
                let available = rx.count();
                if available == 0 {
                    thread::yield_now();
                    continue;
                }
                for _ in 0..available {
                    assert_eq!(rx.remove(), Ok(expected));
                    expected += 1;
                }
            }
            assert_eq!(rx.remove(), Err(RingError::Underflow));
            expected
        });

        assert_eq!(consumer.join().unwrap(), TOTAL);
    });

    assert!(ring.is_empty());
}

#[test]
fn record_references_cross_threads() {
    const BLOCKS: usize = 32;

    let mut pool = PayloadPool::new(16, BLOCKS).unwrap();
    for i in 0..BLOCKS {
        pool.write(i, format!("payload-{i}").as_bytes()).unwrap();
    }
    let records: Vec<Record<'_>> = (0..BLOCKS)
        .map(|i| pool.record(i, i as u16).unwrap())
        .collect();

    let mut slots = vec![None; 4];
    let mut ring = SpscRingBuffer::new(&mut slots).unwrap();
    let (mut tx, mut rx) = ring.split();

    thread::scope(|scope| {
        scope.spawn(|| {
            for record in &records {
                while tx.insert(record).is_err() {
                    thread::yield_now();
                }
            }
        });

        let mut seen = 0;
        while seen < BLOCKS {
            match rx.remove() {
                Ok(record) => {
                    assert!(std::ptr::eq(record, &records[seen]));
                    assert_eq!(record.addr as usize, seen);
                    assert_eq!(record.payload, format!("payload-{seen}").as_bytes());
                    seen += 1;
                }
                Err(_) => thread::yield_now(),
            }
        }
    });
}

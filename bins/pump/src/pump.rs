//! Producer/consumer pair streaming sequential integers through one ring.

use cadence_config::PumpConfig;
use cadence_math::lcm;
use cadence_ring::{Reader, RingError, Writer};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum PumpError {
    #[error("item {index} arrived as {found}")]
    OutOfOrder { index: u64, found: u64 },

    #[error("ring of {block} x {chunks} slots overflows usize")]
    CapacityOverflow { block: usize, chunks: usize },

    #[error(transparent)]
    Ring(#[from] RingError),

    #[error("failed to spawn {name} thread")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} thread panicked")]
    Panicked(&'static str),
}

/// Ring geometry and workload derived from a [`PumpConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub capacity: usize,
    pub produce_chunk: usize,
    pub consume_chunk: usize,
    pub item_count: u64,
}

impl Plan {
    /// Sizes the ring as a whole number of `lcm(produce_chunk, consume_chunk)`
    /// blocks, so both cursors only stop on chunk boundaries and no chunk is
    /// ever split at the end of the storage.
    pub fn from_config(cfg: &PumpConfig) -> Result<Self, PumpError> {
        let block = lcm(cfg.produce_chunk, cfg.consume_chunk);
        let capacity = block
            .checked_mul(cfg.chunks_in_flight)
            .ok_or(PumpError::CapacityOverflow {
                block,
                chunks: cfg.chunks_in_flight,
            })?;
        Ok(Self {
            capacity,
            produce_chunk: cfg.produce_chunk,
            consume_chunk: cfg.consume_chunk,
            item_count: cfg.item_count,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Report {
    pub items: u64,
    pub checksum: u64,
    pub elapsed: Duration,
}

impl Report {
    pub fn items_per_sec(&self) -> f64 {
        self.items as f64 / self.elapsed.as_secs_f64().max(f64::MIN_POSITIVE)
    }
}

/// Sum of `0..count`, the checksum a lossless stream produces.
pub fn expected_checksum(count: u64) -> u64 {
    (0..count).fold(0u64, |acc, v| acc.wrapping_add(v))
}

/// Size of the next step: `chunk`, or fewer when the stream is nearly done.
fn chunk_len(chunk: usize, remaining: u64) -> usize {
    usize::try_from(remaining).map_or(chunk, |r| chunk.min(r))
}

/// Publishes `0..count` in chunks of `chunk`, blocking while the ring is full.
pub fn produce(mut writer: Writer<u64>, count: u64, chunk: usize) {
    let mut next = 0u64;
    while next < count {
        let n = chunk_len(chunk, count - next);
        writer.wait(n);

        for slot in &mut writer.as_mut_slice()[..n] {
            *slot = next;
            next += 1;
        }
        writer.consume(n);
    }
    debug!(published = next, "producer finished");
}

/// Drains `count` items in chunks of `chunk` and returns their checksum.
///
/// The whole stream is drained even after a mismatch so the producer never
/// blocks on a ring nobody empties; the first mismatch is reported at the end.
pub fn drain(mut reader: Reader<u64>, count: u64, chunk: usize) -> Result<u64, PumpError> {
    let mut index = 0u64;
    let mut checksum = 0u64;
    let mut first_error = None;

    while index < count {
        let n = chunk_len(chunk, count - index);
        reader.wait(n);

        for &found in &reader.as_slice()[..n] {
            if found != index && first_error.is_none() {
                first_error = Some(PumpError::OutOfOrder { index, found });
            }
            checksum = checksum.wrapping_add(found);
            index += 1;
        }
        reader.consume(n);
    }
    debug!(received = index, "consumer finished");

    match first_error {
        Some(err) => Err(err),
        None => Ok(checksum),
    }
}

/// Runs the producer and consumer on their own threads until the stream ends.
pub fn run(plan: &Plan) -> Result<Report, PumpError> {
    let writer = Writer::<u64>::new(plan.capacity)?;
    let reader = writer.make_reader();
    info!(
        capacity = plan.capacity,
        produce_chunk = plan.produce_chunk,
        consume_chunk = plan.consume_chunk,
        items = plan.item_count,
        "starting stream"
    );

    let start = Instant::now();
    let Plan {
        produce_chunk,
        consume_chunk,
        item_count,
        ..
    } = *plan;

    let producer = thread::Builder::new()
        .name("producer".into())
        .spawn(move || produce(writer, item_count, produce_chunk))
        .map_err(|source| PumpError::Spawn {
            name: "producer",
            source,
        })?;
    let consumer = thread::Builder::new()
        .name("consumer".into())
        .spawn(move || drain(reader, item_count, consume_chunk))
        .map_err(|source| PumpError::Spawn {
            name: "consumer",
            source,
        })?;

    producer.join().map_err(|_| PumpError::Panicked("producer"))?;
    let checksum = consumer
        .join()
        .map_err(|_| PumpError::Panicked("consumer"))??;

    Ok(Report {
        items: item_count,
        checksum,
        elapsed: start.elapsed(),
    })
}

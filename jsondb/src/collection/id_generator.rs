use crate::common::get_current_time_or_zero;
use log::{info, warn};
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const NODE_ID_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const MAX_NODE_ID: u64 = (1 << NODE_ID_BITS) - 1;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
const TIMESTAMP_LEFT_SHIFT: u64 = SEQUENCE_BITS + NODE_ID_BITS;
const EPOCH: u64 = 1288834974657;

/// How record ids are generated on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Milliseconds since the unix epoch. Two inserts within the same
    /// millisecond get the same id.
    Timestamp,
    /// 64-bit snowflake ids, unique within the process.
    ///
    /// Current ids are around 2^60, well above 2^53, so readers that parse JSON
    /// numbers as IEEE doubles (JavaScript, for one) will round them. Use
    /// [IdStrategy::Timestamp] when the collection files are shared with such
    /// readers.
    #[default]
    Snowflake,
}

/// Produces the `id` assigned to inserted records.
pub struct IdGenerator {
    strategy: IdStrategy,
    node_id: u64,
    state: Mutex<SnowflakeState>,
}

struct SnowflakeState {
    last_timestamp: u64,
    sequence: u64,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        let mut node_id = generate_node_id();
        if node_id > MAX_NODE_ID {
            warn!("Node id can't be greater than {}", MAX_NODE_ID);
            node_id = OsRng.gen_range(1..=MAX_NODE_ID);
        }
        if strategy == IdStrategy::Snowflake {
            info!("Initialized snowflake ids with node id: {}", node_id);
        }

        IdGenerator {
            strategy,
            node_id,
            state: Mutex::new(SnowflakeState {
                last_timestamp: 0,
                sequence: 0,
            }),
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    pub fn next_id(&self) -> u64 {
        match self.strategy {
            IdStrategy::Timestamp => get_current_time_or_zero() as u64,
            IdStrategy::Snowflake => self.next_snowflake(),
        }
    }

    fn next_snowflake(&self) -> u64 {
        let mut state = self.state.lock();

        let mut timestamp = current_millis();
        if timestamp < state.last_timestamp {
            // clock moved backwards, keep issuing ids from the last seen tick
            timestamp = state.last_timestamp;
        }

        if timestamp == state.last_timestamp {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                timestamp = wait_next_millis(state.last_timestamp);
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = timestamp;

        (timestamp.saturating_sub(EPOCH) << TIMESTAMP_LEFT_SHIFT)
            | (self.node_id << SEQUENCE_BITS)
            | state.sequence
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        IdGenerator::new(IdStrategy::default())
    }
}

fn current_millis() -> u64 {
    get_current_time_or_zero() as u64
}

fn wait_next_millis(last_timestamp: u64) -> u64 {
    let mut timestamp = current_millis();
    while timestamp <= last_timestamp {
        std::thread::sleep(Duration::from_micros(100));
        timestamp = current_millis();
    }
    timestamp
}

fn generate_node_id() -> u64 {
    let uuid = uuid::Uuid::new_v4();
    let uid = uuid.as_bytes();
    let rnd_byte = OsRng.gen::<u64>() & 0x000000FF;

    ((0x000000FF & uid[uid.len() - 1] as u64) | (0x0000FF00 & (rnd_byte << 8))) >> 6
}

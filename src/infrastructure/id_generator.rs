// Document ID Generator - Snowflake-like ids with an embedded node id
// Ids sort by creation time, which the newest-first listings rely on as a tie-breaker

use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::core::DocId;

/// 2024-01-01T00:00:00Z in milliseconds; keeps the timestamp within 41 bits for decades
const EPOCH_MILLIS: u64 = 1_704_067_200_000;
const NODE_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;

/// 64-bit id format: [sign:1][timestamp:41][node_id:10][sequence:12]
/// This allows 1024 nodes and 4096 ids per millisecond per node
#[derive(Debug)]
pub struct DocIdGenerator {
    node_id: u16,
    state: Mutex<GeneratorState>,
}

#[derive(Debug, Default)]
struct GeneratorState {
    last_timestamp: u64,
    sequence: u64,
}

impl DocIdGenerator {
    /// Create a new generator for the given node (0..1024)
    pub fn new(node_id: u16) -> Self {
        Self {
            node_id: node_id & 0x3FF,
            state: Mutex::new(GeneratorState::default()),
        }
    }

    fn now_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    /// Generate the next unique id
    pub fn next_id(&self) -> DocId {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut now = Self::now_millis().max(state.last_timestamp);
        if now == state.last_timestamp {
            state.sequence += 1;
            if state.sequence > MAX_SEQUENCE {
                // Sequence exhausted for this millisecond - wait for the next one
                while now <= state.last_timestamp {
                    std::thread::sleep(Duration::from_micros(100));
                    now = Self::now_millis();
                }
                state.sequence = 0;
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = now;

        let elapsed = now.saturating_sub(EPOCH_MILLIS) & ((1 << 41) - 1);
        let id = (elapsed << (NODE_BITS + SEQUENCE_BITS))
            | ((self.node_id as u64) << SEQUENCE_BITS)
            | state.sequence;

        DocId::new(id as i64)
    }

    /// Extract node id from a generated id
    pub fn extract_node_id(id: DocId) -> u16 {
        ((id.value() as u64 >> SEQUENCE_BITS) & 0x3FF) as u16
    }

    /// Extract sequence from a generated id
    pub fn extract_sequence(id: DocId) -> u16 {
        (id.value() as u64 & MAX_SEQUENCE) as u16
    }

    pub fn node_id(&self) -> u16 {
        self.node_id
    }
}

// src/chunker.rs
//
// Splits the datetime range across workers. Timer0 and VCount stay full-width
// in every chunk; only the datetime axis is sliced, which keeps per-worker
// match ordering monotone in datetime and makes progress reporting cheap.

use chrono::Duration;

use crate::data_types::{SearchConditions, WorkerChunk};

/// Split the search range into at most `workers` contiguous, disjoint
/// datetime slices of near-equal second counts. Remainder seconds go to the
/// earlier chunks. A range shorter than the worker count yields fewer chunks.
pub fn split(conditions: &SearchConditions, workers: usize) -> Vec<WorkerChunk> {
    let total_seconds = conditions.range_seconds();
    let workers = (workers.max(1) as u64).min(total_seconds);
    let base = total_seconds / workers;
    let remainder = total_seconds % workers;

    let per_second_ops = conditions.timer0_count() * conditions.vcount_count();
    let mut chunks = Vec::with_capacity(workers as usize);
    let mut cursor = conditions.datetime_start;
    for worker_id in 0..workers {
        let seconds = base + u64::from(worker_id < remainder);
        let end = cursor + Duration::seconds(seconds as i64 - 1);
        chunks.push(WorkerChunk {
            worker_id: worker_id as usize,
            start: cursor,
            end,
            timer0_min: conditions.timer0_min,
            timer0_max: conditions.timer0_max,
            vcount_min: conditions.vcount_min,
            vcount_max: conditions.vcount_max,
            estimated_ops: seconds * per_second_ops,
        });
        cursor = end + Duration::seconds(1);
    }
    chunks
}

/// How evenly the work is spread: `100 * min / max` chunk seconds. Purely
/// informational.
pub fn load_balance_score(chunks: &[WorkerChunk]) -> u8 {
    let min = chunks.iter().map(WorkerChunk::seconds).min().unwrap_or(0);
    let max = chunks.iter().map(WorkerChunk::seconds).max().unwrap_or(0);
    if max == 0 {
        return 0;
    }
    (100 * min / max) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::{Hardware, KeyInput, MacAddress};
    use crate::datetime_codes::datetime_from_parts;
    use crate::rom_profiles::{RomRegion, RomVersion};

    fn conditions(range_seconds: i64) -> SearchConditions {
        let start = datetime_from_parts(2011, 3, 6, 0, 0, 0).unwrap();
        SearchConditions {
            version: RomVersion::Black,
            region: RomRegion::Jpn,
            hardware: Hardware::Ds,
            timer0_min: 0x0C79,
            timer0_max: 0x0C7A,
            vcount_min: 0x60,
            vcount_max: 0x60,
            auto_vcount: false,
            datetime_start: start,
            datetime_end: start + Duration::seconds(range_seconds - 1),
            key_input: KeyInput::NONE,
            mac: MacAddress([0x56, 0x34, 0x12, 0xBF, 0x09, 0x00]),
            frame: 0,
        }
    }

    #[test]
    fn two_hours_across_four_workers() {
        let cond = conditions(7200);
        let chunks = split(&cond, 4);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.iter().map(WorkerChunk::seconds).sum::<u64>(), 7200);
        let min = chunks.iter().map(WorkerChunk::seconds).min().unwrap();
        let max = chunks.iter().map(WorkerChunk::seconds).max().unwrap();
        assert!(max - min <= 1);
        assert_eq!(load_balance_score(&chunks), 100);
        // disjoint and contiguous
        for pair in chunks.windows(2) {
            assert_eq!(pair[1].start, pair[0].end + Duration::seconds(1));
        }
        assert_eq!(chunks[0].start, cond.datetime_start);
        assert_eq!(chunks[3].end, cond.datetime_end);
    }

    #[test]
    fn remainder_goes_to_earlier_chunks() {
        let chunks = split(&conditions(10), 3);
        let sizes: Vec<u64> = chunks.iter().map(WorkerChunk::seconds).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
        assert_eq!(load_balance_score(&chunks), 75);
    }

    #[test]
    fn short_range_yields_fewer_chunks() {
        let chunks = split(&conditions(3), 8);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.seconds() == 1));
    }

    #[test]
    fn estimated_ops_counts_triples() {
        let chunks = split(&conditions(10), 2);
        // 2 Timer0 values, 1 VCount value
        assert_eq!(chunks[0].estimated_ops, 5 * 2);
    }
}

//! Integration tests for segment iterables
//!
//! These tests verify sequential scans, order-preserving position-list
//! access and the access statistics recorded by both iterator kinds.

use pretty_assertions::assert_eq;
use prismpack::storage::*;
use prismpack::{MemoryPool, PositionList, PrismPackResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn nullable_column(rng: &mut StdRng, len: usize) -> Vec<Option<u32>> {
    (0..len)
        .map(|_| {
            if rng.random_bool(0.2) {
                None
            } else {
                Some(rng.random_range(0..1_000_000))
            }
        })
        .collect()
}

fn all_segments(values: &[Option<u32>]) -> PrismPackResult<Vec<Segment>> {
    let pool = MemoryPool::default();
    [
        EncodingType::Bitpacking,
        EncodingType::FrameOfReference,
        EncodingType::VarByte,
    ]
    .into_iter()
    .map(|encoding| {
        SegmentEncoder::new(encoding)
            .with_block_size(128)
            .encode(values, &pool)
    })
    .collect()
}

#[test]
fn test_order_preserving_batch_access() -> PrismPackResult<()> {
    let mut rng = StdRng::seed_from_u64(1234);
    let values = nullable_column(&mut rng, 3000);

    for segment in all_segments(&values)? {
        for _ in 0..10 {
            let count = rng.random_range(0..500);
            let positions: PositionList = (0..count)
                .map(|_| rng.random_range(0..values.len()))
                .collect();

            let results: Vec<_> = segment.iterable().point_access(&positions)?.collect();
            assert_eq!(results.len(), positions.len());
            for (k, result) in results.iter().enumerate() {
                assert_eq!(result.offset_in_poslist, k);
                assert_eq!(result.chunk_offset, positions.get_index(k));
                assert_eq!(result.value, values[positions.get_index(k)]);
            }
        }
    }
    Ok(())
}

#[test]
fn test_duplicates_and_reverse_iteration() -> PrismPackResult<()> {
    let values: Vec<Option<u32>> = (0..1000).map(|i| Some(i * 3)).collect();
    let positions = PositionList::from_indices(vec![999, 10, 999, 10, 500]);

    for segment in all_segments(&values)? {
        let forward: Vec<Option<u32>> = segment
            .iterable()
            .point_access(&positions)?
            .map(|p| p.value)
            .collect();
        assert_eq!(
            forward,
            vec![Some(2997), Some(30), Some(2997), Some(30), Some(1500)]
        );

        let backward: Vec<usize> = segment
            .iterable()
            .point_access(&positions)?
            .rev()
            .map(|p| p.offset_in_poslist)
            .collect();
        assert_eq!(backward, vec![4, 3, 2, 1, 0]);
    }
    Ok(())
}

#[test]
fn test_point_access_on_block_codec_decodes_few_blocks() -> PrismPackResult<()> {
    let values: Vec<Option<u32>> = (0..10_000).map(Some).collect();
    let segment = SegmentEncoder::new(EncodingType::VarByte)
        .with_block_size(256)
        .encode(&values, &MemoryPool::default())?;

    // sorted positions inside two blocks
    let positions: PositionList = (300..320).chain(9_990..10_000).collect();
    let mut iter = segment.iterable().point_access(&positions)?;
    let decoded: Vec<_> = iter.by_ref().map(|p| p.value).collect();

    assert_eq!(decoded.len(), 30);
    assert_eq!(decoded[0], Some(300));
    assert_eq!(decoded[29], Some(9_999));
    assert_eq!(iter.block_decodes(), 2);
    Ok(())
}

#[test]
fn test_scan_matches_point_reads() -> PrismPackResult<()> {
    let mut rng = StdRng::seed_from_u64(99);
    let values = nullable_column(&mut rng, 777);

    for segment in all_segments(&values)? {
        let iterable = segment.iterable();
        let mut scan = iterable.iter();
        assert_eq!(scan.len(), values.len());

        for position in scan.by_ref() {
            assert_eq!(position.value, values[position.chunk_offset]);
            assert_eq!(position.is_null(), values[position.chunk_offset].is_none());
        }
        assert_eq!(scan.len(), 0);

        scan.reset();
        let last = scan.next_back().map(|p| p.value);
        assert_eq!(last, Some(values[776]));

        // 776 was taken from the back and stays consumed
        scan.seek(400);
        let tail: Vec<Option<u32>> = scan.map(|p| p.value).collect();
        assert_eq!(tail, values[400..776].to_vec());
    }
    Ok(())
}

#[test]
fn test_iterable_into_iterator() -> PrismPackResult<()> {
    let values = vec![Some(1), None, Some(3)];
    for segment in all_segments(&values)? {
        let collected: Vec<Option<u32>> = segment.iterable().into_iter().map(|p| p.value).collect();
        assert_eq!(collected, values);
    }
    Ok(())
}

#[test]
fn test_access_counter_classification() -> PrismPackResult<()> {
    let values: Vec<Option<u32>> = (0..100).map(Some).collect();
    let segment = SegmentEncoder::new(EncodingType::Bitpacking).encode(&values, &MemoryPool::default())?;
    let iterable = segment.iterable();

    iterable.iter().for_each(drop);
    let sequential: PositionList = (10..20).collect();
    iterable.point_access(&sequential)?.for_each(drop);
    let random = PositionList::from_indices(vec![50, 3, 77]);
    iterable.point_access(&random)?.for_each(drop);

    assert_eq!(
        segment.access_counter().counts(),
        AccessCounts {
            point: 0,
            sequential: 110,
            monotonic: 0,
            random: 3,
        }
    );
    Ok(())
}

//! Integration tests for segments
//!
//! These tests verify null fidelity, memory accounting, allocator-aware
//! copies and encoding selection on whole segments.

use pretty_assertions::assert_eq;
use prismpack::storage::*;
use prismpack::{CompressionConfig, MemoryPool, PrismPackResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn encoders() -> Vec<SegmentEncoder> {
    vec![
        SegmentEncoder::new(EncodingType::Bitpacking),
        SegmentEncoder::new(EncodingType::FrameOfReference),
        SegmentEncoder::new(EncodingType::VarByte).with_block_size(64),
    ]
}

#[test]
fn test_scenario_b_empty_segment() -> PrismPackResult<()> {
    init_tracing();
    let pool = MemoryPool::default();

    for encoder in encoders() {
        let segment = encoder.encode(&[], &pool)?;
        assert_eq!(segment.size(), 0);
        assert!(segment.is_empty());
        assert!(segment.null_values().is_none());
        assert_eq!(segment.iterable().iter().count(), 0);
    }

    let segment = SegmentEncoder::new(EncodingType::Bitpacking).encode(&[], &pool)?;
    assert_eq!(
        segment.memory_usage(),
        std::mem::size_of::<Segment>() + segment.compressed_vector().header_size()
    );
    Ok(())
}

#[test]
fn test_scenario_d_nulls() -> PrismPackResult<()> {
    let pool = MemoryPool::default();
    let values = [Some(5), None, Some(7), None, Some(9)];

    for encoder in encoders() {
        let segment = encoder.encode(&values, &pool)?;
        assert_eq!(segment.get(0), Some(5));
        assert_eq!(segment.get(1), None);
        assert_eq!(segment.get(2), Some(7));
        assert_eq!(segment.get(3), None);
        assert_eq!(segment.get(4), Some(9));
    }
    Ok(())
}

#[test]
fn test_null_fidelity_with_zero_values() -> PrismPackResult<()> {
    // zeros are real values; only the bitmap marks nulls
    let pool = MemoryPool::default();
    let values = [Some(0), None, Some(0), Some(3), None];
    for encoder in encoders() {
        let segment = encoder.encode(&values, &pool)?;
        let decoded: Vec<Option<u32>> = (0..values.len()).map(|i| segment.get(i)).collect();
        assert_eq!(decoded, values.to_vec());
    }
    Ok(())
}

#[test]
fn test_random_nullable_round_trip() -> PrismPackResult<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let pool = MemoryPool::default();

    for _ in 0..20 {
        let len = rng.random_range(0..2000);
        let max = rng.random_range(1..=u32::MAX);
        let values: Vec<Option<u32>> = (0..len)
            .map(|_| {
                if rng.random_bool(0.1) {
                    None
                } else {
                    Some(rng.random_range(0..=max))
                }
            })
            .collect();

        for encoder in encoders() {
            let segment = encoder.encode(&values, &pool)?;
            assert_eq!(segment.size(), values.len());
            let scanned: Vec<Option<u32>> = segment.iterable().iter().map(|p| p.value).collect();
            assert_eq!(scanned, values);
        }
    }
    Ok(())
}

#[test]
fn test_deep_copy_independence() -> PrismPackResult<()> {
    let values: Vec<Option<u32>> = (0..3000u32)
        .map(|i| if i % 7 == 0 { None } else { Some(i * 31 % 5000) })
        .collect();

    for encoder in encoders() {
        let source_pool = MemoryPool::unbounded("source");
        let target_pool = MemoryPool::unbounded("target");

        let source = encoder.encode(&values, &source_pool)?;
        source.iterable().iter().for_each(drop);
        let copy = source.copy_using_allocator(&target_pool)?;

        assert!(target_pool.allocated_bytes() > 0);
        assert_eq!(copy.encoding_type(), source.encoding_type());
        assert_eq!(copy.memory_usage(), source.memory_usage());
        assert_eq!(copy.access_counter().counts(), source.access_counter().counts());

        drop(source);
        assert_eq!(source_pool.allocated_bytes(), 0);

        for (i, expected) in values.iter().enumerate() {
            assert_eq!(copy.get(i), *expected);
        }
    }
    Ok(())
}

#[test]
fn test_copy_into_exhausted_pool_fails() -> PrismPackResult<()> {
    let values: Vec<Option<u32>> = (0..1000).map(Some).collect();
    let segment = SegmentEncoder::new(EncodingType::Bitpacking).encode(&values, &MemoryPool::default())?;

    let target = MemoryPool::with_budget("full", 16);
    assert!(matches!(
        segment.copy_using_allocator(&target),
        Err(prismpack::PrismPackError::AllocationFailure { .. })
    ));
    assert_eq!(target.allocated_bytes(), 0);
    Ok(())
}

#[test]
fn test_dropped_segments_return_budget() -> PrismPackResult<()> {
    // one 4-bit segment of 200 values needs 108 bytes
    let pool = MemoryPool::with_budget("reused", 200);
    let values: Vec<Option<u32>> = (0..200).map(|i| Some(i % 16)).collect();
    let encoder = SegmentEncoder::new(EncodingType::Bitpacking);

    let first = encoder.encode(&values, &pool)?;
    assert_eq!(pool.allocated_bytes(), 108);
    assert!(encoder.encode(&values, &pool).is_err());
    drop(first);
    assert_eq!(pool.allocated_bytes(), 0);

    let second = encoder.encode(&values, &pool)?;
    assert_eq!(second.get(199), Some(199 % 16));
    drop(second);

    let with_nulls: Vec<Option<u32>> = (0..200)
        .map(|i| if i % 5 == 0 { None } else { Some(i % 16) })
        .collect();
    let shared = MemoryPool::with_budget("cycled", 4096);
    for encoder in encoders() {
        let segment = encoder.encode(&with_nulls, &shared)?;
        let copy = segment.copy_using_allocator(&shared)?;
        drop(segment);
        assert_eq!(copy.get(5), None);
        drop(copy);
        assert_eq!(shared.allocated_bytes(), 0);
    }
    Ok(())
}

#[test]
fn test_memory_monotonicity() -> PrismPackResult<()> {
    let pool = MemoryPool::default();
    let len = 4096u32;
    let mut previous = 0;

    for bit_width in 1..=32u32 {
        let max = if bit_width == 32 { u32::MAX } else { (1 << bit_width) - 1 };
        let values: Vec<u32> = (0..len).map(|i| if i == 0 { max } else { i & max }).collect();
        let segment = SegmentEncoder::new(EncodingType::Bitpacking).encode_values(&values, None, &pool)?;

        let usage = segment.memory_usage();
        assert!(usage >= previous, "bit width {} shrank memory usage", bit_width);
        previous = usage;
    }
    Ok(())
}

#[test]
fn test_scenario_a_memory_usage() -> PrismPackResult<()> {
    let values: Vec<u32> = (0..1_000_000).map(|i| i % 4).collect();
    let segment = SegmentEncoder::new(EncodingType::Bitpacking)
        .encode_values(&values, None, &MemoryPool::default())?;

    let header = segment.compressed_vector().header_size();
    assert_eq!(
        segment.memory_usage(),
        std::mem::size_of::<Segment>() + header + 250_000 + 8
    );
    Ok(())
}

#[test]
fn test_auto_encode_and_stats() -> PrismPackResult<()> {
    let pool = MemoryPool::default();
    let clustered: Vec<Option<u32>> = (0..5000u32)
        .map(|i| Some(3_000_000_000 + (i / 256) * 10_000 + i % 5))
        .collect();
    let segment = auto_encode(&clustered, &pool)?;

    assert_eq!(segment.encoding_type(), EncodingType::FrameOfReference);
    assert!(segment.compression_ratio() > 2.0);
    assert_eq!(segment.get(4321), clustered[4321]);
    Ok(())
}

#[test]
fn test_config_driven_encoder() -> PrismPackResult<()> {
    let config = CompressionConfig::from_json_str(
        r#"{"block_size": 32, "default_encoding": "VarByte", "verify_on_encode": true}"#,
    )?;
    let pool = config.create_pool();
    let values: Vec<Option<u32>> = (0..100).map(|i| Some(i * i)).collect();
    let segment = SegmentEncoder::with_config(&config).encode(&values, &pool)?;

    assert_eq!(segment.encoding_type(), EncodingType::VarByte);
    match segment.compressed_vector() {
        CompressedVector::Block(vector) => {
            assert_eq!(vector.block_size(), 32);
            assert_eq!(vector.num_blocks(), 4);
        }
        other => panic!("expected block vector, got {:?}", other.vector_type()),
    }
    Ok(())
}

#[test]
fn test_external_codec_segment() -> PrismPackResult<()> {
    #[derive(Debug)]
    struct PlainCodec;

    impl BlockCodec for PlainCodec {
        fn id(&self) -> u8 {
            128
        }

        fn name(&self) -> &'static str {
            "Plain"
        }

        fn encode(&self, block: &[u32], out: &mut Vec<u8>) {
            block.iter().for_each(|v| out.extend_from_slice(&v.to_le_bytes()));
        }

        fn decode(&self, bytes: &[u8], out: &mut [u32]) {
            for (slot, raw) in out.iter_mut().zip(bytes.chunks_exact(4)) {
                *slot = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            }
        }
    }

    let segment = SegmentEncoder::new(EncodingType::Bitpacking)
        .with_block_codec(Arc::new(PlainCodec))
        .with_block_size(10)
        .encode(&[Some(1), None, Some(u32::MAX)], &MemoryPool::default())?;

    assert_eq!(segment.encoding_type(), EncodingType::External);
    assert_eq!(segment.get(2), Some(u32::MAX));
    assert_eq!(segment.get(1), None);
    Ok(())
}

//! Ring-group resolution.
//!
//! Rings are fixed, non-overlapping windows of [`RING_GROUP_SIZE`] blocks
//! aligned to multiples of the group size:
//!
//! ```text
//! heights:  ... | 297 298 299 | 300 301 302 | 303 304 305 | ...
//! ring(301) = ring(300) = ring(302) = [300, 301, 302]
//! ```
//!
//! The backend expects ring blocks in ascending height order. Block maps are
//! never iterated directly; heights are sorted first.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use abel_core::constants::RING_GROUP_SIZE;
use abel_core::error::{AbelError, Result};
use abel_core::types::{Bytes, TxBlockDesc, TxInDesc};

const RING_LEN: usize = RING_GROUP_SIZE as usize;

/// Returns the heights of the ring window containing `height`, ascending.
///
/// Negative heights use the Euclidean remainder, so the window always
/// contains the queried height.
///
/// # Errors
/// `ValueOutOfRange` when the window does not fit in `i64`. That only
/// happens for heights within two of `i64::MIN` or `i64::MAX`.
pub fn get_ring_block_heights(height: i64) -> Result<[i64; RING_LEN]> {
    let out_of_range = || {
        AbelError::ValueOutOfRange(format!(
            "ring window of height {} does not fit in i64",
            height
        ))
    };

    let start = height
        .checked_sub(height.rem_euclid(RING_GROUP_SIZE))
        .ok_or_else(out_of_range)?;
    start
        .checked_add(RING_GROUP_SIZE - 1)
        .ok_or_else(out_of_range)?;

    let mut heights = [0i64; RING_LEN];
    for (offset, slot) in heights.iter_mut().enumerate() {
        *slot = start + offset as i64;
    }
    Ok(heights)
}

/// Returns the raw block bytes of `blocks`, sorted ascending by height.
pub fn serialized_blocks_for_ring_group(blocks: &HashMap<i64, TxBlockDesc>) -> Vec<Bytes> {
    let mut heights: Vec<i64> = blocks.keys().copied().collect();
    heights.sort_unstable();

    debug!(?heights, "ordered ring blocks");

    heights
        .iter()
        .filter_map(|height| blocks.get(height))
        .map(|block| block.bin_data.clone())
        .collect()
}

/// Returns the union of the ring windows of all inputs, sorted and de-duplicated.
///
/// # Errors
/// `ValueOutOfRange` if any input's ring window does not fit in `i64`.
pub fn ring_block_heights_for_inputs(inputs: &[TxInDesc]) -> Result<Vec<i64>> {
    let mut heights = BTreeSet::new();
    for input in inputs {
        heights.extend(get_ring_block_heights(input.height)?);
    }
    Ok(heights.into_iter().collect())
}

/// Checks that `blocks` holds every block of every input's ring window.
///
/// # Errors
/// `MissingRingBlock` naming the lowest absent height, or `ValueOutOfRange`
/// for an input whose ring window does not fit in `i64`.
pub fn ensure_ring_blocks_present(
    inputs: &[TxInDesc],
    blocks: &HashMap<i64, TxBlockDesc>,
) -> Result<()> {
    match ring_block_heights_for_inputs(inputs)?
        .into_iter()
        .find(|height| !blocks.contains_key(height))
    {
        Some(height) => Err(AbelError::MissingRingBlock(height)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abel_core::types::{make_short_abel_address, CoinId};
    use proptest::prelude::*;
    use test_case::test_case;

    fn input_at(height: i64) -> TxInDesc {
        let owner = make_short_abel_address(&[1u8; 32], &[2u8; 32], 0);
        TxInDesc::new(vec![0u8; 4], owner, CoinId::new(vec![3u8; 32], 0), height)
    }

    fn blocks_at(heights: &[i64]) -> HashMap<i64, TxBlockDesc> {
        heights
            .iter()
            .map(|&h| (h, TxBlockDesc::new(h.to_be_bytes().to_vec(), h)))
            .collect()
    }

    #[test_case(0, [0, 1, 2] ; "genesis")]
    #[test_case(300, [300, 301, 302] ; "window start")]
    #[test_case(301, [300, 301, 302] ; "window middle")]
    #[test_case(302, [300, 301, 302] ; "window end")]
    #[test_case(303, [303, 304, 305] ; "next window")]
    #[test_case(-1, [-3, -2, -1] ; "negative")]
    fn test_ring_heights(height: i64, expected: [i64; 3]) {
        assert_eq!(get_ring_block_heights(height).unwrap(), expected);
    }

    #[test_case(i64::MAX ; "max")]
    #[test_case(i64::MAX - 1 ; "max minus one")]
    #[test_case(i64::MIN ; "min")]
    #[test_case(i64::MIN + 1 ; "min plus one")]
    fn test_ring_heights_out_of_range(height: i64) {
        assert!(matches!(
            get_ring_block_heights(height),
            Err(AbelError::ValueOutOfRange(_))
        ));
    }

    #[test]
    fn test_ring_heights_at_extremes() {
        assert_eq!(
            get_ring_block_heights(i64::MAX - 2).unwrap(),
            [i64::MAX - 4, i64::MAX - 3, i64::MAX - 2]
        );
        assert_eq!(
            get_ring_block_heights(i64::MIN + 2).unwrap(),
            [i64::MIN + 2, i64::MIN + 3, i64::MIN + 4]
        );
    }

    #[test]
    fn test_serialized_blocks_sorted() {
        let blocks = blocks_at(&[302, 300, 301]);
        let ordered = serialized_blocks_for_ring_group(&blocks);

        let expected: Vec<Bytes> = [300i64, 301, 302]
            .iter()
            .map(|h| Bytes::from(h.to_be_bytes().to_vec()))
            .collect();
        assert_eq!(ordered, expected);
    }

    #[test]
    fn test_serialized_blocks_empty() {
        assert!(serialized_blocks_for_ring_group(&HashMap::new()).is_empty());
    }

    #[test]
    fn test_heights_for_inputs_dedup() {
        let inputs = vec![input_at(301), input_at(300), input_at(7)];
        assert_eq!(
            ring_block_heights_for_inputs(&inputs).unwrap(),
            vec![6, 7, 8, 300, 301, 302]
        );
    }

    #[test]
    fn test_ensure_ring_blocks_present() {
        let inputs = vec![input_at(300)];
        assert!(ensure_ring_blocks_present(&inputs, &blocks_at(&[300, 301, 302])).is_ok());

        let result = ensure_ring_blocks_present(&inputs, &blocks_at(&[300, 302]));
        assert!(matches!(result, Err(AbelError::MissingRingBlock(301))));
    }

    #[test]
    fn test_ensure_rejects_unrepresentable_window() {
        let inputs = vec![input_at(300), input_at(i64::MAX)];
        let result = ensure_ring_blocks_present(&inputs, &blocks_at(&[300, 301, 302]));
        assert!(matches!(result, Err(AbelError::ValueOutOfRange(_))));
    }

    proptest! {
        #[test]
        fn prop_ring_is_aligned_window(height in -1_000_000_000_000i64..1_000_000_000_000i64) {
            let ring = get_ring_block_heights(height).unwrap();

            prop_assert_eq!(ring[0].rem_euclid(RING_GROUP_SIZE), 0);
            prop_assert_eq!(ring[1], ring[0] + 1);
            prop_assert_eq!(ring[2], ring[0] + 2);
            prop_assert!(ring.contains(&height));
            for member in ring {
                prop_assert_eq!(get_ring_block_heights(member).unwrap(), ring);
            }
        }

        #[test]
        fn prop_serialized_blocks_ascending(
            heights in prop::collection::hash_set(0i64..100_000, 0..32)
        ) {
            let heights: Vec<i64> = heights.into_iter().collect();
            let blocks = blocks_at(&heights);

            let ordered: Vec<i64> = serialized_blocks_for_ring_group(&blocks)
                .iter()
                .map(|bytes| {
                    let mut buf = [0u8; 8];
                    buf.copy_from_slice(bytes);
                    i64::from_be_bytes(buf)
                })
                .collect();

            let mut expected = heights.clone();
            expected.sort_unstable();
            prop_assert_eq!(ordered, expected);
        }
    }
}

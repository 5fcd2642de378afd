use proptest::prelude::*;
use slicefan::{WorkDescriptor, compute_slices};

#[test]
fn reference_example_two_slices() {
    let slices = compute_slices(1250, 500);
    assert_eq!(
        slices,
        vec![WorkDescriptor::new(0, 2), WorkDescriptor::new(1, 2)]
    );
}

#[test]
fn reference_example_five_slices() {
    let slices = compute_slices(2500, 500);
    assert_eq!(slices.len(), 5);
    for (i, slice) in slices.iter().enumerate() {
        assert_eq!(slice.id, u32::try_from(i).unwrap());
        assert_eq!(slice.max, 5);
    }
}

#[test]
fn total_below_page_size_yields_nothing() {
    assert!(compute_slices(10, 500).is_empty());
}

#[test]
fn remainder_is_dropped_not_rounded_up() {
    // 2999 documents at page size 500: the trailing 499 get no slice.
    assert_eq!(compute_slices(2999, 500).len(), 5);
}

#[test]
fn page_size_one_gives_one_slice_per_document() {
    let slices = compute_slices(7, 1);
    assert_eq!(slices.len(), 7);
    assert!(slices.iter().all(|slice| slice.max == 7));
}

proptest! {
    #[test]
    fn slice_count_is_floor_division(total in 0u64..5_000_000, page_size in 1u32..10_000) {
        let slices = compute_slices(total, page_size);
        prop_assert_eq!(slices.len() as u64, total / u64::from(page_size));
    }

    #[test]
    fn ids_are_contiguous_with_constant_max(total in 0u64..1_000_000, page_size in 1u32..5_000) {
        let slices = compute_slices(total, page_size);
        let count = u32::try_from(slices.len()).unwrap();
        for (i, slice) in slices.iter().enumerate() {
            prop_assert_eq!(slice.id, u32::try_from(i).unwrap());
            prop_assert_eq!(slice.max, count);
        }
    }

    #[test]
    fn every_produced_descriptor_is_valid(total in 1u64..1_000_000, page_size in 1u32..5_000) {
        for slice in compute_slices(total, page_size) {
            prop_assert!(slice.is_valid());
        }
    }

    #[test]
    fn computation_is_deterministic(total in 0u64..1_000_000, page_size in 1u32..5_000) {
        prop_assert_eq!(
            compute_slices(total, page_size),
            compute_slices(total, page_size)
        );
    }
}

//! Property-based invariant checks over the template store, curation
//! policies, and pixel pipeline.

mod common;

use common::FakeExtractor;
use proptest::prelude::*;

use fpbench::pixel::squash::{squash_linear, squash_percentile};
use fpbench::pixel::unsharp::unsharp_mask;
use fpbench::template::curation::diversity_prune;
use fpbench::template::store::Template;

proptest! {
    /// Invariant 1: template count never exceeds capacity, for any
    /// sequence of plain-add attempts.
    #[test]
    fn plain_add_never_exceeds_capacity(
        capacity in 1usize..20,
        descriptors in prop::collection::vec(any::<u8>(), 0..60),
    ) {
        let mut template: Template<u8> = Template::new(capacity);
        for d in descriptors {
            let _ = template.add_plain(d);
            prop_assert!(template.len() <= capacity);
        }
    }

    /// Invariant 9: diversity prune is monotone non-increasing and lands
    /// exactly on target_count when it started above it.
    #[test]
    fn diversity_prune_is_monotone_and_hits_target(
        ids in prop::collection::vec(0i32..255, 2..16),
        target in 1usize..16,
    ) {
        let ext = FakeExtractor::default();
        let mut template: Template<Vec<u8>> = Template::new(32);
        for id in &ids {
            let _ = template.add_plain(vec![*id as u8; 4]);
        }
        let before = template.len();
        diversity_prune(&mut template, &ext, target);
        let after = template.len();

        prop_assert!(after <= before);
        if before > target {
            prop_assert_eq!(after, target.min(before));
        }
    }

    /// Property 5: unsharp mask with boost = 1 is the identity, for any
    /// image content and shape.
    #[test]
    fn unsharp_boost_one_is_identity(
        width in 1usize..12,
        height in 1usize..12,
        seed in prop::collection::vec(any::<u8>(), 1..144),
    ) {
        let n = width * height;
        prop_assume!(seed.len() >= n);
        let original: Vec<u8> = seed[..n].to_vec();
        let mut img = original.clone();
        unsharp_mask(&mut img, width, height, 1);
        prop_assert_eq!(img, original);
    }

    /// Percentile squash always produces values within 0..=255 (trivially
    /// true for u8, but exercises both the degenerate and normal paths
    /// without panicking across arbitrary 16-bit content).
    #[test]
    fn percentile_squash_never_panics_and_stays_in_range(
        samples in prop::collection::vec(any::<u16>(), 1..512),
    ) {
        let out = squash_percentile(&samples);
        prop_assert_eq!(out.len(), samples.len());

        let linear = squash_linear(&samples);
        prop_assert_eq!(linear.len(), samples.len());
    }
}

#[test]
fn frr_is_none_when_no_matches_or_fails_recorded() {
    use fpbench::driver::Summary;

    let summary = Summary::default();
    assert_eq!(summary.frr(), None);
}

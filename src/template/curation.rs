//! Post-enrollment curation policies.

use crate::feature::FeatureExtractor;
use crate::template::store::Template;

/// Computes cross-scores, sorts slots by cross-score descending, and
/// truncates to `target_count`. Sort stability across equal scores is not
/// guaranteed.
pub fn sort_truncate<D: Clone, E: FeatureExtractor<Descriptor = D>>(
    template: &mut Template<D>,
    extractor: &E,
    target_count: usize,
) {
    template.rescore(extractor);
    let mut slots: Vec<_> = template.slots().to_vec();
    slots.sort_by(|a, b| b.cross_score.cmp(&a.cross_score));
    slots.truncate(target_count);

    let mut rebuilt = Template::new(template.capacity());
    for slot in slots {
        rebuilt
            .add_plain(slot.descriptor)
            .expect("rebuilt template never exceeds its own capacity");
    }
    *template = rebuilt;
}

/// While `count > target_count`, finds the pair of slots with the maximum
/// pairwise score and removes the one with the smaller keypoint count
/// (ties broken by lower index). O(count²) per iteration.
pub fn diversity_prune<D: Clone, E: FeatureExtractor<Descriptor = D>>(
    template: &mut Template<D>,
    extractor: &E,
    target_count: usize,
) {
    while template.len() > target_count {
        let n = template.len();
        let mut best: Option<(usize, usize, i32)> = None;
        for i in 0..n {
            for j in (i + 1)..n {
                let score = extractor.match_score(
                    template.descriptor(i).unwrap(),
                    template.descriptor(j).unwrap(),
                );
                let better = match best {
                    None => true,
                    Some((_, _, best_score)) => score > best_score,
                };
                if better {
                    best = Some((i, j, score));
                }
            }
        }
        let (i, j, _) = match best {
            Some(v) => v,
            None => break,
        };
        let kp_i = extractor.keypoint_count(template.descriptor(i).unwrap());
        let kp_j = extractor.keypoint_count(template.descriptor(j).unwrap());
        let victim = if kp_i < kp_j {
            i
        } else if kp_j < kp_i {
            j
        } else {
            i.min(j)
        };
        template.remove(victim).expect("victim index is in range");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeExtractor;

    impl FeatureExtractor for FakeExtractor {
        type Descriptor = (i32, usize);

        fn extract(&self, _pixels: &[u8], _w: usize, _h: usize) -> Option<Self::Descriptor> {
            None
        }

        fn keypoint_count(&self, d: &Self::Descriptor) -> usize {
            d.1
        }

        fn match_score(&self, a: &Self::Descriptor, b: &Self::Descriptor) -> i32 {
            100 - (a.0 - b.0).abs()
        }
    }

    #[test]
    fn sort_truncate_keeps_highest_cross_score_entries() {
        let ext = FakeExtractor;
        let mut t: Template<(i32, usize)> = Template::new(8);
        // Cluster near 0 (high mutual scores), one outlier far away.
        for id in [0, 1, 2, 100] {
            t.add_plain((id, 10)).unwrap();
        }
        sort_truncate(&mut t, &ext, 3);
        assert_eq!(t.len(), 3);
        assert!(!t.slots().iter().any(|s| s.descriptor.0 == 100));
    }

    #[test]
    fn diversity_prune_removes_lower_keypoint_of_most_similar_pair() {
        let ext = FakeExtractor;
        let mut t: Template<(i32, usize)> = Template::new(8);
        t.add_plain((0, 20)).unwrap();
        t.add_plain((1, 5)).unwrap(); // closest to id 0, lower kp -> removed
        t.add_plain((50, 20)).unwrap();
        diversity_prune(&mut t, &ext, 2);
        assert_eq!(t.len(), 2);
        assert!(!t.slots().iter().any(|s| s.descriptor.0 == 1));
    }

    #[test]
    fn diversity_prune_stops_at_target_count() {
        let ext = FakeExtractor;
        let mut t: Template<(i32, usize)> = Template::new(8);
        for id in [0, 10, 20, 30, 40] {
            t.add_plain((id, 10)).unwrap();
        }
        diversity_prune(&mut t, &ext, 5);
        assert_eq!(t.len(), 5);
    }
}

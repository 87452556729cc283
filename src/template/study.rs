//! Runtime template study: naive and multi-layer adaptation.

use crate::constants::{STUDY_FAILED_MAX, STUDY_MIN_KP, STUDY_MIN_OBSERVATIONS};
use crate::feature::FeatureExtractor;
use crate::template::store::Template;

/// Outcome of a study attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyOutcome {
    Updated,
    Unchanged,
}

/// Per-slot and global study bookkeeping, paired 1:1 with a [`Template`] so
/// hit counts never drift out of sync with slot identity.
#[derive(Debug, Clone)]
pub struct StudiedTemplate<D> {
    pub template: Template<D>,
    hit_counts: Vec<u32>,
    insertion_kp: Vec<usize>,
    total_matches: u64,
    failed_updates: u32,
    locked: bool,
}

impl<D: Clone> StudiedTemplate<D> {
    pub fn new(template: Template<D>) -> Self {
        let len = template.len();
        Self {
            template,
            hit_counts: vec![0; len],
            insertion_kp: vec![0; len],
            total_matches: 0,
            failed_updates: 0,
            locked: false,
        }
    }

    /// Snapshots per-slot keypoint counts at finalization time (after
    /// enrollment and curation, before the first verification).
    pub fn finalize<E: FeatureExtractor<Descriptor = D>>(&mut self, extractor: &E) {
        let n = self.template.len();
        self.hit_counts = vec![0; n];
        self.insertion_kp = (0..n)
            .map(|i| extractor.keypoint_count(self.template.descriptor(i).unwrap()))
            .collect();
        self.total_matches = 0;
        self.failed_updates = 0;
        self.locked = false;
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn failed_updates(&self) -> u32 {
        self.failed_updates
    }

    pub fn total_matches(&self) -> u64 {
        self.total_matches
    }

    /// Records that `slot_idx` was the best-matching entry for an accepted
    /// probe. Called on every accepted match regardless of whether study
    /// proceeds.
    pub fn record_hit(&mut self, slot_idx: usize) {
        self.total_matches += 1;
        if let Some(count) = self.hit_counts.get_mut(slot_idx) {
            *count += 1;
        }
    }

    fn note_failure(&mut self) -> StudyOutcome {
        self.failed_updates += 1;
        if self.failed_updates > STUDY_FAILED_MAX {
            self.locked = true;
        }
        StudyOutcome::Unchanged
    }

    fn cross_scores<E: FeatureExtractor<Descriptor = D>>(&self, extractor: &E) -> Vec<i32> {
        let n = self.template.len();
        if n < 2 {
            return vec![0; n];
        }
        (0..n)
            .map(|i| {
                let sum: i64 = (0..n)
                    .filter(|&j| j != i)
                    .map(|j| {
                        extractor.match_score(
                            self.template.descriptor(i).unwrap(),
                            self.template.descriptor(j).unwrap(),
                        ) as i64
                    })
                    .sum();
                (sum / (n as i64 - 1)) as i32
            })
            .collect()
    }

    fn probe_avg<E: FeatureExtractor<Descriptor = D>>(&self, extractor: &E, probe: &D) -> i32 {
        let n = self.template.len();
        if n == 0 {
            return 0;
        }
        let sum: i64 = (0..n)
            .map(|i| extractor.match_score(probe, self.template.descriptor(i).unwrap()) as i64)
            .sum();
        (sum / n as i64) as i32
    }

    /// Preconditions: `count ≥ 2` and the probe already matched at or
    /// above the study threshold (checked by the caller before invoking
    /// this). Replaces the slot with the lowest cross-score if the probe
    /// beats it.
    pub fn naive_study<E: FeatureExtractor<Descriptor = D>>(
        &mut self,
        extractor: &E,
        probe: &D,
        probe_kp: usize,
    ) -> StudyOutcome {
        if self.template.len() < 2 {
            return StudyOutcome::Unchanged;
        }

        let cross = self.cross_scores(extractor);
        let worst_idx = cross
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)))
            .map(|(i, _)| i)
            .expect("non-empty template has a worst slot");

        let avg = self.probe_avg(extractor, probe);
        if avg > cross[worst_idx] {
            self.template.remove(worst_idx).ok();
            self.template
                .add_plain(probe.clone())
                .expect("slot just vacated has room");
            if worst_idx < self.hit_counts.len() {
                self.insertion_kp[worst_idx] = probe_kp;
                self.hit_counts[worst_idx] = 0;
            }
            StudyOutcome::Updated
        } else {
            StudyOutcome::Unchanged
        }
    }

    /// Layered guard against template degradation (L1–L6, see module docs
    /// in the design ledger). Any layer's failure is a study failure.
    pub fn multilayer_study<E: FeatureExtractor<Descriptor = D>>(
        &mut self,
        extractor: &E,
        probe: &D,
        probe_kp: usize,
    ) -> StudyOutcome {
        // L6: degradation lock.
        if self.locked {
            return StudyOutcome::Unchanged;
        }
        // L5: observation gate.
        if self.total_matches < STUDY_MIN_OBSERVATIONS as u64 {
            return self.note_failure();
        }
        // L1: probe quality.
        if (probe_kp as i64) < STUDY_MIN_KP as i64 {
            return self.note_failure();
        }

        if self.template.len() < 2 {
            return self.note_failure();
        }

        let cross = self.cross_scores(extractor);

        // L3: anchor protection, highest cross-score slot is untouchable.
        let anchor_idx = cross
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0).reverse()))
            .map(|(i, _)| i)
            .expect("non-empty template has an anchor");

        // L4: target selection, fewest hits among non-anchor slots; tie
        // by lower cross-score; tie by lower index.
        let target_idx = (0..self.template.len())
            .filter(|&i| i != anchor_idx)
            .min_by(|&a, &b| {
                let hits_a = self.hit_counts.get(a).copied().unwrap_or(0);
                let hits_b = self.hit_counts.get(b).copied().unwrap_or(0);
                hits_a
                    .cmp(&hits_b)
                    .then(cross[a].cmp(&cross[b]))
                    .then(a.cmp(&b))
            });
        let target_idx = match target_idx {
            Some(i) => i,
            None => return self.note_failure(),
        };

        // L2: quality comparison, probe must carry >= 60% of the
        // target's keypoint count at insertion.
        let target_kp = self
            .insertion_kp
            .get(target_idx)
            .copied()
            .unwrap_or(0);
        if (probe_kp as u64) * 10 < (target_kp as u64) * 6 {
            return self.note_failure();
        }

        // Benefit check.
        let probe_avg = self.probe_avg(extractor, probe);
        if probe_avg <= cross[target_idx] {
            return self.note_failure();
        }

        self.template.remove(target_idx).ok();
        self.template
            .add_plain(probe.clone())
            .expect("slot just vacated has room");
        if target_idx < self.hit_counts.len() {
            self.hit_counts[target_idx] = 0;
            self.insertion_kp[target_idx] = probe_kp;
        }
        self.failed_updates = 0;
        StudyOutcome::Updated
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

    fn built(entries: &[(i32, usize)]) -> StudiedTemplate<(i32, usize)> {
        let mut t: Template<(i32, usize)> = Template::new(8);
        for &e in entries {
            t.add_plain(e).unwrap();
        }
        let mut st = StudiedTemplate::new(t);
        st.finalize(&FakeExtractor);
        st
    }

    #[test]
    fn naive_study_requires_at_least_two_slots() {
        let ext = FakeExtractor;
        let mut st = built(&[(0, 20)]);
        assert_eq!(st.naive_study(&ext, &(0, 20), 20), StudyOutcome::Unchanged);
    }

    #[test]
    fn naive_study_replaces_worst_when_probe_beats_it() {
        let ext = FakeExtractor;
        // (0,*) and (1,*) are mutually close (score ~99); (50,*) is the
        // clear outlier with the lowest cross-score.
        let mut st = built(&[(0, 20), (1, 20), (50, 20)]);
        let outcome = st.naive_study(&ext, &(2, 20), 20);
        assert_eq!(outcome, StudyOutcome::Updated);
        assert!(!st.template.slots().iter().any(|s| s.descriptor.0 == 50));
    }

    #[test]
    fn multilayer_study_blocked_before_min_observations() {
        let ext = FakeExtractor;
        let mut st = built(&[(0, 20), (1, 20), (50, 20)]);
        let outcome = st.multilayer_study(&ext, &(2, 20), 20);
        assert_eq!(outcome, StudyOutcome::Unchanged);
        assert_eq!(st.failed_updates(), 1);
    }

    #[test]
    fn multilayer_study_locks_after_failed_max_failures() {
        let ext = FakeExtractor;
        let mut st = built(&[(0, 20), (1, 20), (50, 20)]);
        for _ in 0..(STUDY_FAILED_MAX + 1) {
            st.multilayer_study(&ext, &(2, 20), 1); // no recorded hits -> always L5 failure
        }
        assert!(st.locked());
        let before = st.failed_updates();
        st.multilayer_study(&ext, &(2, 20), 1);
        assert_eq!(st.failed_updates(), before);
    }

    #[test]
    fn multilayer_study_updates_when_all_layers_pass() {
        let ext = FakeExtractor;
        let mut st = built(&[(0, 20), (1, 20), (50, 20)]);
        for _ in 0..STUDY_MIN_OBSERVATIONS {
            st.record_hit(0);
        }
        let outcome = st.multilayer_study(&ext, &(2, 20), 20);
        assert_eq!(outcome, StudyOutcome::Updated);
        assert_eq!(st.failed_updates(), 0);
    }
}

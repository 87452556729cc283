//! Fixed-capacity template store.

use crate::error::FpError;
use crate::feature::FeatureExtractor;

/// One occupied entry in a [`Template`].
#[derive(Debug, Clone)]
pub struct TemplateSlot<D> {
    pub descriptor: D,
    /// Average pairwise score against every other slot; valid only
    /// immediately after a full rescore (see [`Template::rescore`]).
    pub cross_score: i32,
}

/// Ordered, bounded collection of feature descriptors with cached
/// cross-scores. Generic over the feature extractor so it never depends on
/// a concrete matcher implementation.
#[derive(Debug, Clone)]
pub struct Template<D> {
    slots: Vec<TemplateSlot<D>>,
    capacity: usize,
}

impl<D: Clone> Template<D> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn slots(&self) -> &[TemplateSlot<D>] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [TemplateSlot<D>] {
        &mut self.slots
    }

    pub fn descriptor(&self, index: usize) -> Option<&D> {
        self.slots.get(index).map(|s| &s.descriptor)
    }

    /// Appends unconditionally if capacity remains; otherwise refuses and
    /// the candidate descriptor is dropped by the caller.
    pub fn add_plain(&mut self, descriptor: D) -> Result<(), FpError> {
        if self.slots.len() >= self.capacity {
            return Err(FpError::TemplateFull {
                capacity: self.capacity,
            });
        }
        self.slots.push(TemplateSlot {
            descriptor,
            cross_score: 0,
        });
        Ok(())
    }

    /// Quality-ranked admission: appends unconditionally while `count <
    /// min_fill`; afterwards admits only if `keypoint_count` beats the
    /// current weakest slot's, evicting that slot if the template is full.
    pub fn add_quality_ranked<E: FeatureExtractor<Descriptor = D>>(
        &mut self,
        extractor: &E,
        descriptor: D,
        keypoint_count: usize,
        min_fill: usize,
    ) -> Result<(), FpError> {
        if self.slots.len() < min_fill {
            return self.add_plain(descriptor);
        }

        let weakest = self.find_weakest_index(extractor);
        let weakest = match weakest {
            Some(i) => i,
            None => return self.add_plain(descriptor),
        };
        let weakest_kp = extractor.keypoint_count(&self.slots[weakest].descriptor);

        if keypoint_count <= weakest_kp {
            return Err(FpError::TemplateFull {
                capacity: self.capacity,
            });
        }

        if self.slots.len() < self.capacity {
            self.slots.push(TemplateSlot {
                descriptor,
                cross_score: 0,
            });
            Ok(())
        } else {
            self.slots[weakest] = TemplateSlot {
                descriptor,
                cross_score: 0,
            };
            Ok(())
        }
    }

    /// Releases the descriptor at `index`, shifting later slots down.
    pub fn remove(&mut self, index: usize) -> Result<D, FpError> {
        if index >= self.slots.len() {
            return Err(FpError::SlotOutOfRange {
                index,
                count: self.slots.len(),
            });
        }
        Ok(self.slots.remove(index).descriptor)
    }

    /// The slot with the lowest cached keypoint count, per `extractor`.
    /// Ties broken by lowest index.
    pub fn find_weakest_index<E: FeatureExtractor<Descriptor = D>>(
        &self,
        extractor: &E,
    ) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| (i, extractor.keypoint_count(&s.descriptor)))
            .min_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(i, _)| i)
    }

    /// Recomputes every slot's cached cross-score (mean pairwise score
    /// against all other slots). O(count²).
    pub fn rescore<E: FeatureExtractor<Descriptor = D>>(&mut self, extractor: &E) {
        let n = self.slots.len();
        if n < 2 {
            for slot in &mut self.slots {
                slot.cross_score = 0;
            }
            return;
        }
        let scores: Vec<i32> = (0..n)
            .map(|i| {
                let sum: i64 = (0..n)
                    .filter(|&j| j != i)
                    .map(|j| {
                        extractor.match_score(&self.slots[i].descriptor, &self.slots[j].descriptor)
                            as i64
                    })
                    .sum();
                (sum / (n as i64 - 1)) as i32
            })
            .collect();
        for (slot, score) in self.slots.iter_mut().zip(scores) {
            slot.cross_score = score;
        }
    }

    /// Matches `probe` against every slot; returns the maximum score and
    /// its slot index. Ties broken by lowest index (stable iteration
    /// order already guarantees this).
    pub fn match_probe<E: FeatureExtractor<Descriptor = D>>(
        &self,
        extractor: &E,
        probe: &D,
    ) -> Option<(usize, i32)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| (i, extractor.match_score(probe, &s.descriptor)))
            .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0).reverse()))
    }
}

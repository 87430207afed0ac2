// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared classification of component sets.

use alloc::rc::Rc;
use alloc::vec::Vec;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::registry::RuntimeType;

/// Sorted runtime types of a component list, one entry per component.
pub type Signature = SmallVec<[RuntimeType; 8]>;

/// Where the components of each runtime type sit in a sorted component array.
///
/// Two lists with the same [`Signature`] share one `Family`.
#[derive(Debug, PartialEq, Eq)]
pub struct Family {
    signature: Signature,
    /// `(start, count)` per runtime type index.
    ranges: Vec<(u32, u32)>,
}

impl Family {
    /// Classify a sorted signature.
    pub fn new(signature: Signature) -> Self {
        debug_assert!(
            signature.windows(2).all(|w| w[0] <= w[1]),
            "signature must be sorted"
        );
        let len = signature.last().map_or(0, |rt| rt.index() + 1);
        let mut ranges = alloc::vec![(0_u32, 0_u32); len];
        for (pos, rt) in signature.iter().enumerate() {
            let range = &mut ranges[rt.index()];
            if range.1 == 0 {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "A control holds far fewer than u32::MAX components."
                )]
                let start = pos as u32;
                range.0 = start;
            }
            range.1 += 1;
        }
        Self { signature, ranges }
    }

    /// The signature this family classifies.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Number of components of `rt`.
    pub fn count(&self, rt: RuntimeType) -> usize {
        self.ranges.get(rt.index()).map_or(0, |r| r.1 as usize)
    }

    /// Array position of the `index`-th component of `rt`.
    pub fn position(&self, rt: RuntimeType, index: usize) -> Option<usize> {
        let (start, count) = *self.ranges.get(rt.index())?;
        (index < count as usize).then(|| start as usize + index)
    }

    /// Total number of components.
    pub fn len(&self) -> usize {
        self.signature.len()
    }

    /// Whether the family classifies an empty list.
    pub fn is_empty(&self) -> bool {
        self.signature.is_empty()
    }
}

/// Interned families keyed by signature.
#[derive(Debug, Default)]
pub struct FamilyCache {
    families: HashMap<Signature, Rc<Family>>,
}

impl FamilyCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared family of `signature`, created on first request.
    pub fn acquire(&mut self, signature: Signature) -> Rc<Family> {
        if let Some(family) = self.families.get(&signature) {
            return family.clone();
        }
        let family = Rc::new(Family::new(signature.clone()));
        self.families.insert(signature, family.clone());
        family
    }

    /// Give back a family; it is evicted once the cache holds the last reference.
    pub fn release(&mut self, family: Rc<Family>) {
        let signature = family.signature().clone();
        drop(family);
        if let Some(cached) = self.families.get(&signature)
            && Rc::strong_count(cached) == 1
        {
            self.families.remove(&signature);
        }
    }

    /// Evict every family no list refers to any more.
    pub fn purge_unused(&mut self) {
        self.families.retain(|_, family| Rc::strong_count(family) > 1);
    }

    /// Number of cached families.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Whether no family is cached.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn ranges_are_contiguous_per_type() {
        let family = Family::new(smallvec![
            RuntimeType(0),
            RuntimeType(2),
            RuntimeType(2),
            RuntimeType(5)
        ]);
        assert_eq!(family.count(RuntimeType(2)), 2);
        assert_eq!(family.count(RuntimeType(1)), 0);
        assert_eq!(family.count(RuntimeType(9)), 0, "unknown types have no components");
        assert_eq!(family.position(RuntimeType(2), 1), Some(2));
        assert_eq!(family.position(RuntimeType(5), 0), Some(3));
        assert_eq!(family.position(RuntimeType(2), 2), None);
    }

    #[test]
    fn cache_shares_and_evicts() {
        let mut cache = FamilyCache::new();
        let a = cache.acquire(smallvec![RuntimeType(1)]);
        let b = cache.acquire(smallvec![RuntimeType(1)]);
        assert!(Rc::ptr_eq(&a, &b), "same signature, same family");
        assert_eq!(cache.len(), 1);
        cache.release(a);
        assert_eq!(cache.len(), 1, "still referenced by b");
        cache.release(b);
        assert!(cache.is_empty());
    }
}

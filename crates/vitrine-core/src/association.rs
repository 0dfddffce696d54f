//! Association of freshly stored artifacts with a product's image set.
//!
//! Both entry points are pure: they take the current set (if any) and the
//! names that survived ingestion, in upload order, and return a new set.
//! Nothing here removes, reorders or de-duplicates images.

use crate::models::{ArtifactName, ProductImageSet};

/// Which entry point a request goes through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationMode {
    /// New product, no prior images
    Create,
    /// Existing product with its current images
    Update(ProductImageSet),
}

pub struct AssociationManager;

impl AssociationManager {
    /// Image set of a new product: the batch in upload order, first image primary.
    pub fn create(batch: Vec<ArtifactName>) -> ProductImageSet {
        ProductImageSet::from_ordered(batch)
    }

    /// Append a batch to an existing set.
    ///
    /// An empty batch leaves the set untouched. Otherwise the existing images
    /// stay in front and the primary is recomputed from the first entry, so
    /// it only changes when the product had no images before.
    pub fn update(existing: &ProductImageSet, batch: Vec<ArtifactName>) -> ProductImageSet {
        if batch.is_empty() {
            return existing.clone();
        }

        let mut ordered = Vec::with_capacity(existing.len() + batch.len());
        ordered.extend_from_slice(existing.ordered());
        ordered.extend(batch);
        ProductImageSet::from_ordered(ordered)
    }

    pub fn apply(mode: AssociationMode, batch: Vec<ArtifactName>) -> ProductImageSet {
        match mode {
            AssociationMode::Create => Self::create(batch),
            AssociationMode::Update(existing) => Self::update(&existing, batch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(tag: u64) -> ArtifactName {
        ArtifactName::from_parts(1_700_000_000_000, tag)
    }

    #[test]
    fn test_create_keeps_upload_order() {
        let batch = vec![named(3), named(1), named(2)];
        let set = AssociationManager::create(batch.clone());
        assert_eq!(set.ordered(), batch.as_slice());
        assert_eq!(set.primary(), Some(&named(3)));
        assert!(set.verify().is_ok());
    }

    #[test]
    fn test_create_with_empty_batch_has_no_primary() {
        let set = AssociationManager::create(Vec::new());
        assert!(set.is_empty());
        assert!(set.primary().is_none());
    }

    #[test]
    fn test_update_appends_and_keeps_primary() {
        let (a, b, c) = (named(1), named(2), named(3));
        let existing = AssociationManager::create(vec![a.clone()]);

        let set = AssociationManager::update(&existing, vec![b.clone(), c.clone()]);
        assert_eq!(set.ordered(), &[a.clone(), b, c]);
        assert_eq!(set.primary(), Some(&a));
    }

    #[test]
    fn test_update_with_empty_batch_is_unchanged() {
        let existing = AssociationManager::create(vec![named(1), named(2)]);
        let set = AssociationManager::update(&existing, Vec::new());
        assert_eq!(set, existing);
    }

    #[test]
    fn test_update_on_imageless_product_sets_primary() {
        let set = AssociationManager::update(&ProductImageSet::empty(), vec![named(9)]);
        assert_eq!(set.primary(), Some(&named(9)));
    }

    #[test]
    fn test_update_existing_is_strict_prefix() {
        let existing = AssociationManager::create(vec![named(1), named(2), named(3)]);
        for added in 1..=5u64 {
            let batch: Vec<_> = (0..added).map(|i| named(100 + i)).collect();
            let set = AssociationManager::update(&existing, batch);
            assert!(set.len() > existing.len());
            assert_eq!(&set.ordered()[..existing.len()], existing.ordered());
            assert!(set.verify().is_ok());
        }
    }

    #[test]
    fn test_duplicate_names_are_not_collapsed() {
        let existing = AssociationManager::create(vec![named(1)]);
        let set = AssociationManager::apply(AssociationMode::Update(existing), vec![named(1)]);
        assert_eq!(set.len(), 2);
    }
}

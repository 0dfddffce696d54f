use serde::Serialize;
use utoipa::ToSchema;

use super::artifact::ArtifactName;
use crate::error::AppError;

/// The images attached to one product.
///
/// `primary` always mirrors the first entry of `ordered`, and is absent when
/// `ordered` is empty. New sets are produced by the association rules in
/// [`crate::association`]; sets loaded from storage go through
/// [`ProductImageSet::from_parts`] and are checked with [`ProductImageSet::verify`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProductImageSet {
    primary: Option<ArtifactName>,
    ordered: Vec<ArtifactName>,
}

impl ProductImageSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set whose primary is derived from the ordered list.
    pub(crate) fn from_ordered(ordered: Vec<ArtifactName>) -> Self {
        Self {
            primary: ordered.first().cloned(),
            ordered,
        }
    }

    /// Rebuild a set from previously persisted values without checking it.
    pub fn from_parts(primary: Option<ArtifactName>, ordered: Vec<ArtifactName>) -> Self {
        Self { primary, ordered }
    }

    pub fn primary(&self) -> Option<&ArtifactName> {
        self.primary.as_ref()
    }

    pub fn ordered(&self) -> &[ArtifactName] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn into_parts(self) -> (Option<ArtifactName>, Vec<ArtifactName>) {
        (self.primary, self.ordered)
    }

    /// Check that `primary` is exactly the first ordered entry.
    pub fn verify(&self) -> Result<(), AppError> {
        match (self.primary.as_ref(), self.ordered.first()) {
            (None, None) => Ok(()),
            (Some(primary), Some(first)) if primary == first => Ok(()),
            (primary, first) => Err(AppError::AssociationInvariant(format!(
                "primary {:?} does not match first ordered image {:?} ({} images)",
                primary.map(ArtifactName::as_str),
                first.map(ArtifactName::as_str),
                self.ordered.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: u64) -> ArtifactName {
        ArtifactName::from_parts(1_700_000_000_000, n)
    }

    #[test]
    fn test_empty_set_is_consistent() {
        let set = ProductImageSet::empty();
        assert!(set.is_empty());
        assert!(set.primary().is_none());
        assert!(set.verify().is_ok());
    }

    #[test]
    fn test_from_ordered_sets_primary() {
        let set = ProductImageSet::from_ordered(vec![name(1), name(2)]);
        assert_eq!(set.primary(), Some(&name(1)));
        assert_eq!(set.len(), 2);
        assert!(set.verify().is_ok());
    }

    #[test]
    fn test_verify_detects_divergent_primary() {
        let set = ProductImageSet::from_parts(Some(name(2)), vec![name(1), name(2)]);
        assert!(matches!(set.verify(), Err(AppError::AssociationInvariant(_))));
    }

    #[test]
    fn test_verify_detects_primary_without_images() {
        let set = ProductImageSet::from_parts(Some(name(1)), Vec::new());
        assert!(matches!(set.verify(), Err(AppError::AssociationInvariant(_))));

        let set = ProductImageSet::from_parts(None, vec![name(1)]);
        assert!(matches!(set.verify(), Err(AppError::AssociationInvariant(_))));
    }
}

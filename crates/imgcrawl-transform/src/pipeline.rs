//! Ordered transform pipeline applied through the gate.

use tracing::trace;

use imgcrawl_core::{CacheKey, Image, Platform, StoredRef, TransformError};

use crate::builtin::{TransformKind, identity};
use crate::descriptor::TransformDescriptor;
use crate::gate::TransformGate;

/// What happened to one `(image, descriptor)` pair.
#[derive(Debug, Clone)]
pub enum TransformOutcome {
    /// This caller won the gate; the result was stored.
    Stored(StoredRef),
    /// Another caller already claimed the key.
    Skipped(CacheKey),
    /// This caller won the gate but transforming or storing failed.
    Failed {
        key: CacheKey,
        error: TransformError,
    },
}

impl TransformOutcome {
    /// Check if this outcome produced an artifact.
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_))
    }
}

/// Ordered list of transforms applied to every downloaded image.
#[derive(Debug, Clone, Default)]
pub struct TransformPipeline {
    descriptors: Vec<TransformDescriptor>,
}

impl TransformPipeline {
    /// Create a pipeline from descriptors, in application order.
    pub fn new(descriptors: Vec<TransformDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Pipeline holding only the identity transform.
    pub fn identity() -> Self {
        Self::new(vec![identity()])
    }

    /// Pipeline of built-in transforms.
    pub fn from_kinds(kinds: &[TransformKind]) -> Self {
        Self::new(kinds.iter().map(|kind| kind.descriptor()).collect())
    }

    /// Append a descriptor.
    pub fn push(&mut self, descriptor: TransformDescriptor) {
        self.descriptors.push(descriptor);
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransformDescriptor> {
        self.descriptors.iter()
    }

    /// Descriptor names in order.
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(TransformDescriptor::name).collect()
    }

    /// Run every descriptor over `image`.
    ///
    /// Each `(source, name)` key goes through `gate`; only keys this call
    /// claims are transformed and stored via `platform`.
    pub fn run(
        &self,
        image: &Image,
        gate: &TransformGate,
        platform: &dyn Platform,
    ) -> Vec<TransformOutcome> {
        self.descriptors
            .iter()
            .map(|descriptor| {
                let key = CacheKey::new(image.source().clone(), descriptor.name());
                if !gate.try_claim(&key) {
                    trace!(%key, "transform already claimed");
                    return TransformOutcome::Skipped(key);
                }

                let stored = descriptor
                    .apply(image)
                    .and_then(|output| platform.store(&output, &key).map_err(Into::into));

                match stored {
                    Ok(stored) => TransformOutcome::Stored(stored),
                    Err(error) => TransformOutcome::Failed { key, error },
                }
            })
            .collect()
    }
}

impl FromIterator<TransformDescriptor> for TransformPipeline {
    fn from_iter<I: IntoIterator<Item = TransformDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

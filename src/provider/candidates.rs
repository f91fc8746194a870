use std::sync::Arc;

use tracing::trace;

use super::ProviderError;

/// Registered implementations of one collaborator.
///
/// The same instance may be registered more than once; resolution
/// collapses registrations by identity before deciding.
pub struct Candidates<T: ?Sized> {
    name: &'static str,
    items: Vec<Arc<T>>,
}

impl<T: ?Sized> Candidates<T> {
    /// `name` labels the collaborator in errors and logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Vec::new(),
        }
    }

    pub fn register(&mut self, candidate: Arc<T>) {
        self.items.push(candidate);
    }

    pub fn with(mut self, candidate: Arc<T>) -> Self {
        self.register(candidate);
        self
    }

    /// Number of registrations, duplicates included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct instances, in registration order.
    pub fn distinct(&self) -> Vec<Arc<T>> {
        let mut seen: Vec<Arc<T>> = Vec::new();
        for item in &self.items {
            if !seen.iter().any(|s| Arc::ptr_eq(s, item)) {
                seen.push(item.clone());
            }
        }
        seen
    }

    /// The single distinct candidate, if any.
    ///
    /// More than one distinct instance is ambiguous and never guessed.
    pub fn resolve_unique(&self) -> Result<Option<Arc<T>>, ProviderError> {
        let mut distinct = self.distinct();
        trace!(
            collaborator = self.name,
            registered = self.items.len(),
            distinct = distinct.len(),
            "resolving candidates"
        );
        match distinct.len() {
            0 => Ok(None),
            1 => Ok(distinct.pop()),
            count => Err(ProviderError::AmbiguousResolution {
                collaborator: self.name,
                count,
            }),
        }
    }
}

impl<T: ?Sized> Clone for Candidates<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            items: self.items.clone(),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for Candidates<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidates")
            .field("name", &self.name)
            .field("registered", &self.items.len())
            .finish()
    }
}

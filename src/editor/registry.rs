//! Maps each [`EditorKind`] to the factory that builds its hosted editor.

use super::{EditorContext, EditorKind, EntityEditor, HostedEditor, MountError};
use std::collections::HashMap;

/// Builds the hosted editor for one tab.
pub type EditorFactory =
    Box<dyn Fn(EditorContext) -> Result<Box<dyn HostedEditor>, MountError> + Send + Sync>;

pub struct EditorRegistry {
    factories: HashMap<EditorKind, EditorFactory>,
}

impl EditorRegistry {
    /// Registry with no editors.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry where every kind is served by [`EntityEditor`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for &kind in EditorKind::all() {
            registry.register(kind, move |ctx| {
                Ok(Box::new(EntityEditor::new(kind, ctx)) as Box<dyn HostedEditor>)
            });
        }
        registry
    }

    /// Install (or replace) the factory for `kind`.
    pub fn register<F>(&mut self, kind: EditorKind, factory: F)
    where
        F: Fn(EditorContext) -> Result<Box<dyn HostedEditor>, MountError> + Send + Sync + 'static,
    {
        if self.factories.insert(kind, Box::new(factory)).is_some() {
            log::debug!("Replaced editor factory for {}", kind);
        }
    }

    pub fn contains(&self, kind: EditorKind) -> bool {
        self.factories.contains_key(&kind)
    }

    pub(crate) fn build(
        &self,
        kind: EditorKind,
        ctx: EditorContext,
    ) -> Result<Box<dyn HostedEditor>, MountError> {
        let factory = self
            .factories
            .get(&kind)
            .ok_or(MountError::Unregistered(kind))?;
        factory(ctx)
    }

    /// Registered kinds, in declaration order.
    pub fn kinds(&self) -> Vec<EditorKind> {
        EditorKind::all()
            .iter()
            .copied()
            .filter(|kind| self.factories.contains_key(kind))
            .collect()
    }
}

impl Default for EditorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

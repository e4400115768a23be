//! Shim sources with placeholders filled in at render time.

use std::marker::PhantomData;

/// Values substituted into a shim source.
pub trait TemplateVars {
    fn apply(&self, source: &str) -> String;
}

/// Compiled-in shim source bound to the variables it expects.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    source: &'static str,
    _vars: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(source: &'static str) -> Self {
        Self {
            source,
            _vars: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.source)
    }
}

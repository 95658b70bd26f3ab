//! Embedded text templates with typed placeholders.

use std::marker::PhantomData;

/// Values substituted into one embedded template.
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// A compile-time embedded template bound to its variable set.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

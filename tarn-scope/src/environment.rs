#[cfg(test)]
mod test;

use crate::scope::{Scope, ScopeKind, ScopeTag};
use std::sync::Arc;
use tarn_syntax::names::{ConstructorName, DataName, DeclarationName, LetName, NamespaceName};

/**
A stack of scopes, innermost last.

Lookups search from the innermost scope outward and then fall back to the
built-in scope, which is shared between environments and never modified.
Insertions only ever touch the innermost scope.
*/
#[derive(Debug, Clone)]
pub struct Environment<A> {
    scopes: Vec<Scope<A>>,
    builtins: Option<Arc<Scope<A>>>,
}

impl<A> Default for Environment<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Environment<A> {
    pub fn new() -> Self {
        Environment {
            scopes: Vec::new(),
            builtins: None,
        }
    }

    pub fn with_builtins(builtins: Arc<Scope<A>>) -> Self {
        Environment {
            scopes: Vec::new(),
            builtins: Some(builtins),
        }
    }

    pub fn builtins(&self) -> Option<&Arc<Scope<A>>> {
        self.builtins.as_ref()
    }

    /// Outermost first.
    pub fn scopes(&self) -> &[Scope<A>] {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut [Scope<A>] {
        &mut self.scopes
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn top_scope(&self) -> Option<&Scope<A>> {
        self.scopes.last()
    }

    /// # Panics
    ///
    /// When no scope has been pushed.
    pub fn top_scope_mut(&mut self) -> &mut Scope<A> {
        match self.scopes.last_mut() {
            Some(scope) => scope,
            None => panic!("no scope has been pushed"),
        }
    }

    fn lookup<'a>(&'a self, get: impl Fn(&'a Scope<A>) -> Option<&'a A>) -> Option<&'a A> {
        self.scopes
            .iter()
            .rev()
            .find_map(&get)
            .or_else(|| self.builtins.as_deref().and_then(&get))
    }

    pub fn lookup_value(&self, key: &str) -> Option<&A> {
        self.lookup(|scope| scope.lookup_value(key))
    }

    pub fn lookup_type(&self, key: &str) -> Option<&A> {
        self.lookup(|scope| scope.lookup_type(key))
    }

    pub fn lookup_field(&self, constructor: &ConstructorName, key: &str) -> Option<&A> {
        self.lookup(|scope| scope.lookup_field(constructor, key))
    }

    pub fn lookup_value_or_else(&self, key: &str, on_missing: impl FnOnce(&str)) -> Option<&A> {
        let result = self.lookup_value(key);
        if result.is_none() {
            on_missing(key);
        }
        result
    }

    pub fn lookup_type_or_else(&self, key: &str, on_missing: impl FnOnce(&str)) -> Option<&A> {
        let result = self.lookup_type(key);
        if result.is_none() {
            on_missing(key);
        }
        result
    }

    pub fn lookup_field_or_else(
        &self,
        constructor: &ConstructorName,
        key: &str,
        on_missing: impl FnOnce(&str),
    ) -> Option<&A> {
        let result = self.lookup_field(constructor, key);
        if result.is_none() {
            on_missing(key);
        }
        result
    }

    /// See [`Scope::populate_value`].
    pub fn populate_value(&mut self, key: &str, meta: A) -> bool {
        self.top_scope_mut().populate_value(key, meta)
    }

    /// See [`Scope::populate_type`].
    pub fn populate_type(&mut self, key: &str, meta: A) -> bool {
        self.top_scope_mut().populate_type(key, meta)
    }

    /// See [`Scope::populate_field`].
    pub fn populate_field(&mut self, constructor: &ConstructorName, key: &str, meta: A) -> bool {
        self.top_scope_mut().populate_field(constructor, key, meta)
    }

    pub fn put_value(&mut self, key: &str, meta: A) {
        self.top_scope_mut().put_value(key, meta)
    }

    pub fn put_type(&mut self, key: &str, meta: A) {
        self.top_scope_mut().put_type(key, meta)
    }

    pub fn put_field(&mut self, constructor: &ConstructorName, key: &str, meta: A) {
        self.top_scope_mut().put_field(constructor, key, meta)
    }

    pub fn push_scope(&mut self, scope: Scope<A>) {
        log::trace!("push {:?} scope at depth {}", scope.tag(), self.scopes.len());
        self.scopes.push(scope);
    }

    /**
    Remove the innermost scope.

    # Panics

    When the stack is empty, or when the innermost scope isn't an `expected` scope.
    Either means a pass pushed and popped out of order.
    */
    pub fn pop_scope(&mut self, expected: ScopeTag) -> Scope<A> {
        match self.scopes.pop() {
            None => panic!("tried to pop a {:?} scope from an empty stack", expected),
            Some(scope) => {
                assert_eq!(
                    scope.tag(),
                    expected,
                    "popped a {:?} scope, expected {:?}",
                    scope.tag(),
                    expected
                );
                log::trace!("pop {:?} scope at depth {}", expected, self.scopes.len());
                scope
            }
        }
    }

    /// The nearest scope with the given tag.
    pub fn enclosing(&self, tag: ScopeTag) -> Option<&Scope<A>> {
        self.scopes.iter().rev().find(|scope| scope.tag() == tag)
    }

    pub fn enclosing_mut(&mut self, tag: ScopeTag) -> Option<&mut Scope<A>> {
        self.scopes.iter_mut().rev().find(|scope| scope.tag() == tag)
    }

    pub fn enclosing_namespace(&self) -> Option<&NamespaceName> {
        self.enclosing(ScopeTag::Namespace)
            .and_then(|scope| match scope.kind() {
                ScopeKind::Namespace(name) => Some(name),
                _ => None,
            })
    }

    pub fn enclosing_data(&self) -> Option<&DataName> {
        self.enclosing(ScopeTag::Data)
            .and_then(|scope| match scope.kind() {
                ScopeKind::Data(name) => Some(name),
                _ => None,
            })
    }

    pub fn enclosing_constructor(&self) -> Option<&ConstructorName> {
        self.enclosing(ScopeTag::Constructor)
            .and_then(|scope| match scope.kind() {
                ScopeKind::Constructor(name) => Some(name),
                _ => None,
            })
    }

    pub fn enclosing_let(&self) -> Option<&LetName> {
        self.enclosing(ScopeTag::Let)
            .and_then(|scope| match scope.kind() {
                ScopeKind::Let(name) => Some(name),
                _ => None,
            })
    }

    /// The top-level declaration currently being visited.
    pub fn enclosing_declaration(&self) -> Option<DeclarationName> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| match scope.kind() {
                ScopeKind::Data(name) => Some(DeclarationName::Data(name.clone())),
                ScopeKind::Constructor(name) => Some(DeclarationName::Constructor(name.clone())),
                ScopeKind::Let(name) => Some(DeclarationName::Let(name.clone())),
                _ => None,
            })
    }

    /**
    The nearest constructor pattern.

    The inner `Option` is `None` when that pattern names an unknown constructor.
    */
    pub fn enclosing_constructor_pattern(&self) -> Option<Option<&ConstructorName>> {
        self.enclosing(ScopeTag::ConstructorPattern)
            .and_then(|scope| match scope.kind() {
                ScopeKind::ConstructorPattern(name) => Some(name.as_ref()),
                _ => None,
            })
    }

    pub fn enclosing_lambda(&self) -> Option<&Scope<A>> {
        self.enclosing(ScopeTag::Lambda)
    }

    pub fn enclosing_lambda_mut(&mut self) -> Option<&mut Scope<A>> {
        self.enclosing_mut(ScopeTag::Lambda)
    }

    pub fn enclosing_case(&self) -> Option<&Scope<A>> {
        self.enclosing(ScopeTag::Case)
    }

    pub fn enclosing_case_mut(&mut self) -> Option<&mut Scope<A>> {
        self.enclosing_mut(ScopeTag::Case)
    }

    pub fn enclosing_block(&self) -> Option<&Scope<A>> {
        self.enclosing(ScopeTag::Block)
    }

    pub fn enclosing_block_mut(&mut self) -> Option<&mut Scope<A>> {
        self.enclosing_mut(ScopeTag::Block)
    }
}

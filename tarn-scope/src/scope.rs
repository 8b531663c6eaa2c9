
use fnv::{FnvHashMap, FnvHashSet};
use std::sync::Arc;
use tarn_syntax::{
    kind::UnsolvedKind,
    names::{ConstructorName, DataName, LetName, NamespaceName},
    r#type::UnsolvedTypeId,
};

/// The construct that introduced a scope.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ScopeKind {
    BuiltIn,
    Namespace(NamespaceName),
    Data(DataName),
    Constructor(ConstructorName),
    Let(LetName),
    Lambda,
    Block,
    Case,
    /// `None` when the pattern refers to an unknown constructor.
    ConstructorPattern(Option<ConstructorName>),
    QuantifiedType,
    InstantiateKind,
    CheckSubKind,
    InstantiateType,
    CheckSubType,
}

/// [`ScopeKind`] without its payload.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ScopeTag {
    BuiltIn,
    Namespace,
    Data,
    Constructor,
    Let,
    Lambda,
    Block,
    Case,
    ConstructorPattern,
    QuantifiedType,
    InstantiateKind,
    CheckSubKind,
    InstantiateType,
    CheckSubType,
}

impl ScopeKind {
    pub fn tag(&self) -> ScopeTag {
        match self {
            ScopeKind::BuiltIn => ScopeTag::BuiltIn,
            ScopeKind::Namespace(_) => ScopeTag::Namespace,
            ScopeKind::Data(_) => ScopeTag::Data,
            ScopeKind::Constructor(_) => ScopeTag::Constructor,
            ScopeKind::Let(_) => ScopeTag::Let,
            ScopeKind::Lambda => ScopeTag::Lambda,
            ScopeKind::Block => ScopeTag::Block,
            ScopeKind::Case => ScopeTag::Case,
            ScopeKind::ConstructorPattern(_) => ScopeTag::ConstructorPattern,
            ScopeKind::QuantifiedType => ScopeTag::QuantifiedType,
            ScopeKind::InstantiateKind => ScopeTag::InstantiateKind,
            ScopeKind::CheckSubKind => ScopeTag::CheckSubKind,
            ScopeKind::InstantiateType => ScopeTag::InstantiateType,
            ScopeKind::CheckSubType => ScopeTag::CheckSubType,
        }
    }

    /// Scopes that belong to a top-level declaration.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            ScopeKind::Data(_) | ScopeKind::Constructor(_) | ScopeKind::Let(_)
        )
    }
}

/**
A single binding frame.

Values, types and fields are independent: the same key can be bound in more
than one of them.
*/
#[derive(Debug, Clone)]
pub struct Scope<A> {
    kind: ScopeKind,
    values: FnvHashMap<Arc<str>, A>,
    types: FnvHashMap<Arc<str>, A>,
    fields: FnvHashMap<ConstructorName, FnvHashMap<Arc<str>, A>>,
    unsolved_kinds: FnvHashSet<UnsolvedKind>,
    unsolved_types: FnvHashSet<UnsolvedTypeId>,
}

impl<A> Scope<A> {
    pub fn new(kind: ScopeKind) -> Self {
        Scope {
            kind,
            values: FnvHashMap::default(),
            types: FnvHashMap::default(),
            fields: FnvHashMap::default(),
            unsolved_kinds: FnvHashSet::default(),
            unsolved_types: FnvHashSet::default(),
        }
    }

    pub fn kind(&self) -> &ScopeKind {
        &self.kind
    }

    pub fn tag(&self) -> ScopeTag {
        self.kind.tag()
    }

    pub fn lookup_value(&self, key: &str) -> Option<&A> {
        self.values.get(key)
    }

    pub fn lookup_type(&self, key: &str) -> Option<&A> {
        self.types.get(key)
    }

    pub fn lookup_field(&self, constructor: &ConstructorName, key: &str) -> Option<&A> {
        self.fields
            .get(constructor)
            .and_then(|fields| fields.get(key))
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn has_type(&self, key: &str) -> bool {
        self.types.contains_key(key)
    }

    pub fn has_field(&self, constructor: &ConstructorName, key: &str) -> bool {
        self.lookup_field(constructor, key).is_some()
    }

    /// Returns `false`, keeping the existing binding, when `key` is already bound.
    pub fn populate_value(&mut self, key: &str, meta: A) -> bool {
        if self.values.contains_key(key) {
            false
        } else {
            self.values.insert(Arc::from(key), meta);
            true
        }
    }

    /// Returns `false`, keeping the existing binding, when `key` is already bound.
    pub fn populate_type(&mut self, key: &str, meta: A) -> bool {
        if self.types.contains_key(key) {
            false
        } else {
            self.types.insert(Arc::from(key), meta);
            true
        }
    }

    /// Returns `false`, keeping the existing binding, when `key` is already bound.
    pub fn populate_field(&mut self, constructor: &ConstructorName, key: &str, meta: A) -> bool {
        let fields = self.fields.entry(constructor.clone()).or_default();
        if fields.contains_key(key) {
            false
        } else {
            fields.insert(Arc::from(key), meta);
            true
        }
    }

    pub fn put_value(&mut self, key: &str, meta: A) {
        self.values.insert(Arc::from(key), meta);
    }

    pub fn put_type(&mut self, key: &str, meta: A) {
        self.types.insert(Arc::from(key), meta);
    }

    pub fn put_field(&mut self, constructor: &ConstructorName, key: &str, meta: A) {
        self.fields
            .entry(constructor.clone())
            .or_default()
            .insert(Arc::from(key), meta);
    }

    pub fn values(&self) -> impl Iterator<Item = (&Arc<str>, &A)> {
        self.values.iter()
    }

    pub fn types(&self) -> impl Iterator<Item = (&Arc<str>, &A)> {
        self.types.iter()
    }

    pub fn fields(&self, constructor: &ConstructorName) -> impl Iterator<Item = (&Arc<str>, &A)> {
        self.fields.get(constructor).into_iter().flatten()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut A> {
        self.values.values_mut()
    }

    pub fn types_mut(&mut self) -> impl Iterator<Item = &mut A> {
        self.types.values_mut()
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut A> {
        self.fields
            .values_mut()
            .flat_map(|fields| fields.values_mut())
    }

    pub fn unsolved_kinds(&self) -> &FnvHashSet<UnsolvedKind> {
        &self.unsolved_kinds
    }

    pub fn unsolved_types(&self) -> &FnvHashSet<UnsolvedTypeId> {
        &self.unsolved_types
    }

    pub fn add_unsolved_kind(&mut self, unsolved: UnsolvedKind) {
        self.unsolved_kinds.insert(unsolved);
    }

    pub fn add_unsolved_type(&mut self, unsolved: UnsolvedTypeId) {
        self.unsolved_types.insert(unsolved);
    }
}

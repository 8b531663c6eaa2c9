//! The typing environment: bindings, and the solutions to unsolved kinds and types.


use crate::{builtins::builtin_typing_scope, substitution, union_find::UnionFind, TypingScope};
use std::sync::Arc;
use tarn_scope::{Environment, Scope, ScopeKind, ScopeTag};
use tarn_syntax::{
    kind::UnsolvedKind,
    names::ConstructorName,
    r#type::{Attributes, Sort, UnsolvedType, UnsolvedTypeId},
    Kind, Meta, Type,
};

/// Hands out fresh unsolved kind and type ids. Ids are never reused.
#[derive(Debug, Default, Clone)]
pub struct UnsolvedVariableSupply {
    next_kind: usize,
    next_type: usize,
}

impl UnsolvedVariableSupply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh_kind(&mut self) -> UnsolvedKind {
        let id = self.next_kind;
        self.next_kind += 1;
        UnsolvedKind(id)
    }

    pub fn fresh_type(&mut self) -> UnsolvedTypeId {
        let id = self.next_type;
        self.next_type += 1;
        UnsolvedTypeId(id)
    }
}

/// Index of the scope that registered a variable. Unregistered variables count as innermost.
fn registered_depth<A>(scopes: &[Scope<A>], registered: impl Fn(&Scope<A>) -> bool) -> usize {
    scopes
        .iter()
        .position(|scope| registered(scope))
        .unwrap_or(scopes.len())
}

/**
Choose the representative when two kinds are unified.

A solved kind beats an unsolved one, and the left one wins between two solved
kinds. Between unsolved kinds, the one registered in the outer scope wins, then
the one with the lower id.

# Laws

* The choice doesn't depend on argument order unless both kinds are solved.

  `{ left.is_unsolved() || right.is_unsolved() } pick_kind(scopes, left, right) == pick_kind(scopes, right, left)`
*/
pub fn pick_kind<A>(scopes: &[Scope<A>], left: &Kind, right: &Kind) -> Kind {
    match (left, right) {
        (Kind::Unsolved(left_var), Kind::Unsolved(right_var)) => {
            let left_depth =
                registered_depth(scopes, |scope| scope.unsolved_kinds().contains(left_var));
            let right_depth =
                registered_depth(scopes, |scope| scope.unsolved_kinds().contains(right_var));
            if (left_depth, left_var) <= (right_depth, right_var) {
                left.clone()
            } else {
                right.clone()
            }
        }
        (Kind::Unsolved(_), _) => right.clone(),
        (_, _) => left.clone(),
    }
}

/// Like [`pick_kind`], for types.
pub fn pick_type<A>(scopes: &[Scope<A>], left: &Type, right: &Type) -> Type {
    match (left, right) {
        (Type::Unsolved(left_var), Type::Unsolved(right_var)) => {
            let left_depth =
                registered_depth(scopes, |scope| scope.unsolved_types().contains(&left_var.id));
            let right_depth = registered_depth(scopes, |scope| {
                scope.unsolved_types().contains(&right_var.id)
            });
            if (left_depth, left_var.id) <= (right_depth, right_var.id) {
                left.clone()
            } else {
                right.clone()
            }
        }
        (Type::Unsolved(_), _) => right.clone(),
        (_, _) => left.clone(),
    }
}

fn drops_variables(tag: ScopeTag) -> bool {
    matches!(
        tag,
        ScopeTag::QuantifiedType
            | ScopeTag::InstantiateKind
            | ScopeTag::CheckSubKind
            | ScopeTag::InstantiateType
            | ScopeTag::CheckSubType
            | ScopeTag::Data
            | ScopeTag::Constructor
    )
}

/**
A scope stack of typed bindings, together with the solutions found so far.

Every unsolved variable is registered in the scope that was innermost when it
was created. See [`TypeEnvironment::pop_scope`] for what happens to it when
that scope is popped.
*/
#[derive(Debug, Clone)]
pub struct TypeEnvironment {
    environment: Environment<Meta<Attributes>>,
    kinds: UnionFind<Kind>,
    types: UnionFind<Type>,
    supply: UnsolvedVariableSupply,
}

impl TypeEnvironment {
    pub fn new(builtins: Arc<TypingScope>, supply: UnsolvedVariableSupply) -> Self {
        TypeEnvironment {
            environment: Environment::with_builtins(builtins),
            kinds: UnionFind::new(),
            types: UnionFind::new(),
            supply,
        }
    }

    pub fn with_builtin_types() -> Self {
        Self::new(builtin_typing_scope(), UnsolvedVariableSupply::new())
    }

    pub fn environment(&self) -> &Environment<Meta<Attributes>> {
        &self.environment
    }

    pub fn kinds(&self) -> &UnionFind<Kind> {
        &self.kinds
    }

    pub fn types(&self) -> &UnionFind<Type> {
        &self.types
    }

    pub fn depth(&self) -> usize {
        self.environment.depth()
    }

    pub fn lookup_value(&self, key: &str) -> Option<&Meta<Attributes>> {
        self.environment.lookup_value(key)
    }

    pub fn lookup_type(&self, key: &str) -> Option<&Meta<Attributes>> {
        self.environment.lookup_type(key)
    }

    pub fn lookup_field(&self, constructor: &ConstructorName, key: &str) -> Option<&Meta<Attributes>> {
        self.environment.lookup_field(constructor, key)
    }

    pub fn put_value(&mut self, key: &str, meta: Meta<Attributes>) {
        self.environment.put_value(key, meta)
    }

    pub fn put_type(&mut self, key: &str, meta: Meta<Attributes>) {
        self.environment.put_type(key, meta)
    }

    /// Bind `key` in the innermost scope unless it is already bound there.
    pub fn put_type_if_absent(&mut self, key: &str, meta: Meta<Attributes>) {
        self.environment.populate_type(key, meta);
    }

    pub fn put_field(
        &mut self,
        constructor: &ConstructorName,
        key: &str,
        meta: Meta<Attributes>,
    ) {
        self.environment.put_field(constructor, key, meta)
    }

    pub fn push_scope(&mut self, kind: ScopeKind) {
        self.environment.push_scope(Scope::new(kind))
    }

    /**
    Pop the innermost scope.

    Scopes that introduce type or kind variables (quantified types,
    instantiations, sub-kind and subtype checks, data declarations and their
    constructors) forget their unsolved variables. Every solution is closed
    under the current substitution first, so that solutions which mention
    those variables keep their meaning once the variables are gone.

    Any other scope hands its unsolved variables to the enclosing scope, so
    that an expression's type can still be solved after its scope is gone.

    # Panics

    See [`Environment::pop_scope`].
    */
    pub fn pop_scope(&mut self, expected: ScopeTag) -> TypingScope {
        if !drops_variables(expected) {
            let scope = self.environment.pop_scope(expected);
            if let Some(enclosing) = self.environment.scopes_mut().last_mut() {
                for unsolved in scope.unsolved_kinds() {
                    enclosing.add_unsolved_kind(*unsolved);
                }
                for id in scope.unsolved_types() {
                    enclosing.add_unsolved_type(*id);
                }
            }
            return scope;
        }

        self.close_solutions();
        let scope = self.environment.pop_scope(expected);

        let scopes = self.environment.scopes();
        for unsolved in scope.unsolved_kinds() {
            self.kinds
                .remove(&Kind::Unsolved(*unsolved), |left, right| {
                    pick_kind(scopes, left, right)
                });
        }
        for id in scope.unsolved_types() {
            let key = Type::Unsolved(UnsolvedType {
                id: *id,
                kind: Kind::Type,
            });
            self.types
                .remove(&key, |left, right| pick_type(scopes, left, right));
        }

        scope
    }

    pub fn put_unsolved_kind(&mut self, unsolved: UnsolvedKind) {
        self.kinds.add(Kind::Unsolved(unsolved));
        self.environment.top_scope_mut().add_unsolved_kind(unsolved);
    }

    pub fn put_unsolved_type(&mut self, unsolved: UnsolvedType) {
        let id = unsolved.id;
        self.types.add(Type::Unsolved(unsolved));
        self.environment.top_scope_mut().add_unsolved_type(id);
    }

    /// A fresh kind, registered in the innermost scope.
    pub fn new_unsolved_kind(&mut self) -> Kind {
        let unsolved = self.supply.fresh_kind();
        self.put_unsolved_kind(unsolved);
        Kind::Unsolved(unsolved)
    }

    /// A fresh type of kind `kind`, registered in the innermost scope.
    pub fn new_unsolved_type(&mut self, kind: Kind) -> Type {
        let unsolved = UnsolvedType {
            id: self.supply.fresh_type(),
            kind,
        };
        self.put_unsolved_type(unsolved.clone());
        Type::Unsolved(unsolved)
    }

    pub fn find_kind(&mut self, kind: &Kind) -> Kind {
        self.kinds.find(kind)
    }

    pub fn find_type(&mut self, ty: &Type) -> Type {
        self.types.find(ty)
    }

    /// Rewrite every solution through the current substitution.
    fn close_solutions(&mut self) {
        self.kinds
            .update_with(|kinds, _, solution| substitution::substitute_kind(kinds, solution));
        let kinds = &mut self.kinds;
        self.types.update_with(|types, _, solution| {
            substitution::substitute_type(types, kinds, solution)
        });
    }

    /**
    Unify `unsolved` with `kind`.

    The caller is responsible for the occurs check.
    */
    pub fn solve_kind(&mut self, unsolved: UnsolvedKind, kind: &Kind) {
        log::trace!("solve {} := {}", unsolved.name(), kind.render());
        let scopes = self.environment.scopes();
        self.kinds
            .union(&Kind::Unsolved(unsolved), kind, |left, right| {
                pick_kind(scopes, left, right)
            });
        self.close_solutions();
    }

    /**
    Unify `unsolved` with `ty`.

    The caller is responsible for the occurs check and for unifying kinds.
    */
    pub fn solve_type(&mut self, unsolved: &UnsolvedType, ty: &Type) {
        log::trace!("solve {} := {}", unsolved.name(), ty.render());
        let scopes = self.environment.scopes();
        self.types
            .union(&Type::Unsolved(unsolved.clone()), ty, |left, right| {
                pick_type(scopes, left, right)
            });
        self.close_solutions();
    }

    /// Solve the kind a type binding was given, if it is still unsolved.
    pub fn solve_kind_for_name(&mut self, key: &str, kind: &Kind) {
        let bound = match self.lookup_type(key).map(|meta| &meta.meta.sort) {
            Some(Sort::Kind(bound)) => bound.clone(),
            _ => return,
        };
        if let Kind::Unsolved(unsolved) = self.kinds.find(&bound) {
            self.solve_kind(unsolved, kind)
        }
    }

    /// Solve the type a value binding was given, and its kind, if they are still unsolved.
    pub fn solve_type_for_name(&mut self, key: &str, ty: &Type) {
        let bound = match self.lookup_value(key).map(|meta| &meta.meta.sort) {
            Some(Sort::Type(bound)) => bound.clone(),
            _ => return,
        };
        if let Type::Unsolved(unsolved) = self.types.find(&bound) {
            if let Kind::Unsolved(unsolved_kind) = self.kinds.find(&unsolved.kind) {
                self.solve_kind(unsolved_kind, &ty.kind());
            }
            self.solve_type(&unsolved, ty);
        }
    }

    pub fn substitute_kind(&mut self, kind: &Kind) -> Kind {
        substitution::substitute_kind(&mut self.kinds, kind)
    }

    pub fn substitute_type(&mut self, ty: &Type) -> Type {
        substitution::substitute_type(&mut self.types, &mut self.kinds, ty)
    }

    pub fn substitute_sort(&mut self, sort: &Sort) -> Sort {
        substitution::substitute_sort(&mut self.types, &mut self.kinds, sort)
    }

    pub fn default_kind(&mut self, kind: &Kind) -> Kind {
        substitution::default_kind(&mut self.kinds, kind)
    }

    pub fn default_sort(&mut self, sort: &Sort) -> Sort {
        substitution::default_sort(&mut self.types, &mut self.kinds, sort)
    }
}

//! Resolve every name in a namespace to the declaration or binder it refers to.


pub mod builtins;
pub mod graph;

use graph::DeclarationGraph;
use std::sync::Arc;
use tarn_diagnostic::{LocalDiagnosticReporter, Range, RelatedInformation};
use tarn_scope::{Environment, Scope, ScopeKind, ScopeTag};
use tarn_syntax::{
    names::{
        ConstructorName, DataName, DeclarationName, FieldName, LetName, LocalName, NamespaceName,
        QualifiedName,
    },
    Case, Constructor, ConstructorParam, Data, Declaration, Expr, FieldPattern, Let, LetFn, Meta,
    Name, Namespace, Param, Pattern, QualifiedId, Reference, TypeNode, TypeVarNode,
};

pub type NameEnvironment = Environment<Meta<Name>>;

pub type NamingScope = Scope<Meta<Name>>;

fn nameless<A>(meta: &Meta<A>) -> Meta<Name> {
    Meta::new(meta.range, Name::Nameless)
}

/// Renaming errors, reported against a single source.
struct Reporter<'a> {
    inner: LocalDiagnosticReporter<'a>,
}

impl<'a> Reporter<'a> {
    fn original_definition(&self, range: Range, message: String) -> Vec<RelatedInformation> {
        vec![RelatedInformation::new(self.inner.location(range), message)]
    }

    fn duplicate_value(&mut self, name: &str, proposed: Range, existing: Range) {
        let related =
            self.original_definition(existing, format!("Original definition of value '{}'", name));
        self.inner.report_error(
            proposed,
            format!("Duplicate definition of value '{}'", name),
            related,
        );
    }

    fn duplicate_type(&mut self, name: &str, proposed: Range, existing: Range) {
        let related =
            self.original_definition(existing, format!("Original definition of type '{}'", name));
        self.inner.report_error(
            proposed,
            format!("Duplicate definition of type '{}'", name),
            related,
        );
    }

    fn duplicate_field(
        &mut self,
        constructor: &ConstructorName,
        name: &str,
        proposed: Range,
        existing: Range,
    ) {
        let constructor = constructor.name.canonical_name();
        let related = self.original_definition(
            existing,
            format!(
                "Original definition of field '{}' in constructor '{}'",
                name, constructor
            ),
        );
        self.inner.report_error(
            proposed,
            format!(
                "Duplicate definition of field '{}' in constructor '{}'",
                name, constructor
            ),
            related,
        );
    }

    fn undefined_value(&mut self, range: Range, name: &str) {
        self.inner.report_error(
            range,
            format!("Reference to undefined value '{}'", name),
            Vec::new(),
        );
    }

    fn undefined_type(&mut self, range: Range, name: &str) {
        self.inner.report_error(
            range,
            format!("Reference to undefined type '{}'", name),
            Vec::new(),
        );
    }

    fn unknown_constructor(&mut self, range: Range, name: &str) {
        self.inner.report_error(
            range,
            format!("Reference to unknown constructor '{}'", name),
            Vec::new(),
        );
    }

    fn unknown_field(&mut self, range: Range, constructor: &ConstructorName, name: &str) {
        self.inner.report_error(
            range,
            format!(
                "Reference to unknown field '{}' in constructor '{}'",
                name,
                constructor.name.canonical_name()
            ),
            Vec::new(),
        );
    }

    fn define_value(&mut self, scope: &mut NamingScope, name: &str, meta: Meta<Name>) {
        let proposed = meta.range;
        if !scope.populate_value(name, meta) {
            let existing = scope
                .lookup_value(name)
                .map_or(Range::EMPTY, |existing| existing.range);
            self.duplicate_value(name, proposed, existing);
        }
    }

    fn define_type(&mut self, scope: &mut NamingScope, name: &str, meta: Meta<Name>) {
        let proposed = meta.range;
        if !scope.populate_type(name, meta) {
            let existing = scope
                .lookup_type(name)
                .map_or(Range::EMPTY, |existing| existing.range);
            self.duplicate_type(name, proposed, existing);
        }
    }

    fn define_field(
        &mut self,
        scope: &mut NamingScope,
        constructor: &ConstructorName,
        name: &str,
        meta: Meta<Name>,
    ) {
        let proposed = meta.range;
        if !scope.populate_field(constructor, name, meta) {
            let existing = scope
                .lookup_field(constructor, name)
                .map_or(Range::EMPTY, |existing| existing.range);
            self.duplicate_field(constructor, name, proposed, existing);
        }
    }
}

/**
Renames one namespace.

Every node of the output carries the [`Name`] it declares or refers to, or
[`Name::Nameless`] for nodes that don't name anything. Problems are reported to
the diagnostic collector and renaming carries on.

While renaming, each reference to a declaration in the same namespace is
recorded in a [`DeclarationGraph`], which decides the output's declaration
groups.
*/
pub struct Renamer<'a> {
    reporter: Reporter<'a>,
    environment: NameEnvironment,
    graph: DeclarationGraph,
    namespace_scope: Option<NamingScope>,
    local_index: usize,
}

impl<'a> Renamer<'a> {
    pub fn new(reporter: LocalDiagnosticReporter<'a>, environment: NameEnvironment) -> Self {
        Renamer {
            reporter: Reporter { inner: reporter },
            environment,
            graph: DeclarationGraph::new(),
            namespace_scope: None,
            local_index: 0,
        }
    }

    pub fn source_uri(&self) -> &Arc<str> {
        self.reporter.inner.source_uri()
    }

    pub fn environment(&self) -> &NameEnvironment {
        &self.environment
    }

    pub fn into_environment(self) -> NameEnvironment {
        self.environment
    }

    pub fn graph(&self) -> &DeclarationGraph {
        &self.graph
    }

    /// The top-level bindings of the most recently renamed namespace.
    pub fn namespace_scope(&self) -> Option<&NamingScope> {
        self.namespace_scope.as_ref()
    }

    /**
    Bind every top-level declaration of `namespace`, without looking inside
    any of them.

    Lets and data types are bound under their local and canonical names.
    Constructors are bound as values, and also as types so that they can be
    named in a type position. Constructor parameters are bound as fields.

    Only the local bindings report duplicates.
    */
    pub fn populate_top_level(&mut self, namespace: &Namespace<()>) -> NamingScope {
        let ns = namespace.id.to_name();
        let mut scope = Scope::new(ScopeKind::Namespace(ns.clone()));

        for declaration in namespace.declarations() {
            match declaration {
                Declaration::Data(data) => {
                    let data_name = DataName(QualifiedName::new(ns.clone(), &data.name));
                    let meta = Meta::new(data.meta.range, Name::Data(data_name.clone()));
                    self.reporter
                        .define_type(&mut scope, &data.name, meta.clone());
                    scope.populate_type(&data_name.0.canonical_name(), meta);

                    for constructor in &data.constructors {
                        let constructor_name =
                            ConstructorName::new(data_name.clone(), &constructor.name);
                        let canonical = constructor_name.name.canonical_name();
                        let meta = Meta::new(
                            constructor.meta.range,
                            Name::Constructor(constructor_name.clone()),
                        );
                        self.reporter
                            .define_value(&mut scope, &constructor.name, meta.clone());
                        scope.populate_value(&canonical, meta.clone());
                        scope.populate_type(&constructor.name, meta.clone());
                        scope.populate_type(&canonical, meta);

                        for param in &constructor.params {
                            let meta = Meta::new(
                                param.meta.range,
                                Name::Field(FieldName {
                                    constructor: constructor_name.clone(),
                                    name: param.name.clone(),
                                }),
                            );
                            self.reporter.define_field(
                                &mut scope,
                                &constructor_name,
                                &param.name,
                                meta,
                            );
                        }
                    }
                }
                Declaration::Let(Let { meta, name, .. })
                | Declaration::LetFn(LetFn { meta, name, .. }) => {
                    let let_name = LetName(QualifiedName::new(ns.clone(), name));
                    let canonical = let_name.0.canonical_name();
                    let meta = Meta::new(meta.range, Name::Let(let_name));
                    self.reporter.define_value(&mut scope, name, meta.clone());
                    scope.populate_value(&canonical, meta);
                }
            }
        }

        log::debug!(
            "populated {} with {} values and {} types",
            ns.canonical_name(),
            scope.values().count(),
            scope.types().count()
        );

        scope
    }

    pub fn rename_namespace(&mut self, namespace: &Namespace<()>) -> Namespace<Name> {
        let ns = namespace.id.to_name();
        log::debug!("renaming {}", ns.canonical_name());

        self.graph = DeclarationGraph::new();
        let scope = self.populate_top_level(namespace);
        self.environment.push_scope(scope);

        let declarations: Vec<Declaration<Name>> = namespace
            .declarations()
            .map(|declaration| self.rename_declaration(declaration))
            .collect();

        self.namespace_scope = Some(self.environment.pop_scope(ScopeTag::Namespace));

        Namespace {
            meta: Meta::new(namespace.meta.range, Name::Namespace(ns)),
            id: namespace.id.clone(),
            imports: namespace.imports.clone(),
            declaration_groups: self.graph.group_declarations(declarations),
        }
    }

    fn current_namespace(&self) -> NamespaceName {
        match self.environment.enclosing_namespace() {
            Some(ns) => ns.clone(),
            None => panic!("declaration renamed outside of a namespace"),
        }
    }

    /// Add a dependency edge when `name` refers to a declaration of this namespace.
    fn record_reference(&mut self, name: &Name) {
        if let Some(referenced) = name.declaration_name() {
            if self.environment.enclosing_namespace() == Some(&referenced.qualified_name().ns) {
                if let Some(enclosing) = self.environment.enclosing_declaration() {
                    self.graph.add_edge(&referenced, &enclosing);
                }
            }
        }
    }

    /// Bind a fresh local in the nearest `target` scope.
    fn bind_local(&mut self, target: ScopeTag, name: &str, range: Range) -> Meta<Name> {
        let meta = Meta::new(range, Name::Local(LocalName::new(name, self.local_index)));
        self.local_index += 1;
        match self.environment.enclosing_mut(target) {
            Some(scope) => self.reporter.define_value(scope, name, meta.clone()),
            None => panic!("no {:?} scope to bind '{}' in", target, name),
        }
        meta
    }

    fn resolve_value(&mut self, range: Range, id: &QualifiedId) -> Meta<Name> {
        let canonical = id.canonical_name();
        let resolved = self
            .environment
            .lookup_value_or_else(&canonical, |key| self.reporter.undefined_value(range, key))
            .map(|found| found.with_range(range));
        match resolved {
            Some(meta) => {
                self.record_reference(&meta.meta);
                meta
            }
            None => Meta::new(range, Name::Nameless),
        }
    }

    fn resolve_type(&mut self, range: Range, id: &QualifiedId) -> Meta<Name> {
        let canonical = id.canonical_name();
        let resolved = self
            .environment
            .lookup_type_or_else(&canonical, |key| self.reporter.undefined_type(range, key))
            .map(|found| found.with_range(range));
        match resolved {
            Some(meta) => {
                self.record_reference(&meta.meta);
                meta
            }
            None => Meta::new(range, Name::Nameless),
        }
    }

    fn rename_declaration(&mut self, declaration: &Declaration<()>) -> Declaration<Name> {
        self.local_index = 0;
        match declaration {
            Declaration::Data(data) => Declaration::Data(self.rename_data(data)),
            Declaration::Let(let_) => Declaration::Let(self.rename_top_level_let(let_)),
            Declaration::LetFn(let_fn) => Declaration::LetFn(self.rename_let_fn(let_fn)),
        }
    }

    fn rename_data(&mut self, data: &Data<()>) -> Data<Name> {
        let data_name = DataName(QualifiedName::new(self.current_namespace(), &data.name));

        let mut scope = Scope::new(ScopeKind::Data(data_name.clone()));
        for param in &data.type_params {
            self.reporter.define_type(
                &mut scope,
                &param.name,
                Meta::new(param.meta.range, param.binder_name()),
            );
        }
        self.environment.push_scope(scope);

        let type_params = data
            .type_params
            .iter()
            .map(|param| self.rename_type_var(param))
            .collect();
        let constructors = data
            .constructors
            .iter()
            .map(|constructor| self.rename_constructor(&data_name, constructor))
            .collect();

        self.environment.pop_scope(ScopeTag::Data);

        Data {
            meta: Meta::new(data.meta.range, Name::Data(data_name)),
            name: data.name.clone(),
            type_params,
            constructors,
        }
    }

    fn rename_constructor(
        &mut self,
        data_name: &DataName,
        constructor: &Constructor<()>,
    ) -> Constructor<Name> {
        let constructor_name = ConstructorName::new(data_name.clone(), &constructor.name);

        let data_node = DeclarationName::Data(data_name.clone());
        let constructor_node = DeclarationName::Constructor(constructor_name.clone());
        self.graph.add_edge(&data_node, &constructor_node);
        self.graph.add_edge(&constructor_node, &data_node);

        self.environment
            .push_scope(Scope::new(ScopeKind::Constructor(constructor_name.clone())));

        let params = constructor
            .params
            .iter()
            .map(|param| ConstructorParam {
                meta: Meta::new(
                    param.meta.range,
                    Name::Field(FieldName {
                        constructor: constructor_name.clone(),
                        name: param.name.clone(),
                    }),
                ),
                name: param.name.clone(),
                type_annotation: self.rename_type(&param.type_annotation),
            })
            .collect();
        let return_type = constructor
            .return_type
            .as_ref()
            .map(|return_type| self.rename_type(return_type));

        self.environment.pop_scope(ScopeTag::Constructor);

        Constructor {
            meta: Meta::new(constructor.meta.range, Name::Constructor(constructor_name)),
            name: constructor.name.clone(),
            params,
            return_type,
        }
    }

    fn rename_top_level_let(&mut self, let_: &Let<()>) -> Let<Name> {
        let let_name = LetName(QualifiedName::new(self.current_namespace(), &let_.name));

        self.environment
            .push_scope(Scope::new(ScopeKind::Let(let_name.clone())));
        let type_annotation = let_
            .type_annotation
            .as_ref()
            .map(|type_annotation| self.rename_type(type_annotation));
        let expr = self.rename_expr(&let_.expr);
        self.environment.pop_scope(ScopeTag::Let);

        Let {
            meta: Meta::new(let_.meta.range, Name::Let(let_name)),
            name: let_.name.clone(),
            type_annotation,
            expr,
        }
    }

    /// A `let` inside a block. The binding is visible in its own body.
    fn rename_local_let(&mut self, let_: &Let<()>) -> Let<Name> {
        let meta = self.bind_local(ScopeTag::Block, &let_.name, let_.meta.range);
        Let {
            meta,
            name: let_.name.clone(),
            type_annotation: let_
                .type_annotation
                .as_ref()
                .map(|type_annotation| self.rename_type(type_annotation)),
            expr: self.rename_expr(&let_.expr),
        }
    }

    fn rename_let_fn(&mut self, let_fn: &LetFn<()>) -> LetFn<Name> {
        let let_name = LetName(QualifiedName::new(self.current_namespace(), &let_fn.name));

        let mut scope = Scope::new(ScopeKind::Let(let_name.clone()));
        for param in &let_fn.type_params {
            self.reporter.define_type(
                &mut scope,
                &param.name,
                Meta::new(param.meta.range, param.binder_name()),
            );
        }
        self.environment.push_scope(scope);
        self.environment.push_scope(Scope::new(ScopeKind::Lambda));

        let type_params = let_fn
            .type_params
            .iter()
            .map(|param| self.rename_type_var(param))
            .collect();
        let value_params = let_fn
            .value_params
            .iter()
            .map(|param| self.rename_param(param))
            .collect();
        let return_type = let_fn
            .return_type
            .as_ref()
            .map(|return_type| self.rename_type(return_type));
        let expr = self.rename_expr(&let_fn.expr);

        self.environment.pop_scope(ScopeTag::Lambda);
        self.environment.pop_scope(ScopeTag::Let);

        LetFn {
            meta: Meta::new(let_fn.meta.range, Name::Let(let_name)),
            name: let_fn.name.clone(),
            type_params,
            value_params,
            return_type,
            expr,
        }
    }

    fn rename_param(&mut self, param: &Param<()>) -> Param<Name> {
        let meta = self.bind_local(ScopeTag::Lambda, &param.name, param.meta.range);
        Param {
            meta,
            name: param.name.clone(),
            type_annotation: param
                .type_annotation
                .as_ref()
                .map(|type_annotation| self.rename_type(type_annotation)),
        }
    }

    /// Type variables refer to their binder.
    fn rename_type_var(&mut self, var: &TypeVarNode<()>) -> TypeVarNode<Name> {
        let range = var.meta.range;
        let meta = match self
            .environment
            .lookup_type_or_else(&var.name, |key| self.reporter.undefined_type(range, key))
        {
            Some(found) => found.with_range(range),
            None => Meta::new(range, Name::Nameless),
        };
        TypeVarNode {
            meta,
            quantifier: var.quantifier,
            name: var.name.clone(),
        }
    }

    fn rename_type(&mut self, ty: &TypeNode<()>) -> TypeNode<Name> {
        match ty {
            TypeNode::Quantified { meta, args, body } => {
                let mut scope = Scope::new(ScopeKind::QuantifiedType);
                for arg in args {
                    self.reporter.define_type(
                        &mut scope,
                        &arg.name,
                        Meta::new(arg.meta.range, arg.binder_name()),
                    );
                }
                self.environment.push_scope(scope);
                let args = args.iter().map(|arg| self.rename_type_var(arg)).collect();
                let body = Box::new(self.rename_type(body));
                self.environment.pop_scope(ScopeTag::QuantifiedType);

                TypeNode::Quantified {
                    meta: nameless(meta),
                    args,
                    body,
                }
            }
            TypeNode::Fun { meta, args, ret } => TypeNode::Fun {
                meta: nameless(meta),
                args: args.iter().map(|arg| self.rename_type(arg)).collect(),
                ret: Box::new(self.rename_type(ret)),
            },
            TypeNode::Apply { meta, head, args } => TypeNode::Apply {
                meta: nameless(meta),
                head: Box::new(self.rename_type(head)),
                args: args.iter().map(|arg| self.rename_type(arg)).collect(),
            },
            TypeNode::Reference { meta, id } => TypeNode::Reference {
                meta: self.resolve_type(meta.range, id),
                id: id.clone(),
            },
            TypeNode::Var(var) => TypeNode::Var(self.rename_type_var(var)),
        }
    }

    fn rename_reference(&mut self, reference: &Reference<()>) -> Reference<Name> {
        Reference {
            meta: self.resolve_value(reference.meta.range, &reference.id),
            id: reference.id.clone(),
        }
    }

    pub fn rename_expr(&mut self, expr: &Expr<()>) -> Expr<Name> {
        match expr {
            Expr::Block { meta, lets, result } => {
                self.environment.push_scope(Scope::new(ScopeKind::Block));
                let lets = lets.iter().map(|let_| self.rename_local_let(let_)).collect();
                let result = result
                    .as_ref()
                    .map(|result| Box::new(self.rename_expr(result)));
                self.environment.pop_scope(ScopeTag::Block);

                Expr::Block {
                    meta: nameless(meta),
                    lets,
                    result,
                }
            }
            Expr::If {
                meta,
                condition,
                consequent,
                alternative,
            } => Expr::If {
                meta: nameless(meta),
                condition: Box::new(self.rename_expr(condition)),
                consequent: Box::new(self.rename_expr(consequent)),
                alternative: Box::new(self.rename_expr(alternative)),
            },
            Expr::Lambda { meta, params, body } => {
                self.environment.push_scope(Scope::new(ScopeKind::Lambda));
                let params = params.iter().map(|param| self.rename_param(param)).collect();
                let body = Box::new(self.rename_expr(body));
                self.environment.pop_scope(ScopeTag::Lambda);

                Expr::Lambda {
                    meta: nameless(meta),
                    params,
                    body,
                }
            }
            Expr::Match {
                meta,
                scrutinee,
                cases,
            } => Expr::Match {
                meta: nameless(meta),
                scrutinee: Box::new(self.rename_expr(scrutinee)),
                cases: cases.iter().map(|case| self.rename_case(case)).collect(),
            },
            Expr::Apply {
                meta,
                function,
                args,
            } => Expr::Apply {
                meta: nameless(meta),
                function: Box::new(self.rename_expr(function)),
                args: args.iter().map(|arg| self.rename_expr(arg)).collect(),
            },
            Expr::Select {
                meta,
                receiver,
                selection,
            } => Expr::Select {
                meta: nameless(meta),
                receiver: Box::new(self.rename_expr(receiver)),
                selection: self.rename_reference(selection),
            },
            Expr::Reference(reference) => Expr::Reference(self.rename_reference(reference)),
            Expr::BinaryOp {
                meta,
                operator,
                left,
                right,
            } => Expr::BinaryOp {
                meta: nameless(meta),
                operator: *operator,
                left: Box::new(self.rename_expr(left)),
                right: Box::new(self.rename_expr(right)),
            },
            Expr::UnaryOp {
                meta,
                operator,
                operand,
            } => Expr::UnaryOp {
                meta: nameless(meta),
                operator: *operator,
                operand: Box::new(self.rename_expr(operand)),
            },
            Expr::Literal { meta, value } => Expr::Literal {
                meta: nameless(meta),
                value: value.clone(),
            },
        }
    }

    fn rename_case(&mut self, case: &Case<()>) -> Case<Name> {
        self.environment.push_scope(Scope::new(ScopeKind::Case));
        let pattern = self.rename_pattern(&case.pattern);
        let consequent = self.rename_expr(&case.consequent);
        self.environment.pop_scope(ScopeTag::Case);

        Case {
            meta: nameless(&case.meta),
            pattern,
            consequent,
        }
    }

    fn rename_pattern(&mut self, pattern: &Pattern<()>) -> Pattern<Name> {
        match pattern {
            Pattern::Alias {
                meta,
                alias,
                pattern,
            } => Pattern::Alias {
                meta: self.bind_local(ScopeTag::Case, alias, meta.range),
                alias: alias.clone(),
                pattern: Box::new(self.rename_pattern(pattern)),
            },
            Pattern::Id { meta, name } => Pattern::Id {
                meta: self.bind_local(ScopeTag::Case, name, meta.range),
                name: name.clone(),
            },
            Pattern::Literal { meta, value } => Pattern::Literal {
                meta: nameless(meta),
                value: value.clone(),
            },
            Pattern::Constructor { meta, id, fields } => {
                let range = meta.range;
                let resolved = self
                    .environment
                    .lookup_value_or_else(&id.canonical_name(), |key| {
                        self.reporter.unknown_constructor(range, key)
                    })
                    .map(|found| found.with_range(range));
                let constructor = match resolved.as_ref().map(|found| &found.meta) {
                    Some(Name::Constructor(constructor)) => Some(constructor.clone()),
                    _ => None,
                };

                self.environment
                    .push_scope(Scope::new(ScopeKind::ConstructorPattern(constructor)));
                let fields = fields
                    .iter()
                    .map(|field| self.rename_field_pattern(field))
                    .collect();
                self.environment.pop_scope(ScopeTag::ConstructorPattern);

                let meta = match resolved {
                    Some(found) => {
                        self.record_reference(&found.meta);
                        found
                    }
                    None => Meta::new(range, Name::Nameless),
                };
                Pattern::Constructor {
                    meta,
                    id: id.clone(),
                    fields,
                }
            }
        }
    }

    fn rename_field_pattern(&mut self, field: &FieldPattern<()>) -> FieldPattern<Name> {
        let constructor = self
            .environment
            .enclosing_constructor_pattern()
            .flatten()
            .cloned();
        if let Some(constructor) = &constructor {
            if self
                .environment
                .lookup_field(constructor, &field.field)
                .is_none()
            {
                self.reporter
                    .unknown_field(field.meta.range, constructor, &field.field);
            }
        }

        match &field.pattern {
            None => FieldPattern {
                meta: self.bind_local(ScopeTag::Case, &field.field, field.meta.range),
                field: field.field.clone(),
                pattern: None,
            },
            Some(pattern) => FieldPattern {
                meta: nameless(&field.meta),
                field: field.field.clone(),
                pattern: Some(self.rename_pattern(pattern)),
            },
        }
    }
}

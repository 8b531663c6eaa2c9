//! Kind checking and inference for data declarations and type annotations.

#[cfg(test)]
mod test;

use crate::{
    annotation::{fold_annotation, kind_of},
    environment::TypeEnvironment,
    kind_unification,
    sorts::{map_type_node, map_var},
};
use tarn_diagnostic::{LocalDiagnosticReporter, Range};
use tarn_scope::{ScopeKind, ScopeTag};
use tarn_syntax::{
    kind::UnsolvedKind,
    names::{ConstructorName, DataName},
    r#type::{Attributes, Sort},
    Constructor, ConstructorParam, Data, Kind, Meta, Name, Type, TypeNode, TypeVarNode,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KindError {
    #[error("Mismatched kind! Expected: {}, Actual: {}", .expected.render(), .actual.render())]
    Mismatch {
        range: Range,
        expected: Kind,
        actual: Kind,
    },
    #[error(
        "Mismatched type application! Expected: {}, Actual: {}",
        .expected.render(),
        .actual.render()
    )]
    MismatchedApplication {
        range: Range,
        expected: Kind,
        actual: Kind,
    },
}

impl KindError {
    pub fn mismatch(range: Range, expected: &Kind, actual: &Kind) -> Self {
        KindError::Mismatch {
            range,
            expected: expected.clone(),
            actual: actual.clone(),
        }
    }

    pub fn mismatched_application(range: Range, expected: &Kind, actual: &Kind) -> Self {
        KindError::MismatchedApplication {
            range,
            expected: expected.clone(),
            actual: actual.clone(),
        }
    }

    pub fn range(&self) -> Range {
        match self {
            KindError::Mismatch { range, .. } => *range,
            KindError::MismatchedApplication { range, .. } => *range,
        }
    }
}

fn attributes(name: &Name, kind: Kind) -> Attributes {
    Attributes::new(name.clone(), Sort::Kind(kind))
}

/// Checked field annotations and the explicit return type of one constructor.
struct CheckedConstructor {
    name: ConstructorName,
    fields: Vec<TypeNode<Attributes>>,
    return_type: Option<TypeNode<Attributes>>,
}

/**
Infers the kinds of data declarations and checks the kinds of type annotations.

Kind errors are reported as diagnostics; checking carries on with whatever
kinds it has.
*/
pub struct Kindchecker<'a> {
    reporter: LocalDiagnosticReporter<'a>,
    environment: TypeEnvironment,
}

impl<'a> Kindchecker<'a> {
    pub fn new(reporter: LocalDiagnosticReporter<'a>, environment: TypeEnvironment) -> Self {
        Kindchecker {
            reporter,
            environment,
        }
    }

    pub fn environment(&self) -> &TypeEnvironment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut TypeEnvironment {
        &mut self.environment
    }

    pub fn into_environment(self) -> TypeEnvironment {
        self.environment
    }

    pub(crate) fn report_error(&mut self, range: Range, message: String) {
        self.reporter.report_error(range, message, Vec::new());
    }

    pub(crate) fn report(&mut self, error: KindError) {
        log::debug!("kind error: {}", error);
        self.report_error(error.range(), error.to_string());
    }

    fn substitute_node(&mut self, node: &TypeNode<Attributes>) -> TypeNode<Attributes> {
        let environment = &mut self.environment;
        map_type_node(node, &mut |sort| environment.substitute_sort(sort))
    }

    fn default_node(&mut self, node: &TypeNode<Attributes>) -> TypeNode<Attributes> {
        let environment = &mut self.environment;
        map_type_node(node, &mut |sort| environment.default_sort(sort))
    }

    /// Read a checked annotation as a type. Unresolved references become fresh unsolved types.
    pub fn to_type(&mut self, node: &TypeNode<Attributes>) -> Type {
        let environment = &mut self.environment;
        fold_annotation(node, &mut |kind| environment.new_unsolved_type(kind))
    }

    fn bind_type_var(&mut self, var: &TypeVarNode<Name>, kind: Kind) -> TypeVarNode<Attributes> {
        let meta = Meta::new(var.meta.range, attributes(&var.meta.meta, kind));
        self.environment.put_type(&var.name, meta.clone());
        TypeVarNode {
            meta,
            quantifier: var.quantifier,
            name: var.name.clone(),
        }
    }

    /// The kind a resolved name was given, or a fresh kind when it hasn't been given one yet.
    fn kind_of_name(&mut self, name: &Name) -> Kind {
        if name.is_nameless() {
            return self.environment.new_unsolved_kind();
        }

        let key = name.canonical_name();
        match self
            .environment
            .lookup_type(&key)
            .map(|meta| meta.meta.sort.clone())
        {
            Some(Sort::Kind(kind)) => self.environment.substitute_kind(&kind),
            _ => {
                let kind = self.environment.new_unsolved_kind();
                self.environment
                    .put_type_if_absent(&key, Meta::empty(attributes(name, kind.clone())));
                kind
            }
        }
    }

    /// Bind a type parameter to a fresh kind in the innermost scope.
    pub fn infer_type_var(&mut self, var: &TypeVarNode<Name>) -> TypeVarNode<Attributes> {
        let kind = self.environment.new_unsolved_kind();
        self.bind_type_var(var, kind)
    }

    pub fn check_sub_kind(&mut self, sub: &Kind, sup: &Kind) -> bool {
        kind_unification::check_sub_kind(&mut self.environment, sub, sup)
    }

    pub fn instantiate_as_sub_kind(&mut self, unsolved: UnsolvedKind, kind: &Kind) -> bool {
        kind_unification::instantiate_as_sub_kind(&mut self.environment, unsolved, kind)
    }

    pub fn instantiate_as_super_kind(&mut self, unsolved: UnsolvedKind, kind: &Kind) -> bool {
        kind_unification::instantiate_as_super_kind(&mut self.environment, unsolved, kind)
    }

    /**
    Infer the kind of a type annotation.

    The result's root carries the inferred kind. Kinds may still be unsolved;
    see [`Kindchecker::kindcheck_type`] for a fully solved result.
    */
    pub fn infer_type(&mut self, ty: &TypeNode<Name>) -> TypeNode<Attributes> {
        match ty {
            TypeNode::Quantified { meta, args, body } => {
                self.environment.push_scope(ScopeKind::QuantifiedType);
                let args = args
                    .iter()
                    .map(|arg| {
                        let kind = self.environment.new_unsolved_kind();
                        self.bind_type_var(arg, kind)
                    })
                    .collect();
                let body = self.check_type(body, &Kind::Type);
                let node = self.substitute_node(&TypeNode::Quantified {
                    meta: Meta::new(meta.range, attributes(&meta.meta, Kind::Type)),
                    args,
                    body: Box::new(body),
                });
                self.environment.pop_scope(ScopeTag::QuantifiedType);
                node
            }
            TypeNode::Fun { meta, args, ret } => {
                let args = args
                    .iter()
                    .map(|arg| self.check_type(arg, &Kind::Type))
                    .collect();
                let ret = self.check_type(ret, &Kind::Type);
                TypeNode::Fun {
                    meta: Meta::new(meta.range, attributes(&meta.meta, Kind::Type)),
                    args,
                    ret: Box::new(ret),
                }
            }
            TypeNode::Apply { meta, head, args } => {
                let head = self.infer_type(head);
                let head_kind = self.environment.substitute_kind(&kind_of(head.meta()));

                let (arg_kinds, result_kind) = match head_kind.unwrap_higher() {
                    Some(higher) if higher.args.len() == args.len() => {
                        (higher.args.clone(), higher.result.clone())
                    }
                    _ => {
                        let arg_kinds: Vec<Kind> = args
                            .iter()
                            .map(|_| self.environment.new_unsolved_kind())
                            .collect();
                        let result_kind = self.environment.new_unsolved_kind();
                        let expected = Kind::mk_higher(arg_kinds.clone(), result_kind.clone());
                        match head_kind {
                            Kind::Unsolved(unsolved) if !expected.occurs(unsolved) => {
                                self.instantiate_as_sub_kind(unsolved, &expected);
                            }
                            _ => self.report(KindError::mismatched_application(
                                meta.range, &expected, &head_kind,
                            )),
                        }
                        (arg_kinds, result_kind)
                    }
                };

                let args = args
                    .iter()
                    .zip(arg_kinds.iter())
                    .map(|(arg, kind)| self.check_type(arg, kind))
                    .collect();
                TypeNode::Apply {
                    meta: Meta::new(meta.range, attributes(&meta.meta, result_kind)),
                    head: Box::new(head),
                    args,
                }
            }
            TypeNode::Reference { meta, id } => {
                let kind = self.kind_of_name(&meta.meta);
                TypeNode::Reference {
                    meta: Meta::new(meta.range, attributes(&meta.meta, kind)),
                    id: id.clone(),
                }
            }
            TypeNode::Var(var) => {
                let kind = self.kind_of_name(&var.meta.meta);
                TypeNode::Var(TypeVarNode {
                    meta: Meta::new(var.meta.range, attributes(&var.meta.meta, kind)),
                    quantifier: var.quantifier,
                    name: var.name.clone(),
                })
            }
        }
    }

    /// Check a type annotation against an expected kind, reporting a mismatch.
    pub fn check_type(&mut self, ty: &TypeNode<Name>, expected: &Kind) -> TypeNode<Attributes> {
        let expected = self.environment.substitute_kind(expected);
        match (ty, expected.unwrap_higher()) {
            (TypeNode::Quantified { meta, args, body }, Some(higher))
                if higher.args.len() == args.len() =>
            {
                self.environment.push_scope(ScopeKind::QuantifiedType);
                let args = args
                    .iter()
                    .zip(higher.args.iter())
                    .map(|(arg, kind)| self.bind_type_var(arg, kind.clone()))
                    .collect();
                let body = self.check_type(body, &higher.result);
                let node = self.substitute_node(&TypeNode::Quantified {
                    meta: Meta::new(meta.range, attributes(&meta.meta, expected.clone())),
                    args,
                    body: Box::new(body),
                });
                self.environment.pop_scope(ScopeTag::QuantifiedType);
                node
            }
            _ => {
                let node = self.infer_type(ty);
                let actual = kind_of(node.meta());
                if !self.check_sub_kind(&actual, &expected) {
                    let expected = self.environment.substitute_kind(&expected);
                    let actual = self.environment.substitute_kind(&actual);
                    self.report(KindError::mismatch(ty.meta().range, &expected, &actual));
                }
                node
            }
        }
    }

    /// Check that an annotation is a type of kind `*`, defaulting any kinds left unsolved.
    pub fn kindcheck_type(&mut self, ty: &TypeNode<Name>) -> TypeNode<Attributes> {
        let node = self.check_type(ty, &Kind::Type);
        self.default_node(&node)
    }

    fn check_constructor(&mut self, constructor: &Constructor<Name>) -> CheckedConstructor {
        let name = match &constructor.meta.meta {
            Name::Constructor(name) => name.clone(),
            other => panic!("{:?} is not a constructor", other),
        };

        self.environment
            .push_scope(ScopeKind::Constructor(name.clone()));
        let fields: Vec<TypeNode<Attributes>> = constructor
            .params
            .iter()
            .map(|param| {
                let node = self.check_type(&param.type_annotation, &Kind::Type);
                self.substitute_node(&node)
            })
            .collect();
        let return_type = constructor.return_type.as_ref().map(|return_type| {
            let node = self.check_type(return_type, &Kind::Type);
            self.substitute_node(&node)
        });
        self.environment.pop_scope(ScopeTag::Constructor);

        CheckedConstructor {
            name,
            fields,
            return_type,
        }
    }

    fn bind_data(&mut self, local_name: &str, name: &DataName, meta: Meta<Attributes>) {
        self.environment.put_type(local_name, meta.clone());
        self.environment.put_type(&name.0.canonical_name(), meta);
    }

    /**
    Infer the kind of a data declaration, and the type of each of its constructors.

    A declaration without parameters has kind `*`. Otherwise its kind is
    `(k1, ..., kn) -> *`, where each `ki` is inferred from how the parameter is
    used; parameters that aren't constrained default to `*`.

    Each constructor gets the type `[params] { (fields) -> Data[params] }`, or
    its explicit return type in place of `Data[params]`.

    The declaration, its constructors and their fields are bound in the
    innermost scope.

    # Panics

    When no scope has been pushed, or when `data` hasn't been renamed.
    */
    pub fn infer_data(&mut self, data: &Data<Name>) -> Data<Attributes> {
        let data_name = match &data.meta.meta {
            Name::Data(name) => name.clone(),
            other => panic!("{:?} is not a data declaration", other),
        };

        self.environment
            .push_scope(ScopeKind::Data(data_name.clone()));
        let type_params: Vec<TypeVarNode<Attributes>> = data
            .type_params
            .iter()
            .map(|param| {
                let kind = self.environment.new_unsolved_kind();
                self.bind_type_var(param, kind)
            })
            .collect();
        let data_kind = if type_params.is_empty() {
            Kind::Type
        } else {
            Kind::mk_higher(
                type_params.iter().map(|param| kind_of(&param.meta)).collect(),
                Kind::Type,
            )
        };
        self.bind_data(
            &data.name,
            &data_name,
            Meta::new(data.meta.range, attributes(&data.meta.meta, data_kind.clone())),
        );

        let checked: Vec<CheckedConstructor> = data
            .constructors
            .iter()
            .map(|constructor| self.check_constructor(constructor))
            .collect();

        let type_params: Vec<TypeVarNode<Attributes>> = type_params
            .iter()
            .map(|param| {
                let environment = &mut self.environment;
                map_var(param, &mut |sort| environment.default_sort(sort))
            })
            .collect();
        let data_kind = self.environment.default_kind(&data_kind);
        let checked: Vec<CheckedConstructor> = checked
            .into_iter()
            .map(|constructor| CheckedConstructor {
                name: constructor.name,
                fields: constructor
                    .fields
                    .iter()
                    .map(|field| self.default_node(field))
                    .collect(),
                return_type: constructor
                    .return_type
                    .as_ref()
                    .map(|return_type| self.default_node(return_type)),
            })
            .collect();
        self.environment.pop_scope(ScopeTag::Data);

        log::debug!(
            "{} : {}",
            data_name.0.canonical_name(),
            data_kind.render()
        );
        let data_meta = Meta::new(data.meta.range, attributes(&data.meta.meta, data_kind.clone()));
        self.bind_data(&data.name, &data_name, data_meta.clone());

        let param_types: Vec<Type> = type_params
            .iter()
            .map(|param| self.to_type(&TypeNode::Var(param.clone())))
            .collect();
        let data_type = Type::Constructor(data_name.0.clone(), data_kind.clone());
        let applied = if param_types.is_empty() {
            data_type
        } else {
            Type::mk_apply(data_type, param_types.clone(), Kind::Type)
        };

        let constructors = data
            .constructors
            .iter()
            .zip(checked)
            .map(|(constructor, checked)| {
                let field_types: Vec<Type> = checked
                    .fields
                    .iter()
                    .map(|field| self.to_type(field))
                    .collect();
                let return_type = match &checked.return_type {
                    Some(return_type) => self.to_type(return_type),
                    None => applied.clone(),
                };
                let body = if field_types.is_empty() {
                    return_type
                } else {
                    Type::mk_function(field_types.clone(), return_type)
                };
                let ty = if param_types.is_empty() {
                    body
                } else {
                    Type::mk_quantified(param_types.clone(), body, Kind::Type)
                };
                log::trace!(
                    "{} : {}",
                    checked.name.name.canonical_name(),
                    ty.render()
                );

                let constructor_meta = Meta::new(
                    constructor.meta.range,
                    Attributes::new(constructor.meta.meta.clone(), Sort::Type(ty)),
                );
                self.environment
                    .put_value(&constructor.name, constructor_meta.clone());
                self.environment
                    .put_value(&checked.name.name.canonical_name(), constructor_meta.clone());
                let pseudo_type = Meta::new(
                    constructor.meta.range,
                    attributes(&constructor.meta.meta, data_kind.clone()),
                );
                self.environment
                    .put_type(&constructor.name, pseudo_type.clone());
                self.environment
                    .put_type(&checked.name.name.canonical_name(), pseudo_type);

                let params = constructor
                    .params
                    .iter()
                    .zip(checked.fields.into_iter().zip(field_types))
                    .map(|(param, (type_annotation, field_type))| {
                        let meta = Meta::new(
                            param.meta.range,
                            Attributes::new(param.meta.meta.clone(), Sort::Type(field_type)),
                        );
                        self.environment
                            .put_field(&checked.name, &param.name, meta.clone());
                        ConstructorParam {
                            meta,
                            name: param.name.clone(),
                            type_annotation,
                        }
                    })
                    .collect();

                Constructor {
                    meta: constructor_meta,
                    name: constructor.name.clone(),
                    params,
                    return_type: checked.return_type,
                }
            })
            .collect();

        Data {
            meta: data_meta,
            name: data.name.clone(),
            type_params,
            constructors,
        }
    }
}

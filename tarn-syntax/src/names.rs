use std::{fmt::Display, sync::Arc};

/**
A namespace, e.g. `Mina/Test/Renamer`.

The package segments come first and the final segment is the namespace's own
name.
*/
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct NamespaceName {
    pub pkg: Vec<Arc<str>>,
    pub name: Arc<str>,
}

impl NamespaceName {
    pub fn new(pkg: &[&str], name: &str) -> Self {
        NamespaceName {
            pkg: pkg.iter().map(|segment| Arc::from(*segment)).collect(),
            name: Arc::from(name),
        }
    }

    pub fn local_name(&self) -> &str {
        &self.name
    }

    pub fn canonical_name(&self) -> String {
        let mut str = String::new();
        for segment in &self.pkg {
            str.push_str(segment);
            str.push('/');
        }
        str.push_str(&self.name);
        str
    }
}

/// A name declared at the top level of a namespace.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct QualifiedName {
    pub ns: NamespaceName,
    pub name: Arc<str>,
}

impl QualifiedName {
    pub fn new(ns: NamespaceName, name: &str) -> Self {
        QualifiedName {
            ns,
            name: Arc::from(name),
        }
    }

    pub fn local_name(&self) -> &str {
        &self.name
    }

    pub fn canonical_name(&self) -> String {
        format!("{}.{}", self.ns.canonical_name(), self.name)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct LetName(pub QualifiedName);

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct DataName(pub QualifiedName);

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct ConstructorName {
    pub data: DataName,
    pub name: QualifiedName,
}

impl ConstructorName {
    pub fn new(data: DataName, name: &str) -> Self {
        let ns = data.0.ns.clone();
        ConstructorName {
            data,
            name: QualifiedName::new(ns, name),
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct FieldName {
    pub constructor: ConstructorName,
    pub name: Arc<str>,
}

/// A local binder. `index` tells apart binders that share a name.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct LocalName {
    pub name: Arc<str>,
    pub index: usize,
}

impl LocalName {
    pub fn new(name: &str, index: usize) -> Self {
        LocalName {
            name: Arc::from(name),
            index,
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct SyntheticName {
    pub index: usize,
}

/// A name that can be a node in the declaration graph.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum DeclarationName {
    Let(LetName),
    Data(DataName),
    Constructor(ConstructorName),
}

impl DeclarationName {
    pub fn qualified_name(&self) -> &QualifiedName {
        match self {
            DeclarationName::Let(name) => &name.0,
            DeclarationName::Data(name) => &name.0,
            DeclarationName::Constructor(name) => &name.name,
        }
    }

    pub fn to_name(&self) -> Name {
        match self {
            DeclarationName::Let(name) => Name::Let(name.clone()),
            DeclarationName::Data(name) => Name::Data(name.clone()),
            DeclarationName::Constructor(name) => Name::Constructor(name.clone()),
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum Name {
    Nameless,
    BuiltIn(Arc<str>),
    Namespace(NamespaceName),
    Let(LetName),
    Data(DataName),
    Constructor(ConstructorName),
    Field(FieldName),
    Local(LocalName),
    Synthetic(SyntheticName),
    ForAllVar(Arc<str>),
    ExistsVar(Arc<str>),
}

impl Name {
    /// What the author wrote.
    pub fn local_name(&self) -> String {
        match self {
            Name::Nameless => String::new(),
            Name::BuiltIn(name) => String::from(name.as_ref()),
            Name::Namespace(name) => String::from(name.local_name()),
            Name::Let(name) => String::from(name.0.local_name()),
            Name::Data(name) => String::from(name.0.local_name()),
            Name::Constructor(name) => String::from(name.name.local_name()),
            Name::Field(name) => String::from(name.name.as_ref()),
            Name::Local(name) => String::from(name.name.as_ref()),
            Name::Synthetic(name) => format!("${}", name.index),
            Name::ForAllVar(name) => String::from(name.as_ref()),
            Name::ExistsVar(name) => String::from(name.as_ref()),
        }
    }

    /// Unique across the whole program for declaration names.
    pub fn canonical_name(&self) -> String {
        match self {
            Name::Namespace(name) => name.canonical_name(),
            Name::Let(name) => name.0.canonical_name(),
            Name::Data(name) => name.0.canonical_name(),
            Name::Constructor(name) => name.name.canonical_name(),
            _ => self.local_name(),
        }
    }

    pub fn declaration_name(&self) -> Option<DeclarationName> {
        match self {
            Name::Let(name) => Some(DeclarationName::Let(name.clone())),
            Name::Data(name) => Some(DeclarationName::Data(name.clone())),
            Name::Constructor(name) => Some(DeclarationName::Constructor(name.clone())),
            _ => None,
        }
    }

    pub fn is_nameless(&self) -> bool {
        matches!(self, Name::Nameless)
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

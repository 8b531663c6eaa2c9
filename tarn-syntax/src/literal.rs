use crate::r#type::BuiltInType;
use quickcheck::Arbitrary;
use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

/**
A literal value.

Floating point literals are compared and hashed by their bit patterns, so
`NaN == NaN` and `0.0 != -0.0`.
*/
#[derive(Debug, Clone)]
pub enum Literal {
    Boolean(bool),
    Char(char),
    String(Arc<str>),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::Boolean(a), Literal::Boolean(b)) => a == b,
            (Literal::Char(a), Literal::Char(b)) => a == b,
            (Literal::String(a), Literal::String(b)) => a == b,
            (Literal::Int(a), Literal::Int(b)) => a == b,
            (Literal::Long(a), Literal::Long(b)) => a == b,
            (Literal::Float(a), Literal::Float(b)) => a.to_bits() == b.to_bits(),
            (Literal::Double(a), Literal::Double(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Literal::Boolean(value) => value.hash(state),
            Literal::Char(value) => value.hash(state),
            Literal::String(value) => value.hash(state),
            Literal::Int(value) => value.hash(state),
            Literal::Long(value) => value.hash(state),
            Literal::Float(value) => value.to_bits().hash(state),
            Literal::Double(value) => value.to_bits().hash(state),
        }
    }
}

impl Literal {
    pub fn builtin_type(&self) -> BuiltInType {
        match self {
            Literal::Boolean(_) => BuiltInType::Boolean,
            Literal::Char(_) => BuiltInType::Char,
            Literal::String(_) => BuiltInType::String,
            Literal::Int(_) => BuiltInType::Int,
            Literal::Long(_) => BuiltInType::Long,
            Literal::Float(_) => BuiltInType::Float,
            Literal::Double(_) => BuiltInType::Double,
        }
    }

    pub fn unwrap_boolean(&self) -> Option<bool> {
        match self {
            Literal::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Literal::Boolean(value) => value.to_string(),
            Literal::Char(value) => format!("{:?}", value),
            Literal::String(value) => format!("{:?}", value),
            Literal::Int(value) => value.to_string(),
            Literal::Long(value) => format!("{}L", value),
            Literal::Float(value) => format!("{}F", value),
            Literal::Double(value) => value.to_string(),
        }
    }
}

impl Arbitrary for Literal {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        match u8::arbitrary(g) % 7 {
            0 => Literal::Boolean(bool::arbitrary(g)),
            1 => Literal::Char(char::arbitrary(g)),
            2 => Literal::String(Arc::from(String::arbitrary(g))),
            3 => Literal::Int(i32::arbitrary(g)),
            4 => Literal::Long(i64::arbitrary(g)),
            5 => Literal::Float(f32::arbitrary(g)),
            _ => Literal::Double(f64::arbitrary(g)),
        }
    }
}

use crate::ir::{BinOp, Expr, TypeRef};

/// How a setter decides the incoming value is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualityStrategy {
    /// `stored == value`
    Operator,
    /// `object.Equals(stored, value)`
    ObjectEquals,
}

const PRIMITIVES: &[(&str, &str)] = &[
    ("bool", "System.Boolean"),
    ("char", "System.Char"),
    ("sbyte", "System.SByte"),
    ("byte", "System.Byte"),
    ("short", "System.Int16"),
    ("ushort", "System.UInt16"),
    ("int", "System.Int32"),
    ("uint", "System.UInt32"),
    ("long", "System.Int64"),
    ("ulong", "System.UInt64"),
    ("float", "System.Single"),
    ("double", "System.Double"),
];

impl EqualityStrategy {
    pub fn for_type(ty: &TypeRef) -> Self {
        let primitive = !ty.nullable
            && PRIMITIVES
                .iter()
                .any(|(keyword, system)| ty.name == *keyword || ty.name == *system);
        if primitive { EqualityStrategy::Operator } else { EqualityStrategy::ObjectEquals }
    }

    pub fn compare(self, stored: Expr, incoming: Expr) -> Expr {
        match self {
            EqualityStrategy::Operator => Expr::binary(BinOp::Eq, stored, incoming),
            EqualityStrategy::ObjectEquals => Expr::call(
                Expr::member(Expr::ident("object"), "Equals"),
                vec![stored, incoming],
            ),
        }
    }
}

// Program representation handed over by the host. Already bound: `base` and
// `interfaces` hold fully-qualified type names, nothing here needs resolving
// beyond name lookups.

use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub units: Vec<CompilationUnit>,
    /// Metadata-only types from referenced libraries. Used for resolution,
    /// never rewritten.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<TypeDecl>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Interface,
}

/// 1-based line/column of a declaration in its unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<TypeDecl>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum Member {
    Property(PropertyDecl),
    Field(FieldDecl),
    Method(MethodDecl),
    Event(EventDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
    pub body: PropertyBody,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PropertyBody {
    /// `{ get; set; }`: storage is synthesized by the compiler.
    Auto {
        #[serde(default)]
        getter: AutoAccessor,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        setter: Option<AutoAccessor>,
    },
    /// `=> expr`
    Expression { expr: Expr },
    Accessors {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        getter: Option<Accessor>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        setter: Option<Accessor>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoAccessor {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessor {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Block(Vec<Stmt>),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeRef>,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDecl {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub span: Span,
}

/// A type as written, e.g. `int`, `System.String`, `List<int>?`.
/// Serialized as its source spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypeRef {
    pub name: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    Expr { expr: Expr },
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Expr>,
    },
    If {
        cond: Expr,
        then: Vec<Stmt>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        otherwise: Vec<Stmt>,
    },
    Assign { target: Expr, value: Expr },
    /// `var name = init;`
    Local { name: String, init: Expr },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    Ident { name: String },
    This,
    Literal { value: Literal },
    Member { target: Box<Expr>, name: String },
    Call {
        callee: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Not { operand: Box<Expr> },
    Conditional { cond: Box<Expr>, then: Box<Expr>, otherwise: Box<Expr> },
    /// `$"..."`; string literal parts are text, everything else is a hole.
    Interpolated { parts: Vec<Expr> },
    Lambda { params: Vec<String>, body: Box<Body> },
    Assign { target: Box<Expr>, value: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Coalesce,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

pub fn has_modifier(modifiers: &[String], modifier: &str) -> bool {
    modifiers.iter().any(|m| m == modifier)
}

impl TypeDecl {
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Property(p) => Some(p),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(m) => Some(m),
            _ => None,
        })
    }

    pub fn is_rewritable(&self) -> bool {
        matches!(self.kind, TypeKind::Class | TypeKind::Struct)
    }
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Property(p) => &p.name,
            Member::Field(f) => &f.name,
            Member::Method(m) => &m.name,
            Member::Event(e) => &e.name,
        }
    }

    pub fn modifiers(&self) -> &[String] {
        match self {
            Member::Property(p) => &p.modifiers,
            Member::Field(f) => &f.modifiers,
            Member::Method(m) => &m.modifiers,
            Member::Event(e) => &e.modifiers,
        }
    }

    /// Members without an access modifier are private.
    pub fn is_private(&self) -> bool {
        !["public", "protected", "internal"]
            .iter()
            .any(|access| has_modifier(self.modifiers(), access))
    }
}

impl PropertyDecl {
    /// Auto-property with a setter whose storage the compiler would synthesize.
    pub fn is_simple(&self) -> bool {
        let opaque = ["static", "abstract", "extern"]
            .iter()
            .any(|m| has_modifier(&self.modifiers, m));
        !opaque && matches!(self.body, PropertyBody::Auto { setter: Some(_), .. })
    }

    /// Read-only property with a programmer-supplied getter.
    pub fn is_computed(&self) -> bool {
        match &self.body {
            PropertyBody::Expression { .. } => true,
            PropertyBody::Accessors { getter: Some(_), setter: None } => true,
            _ => false,
        }
    }

    /// The getter's code, if the programmer wrote one.
    pub fn getter_body(&self) -> Option<Body> {
        match &self.body {
            PropertyBody::Expression { expr } => Some(Body::Expr(expr.clone())),
            PropertyBody::Accessors { getter: Some(getter), .. } => Some(getter.body.clone()),
            _ => None,
        }
    }
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        TypeRef::from(name.into())
    }
}

impl From<String> for TypeRef {
    fn from(mut spelling: String) -> Self {
        let nullable = spelling.ends_with('?');
        if nullable {
            spelling.pop();
        }
        TypeRef { name: spelling.trim().to_string(), nullable }
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        ty.to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, if self.nullable { "?" } else { "" })
    }
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident { name: name.into() }
    }

    pub fn str(text: impl Into<String>) -> Self {
        Expr::Literal { value: Literal::Str(text.into()) }
    }

    pub fn member(target: Expr, name: impl Into<String>) -> Self {
        Expr::Member { target: Box::new(target), name: name.into() }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call { callee: Box::new(callee), args }
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }
}

//! C#-flavoured source printer for the program representation. Output is
//! for inspection; it round-trips nothing.
use std::fmt::Write as _;

use crate::ir::{
    Accessor, BinOp, Body, CompilationUnit, Expr, Literal, Member, PropertyBody, Stmt, TypeDecl, TypeKind,
};

const INDENT: &str = "    ";

#[derive(Debug, Default)]
pub struct Codegen {
    out: String,
    depth: usize,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, header: &str) {
        self.line(header);
        self.line("{");
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    pub fn emit_unit(&mut self, unit: &CompilationUnit) {
        self.line(&format!("// {}", unit.path));
        if let Some(ns) = &unit.namespace {
            self.open(&format!("namespace {ns}"));
        }
        for (i, decl) in unit.types.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            self.emit_type(decl);
        }
        if unit.namespace.is_some() {
            self.close();
        }
    }

    pub fn emit_type(&mut self, decl: &TypeDecl) {
        let keyword = match decl.kind {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
        };
        let supertypes: Vec<&str> = decl.base.iter().chain(&decl.interfaces).map(String::as_str).collect();
        let mut header = prefixed(&decl.modifiers, &format!("{keyword} {}", decl.name));
        if !supertypes.is_empty() {
            let _ = write!(header, " : {}", supertypes.join(", "));
        }
        self.open(&header);
        for member in &decl.members {
            self.emit_member(member);
        }
        for nested in &decl.nested {
            self.emit_type(nested);
        }
        self.close();
    }

    fn emit_member(&mut self, member: &Member) {
        match member {
            Member::Field(f) => self.line(&prefixed(&f.modifiers, &format!("{} {};", f.ty, f.name))),
            Member::Event(e) => self.line(&prefixed(&e.modifiers, &format!("event {} {};", e.ty, e.name))),
            Member::Method(m) => {
                let params = m.params.iter().map(|p| format!("{} {}", p.ty, p.name)).collect::<Vec<_>>();
                let returns = m.returns.as_ref().map_or_else(|| "void".to_string(), ToString::to_string);
                let signature = prefixed(&m.modifiers, &format!("{returns} {}({})", m.name, params.join(", ")));
                match &m.body {
                    None => self.line(&format!("{signature};")),
                    Some(Body::Expr(expr)) => self.line(&format!("{signature} => {};", expr_src(expr))),
                    Some(Body::Block(stmts)) => {
                        self.open(&signature);
                        self.block(stmts);
                        self.close();
                    }
                }
            }
            Member::Property(p) => {
                let head = prefixed(&p.modifiers, &format!("{} {}", p.ty, p.name));
                match &p.body {
                    PropertyBody::Auto { getter, setter } => {
                        let mut accessors = prefixed(&getter.modifiers, "get;");
                        if let Some(setter) = setter {
                            accessors.push(' ');
                            accessors.push_str(&prefixed(&setter.modifiers, "set;"));
                        }
                        self.line(&format!("{head} {{ {accessors} }}"));
                    }
                    PropertyBody::Expression { expr } => self.line(&format!("{head} => {};", expr_src(expr))),
                    PropertyBody::Accessors { getter, setter } => {
                        self.open(&head);
                        if let Some(getter) = getter {
                            self.accessor("get", getter);
                        }
                        if let Some(setter) = setter {
                            self.accessor("set", setter);
                        }
                        self.close();
                    }
                }
            }
        }
    }

    fn accessor(&mut self, keyword: &str, accessor: &Accessor) {
        let head = prefixed(&accessor.modifiers, keyword);
        match &accessor.body {
            Body::Expr(expr) => self.line(&format!("{head} => {};", expr_src(expr))),
            Body::Block(stmts) => {
                self.open(&head);
                self.block(stmts);
                self.close();
            }
        }
    }

    fn block(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr { expr } => self.line(&format!("{};", expr_src(expr))),
            Stmt::Return { value: None } => self.line("return;"),
            Stmt::Return { value: Some(v) } => self.line(&format!("return {};", expr_src(v))),
            Stmt::Assign { target, value } => self.line(&format!("{} = {};", expr_src(target), expr_src(value))),
            Stmt::Local { name, init } => self.line(&format!("var {name} = {};", expr_src(init))),
            // single-statement `if (...) return;` stays on one line
            Stmt::If { cond, then, otherwise } if otherwise.is_empty() && matches!(then.as_slice(), [Stmt::Return { value: None }]) => {
                self.line(&format!("if ({}) return;", expr_src(cond)))
            }
            Stmt::If { cond, then, otherwise } => {
                self.open(&format!("if ({})", expr_src(cond)));
                self.block(then);
                self.close();
                if !otherwise.is_empty() {
                    self.open("else");
                    self.block(otherwise);
                    self.close();
                }
            }
        }
    }
}

fn prefixed(modifiers: &[String], rest: &str) -> String {
    if modifiers.is_empty() {
        rest.to_string()
    } else {
        format!("{} {rest}", modifiers.join(" "))
    }
}

fn op_src(op: BinOp) -> &'static str {
    match op {
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::And => "&&",
        BinOp::Or => "||",
        BinOp::Coalesce => "??",
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Compound operands get parenthesised; no precedence table.
fn operand_src(expr: &Expr) -> String {
    match expr {
        Expr::Binary { .. } | Expr::Conditional { .. } | Expr::Assign { .. } | Expr::Lambda { .. } => {
            format!("({})", expr_src(expr))
        }
        _ => expr_src(expr),
    }
}

pub fn expr_src(expr: &Expr) -> String {
    match expr {
        Expr::Ident { name } => name.clone(),
        Expr::This => "this".to_string(),
        Expr::Literal { value } => match value {
            Literal::Null => "null".to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Int(i) => i.to_string(),
            Literal::Float(f) => format!("{f:?}"),
            Literal::Char(c) => format!("'{}'", escape(&c.to_string())),
            Literal::Str(s) => format!("\"{}\"", escape(s)),
        },
        Expr::Member { target, name } => format!("{}.{name}", operand_src(target)),
        Expr::Call { callee, args } => {
            let args = args.iter().map(expr_src).collect::<Vec<_>>();
            format!("{}({})", operand_src(callee), args.join(", "))
        }
        Expr::Binary { op, lhs, rhs } => format!("{} {} {}", operand_src(lhs), op_src(*op), operand_src(rhs)),
        Expr::Not { operand } => format!("!{}", operand_src(operand)),
        Expr::Conditional { cond, then, otherwise } => {
            format!("{} ? {} : {}", operand_src(cond), operand_src(then), operand_src(otherwise))
        }
        Expr::Interpolated { parts } => {
            let mut s = String::from("$\"");
            for part in parts {
                match part {
                    Expr::Literal { value: Literal::Str(text) } => {
                        s.push_str(&escape(text).replace('{', "{{").replace('}', "}}"))
                    }
                    hole => {
                        let _ = write!(s, "{{{}}}", expr_src(hole));
                    }
                }
            }
            s.push('"');
            s
        }
        Expr::Lambda { params, body } => {
            let params = match params.as_slice() {
                [one] => one.clone(),
                many => format!("({})", many.join(", ")),
            };
            match body.as_ref() {
                Body::Expr(expr) => format!("{params} => {}", expr_src(expr)),
                Body::Block(stmts) => {
                    let mut inner = Codegen::new();
                    inner.block(stmts);
                    format!("{params} => {{ {} }}", inner.into_string().lines().map(str::trim).collect::<Vec<_>>().join(" "))
                }
            }
        }
        Expr::Assign { target, value } => format!("{} = {}", expr_src(target), expr_src(value)),
    }
}

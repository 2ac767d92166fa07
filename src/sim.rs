//! Executes property accessors of a single type over an in-memory instance
//! and records every helper invocation.
//!
//! Only the statement and expression forms that show up in rewritten
//! accessors (and in simple hand-written field-backed ones) are understood;
//! anything else is an [`SimError::Unsupported`].
use std::collections::HashMap;
use ordered_float::OrderedFloat;
use thiserror::Error;

use crate::ir::{BinOp, Body, Expr, Literal, Member, PropertyBody, PropertyDecl, Stmt, TypeDecl, TypeRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Char(char),
    Str(String),
    /// Instance of a user type with value equality on `key`.
    Object { class: String, key: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub property: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("no property `{0}`")]
    UnknownProperty(String),
    #[error("property `{0}` has no setter")]
    ReadOnly(String),
    #[error("property `{0}` has no getter")]
    WriteOnly(String),
    #[error("unbound name `{0}`")]
    Unbound(String),
    #[error("unsupported construct: {0}")]
    Unsupported(String),
}

pub struct Instance<'t> {
    decl: &'t TypeDecl,
    helper: String,
    /// Explicit fields plus one hidden slot per untouched auto-property.
    slots: HashMap<String, Value>,
    notifications: Vec<Notification>,
}

enum Flow {
    Next,
    Return(Option<Value>),
}

impl Value {
    pub fn str(text: &str) -> Self {
        Value::Str(text.to_string())
    }

    pub fn float(f: f64) -> Self {
        Value::Float(OrderedFloat(f))
    }

    pub fn default_for(ty: &TypeRef) -> Self {
        if ty.nullable {
            return Value::Null;
        }
        match ty.name.as_str() {
            "bool" | "System.Boolean" => Value::Bool(false),
            "char" | "System.Char" => Value::Char('\0'),
            "float" | "double" | "decimal" | "System.Single" | "System.Double" | "System.Decimal" => {
                Value::float(0.0)
            }
            "sbyte" | "byte" | "short" | "ushort" | "int" | "uint" | "long" | "ulong" | "System.SByte"
            | "System.Byte" | "System.Int16" | "System.UInt16" | "System.Int32" | "System.UInt32"
            | "System.Int64" | "System.UInt64" => Value::Int(0),
            _ => Value::Null,
        }
    }
}

impl<'t> Instance<'t> {
    pub fn new(decl: &'t TypeDecl, helper: &str) -> Self {
        let mut slots = HashMap::new();
        for member in &decl.members {
            match member {
                Member::Field(f) => {
                    slots.insert(f.name.clone(), Value::default_for(&f.ty));
                }
                Member::Property(p @ PropertyDecl { body: PropertyBody::Auto { .. }, .. }) => {
                    slots.insert(auto_slot(&p.name), Value::default_for(&p.ty));
                }
                _ => {}
            }
        }
        Instance { decl, helper: helper.to_string(), slots, notifications: Vec::new() }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn count(&self, property: &str) -> usize {
        self.notifications.iter().filter(|n| n.property == property).count()
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
    }

    fn property(&self, name: &str) -> Result<&'t PropertyDecl, SimError> {
        self.decl
            .properties()
            .find(|p| p.name == name)
            .ok_or_else(|| SimError::UnknownProperty(name.to_string()))
    }

    pub fn get(&mut self, name: &str) -> Result<Value, SimError> {
        let property = self.property(name)?;
        match &property.body {
            PropertyBody::Auto { .. } => self.read(&auto_slot(name), &HashMap::new()),
            PropertyBody::Expression { expr } => self.eval(expr, &mut HashMap::new()),
            PropertyBody::Accessors { getter: Some(getter), .. } => {
                self.run(&getter.body, &mut HashMap::new())?.ok_or_else(|| SimError::WriteOnly(name.to_string()))
            }
            PropertyBody::Accessors { getter: None, .. } => Err(SimError::WriteOnly(name.to_string())),
        }
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<(), SimError> {
        let property = self.property(name)?;
        match &property.body {
            PropertyBody::Auto { setter: Some(_), .. } => {
                self.slots.insert(auto_slot(name), value);
                Ok(())
            }
            PropertyBody::Accessors { setter: Some(setter), .. } => {
                let mut locals = HashMap::from([("value".to_string(), value)]);
                self.run(&setter.body, &mut locals).map(|_| ())
            }
            _ => Err(SimError::ReadOnly(name.to_string())),
        }
    }

    fn run(&mut self, body: &Body, locals: &mut HashMap<String, Value>) -> Result<Option<Value>, SimError> {
        match body {
            Body::Expr(expr) => self.eval(expr, locals).map(Some),
            Body::Block(stmts) => match self.block(stmts, locals)? {
                Flow::Return(value) => Ok(value),
                Flow::Next => Ok(None),
            },
        }
    }

    fn block(&mut self, stmts: &[Stmt], locals: &mut HashMap<String, Value>) -> Result<Flow, SimError> {
        for stmt in stmts {
            let flow = match stmt {
                Stmt::Expr { expr } => self.eval(expr, locals).map(|_| Flow::Next)?,
                Stmt::Return { value } => {
                    let value = value.as_ref().map(|v| self.eval(v, locals)).transpose()?;
                    Flow::Return(value)
                }
                Stmt::If { cond, then, otherwise } => match self.eval(cond, locals)? {
                    Value::Bool(true) => self.block(then, locals)?,
                    Value::Bool(false) => self.block(otherwise, locals)?,
                    other => return Err(SimError::Unsupported(format!("non-boolean condition {other:?}"))),
                },
                Stmt::Assign { target, value } => {
                    let value = self.eval(value, locals)?;
                    self.store(target, value, locals)?;
                    Flow::Next
                }
                Stmt::Local { name, init } => {
                    let value = self.eval(init, locals)?;
                    locals.insert(name.clone(), value);
                    Flow::Next
                }
            };
            if let Flow::Return(_) = flow {
                return Ok(flow);
            }
        }
        Ok(Flow::Next)
    }

    fn read(&self, name: &str, locals: &HashMap<String, Value>) -> Result<Value, SimError> {
        locals
            .get(name)
            .or_else(|| self.slots.get(name))
            .cloned()
            .ok_or_else(|| SimError::Unbound(name.to_string()))
    }

    fn store(&mut self, target: &Expr, value: Value, locals: &mut HashMap<String, Value>) -> Result<(), SimError> {
        match target {
            Expr::Ident { name } if locals.contains_key(name) => {
                locals.insert(name.clone(), value);
                Ok(())
            }
            Expr::Ident { name } if self.slots.contains_key(name) => {
                self.slots.insert(name.clone(), value);
                Ok(())
            }
            Expr::Ident { name } => self.set(name, value),
            Expr::Member { target, name } if matches!(target.as_ref(), Expr::This) => {
                self.store(&Expr::ident(name), value, locals)
            }
            other => Err(SimError::Unsupported(format!("assignment to {other:?}"))),
        }
    }

    fn eval(&mut self, expr: &Expr, locals: &mut HashMap<String, Value>) -> Result<Value, SimError> {
        match expr {
            Expr::Literal { value } => Ok(match value {
                Literal::Null => Value::Null,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Int(i) => Value::Int(*i),
                Literal::Float(f) => Value::float(*f),
                Literal::Char(c) => Value::Char(*c),
                Literal::Str(s) => Value::Str(s.clone()),
            }),
            Expr::Ident { name } => match self.read(name, locals) {
                Ok(value) => Ok(value),
                Err(_) if self.property(name).is_ok() => self.get(name),
                Err(err) => Err(err),
            },
            Expr::Member { target, name } if matches!(target.as_ref(), Expr::This) => {
                self.eval(&Expr::ident(name), locals)
            }
            Expr::Binary { op: op @ (BinOp::Eq | BinOp::Ne), lhs, rhs } => {
                let equal = self.eval(lhs, locals)? == self.eval(rhs, locals)?;
                Ok(Value::Bool(equal == matches!(op, BinOp::Eq)))
            }
            Expr::Not { operand } => match self.eval(operand, locals)? {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                other => Err(SimError::Unsupported(format!("negation of {other:?}"))),
            },
            Expr::Interpolated { parts } => {
                let mut text = String::new();
                for part in parts {
                    match self.eval(part, locals)? {
                        Value::Null => {}
                        Value::Str(s) => text.push_str(&s),
                        Value::Int(i) => text.push_str(&i.to_string()),
                        Value::Bool(b) => text.push_str(if b { "True" } else { "False" }),
                        other => return Err(SimError::Unsupported(format!("formatting {other:?}"))),
                    }
                }
                Ok(Value::Str(text))
            }
            Expr::Assign { target, value } => {
                let value = self.eval(value, locals)?;
                self.store(target, value.clone(), locals)?;
                Ok(value)
            }
            Expr::Call { callee, args } => self.call(callee, args, locals),
            other => Err(SimError::Unsupported(format!("{other:?}"))),
        }
    }

    fn call(&mut self, callee: &Expr, args: &[Expr], locals: &mut HashMap<String, Value>) -> Result<Value, SimError> {
        let args = args.iter().map(|a| self.eval(a, locals)).collect::<Result<Vec<_>, _>>()?;
        match callee {
            Expr::Member { target, name } if name == "Equals" && matches!(target.as_ref(), Expr::Ident { name } if name == "object") => {
                match args.as_slice() {
                    [a, b] => Ok(Value::Bool(a == b)),
                    _ => Err(SimError::Unsupported("object.Equals arity".to_string())),
                }
            }
            Expr::Ident { name } if *name == self.helper => {
                let mut args = args.into_iter();
                let property = match args.next() {
                    Some(Value::Str(property)) => property,
                    other => return Err(SimError::Unsupported(format!("helper called with {other:?}"))),
                };
                self.notifications.push(Notification { property, before: args.next(), after: args.next() });
                Ok(Value::Null)
            }
            other => Err(SimError::Unsupported(format!("call to {other:?}"))),
        }
    }
}

fn auto_slot(property: &str) -> String {
    format!("<{property}>k__BackingField")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn untouched_auto_property_stores_silently() {
        let decl: TypeDecl = serde_json::from_value(json!({ "name": "T", "members": [
            { "member": "property", "name": "Count", "ty": "int", "body": { "shape": "auto", "setter": {} } }
        ]}))
        .unwrap();
        let mut instance = Instance::new(&decl, "OnPropertyChanged");
        assert_eq!(instance.get("Count"), Ok(Value::Int(0)));
        instance.set("Count", Value::Int(3)).unwrap();
        assert_eq!(instance.get("Count"), Ok(Value::Int(3)));
        assert!(instance.notifications().is_empty());
        assert_eq!(instance.set("Missing", Value::Null), Err(SimError::UnknownProperty("Missing".into())));
    }

    #[test]
    fn hand_written_accessors_run() {
        let decl: TypeDecl = serde_json::from_value(json!({ "name": "T", "members": [
            { "member": "field", "name": "_name", "ty": "string" },
            { "member": "property", "name": "Name", "ty": "string", "body": { "shape": "accessors",
              "getter": { "body": { "expr": { "expr": "ident", "name": "_name" } } },
              "setter": { "body": { "expr": { "expr": "assign",
                  "target": { "expr": "ident", "name": "_name" }, "value": { "expr": "ident", "name": "value" } } } } } },
            { "member": "property", "name": "Shout", "ty": "string", "body": { "shape": "expression",
              "expr": { "expr": "interpolated", "parts": [
                  { "expr": "member", "target": { "expr": "this" }, "name": "Name" },
                  { "expr": "literal", "value": { "str": "!" } } ] } } }
        ]}))
        .unwrap();
        let mut instance = Instance::new(&decl, "OnPropertyChanged");
        instance.set("Name", Value::str("hey")).unwrap();
        assert_eq!(instance.get("Shout"), Ok(Value::str("hey!")));
        assert_eq!(instance.set("Shout", Value::Null), Err(SimError::ReadOnly("Shout".into())));
    }
}

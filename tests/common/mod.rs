#![allow(dead_code)]

use prop_changed::ir::{Program, TypeDecl};
use prop_changed::{Diagnostic, DiagnosticBag, RewriteOptions};
use serde_json::{json, Value};

pub const INPC: &str = "System.ComponentModel.INotifyPropertyChanged";

pub fn ident(name: &str) -> Value {
    json!({ "expr": "ident", "name": name })
}

pub fn text(s: &str) -> Value {
    json!({ "expr": "literal", "value": { "str": s } })
}

pub fn auto(name: &str, ty: &str) -> Value {
    json!({ "member": "property", "name": name, "ty": ty, "modifiers": ["public"],
            "body": { "shape": "auto", "setter": {} } })
}

pub fn computed(name: &str, expr: Value) -> Value {
    json!({ "member": "property", "name": name, "ty": "string", "modifiers": ["public"],
            "body": { "shape": "expression", "expr": expr } })
}

pub fn full_name() -> Value {
    computed(
        "FullName",
        json!({ "expr": "interpolated", "parts": [ident("GivenNames"), text(" "), ident("FamilyName")] }),
    )
}

pub fn event() -> Value {
    json!({ "member": "event", "name": "PropertyChanged", "ty": "PropertyChangedEventHandler",
            "modifiers": ["public"] })
}

pub fn helper(param_types: &[&str]) -> Value {
    let names = ["name", "before", "after", "extra"];
    let params: Vec<Value> = param_types
        .iter()
        .zip(names)
        .map(|(ty, name)| json!({ "name": name, "ty": ty }))
        .collect();
    json!({ "member": "method", "name": "OnPropertyChanged", "modifiers": ["protected"],
            "params": params, "span": { "line": 5, "column": 5 } })
}

/// `public class <name> : INotifyPropertyChanged` with the given helper shape.
pub fn notifying_class(name: &str, helper_params: &[&str], members: Vec<Value>) -> Value {
    let mut all = vec![event(), helper(helper_params)];
    all.extend(members);
    json!({ "name": name, "modifiers": ["public"], "interfaces": [INPC], "members": all,
            "span": { "line": 2, "column": 1 } })
}

pub fn program(types: Vec<Value>) -> Program {
    serde_json::from_value(json!({ "units": [{ "path": "Test.cs", "types": types }] })).unwrap()
}

pub fn rewrite_with(program: &Program, options: &RewriteOptions) -> (Program, Vec<Diagnostic>) {
    let bag = DiagnosticBag::new();
    let rewritten = prop_changed::rewrite(program, options, &bag).unwrap();
    (rewritten, bag.into_vec())
}

pub fn rewrite(program: &Program) -> (Program, Vec<Diagnostic>) {
    rewrite_with(program, &RewriteOptions::default())
}

pub fn find<'p>(program: &'p Program, name: &str) -> &'p TypeDecl {
    program
        .units
        .iter()
        .flat_map(|u| &u.types)
        .find(|t| t.name == name)
        .unwrap_or_else(|| panic!("no type {name}"))
}

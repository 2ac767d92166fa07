//! Same-type dependency graph: which computed properties must be announced
//! when a property changes.
//!
//! A computed property depends on every sibling property its getter names,
//! either bare (`GivenNames`) or through `this.GivenNames`. Names bound
//! inside the getter (lambda parameters, `var` locals) shadow siblings.
//! Properties inherited from a base type are never siblings.
use std::collections::HashSet;
use indexmap::{IndexMap, IndexSet};

use crate::ir::{Body, Expr, Stmt, TypeDecl};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    /// source → direct dependents, first-seen order
    edges: IndexMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Over every part of one type; a partial type's properties are all
    /// siblings of each other.
    pub fn build<'d>(parts: impl IntoIterator<Item = &'d TypeDecl>) -> Self {
        let parts: Vec<&TypeDecl> = parts.into_iter().collect();
        let properties = || parts.iter().copied().flat_map(TypeDecl::properties);
        let siblings: HashSet<&str> = properties().map(|p| p.name.as_str()).collect();
        let mut graph = DependencyGraph::default();

        for computed in properties().filter(|p| p.is_computed()) {
            let Some(body) = computed.getter_body() else { continue };
            let mut refs = References { siblings: &siblings, scopes: vec![Vec::new()], found: IndexSet::new() };
            refs.body(&body);
            for source in refs.found {
                if source != computed.name {
                    graph.add_edge(source, &computed.name);
                }
            }
        }
        graph
    }

    fn add_edge(&mut self, source: String, dependent: &str) {
        let dependents = self.edges.entry(source).or_default();
        if !dependents.iter().any(|d| d == dependent) {
            dependents.push(dependent.to_string());
        }
    }

    pub fn direct(&self, source: &str) -> &[String] {
        self.edges.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct dependents first, then computed properties reading those, each
    /// name once.
    pub fn dependents(&self, source: &str) -> Vec<String> {
        let mut out = IndexSet::<&str>::new();
        let mut cursor = 0;
        out.extend(self.direct(source).iter().map(String::as_str));
        while let Some(next) = out.get_index(cursor).copied() {
            out.extend(self.direct(next).iter().map(String::as_str));
            cursor += 1;
        }
        out.into_iter().filter(|d| *d != source).map(str::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.edges.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

struct References<'a> {
    siblings: &'a HashSet<&'a str>,
    scopes: Vec<Vec<String>>,
    found: IndexSet<String>,
}

impl References<'_> {
    fn bound(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.iter().any(|n| n == name))
    }

    fn name(&mut self, name: &str) {
        if self.siblings.contains(name) && !self.bound(name) {
            self.found.insert(name.to_string());
        }
    }

    fn scoped(&mut self, bindings: Vec<String>, walk: impl FnOnce(&mut Self)) {
        self.scopes.push(bindings);
        walk(self);
        self.scopes.pop();
    }

    fn body(&mut self, body: &Body) {
        match body {
            Body::Expr(expr) => self.expr(expr),
            Body::Block(stmts) => self.scoped(Vec::new(), |r| r.block(stmts)),
        }
    }

    fn block(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::Expr { expr } => self.expr(expr),
                Stmt::Return { value } => {
                    if let Some(value) = value {
                        self.expr(value);
                    }
                }
                Stmt::If { cond, then, otherwise } => {
                    self.expr(cond);
                    self.scoped(Vec::new(), |r| r.block(then));
                    self.scoped(Vec::new(), |r| r.block(otherwise));
                }
                Stmt::Assign { target, value } => {
                    self.expr(target);
                    self.expr(value);
                }
                Stmt::Local { name, init } => {
                    self.expr(init);
                    if let Some(scope) = self.scopes.last_mut() {
                        scope.push(name.clone());
                    }
                }
            }
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident { name } => self.name(name),
            Expr::Member { target, name } => match target.as_ref() {
                Expr::This => {
                    if self.siblings.contains(name.as_str()) {
                        self.found.insert(name.clone());
                    }
                }
                other => self.expr(other),
            },
            Expr::This | Expr::Literal { .. } => {}
            Expr::Call { callee, args } => {
                self.expr(callee);
                args.iter().for_each(|a| self.expr(a));
            }
            Expr::Binary { lhs, rhs, .. } => {
                self.expr(lhs);
                self.expr(rhs);
            }
            Expr::Not { operand } => self.expr(operand),
            Expr::Conditional { cond, then, otherwise } => {
                self.expr(cond);
                self.expr(then);
                self.expr(otherwise);
            }
            Expr::Interpolated { parts } => parts.iter().for_each(|p| self.expr(p)),
            Expr::Lambda { params, body } => self.scoped(params.clone(), |r| r.body(body)),
            Expr::Assign { target, value } => {
                self.expr(target);
                self.expr(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ident(name: &str) -> serde_json::Value {
        json!({ "expr": "ident", "name": name })
    }

    fn auto(name: &str) -> serde_json::Value {
        json!({ "member": "property", "name": name, "ty": "string", "body": { "shape": "auto", "setter": {} } })
    }

    fn computed(name: &str, expr: serde_json::Value) -> serde_json::Value {
        json!({ "member": "property", "name": name, "ty": "string", "body": { "shape": "expression", "expr": expr } })
    }

    fn graph(members: serde_json::Value) -> DependencyGraph {
        let decl: TypeDecl = serde_json::from_value(json!({ "name": "T", "members": members })).unwrap();
        DependencyGraph::build([&decl])
    }

    #[test]
    fn interpolation_reads_both_names() {
        let g = graph(json!([
            auto("GivenNames"),
            auto("FamilyName"),
            computed("FullName", json!({ "expr": "interpolated", "parts": [
                ident("GivenNames"), { "expr": "literal", "value": { "str": " " } }, ident("FamilyName")
            ]})),
        ]));
        assert_eq!(g.direct("GivenNames"), ["FullName".to_string()]);
        assert_eq!(g.direct("FamilyName"), ["FullName".to_string()]);
        assert!(g.direct("FullName").is_empty());
    }

    #[test]
    fn getter_blocks_and_this_access_count() {
        let g = graph(json!([
            auto("Width"),
            auto("Height"),
            { "member": "property", "name": "Area", "ty": "int", "body": { "shape": "accessors",
              "getter": { "body": { "block": [
                  { "stmt": "return", "value": { "expr": "binary", "op": "mul",
                    "lhs": { "expr": "member", "target": { "expr": "this" }, "name": "Width" },
                    "rhs": ident("Height") } }
              ]}}}},
            computed("Perimeter", json!({ "expr": "binary", "op": "add", "lhs": ident("Height"), "rhs": ident("Width") })),
        ]));
        assert_eq!(g.direct("Width"), ["Area".to_string(), "Perimeter".to_string()]);
        assert_eq!(g.direct("Height"), ["Area".to_string(), "Perimeter".to_string()]);
    }

    #[test]
    fn shadowed_and_foreign_names_are_ignored() {
        let g = graph(json!([
            auto("Name"),
            auto("Items"),
            computed("Upper", json!({ "expr": "call",
                "callee": { "expr": "member", "target": ident("Items"), "name": "Select" },
                "args": [{ "expr": "lambda", "params": ["Name"], "body": { "expr": ident("Name") } }] })),
            computed("Other", json!({ "expr": "member", "target": ident("Parent"), "name": "Name" })),
        ]));
        assert_eq!(g.direct("Items"), ["Upper".to_string()]);
        assert!(g.direct("Name").is_empty());
    }

    #[test]
    fn settable_properties_are_never_dependents() {
        let g = graph(json!([
            auto("A"),
            { "member": "property", "name": "B", "ty": "string", "body": { "shape": "accessors",
              "getter": { "body": { "expr": ident("A") } },
              "setter": { "body": { "expr": { "expr": "assign", "target": ident("A"), "value": ident("value") } } } } },
        ]));
        assert!(g.is_empty());
    }

    #[test]
    fn dependents_follow_computed_chains() {
        let g = graph(json!([
            auto("First"),
            computed("Full", ident("First")),
            computed("Shout", json!({ "expr": "call",
                "callee": { "expr": "member", "target": ident("Full"), "name": "ToUpper" } })),
            computed("Loop", ident("Loop")),
        ]));
        assert_eq!(g.dependents("First"), vec!["Full".to_string(), "Shout".to_string()]);
        assert!(g.direct("Loop").is_empty());
    }

    #[test]
    fn inherited_properties_are_not_sources() {
        // `Given` lives on a base type
        let g = graph(json!([
            auto("Family"),
            computed("Full", json!({ "expr": "interpolated", "parts": [ident("Given"), ident("Family")] })),
        ]));
        assert!(g.direct("Given").is_empty());
        assert_eq!(g.direct("Family"), ["Full".to_string()]);
    }

    #[test]
    fn partial_parts_see_each_other() {
        let first: TypeDecl = serde_json::from_value(json!({ "name": "T", "members": [auto("Name")] })).unwrap();
        let second: TypeDecl = serde_json::from_value(json!({ "name": "T", "members": [
            computed("Greeting", ident("Name"))
        ]}))
        .unwrap();
        let g = DependencyGraph::build([&first, &second]);
        assert_eq!(g.direct("Name"), ["Greeting".to_string()]);
    }
}

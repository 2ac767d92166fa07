//! Type table over a bound program.
//!
//! Every declared type (nested ones included) and every reference type gets
//! an arena slot keyed by its qualified name. Declarations sharing a name are
//! parts of one partial type and land in the same slot. Bases are resolved
//! to slot indices once; a base name that is not in the table is an external
//! root. The base chain is checked for cycles when the table is built, so
//! the walks below always terminate.
use std::collections::HashSet;
use indexmap::IndexMap;

use crate::error::RewriteError;
use crate::ir::{Member, MethodDecl, Program, TypeDecl};
use crate::rewrite::helper::HelperSignature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(usize);

/// One declaration of a type and the unit it came from (`None` for
/// reference types).
#[derive(Debug, Clone, Copy)]
pub struct TypePart<'p> {
    pub decl: &'p TypeDecl,
    pub path: Option<&'p str>,
}

#[derive(Debug)]
pub struct TypeEntry<'p> {
    pub qualified: String,
    /// Program order; never empty.
    pub parts: Vec<TypePart<'p>>,
    pub base: Option<TypeId>,
}

#[derive(Debug, Default)]
pub struct TypeTable<'p> {
    entries: Vec<TypeEntry<'p>>,
    by_name: IndexMap<String, TypeId>,
}

/// A resolved helper, the type that declares it and the unit of the part
/// it sits in.
#[derive(Debug, Clone, Copy)]
pub struct HelperRef<'p> {
    pub method: &'p MethodDecl,
    pub owner: TypeId,
    pub path: Option<&'p str>,
}

pub fn qualify(scope: Option<&str>, name: &str) -> String {
    match scope {
        Some(scope) if !scope.is_empty() => format!("{scope}.{name}"),
        _ => name.to_string(),
    }
}

impl<'p> TypeEntry<'p> {
    pub fn decls(&self) -> impl Iterator<Item = &'p TypeDecl> + '_ {
        self.parts.iter().map(|part| part.decl)
    }

    /// The first part seen owns diagnostics about the whole type.
    pub fn is_primary(&self, decl: &TypeDecl) -> bool {
        self.parts.first().is_some_and(|part| std::ptr::eq(part.decl, decl))
    }
}

impl<'p> TypeTable<'p> {
    pub fn build(program: &'p Program) -> Result<Self, RewriteError> {
        let mut table = TypeTable::default();
        for unit in &program.units {
            for decl in &unit.types {
                table.insert(unit.namespace.as_deref(), decl, Some(unit.path.as_str()));
            }
        }
        for decl in &program.references {
            table.insert(None, decl, None);
        }

        for i in 0..table.entries.len() {
            let entry = &table.entries[i];
            let mut named = entry.decls().filter_map(|decl| decl.base.as_deref());
            let first = named.next();
            if let (Some(first), Some(second)) = (first, named.find(|name| Some(*name) != first)) {
                return Err(RewriteError::ConflictingBase {
                    name: entry.qualified.clone(),
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
            let base = first.and_then(|name| table.by_name.get(name).copied());
            drop(named);
            table.entries[i].base = base;
        }
        table.check_acyclic()?;
        Ok(table)
    }

    fn insert(&mut self, scope: Option<&str>, decl: &'p TypeDecl, path: Option<&'p str>) {
        let qualified = qualify(scope, &decl.name);
        let id = match self.by_name.get(&qualified) {
            Some(&id) => id,
            None => {
                let id = TypeId(self.entries.len());
                self.by_name.insert(qualified.clone(), id);
                self.entries.push(TypeEntry { qualified: qualified.clone(), parts: Vec::new(), base: None });
                id
            }
        };
        self.entries[id.0].parts.push(TypePart { decl, path });
        for nested in &decl.nested {
            self.insert(Some(&qualified), nested, path);
        }
    }

    fn check_acyclic(&self) -> Result<(), RewriteError> {
        let mut cleared = HashSet::<TypeId>::new();
        for start in 0..self.entries.len() {
            let mut on_path = HashSet::new();
            let mut cursor = Some(TypeId(start));
            while let Some(id) = cursor {
                if cleared.contains(&id) {
                    break;
                }
                if !on_path.insert(id) {
                    return Err(RewriteError::InheritanceCycle {
                        name: self.entry(id).qualified.clone(),
                    });
                }
                cursor = self.entry(id).base;
            }
            cleared.extend(on_path);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn id_of(&self, qualified: &str) -> Option<TypeId> {
        self.by_name.get(qualified).copied()
    }

    pub fn entry(&self, id: TypeId) -> &TypeEntry<'p> {
        &self.entries[id.0]
    }

    /// The type itself, then each ancestor that is part of the table.
    pub fn ancestors(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::successors(Some(id), move |t| self.entry(*t).base)
    }

    /// Members that ancestors of `id` expose to it. Private ones can't
    /// collide with anything the type declares.
    pub fn inherited_members(&self, id: TypeId) -> impl Iterator<Item = &'p Member> + '_ {
        self.ancestors(id)
            .skip(1)
            .flat_map(move |ancestor| self.entry(ancestor).decls())
            .flat_map(|decl| decl.members.iter())
            .filter(|member| !member.is_private())
    }

    /// Does `id` (or an ancestor) list `interface`, directly or through an
    /// interface that extends it?
    pub fn implements(&self, id: TypeId, interface: &str) -> bool {
        let mut seen = HashSet::new();
        self.ancestors(id).any(|t| self.lists_interface(t, interface, &mut seen))
    }

    fn lists_interface(&self, id: TypeId, interface: &str, seen: &mut HashSet<TypeId>) -> bool {
        self.entry(id)
            .decls()
            .flat_map(|decl| decl.interfaces.iter())
            .any(|name| {
                if name == interface {
                    return true;
                }
                match self.id_of(name) {
                    Some(iface) if seen.insert(iface) => self.lists_interface(iface, interface, seen),
                    _ => false,
                }
            })
    }

    /// Nearest declaration of the helper, own members before ancestors. When
    /// that type overloads the name, the first supported overload wins.
    pub fn find_helper(&self, id: TypeId, name: &str) -> Option<HelperRef<'p>> {
        self.ancestors(id).find_map(|owner| {
            let overloads: Vec<(&'p MethodDecl, Option<&'p str>)> = self
                .entry(owner)
                .parts
                .iter()
                .flat_map(|part| {
                    let decl: &'p TypeDecl = part.decl;
                    decl.methods().filter(|m| m.name == name).map(move |m| (m, part.path))
                })
                .collect();
            let (method, path) = overloads
                .iter()
                .copied()
                .find(|(m, _)| HelperSignature::classify(m).is_supported())
                .or_else(|| overloads.first().copied())?;
            Some(HelperRef { method, owner, path })
        })
    }
}

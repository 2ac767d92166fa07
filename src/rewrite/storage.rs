use std::collections::HashSet;

use crate::ir::{FieldDecl, PropertyDecl, Span, TypeDecl, TypeRef};

/// Explicit storage standing in for an auto-property's implicit one.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageSlot {
    pub name: String,
    pub ty: TypeRef,
    pub span: Span,
}

/// Hands out storage names that collide with nothing declared on the type
/// and nothing handed out earlier.
#[derive(Debug)]
pub struct StorageBinder<'a> {
    prefix: &'a str,
    taken: HashSet<String>,
}

impl StorageSlot {
    pub fn field_decl(&self) -> FieldDecl {
        FieldDecl {
            name: self.name.clone(),
            ty: self.ty.clone(),
            modifiers: vec!["private".to_string()],
            span: self.span,
        }
    }
}

impl<'a> StorageBinder<'a> {
    /// Reserves every member and nested type name of all `parts` of one
    /// type, and the type's own name.
    pub fn new<'d>(prefix: &'a str, parts: impl IntoIterator<Item = &'d TypeDecl>) -> Self {
        let mut taken = HashSet::new();
        for decl in parts {
            taken.extend(decl.members.iter().map(|m| m.name().to_string()));
            taken.extend(decl.nested.iter().map(|t| t.name.clone()));
            taken.insert(decl.name.clone());
        }
        StorageBinder { prefix, taken }
    }

    /// Names the new fields must not hide, e.g. visible members of a base.
    pub fn reserve<'n>(&mut self, names: impl IntoIterator<Item = &'n str>) {
        self.taken.extend(names.into_iter().map(str::to_string));
    }

    /// `None` unless the property is Simple.
    pub fn bind(&mut self, property: &PropertyDecl) -> Option<StorageSlot> {
        if !property.is_simple() {
            return None;
        }
        let stem = format!("{}{}", self.prefix, property.name.trim_start_matches('@'));
        let name = std::iter::once(stem.clone())
            .chain((1..).map(|n| format!("{stem}_{n}")))
            .find(|candidate| !self.taken.contains(candidate))?;
        self.taken.insert(name.clone());
        Some(StorageSlot { name, ty: property.ty.clone(), span: property.span })
    }
}

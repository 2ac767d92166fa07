//! Per-type rewrite pass.
//!
//! Each type visit goes `Resolving → Skipped | Classified → DependencyBuilt →
//! Rewriting → Done`. Everything a visit learns lives in a [`TypeContext`]
//! owned by that visit, so units can be rewritten on several workers at once
//! with one shared [`Rewriter`].
//!
//! A partial type is visited once per part. The context is derived from the
//! merged table entry, so every part sees the same helper, dependency graph
//! and storage names; only the first part reports diagnostics.
pub mod deps;
pub mod equality;
pub mod helper;
pub mod storage;
pub mod synth;

use std::ops::AddAssign;
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::config::RewriteOptions;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Location};
use crate::error::RewriteError;
use crate::ir::{Accessor, Body, CompilationUnit, Member, MethodDecl, PropertyBody, PropertyDecl, TypeDecl};
use crate::resolve::{qualify, TypeId, TypeTable};

pub use deps::DependencyGraph;
pub use equality::EqualityStrategy;
pub use helper::HelperSignature;
pub use storage::{StorageBinder, StorageSlot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub types_visited: usize,
    pub types_rewritten: usize,
    /// Opted in but left untouched because of a diagnostic.
    pub types_skipped: usize,
    pub properties_rewritten: usize,
}

/// Why a type came through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    NotRewritable,
    NotNotifying,
    HelperNotFound,
    SignatureUnmatched,
}

struct TypeContext<'p> {
    helper: &'p MethodDecl,
    signature: HelperSignature,
    deps: DependencyGraph,
    /// property name → storage, over all parts
    storage: IndexMap<String, StorageSlot>,
}

pub struct Rewriter<'a, 'p> {
    table: &'a TypeTable<'p>,
    options: &'a RewriteOptions,
    sink: &'a dyn DiagnosticSink,
}

impl AddAssign for RewriteStats {
    fn add_assign(&mut self, other: Self) {
        self.types_visited += other.types_visited;
        self.types_rewritten += other.types_rewritten;
        self.types_skipped += other.types_skipped;
        self.properties_rewritten += other.properties_rewritten;
    }
}

impl<'a, 'p> Rewriter<'a, 'p> {
    pub fn new(table: &'a TypeTable<'p>, options: &'a RewriteOptions, sink: &'a dyn DiagnosticSink) -> Self {
        Rewriter { table, options, sink }
    }

    pub fn rewrite_unit(&self, unit: &CompilationUnit) -> Result<(CompilationUnit, RewriteStats), RewriteError> {
        let mut stats = RewriteStats::default();
        let mut types = Vec::with_capacity(unit.types.len());
        for decl in &unit.types {
            let qualified = qualify(unit.namespace.as_deref(), &decl.name);
            types.push(self.rewrite_type(&qualified, decl, &unit.path, &mut stats)?);
        }
        Ok((CompilationUnit { types, ..unit.clone() }, stats))
    }

    fn rewrite_type(
        &self,
        qualified: &str,
        decl: &TypeDecl,
        path: &str,
        stats: &mut RewriteStats,
    ) -> Result<TypeDecl, RewriteError> {
        let nested = decl
            .nested
            .iter()
            .map(|inner| self.rewrite_type(&qualify(Some(qualified), &inner.name), inner, path, stats))
            .collect::<Result<Vec<_>, _>>()?;
        let unchanged = || TypeDecl { nested: nested.clone(), ..decl.clone() };

        stats.types_visited += 1;
        // only reachable with units the table was not built from
        let id = self
            .table
            .id_of(qualified)
            .ok_or_else(|| RewriteError::UnindexedType { name: qualified.to_string() })?;

        let cx = match self.classify(id, decl, path) {
            Ok(cx) => cx,
            Err(skip) => {
                debug!(ty = qualified, reason = ?skip, "type left unchanged");
                if matches!(skip, Skip::HelperNotFound | Skip::SignatureUnmatched) {
                    stats.types_skipped += 1;
                }
                return Ok(unchanged());
            }
        };
        debug!(ty = qualified, signature = ?cx.signature, edges = cx.deps.edges().count(), "rewriting type");

        let mut fields = Vec::new();
        let members = decl
            .members
            .iter()
            .map(|member| match member {
                Member::Property(property) => match rewrite_property(property, &cx) {
                    Some((rewritten, slot)) => {
                        trace!(ty = qualified, property = %property.name, storage = %slot.name, "property rewritten");
                        fields.push(Member::Field(slot.field_decl()));
                        Member::Property(rewritten)
                    }
                    None => member.clone(),
                },
                other => other.clone(),
            })
            .collect::<Vec<_>>();

        if fields.is_empty() {
            return Ok(unchanged());
        }
        stats.types_rewritten += 1;
        stats.properties_rewritten += fields.len();
        Ok(TypeDecl {
            members: members.into_iter().chain(fields).collect(),
            nested,
            ..decl.clone()
        })
    }

    /// Resolving → Skipped | Classified → DependencyBuilt.
    fn classify(&self, id: TypeId, decl: &TypeDecl, path: &str) -> Result<TypeContext<'p>, Skip> {
        if !decl.is_rewritable() {
            return Err(Skip::NotRewritable);
        }
        let protocol = &self.options.protocol;
        if !self.table.implements(id, &protocol.interface) {
            return Err(Skip::NotNotifying);
        }
        let entry = self.table.entry(id);
        let reports = entry.is_primary(decl);
        let Some(found) = self.table.find_helper(id, &protocol.helper) else {
            if reports {
                self.sink.report(Diagnostic::helper_not_found(Location {
                    path: Some(path.to_string()),
                    span: decl.span,
                }));
            }
            return Err(Skip::HelperNotFound);
        };

        let signature = HelperSignature::classify(found.method);
        if !signature.is_supported() {
            // reported once per type, and only if a property was going to be rewritten
            if reports && entry.decls().flat_map(TypeDecl::properties).any(PropertyDecl::is_simple) {
                self.sink.report(Diagnostic::helper_signature_unmatched(
                    Location { path: found.path.map(str::to_string), span: found.method.span },
                    &found.method.name,
                ));
            }
            return Err(Skip::SignatureUnmatched);
        }

        let mut binder = StorageBinder::new(&self.options.storage_prefix, entry.decls());
        binder.reserve(self.table.inherited_members(id).map(Member::name));
        let storage = entry
            .decls()
            .flat_map(TypeDecl::properties)
            .filter_map(|property| Some((property.name.clone(), binder.bind(property)?)))
            .collect();

        Ok(TypeContext {
            helper: found.method,
            signature,
            deps: DependencyGraph::build(entry.decls()),
            storage,
        })
    }
}

fn rewrite_property(property: &PropertyDecl, cx: &TypeContext<'_>) -> Option<(PropertyDecl, StorageSlot)> {
    let PropertyBody::Auto { getter, setter: Some(setter) } = &property.body else {
        return None;
    };
    let slot = cx.storage.get(&property.name)?.clone();
    let set_body = synth::setter(
        &slot,
        &property.name,
        EqualityStrategy::for_type(&property.ty),
        &cx.helper.name,
        cx.signature,
        &cx.deps.dependents(&property.name),
    )?;

    let body = PropertyBody::Accessors {
        getter: Some(Accessor { modifiers: getter.modifiers.clone(), body: Body::Block(synth::getter(&slot)) }),
        setter: Some(Accessor { modifiers: setter.modifiers.clone(), body: Body::Block(set_body) }),
    };
    Some((PropertyDecl { body, ..property.clone() }, slot))
}

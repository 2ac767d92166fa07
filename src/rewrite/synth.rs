//! Accessor bodies for a rewritten property.
use crate::ir::{Expr, Stmt};
use crate::rewrite::equality::EqualityStrategy;
use crate::rewrite::helper::HelperSignature;
use crate::rewrite::storage::StorageSlot;

/// The setter's implicit parameter.
pub const VALUE: &str = "value";
pub const BEFORE: &str = "before";
pub const AFTER: &str = "after";

#[derive(Debug, Default)]
pub struct BlockBuilder {
    stmts: Vec<Stmt>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn return_if(mut self, cond: Expr) -> Self {
        self.stmts.push(Stmt::If { cond, then: vec![Stmt::Return { value: None }], otherwise: Vec::new() });
        self
    }

    pub fn declare(mut self, name: &str, init: Expr) -> Self {
        self.stmts.push(Stmt::Local { name: name.to_string(), init });
        self
    }

    pub fn assign(mut self, target: Expr, value: Expr) -> Self {
        self.stmts.push(Stmt::Assign { target, value });
        self
    }

    pub fn call(mut self, method: &str, args: Vec<Expr>) -> Self {
        self.stmts.push(Stmt::Expr { expr: Expr::call(Expr::ident(method), args) });
        self
    }

    pub fn calls<I>(self, method: &str, args: I) -> Self
    where
        I: IntoIterator<Item = Vec<Expr>>,
    {
        args.into_iter().fold(self, |block, args| block.call(method, args))
    }

    pub fn returns(mut self, value: Expr) -> Self {
        self.stmts.push(Stmt::Return { value: Some(value) });
        self
    }

    pub fn build(self) -> Vec<Stmt> {
        self.stmts
    }
}

pub fn getter(slot: &StorageSlot) -> Vec<Stmt> {
    BlockBuilder::new().returns(Expr::ident(&slot.name)).build()
}

/// `None` when the helper can't be called.
pub fn setter(
    slot: &StorageSlot,
    property: &str,
    equality: EqualityStrategy,
    helper: &str,
    signature: HelperSignature,
    dependents: &[String],
) -> Option<Vec<Stmt>> {
    let stored = || Expr::ident(&slot.name);
    let guarded = BlockBuilder::new().return_if(equality.compare(stored(), Expr::ident(VALUE)));
    let names = std::iter::once(property).chain(dependents.iter().map(String::as_str));

    let block = match signature {
        HelperSignature::OneArg => guarded
            .assign(stored(), Expr::ident(VALUE))
            .calls(helper, names.map(|name| vec![Expr::str(name)])),
        HelperSignature::ThreeArg => guarded
            .declare(BEFORE, stored())
            .assign(stored(), Expr::ident(VALUE))
            .declare(AFTER, stored())
            .calls(
                helper,
                names.map(|name| vec![Expr::str(name), Expr::ident(BEFORE), Expr::ident(AFTER)]),
            ),
        HelperSignature::Unsupported => return None,
    };
    Some(block.build())
}

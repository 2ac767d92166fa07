use crate::ir::{MethodDecl, TypeRef};

/// Call shape of the resolved helper; one per type, applied to every
/// property rewritten in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperSignature {
    /// `(string name)`
    OneArg,
    /// `(string name, object before, object after)`
    ThreeArg,
    Unsupported,
}

impl HelperSignature {
    pub fn classify(method: &MethodDecl) -> Self {
        match method.params.as_slice() {
            [name] if is_string(&name.ty) => HelperSignature::OneArg,
            [name, before, after]
                if is_string(&name.ty) && is_object(&before.ty) && is_object(&after.ty) =>
            {
                HelperSignature::ThreeArg
            }
            _ => HelperSignature::Unsupported,
        }
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, HelperSignature::Unsupported)
    }
}

// nullable annotations don't change the special type
fn is_string(ty: &TypeRef) -> bool {
    matches!(ty.name.as_str(), "string" | "System.String")
}

fn is_object(ty: &TypeRef) -> bool {
    matches!(ty.name.as_str(), "object" | "System.Object")
}

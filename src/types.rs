//! `Type` and friends (spec §3), arena-allocated per translation unit.
//!
//! Grounded in `original_source/include/parser/type.h`'s `TYPEKIND` union:
//! each variant below carries exactly the payload its C counterpart does.

use crate::token::Token;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeModifier {
    None,
    Short,
    Long,
    LongLong,
}

#[derive(Debug)]
pub struct EnumVariant<'a> {
    pub name: Token,
    pub value: Option<&'a Value<'a>>,
}

#[derive(Debug)]
pub struct Type<'a> {
    pub is_thread_local: bool,
    pub is_static: bool,
    pub is_const: bool,
    pub is_extern: bool,
    pub is_unsigned: bool,
    pub is_signed: bool,
    pub size_mod: SizeModifier,
    /// Name of the type, when one exists (struct/union/enum/typedef tags).
    pub name: Option<Token>,
    pub kind: TypeKind<'a>,
}

#[derive(Debug)]
pub enum TypeKind<'a> {
    /// Reference to another type by name (e.g. a typedef'd alias used as a type).
    Reference(&'a Type<'a>),
    Pointer(&'a Type<'a>),
    Array {
        base: &'a Type<'a>,
        /// `None` means the array length was unspecified (`int a[]`).
        len: Option<&'a Value<'a>>,
        is_static: bool,
    },
    Function {
        args: Vec<&'a crate::symbol::Symbol<'a>>,
        ret: &'a Type<'a>,
    },
    Struct {
        name: Option<Token>,
        members: Vec<&'a crate::symbol::Symbol<'a>>,
    },
    Union {
        name: Option<Token>,
        members: Vec<&'a crate::symbol::Symbol<'a>>,
    },
    Enum {
        name: Option<Token>,
        members: Vec<EnumVariant<'a>>,
    },
    /// A type used as a value (e.g. the operand of `sizeof`).
    TypeOf(&'a Type<'a>),
    Primitive,
}

impl<'a> Type<'a> {
    pub fn new(kind: TypeKind<'a>) -> Self {
        Type {
            is_thread_local: false,
            is_static: false,
            is_const: false,
            is_extern: false,
            is_unsigned: false,
            is_signed: false,
            size_mod: SizeModifier::None,
            name: None,
            kind,
        }
    }

    pub fn primitive(name: &str) -> Self {
        Type { name: Some(synthetic_token(name)), ..Type::new(TypeKind::Primitive) }
    }

    /// The top type: everything converts to it (spec §3/§4.4).
    pub fn any() -> Self {
        Type::primitive("any")
    }

    /// The type of a `...` vararg slot: anything but `any` converts to it
    /// (spec §3/§4.4).
    pub fn va_list() -> Self {
        Type::primitive("va_list")
    }
}

fn is_any(t: &Type) -> bool {
    matches!(&t.kind, TypeKind::Primitive) && t.name.as_ref().map(|tok| &*tok.text == "any").unwrap_or(false)
}

fn is_va_list(t: &Type) -> bool {
    matches!(&t.kind, TypeKind::Primitive) && t.name.as_ref().map(|tok| &*tok.text == "va_list").unwrap_or(false)
}

fn synthetic_token(text: &str) -> Token {
    use crate::token::TokenKind;
    Token::new(TokenKind::Keyword, text, std::rc::Rc::from("<builtin>"), 0, 0)
}

/// Structural type equality (spec §4.6's `Equality` stage), grounded in
/// `original_source/src/parser/type.c`'s `Type_equal`.
pub fn type_equal(a: &Type, b: &Type) -> bool {
    if a.is_const != b.is_const
        || a.is_unsigned != b.is_unsigned
        || a.is_signed != b.is_signed
        || a.size_mod != b.size_mod
    {
        return false;
    }
    match (&a.kind, &b.kind) {
        (TypeKind::Primitive, TypeKind::Primitive) => a.name.as_ref().map(|t| &*t.text) == b.name.as_ref().map(|t| &*t.text),
        (TypeKind::Pointer(x), TypeKind::Pointer(y)) => type_equal(x, y),
        (TypeKind::Reference(x), TypeKind::Reference(y)) => type_equal(x, y),
        (TypeKind::TypeOf(x), TypeKind::TypeOf(y)) => type_equal(x, y),
        (TypeKind::Array { base: b1, .. }, TypeKind::Array { base: b2, .. }) => type_equal(b1, b2),
        (TypeKind::Struct { name: n1, .. }, TypeKind::Struct { name: n2, .. })
        | (TypeKind::Union { name: n1, .. }, TypeKind::Union { name: n2, .. })
        | (TypeKind::Enum { name: n1, .. }, TypeKind::Enum { name: n2, .. }) => {
            n1.as_ref().map(|t| &*t.text) == n2.as_ref().map(|t| &*t.text)
        }
        (TypeKind::Function { args: a1, ret: r1 }, TypeKind::Function { args: a2, ret: r2 }) => {
            a1.len() == a2.len()
                && a1.iter().zip(a2.iter()).all(|(x, y)| x.type_.zip(y.type_).map(|(tx, ty)| type_equal(tx, ty)).unwrap_or(x.type_.is_none() && y.type_.is_none()))
                && type_equal(r1, r2)
        }
        _ => false,
    }
}

/// Whether a value of type `from` may convert to `to` (spec §4.4's
/// call-arity/return/if-condition convertibility rules): structural
/// equality, `Reference` forwarding, numeric-to-numeric, and unrestricted
/// pointer-to-pointer.
pub fn is_convertible(from: &Type, to: &Type) -> bool {
    if type_equal(from, to) {
        return true;
    }
    if let TypeKind::Reference(inner) = &from.kind {
        return is_convertible(inner, to);
    }
    if let TypeKind::Reference(inner) = &to.kind {
        return is_convertible(from, inner);
    }
    if is_any(to) {
        return true;
    }
    if is_va_list(to) && !is_any(from) {
        return true;
    }
    match (&from.kind, &to.kind) {
        (TypeKind::Pointer(_), TypeKind::Pointer(_)) => true,
        (TypeKind::Primitive, TypeKind::Primitive) => is_numeric(from) && is_numeric(to),
        _ => false,
    }
}

fn is_numeric(t: &Type) -> bool {
    matches!(&t.kind, TypeKind::Primitive)
        && t.name.as_ref().map(|tok| {
            matches!(&*tok.text, "int" | "float" | "double" | "char" | "short" | "long" | "signed" | "unsigned")
        }).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_equal_by_name() {
        let a = Type::primitive("int");
        let b = Type::primitive("int");
        assert!(type_equal(&a, &b));
        let c = Type::primitive("float");
        assert!(!type_equal(&a, &c));
    }

    #[test]
    fn pointer_convertible_to_pointer_unrestricted() {
        let int_ty = Type::primitive("int");
        let float_ty = Type::primitive("float");
        let p1 = Type::new(TypeKind::Pointer(&int_ty));
        let p2 = Type::new(TypeKind::Pointer(&float_ty));
        assert!(is_convertible(&p1, &p2));
    }

    #[test]
    fn numeric_convertible_to_numeric() {
        let int_ty = Type::primitive("int");
        let float_ty = Type::primitive("float");
        assert!(is_convertible(&int_ty, &float_ty));
    }

    #[test]
    fn anything_converts_to_any() {
        let int_ty = Type::primitive("int");
        let struct_ty = Type { name: Some(synthetic_token("Point")), ..Type::new(TypeKind::Struct { name: Some(synthetic_token("Point")), members: vec![] }) };
        let any_ty = Type::any();
        assert!(is_convertible(&int_ty, &any_ty));
        assert!(is_convertible(&struct_ty, &any_ty));
        assert!(is_convertible(&any_ty, &any_ty));
    }

    #[test]
    fn non_any_converts_to_va_list_but_any_does_not() {
        let int_ty = Type::primitive("int");
        let any_ty = Type::any();
        let va_list_ty = Type::va_list();
        assert!(is_convertible(&int_ty, &va_list_ty));
        assert!(!is_convertible(&any_ty, &va_list_ty));
    }

    #[test]
    fn reference_forwards_convertibility() {
        let int_ty = Type::primitive("int");
        let reference = Type::new(TypeKind::Reference(&int_ty));
        let float_ty = Type::primitive("float");
        assert!(is_convertible(&reference, &float_ty));
        assert!(is_convertible(&float_ty, &reference));
    }

    #[test]
    fn struct_and_union_require_matching_tag_name() {
        let a = Type { name: Some(synthetic_token("Point")), ..Type::new(TypeKind::Struct { name: Some(synthetic_token("Point")), members: vec![] }) };
        let b = Type { name: Some(synthetic_token("Point")), ..Type::new(TypeKind::Struct { name: Some(synthetic_token("Point")), members: vec![] }) };
        assert!(type_equal(&a, &b));
        let c = Type { name: Some(synthetic_token("Other")), ..Type::new(TypeKind::Struct { name: Some(synthetic_token("Other")), members: vec![] }) };
        assert!(!type_equal(&a, &c));
    }
}

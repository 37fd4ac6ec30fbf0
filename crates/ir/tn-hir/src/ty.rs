//! IR types

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tn_intern::{Interner, Symbol};

use crate::TypeDefId;

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum PrimitiveType {
    /// `i8`
    #[display("i8")]
    I8,
    /// `i16`
    #[display("i16")]
    I16,
    /// `i32`
    #[display("i32")]
    I32,
    /// `i64`
    #[display("i64")]
    I64,
    /// `u8`
    #[display("u8")]
    U8,
    /// `u16`
    #[display("u16")]
    U16,
    /// `u32`
    #[display("u32")]
    U32,
    /// `u64`
    #[display("u64")]
    U64,
    /// `f32`
    #[display("f32")]
    F32,
    /// `f64`
    #[display("f64")]
    F64,
    /// `bool`
    #[display("bool")]
    Bool,
    /// `char`
    #[display("char")]
    Char,
    /// `string`
    #[display("string")]
    String,
}

/// Source name of every primitive
const PRIMITIVES: &[(&str, PrimitiveType)] = &[
    ("i8", PrimitiveType::I8),
    ("i16", PrimitiveType::I16),
    ("i32", PrimitiveType::I32),
    ("i64", PrimitiveType::I64),
    ("u8", PrimitiveType::U8),
    ("u16", PrimitiveType::U16),
    ("u32", PrimitiveType::U32),
    ("u64", PrimitiveType::U64),
    ("f32", PrimitiveType::F32),
    ("f64", PrimitiveType::F64),
    ("bool", PrimitiveType::Bool),
    ("char", PrimitiveType::Char),
    ("string", PrimitiveType::String),
];

impl PrimitiveType {
    /// Looks up a primitive by its source name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        PRIMITIVES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, ty)| *ty)
    }
}

/// A type in the IR
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// Built-in scalar
    Primitive(PrimitiveType),
    /// `()`
    Unit,
    /// User-defined type; `def` is `None` when the name did not resolve
    Named {
        /// Type name
        name: Symbol,
        /// Resolved definition
        def: Option<TypeDefId>,
        /// Generic arguments
        args: Vec<Type>,
    },
    /// Generic parameter or associated type
    Generic {
        /// Parameter name
        name: Symbol,
    },
    /// Placeholder for a type left to inference
    Inferred,
    /// `(A, B)`
    Tuple(Vec<Type>),
    /// `&T` / `&mut T`
    Reference {
        /// Mutable reference
        mutable: bool,
        /// Referenced type
        inner: Box<Type>,
    },
    /// `fn(A) -> B`
    Function {
        /// Parameter types
        params: Vec<Type>,
        /// Return type
        ret: Box<Type>,
    },
}

impl Type {
    /// The boolean type
    pub const BOOL: Self = Self::Primitive(PrimitiveType::Bool);

    /// Whether this is `()`
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }

    /// Renders the type as source-like text
    #[must_use]
    pub fn display(&self, interner: &Interner) -> String {
        match self {
            Self::Primitive(prim) => prim.to_string(),
            Self::Unit => "()".to_string(),
            Self::Named { name, args, .. } => {
                let name = interner.resolve(name);
                if args.is_empty() {
                    name
                } else {
                    format!("{name}<{}>", Self::display_list(args, interner))
                }
            }
            Self::Generic { name } => interner.resolve(name),
            Self::Inferred => "_".to_string(),
            Self::Tuple(elements) => format!("({})", Self::display_list(elements, interner)),
            Self::Reference { mutable, inner } => {
                let prefix = if *mutable { "&mut " } else { "&" };
                format!("{prefix}{}", inner.display(interner))
            }
            Self::Function { params, ret } => format!(
                "fn({}) -> {}",
                Self::display_list(params, interner),
                ret.display(interner)
            ),
        }
    }

    fn display_list(types: &[Self], interner: &Interner) -> String {
        types
            .iter()
            .map(|ty| ty.display(interner))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

use std::fmt;

/// A base type as written in a declaration: qualifiers plus the type name
///
/// `const unsigned long` has qualifiers `["const"]` and names
/// `["unsigned", "long"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NamedType {
    /// Type qualifiers in source order (`const`, `volatile`, ...)
    pub qualifiers: Vec<String>,

    /// Words of the type name (`["unsigned", "int"]`, `["HANDLE"]`)
    pub names: Vec<String>,
}

impl NamedType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            qualifiers: Vec::new(),
            names: vec![name.into()],
        }
    }

    /// Build from a possibly multi-word type name, splitting on whitespace
    pub fn from_words(text: &str) -> Self {
        Self {
            qualifiers: Vec::new(),
            names: text.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifiers.push(qualifier.into());
        self
    }

    /// Qualifiers followed by the type name words, space separated
    pub fn spelling(&self) -> String {
        self.qualifiers
            .iter()
            .chain(self.names.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_void(&self) -> bool {
        self.names.len() == 1 && self.names[0] == "void"
    }
}

/// The shape a declarator resolves to
///
/// Declarators are applied outside-in, so `char *argv[]` is an array of
/// pointers to `char` and `void (*cb)(int)` is a pointer to a function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// Plain named type
    Named(NamedType),
    /// Pointer to the inner shape
    Pointer(Box<TypeShape>),
    /// Array of the inner shape (size is not retained)
    Array(Box<TypeShape>),
    /// Function returning `returns`
    Function {
        returns: Box<TypeShape>,
        params: Vec<ParamDecl>,
    },
    /// struct / union / enum specifier, e.g. `struct point`
    Record(String),
    /// Variadic `...` parameter
    Ellipsis,
    /// Any other type specifier, kept as source text
    Unrecognized(String),
}

impl TypeShape {
    pub fn named(name: impl Into<String>) -> Self {
        TypeShape::Named(NamedType::new(name))
    }

    pub fn pointer_to(inner: TypeShape) -> Self {
        TypeShape::Pointer(Box::new(inner))
    }

    pub fn array_of(inner: TypeShape) -> Self {
        TypeShape::Array(Box::new(inner))
    }

    /// True only for plain `void` (not `void*`)
    pub fn is_void(&self) -> bool {
        matches!(self, TypeShape::Named(t) if t.is_void())
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Named(t) => write!(f, "{}", t.spelling()),
            TypeShape::Pointer(inner) => write!(f, "pointer to {inner}"),
            TypeShape::Array(inner) => write!(f, "array of {inner}"),
            TypeShape::Function { returns, .. } => write!(f, "function returning {returns}"),
            TypeShape::Record(text) => write!(f, "{text}"),
            TypeShape::Ellipsis => write!(f, "..."),
            TypeShape::Unrecognized(text) => write!(f, "unrecognized type `{text}`"),
        }
    }
}

/// Represents a function parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamDecl {
    /// Parameter name (absent in abstract declarators such as `int f(int)`)
    pub name: Option<String>,

    /// Declared shape
    pub shape: TypeShape,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            name: Some(name.into()),
            shape,
        }
    }

    pub fn unnamed(shape: TypeShape) -> Self {
        Self { name: None, shape }
    }
}

/// A function declaration (prototype or definition) found in a header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    /// Function name
    pub name: String,

    /// Parameters in declaration order; `(void)` yields an empty list
    pub params: Vec<ParamDecl>,

    /// Declared return shape
    pub returns: TypeShape,

    /// Line of the declaration (1-indexed)
    pub line: usize,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>, returns: TypeShape) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns,
            line: 0,
        }
    }

    pub fn with_param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

}

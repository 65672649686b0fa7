//! AST-to-XML emitter.
//!
//! Walks the declaration IR and writes one `<Api>` element per function.
//! Each parameter and the return value are reduced to a monitor type string:
//!
//! | declared shape           | type string |
//! |--------------------------|-------------|
//! | `T`                      | `T`         |
//! | `T *`                    | `T*`        |
//! | `T **`                   | `T**`       |
//! | `T name[]`               | `T*`        |
//!
//! where `T` is the qualifiers followed by the base type words. Any other
//! shape stops the run.

use apimon_decl::{FunctionDecl, NamedType, TypeShape};
use std::collections::BTreeSet;
use std::io::Write;

use crate::config::SuccessPolarity;
use crate::error::{Error, Result};
use crate::header::HeaderDescriptor;
use crate::registry::KnownTypes;
use crate::xml::escape_attr;

/// How the monitor decides whether a call succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessHint {
    pub polarity: SuccessPolarity,
}

impl SuccessHint {
    /// Value of the `Return` attribute (`Equal` / `NotEqual`).
    pub fn comparison(&self) -> &'static str {
        self.polarity.comparison()
    }
}

/// Everything written for one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEntry {
    pub name: String,
    /// `(type, name)` pairs in declaration order
    pub params: Vec<(String, String)>,
    pub return_type: String,
    pub success: Option<SuccessHint>,
}

/// Monitor type string for `shape`, or `None` if it has no representation.
pub fn type_string(shape: &TypeShape) -> Option<String> {
    match shape {
        TypeShape::Named(t) => Some(t.spelling()),
        TypeShape::Pointer(inner) => match inner.as_ref() {
            TypeShape::Named(t) => Some(format!("{}*", t.spelling())),
            TypeShape::Pointer(inner) => match inner.as_ref() {
                TypeShape::Named(t) => Some(format!("{}**", t.spelling())),
                _ => None,
            },
            _ => None,
        },
        TypeShape::Array(inner) => match inner.as_ref() {
            TypeShape::Named(t) => Some(format!("{}*", t.spelling())),
            _ => None,
        },
        _ => None,
    }
}

/// Whether a return shape is a plain `BOOL`, qualified or not.
fn returns_bool(shape: &TypeShape) -> bool {
    matches!(
        shape,
        TypeShape::Named(NamedType { names, .. }) if names.first().map(String::as_str) == Some("BOOL")
    )
}

/// Streams `<Api>` elements for one module.
pub struct ApiEmitter<'a> {
    known_types: &'a KnownTypes,
    header: &'a HeaderDescriptor,
    unknown_types: BTreeSet<String>,
}

impl<'a> ApiEmitter<'a> {
    pub fn new(known_types: &'a KnownTypes, header: &'a HeaderDescriptor) -> Self {
        Self {
            known_types,
            header,
            unknown_types: BTreeSet::new(),
        }
    }

    /// Resolve the parameters, return type and success hint of `func`.
    ///
    /// Parameter types missing from the registry are recorded in
    /// [`unknown_types`](Self::unknown_types).
    pub fn describe(&mut self, func: &FunctionDecl) -> Result<ApiEntry> {
        let mut params = Vec::with_capacity(func.params.len());
        for (index, param) in func.params.iter().enumerate() {
            let name = param
                .name
                .clone()
                .unwrap_or_else(|| format!("param{}", index + 1));
            let type_name =
                type_string(&param.shape).ok_or_else(|| Error::UnsupportedParameter {
                    function: func.name.clone(),
                    line: func.line,
                    parameter: name.clone(),
                    shape: param.shape.to_string(),
                })?;

            if !self.known_types.is_defined(&type_name) {
                self.unknown_types.insert(type_name.clone());
            }
            params.push((type_name, name));
        }

        let not_error = self.header.returns_not_error.contains(&func.name);
        let mut return_type =
            type_string(&func.returns).ok_or_else(|| Error::UnsupportedReturn {
                function: func.name.clone(),
                line: func.line,
                shape: func.returns.to_string(),
            })?;
        if not_error && returns_bool(&func.returns) {
            return_type = "int".to_string();
        }

        let success = if func.returns.is_void() || not_error {
            None
        } else {
            Some(SuccessHint {
                polarity: self.header.success,
            })
        };

        Ok(ApiEntry {
            name: func.name.clone(),
            params,
            return_type,
            success,
        })
    }

    pub fn write_api<W: Write>(&self, out: &mut W, entry: &ApiEntry) -> Result<()> {
        writeln!(out, "\t\t<Api Name=\"{}\">", escape_attr(&entry.name))?;
        for (type_name, name) in &entry.params {
            writeln!(
                out,
                "\t\t\t<Param Type=\"{}\" Name=\"{}\" />",
                escape_attr(type_name),
                escape_attr(name)
            )?;
        }
        writeln!(out, "\t\t\t<Return Type=\"{}\" />", escape_attr(&entry.return_type))?;
        if let Some(hint) = entry.success {
            writeln!(
                out,
                "\t\t\t<Success Return=\"{}\" Value=\"0\" />",
                hint.comparison()
            )?;
        }
        writeln!(out, "\t\t</Api>")?;
        Ok(())
    }

    /// Describe and write every function in order; returns how many were written.
    pub fn emit<W: Write>(&mut self, out: &mut W, functions: &[FunctionDecl]) -> Result<usize> {
        for func in functions {
            log::info!("{}", func.name);
            let entry = self.describe(func)?;
            self.write_api(out, &entry)?;
        }
        Ok(functions.len())
    }

    /// Parameter types not found in the registry, sorted.
    pub fn unknown_types(&self) -> &BTreeSet<String> {
        &self.unknown_types
    }

    pub fn into_unknown_types(self) -> BTreeSet<String> {
        self.unknown_types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apimon_decl::ParamDecl;

    fn known() -> KnownTypes {
        KnownTypes::from_xml(
            r#"<ApiMonitor><Headers>
                <Variable Name="INT_PTR" Type="Integer" Size="4" />
                <Variable Name="UINT_PTR" Type="Integer" Size="4" Unsigned="True" />
                <Variable Name="BOOL" Type="Integer" Size="4" />
                <Variable Name="int" Type="Integer" Size="4" />
            </Headers></ApiMonitor>"#,
        )
        .unwrap()
    }

    fn header() -> HeaderDescriptor {
        HeaderDescriptor::for_header(std::path::Path::new("test.h"))
    }

    fn render(header: &HeaderDescriptor, func: &FunctionDecl) -> String {
        let known = known();
        let mut emitter = ApiEmitter::new(&known, header);
        let mut out = Vec::new();
        emitter.emit(&mut out, std::slice::from_ref(func)).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn named(name: &str) -> TypeShape {
        TypeShape::named(name)
    }

    #[test]
    fn test_type_strings() {
        let const_char = TypeShape::Named(NamedType::new("char").with_qualifier("const"));

        assert_eq!(type_string(&named("HANDLE")).as_deref(), Some("HANDLE"));
        assert_eq!(
            type_string(&TypeShape::Named(NamedType::from_words("unsigned long"))).as_deref(),
            Some("unsigned long")
        );
        assert_eq!(
            type_string(&TypeShape::pointer_to(const_char)).as_deref(),
            Some("const char*")
        );
        assert_eq!(
            type_string(&TypeShape::pointer_to(TypeShape::pointer_to(named("void")))).as_deref(),
            Some("void**")
        );
        assert_eq!(
            type_string(&TypeShape::array_of(named("int"))).as_deref(),
            Some("int*")
        );
    }

    #[test]
    fn test_unsupported_type_strings() {
        let char_ptr = TypeShape::pointer_to(named("char"));

        assert!(type_string(&TypeShape::array_of(char_ptr.clone())).is_none());
        assert!(type_string(&TypeShape::pointer_to(TypeShape::pointer_to(char_ptr))).is_none());
        assert!(type_string(&TypeShape::Ellipsis).is_none());
        assert!(type_string(&TypeShape::Record("struct point".to_string())).is_none());
        assert!(type_string(&TypeShape::pointer_to(TypeShape::Function {
            returns: Box::new(named("void")),
            params: Vec::new(),
        }))
        .is_none());
    }

    #[test]
    fn test_bool_returns_true_becomes_int() {
        let func = FunctionDecl::new("Foo", named("BOOL")).with_param(ParamDecl::new("x", named("int")));
        let header = header().with_returns_not_error(["Foo".to_string()]);

        let xml = render(&header, &func);
        assert_eq!(
            xml,
            "\t\t<Api Name=\"Foo\">\n\
             \t\t\t<Param Type=\"int\" Name=\"x\" />\n\
             \t\t\t<Return Type=\"int\" />\n\
             \t\t</Api>\n"
        );
    }

    #[test]
    fn test_qualified_bool_return_becomes_int() {
        let func = FunctionDecl::new(
            "IsReady",
            TypeShape::Named(NamedType::new("BOOL").with_qualifier("const")),
        );
        let header = header().with_returns_not_error(["IsReady".to_string()]);
        let xml = render(&header, &func);

        assert!(xml.contains("<Return Type=\"int\" />"));
        assert!(!xml.contains("<Success"));
    }

    #[test]
    fn test_bool_pointer_return_is_not_downgraded() {
        let func = FunctionDecl::new("Flags", TypeShape::pointer_to(named("BOOL")));
        let header = header().with_returns_not_error(["Flags".to_string()]);
        let xml = render(&header, &func);

        assert!(xml.contains("<Return Type=\"BOOL*\" />"));
    }

    #[test]
    fn test_bool_not_flagged_keeps_bool() {
        let func = FunctionDecl::new("Foo", named("BOOL"));
        let xml = render(&header(), &func);

        assert!(xml.contains("<Return Type=\"BOOL\" />"));
        assert!(xml.contains("<Success Return=\"Equal\" Value=\"0\" />"));
    }

    #[test]
    fn test_override_is_bool_specific() {
        let func = FunctionDecl::new("Count", named("DWORD"));
        let header = header().with_returns_not_error(["Count".to_string()]);
        let xml = render(&header, &func);

        assert!(xml.contains("<Return Type=\"DWORD\" />"));
        assert!(!xml.contains("<Success"));
    }

    #[test]
    fn test_void_function_has_no_success() {
        let func = FunctionDecl::new("Bar", named("void"));
        let xml = render(&header(), &func);

        assert_eq!(
            xml,
            "\t\t<Api Name=\"Bar\">\n\t\t\t<Return Type=\"void\" />\n\t\t</Api>\n"
        );
    }

    #[test]
    fn test_void_pointer_return_has_success() {
        let func = FunctionDecl::new("Alloc", TypeShape::pointer_to(named("void")));
        let xml = render(&header(), &func);

        assert!(xml.contains("<Return Type=\"void*\" />"));
        assert!(xml.contains("<Success Return=\"Equal\" Value=\"0\" />"));
    }

    #[test]
    fn test_nonzero_polarity() {
        let func = FunctionDecl::new("Baz", named("int"))
            .with_param(ParamDecl::new("s", TypeShape::pointer_to(named("char"))));
        let header = header().with_success(SuccessPolarity::NonZero);
        let xml = render(&header, &func);

        assert!(xml.contains("<Param Type=\"char*\" Name=\"s\" />"));
        assert!(xml.contains("<Success Return=\"NotEqual\" Value=\"0\" />"));
    }

    #[test]
    fn test_unnamed_params_are_numbered() {
        let func = FunctionDecl::new("Pair", named("int"))
            .with_param(ParamDecl::unnamed(named("int")))
            .with_param(ParamDecl::new("b", named("int")))
            .with_param(ParamDecl::unnamed(named("int")));

        let known = known();
        let header = header();
        let entry = ApiEmitter::new(&known, &header).describe(&func).unwrap();
        let names: Vec<_> = entry.params.iter().map(|(_, name)| name.as_str()).collect();
        assert_eq!(names, vec!["param1", "b", "param3"]);
    }

    #[test]
    fn test_unknown_types_collected_and_sorted() {
        let func = FunctionDecl::new("Query", named("INT_PTR"))
            .with_param(ParamDecl::new("id", named("UINT_PTR")))
            .with_param(ParamDecl::new("p", TypeShape::pointer_to(named("int"))))
            .with_param(ParamDecl::new("h", named("HANDLE")));

        let known = known();
        let header = header();
        let mut emitter = ApiEmitter::new(&known, &header);
        emitter.describe(&func).unwrap();

        let unknown: Vec<_> = emitter.unknown_types().iter().cloned().collect();
        assert_eq!(unknown, vec!["HANDLE".to_string(), "int*".to_string()]);
    }

    #[test]
    fn test_unsupported_parameter_is_fatal() {
        let func = FunctionDecl {
            line: 42,
            ..FunctionDecl::new("main", named("int"))
        }
        .with_param(ParamDecl::new("argc", named("int")))
        .with_param(ParamDecl::new(
            "argv",
            TypeShape::array_of(TypeShape::pointer_to(named("char"))),
        ));

        let known = known();
        let header = header();
        let result = ApiEmitter::new(&known, &header).describe(&func);

        match result {
            Err(Error::UnsupportedParameter { function, line, parameter, shape }) => {
                assert_eq!(function, "main");
                assert_eq!(line, 42);
                assert_eq!(parameter, "argv");
                assert_eq!(shape, "array of pointer to char");
            }
            other => panic!("Expected UnsupportedParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_variadic_parameter_is_fatal() {
        let func = FunctionDecl::new("Print", named("int"))
            .with_param(ParamDecl::new("fmt", TypeShape::pointer_to(named("char"))))
            .with_param(ParamDecl::unnamed(TypeShape::Ellipsis));

        let known = known();
        let header = header();
        let result = ApiEmitter::new(&known, &header).describe(&func);

        match result {
            Err(Error::UnsupportedParameter { parameter, .. }) => assert_eq!(parameter, "param2"),
            other => panic!("Expected UnsupportedParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_return_is_fatal() {
        let func = FunctionDecl {
            line: 9,
            ..FunctionDecl::new("GetPoint", TypeShape::Record("struct point".to_string()))
        };

        let known = known();
        let header = header();
        let result = ApiEmitter::new(&known, &header).describe(&func);

        assert!(matches!(result, Err(Error::UnsupportedReturn { line: 9, .. })));
    }

    #[test]
    fn test_attribute_values_escaped() {
        let func = FunctionDecl::new("Weird", named("A<B>"));
        let xml = render(&header(), &func);

        assert!(xml.contains("<Return Type=\"A&lt;B&gt;\" />"));
    }
}

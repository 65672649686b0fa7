//! AST visitor for extracting function declarations
//!
//! This visitor traverses the tree-sitter AST and extracts every function
//! prototype and definition reachable from the top level, including those
//! inside `extern "C"` blocks and preprocessor conditionals.
//!
//! Declarators are resolved outside-in, the way C reads them: in
//! `char *argv[]` the `*` wraps the base type first and the `[]` wraps the
//! result, giving an array of pointers to `char`.

use apimon_decl::{FunctionDecl, NamedType, ParamDecl, TypeShape};
use tree_sitter::Node;

pub struct DeclVisitor<'a> {
    pub source: &'a [u8],
    pub functions: Vec<FunctionDecl>,
}

impl<'a> DeclVisitor<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            functions: Vec::new(),
        }
    }

    fn node_text(&self, node: Node) -> String {
        node.utf8_text(self.source).unwrap_or("").to_string()
    }

    pub fn visit_node(&mut self, node: Node) {
        // Skip ERROR nodes - tree-sitter marks unparseable sections as ERROR
        // We continue visiting children to extract what we can
        if node.is_error() {
            self.visit_children(node);
            return;
        }

        match node.kind() {
            "declaration" => self.visit_declaration(node),
            "function_definition" => self.visit_function_definition(node),
            // Typedefs name types, including function pointer types
            "type_definition" => {}
            // Bodies and aggregate members never declare exported functions
            "compound_statement" | "field_declaration_list" | "enumerator_list" => {}
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit_node(child);
        }
    }

    fn visit_declaration(&mut self, node: Node) {
        let base = self.base_type(node);

        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();

        for declarator in declarators {
            // `int x = 1;` declares a variable
            if declarator.kind() == "init_declarator" {
                continue;
            }
            self.record_function(node, declarator, base.clone());
        }
    }

    fn visit_function_definition(&mut self, node: Node) {
        let base = self.base_type(node);
        if let Some(declarator) = node.child_by_field_name("declarator") {
            self.record_function(node, declarator, base);
        }
    }

    /// Resolve a top-level declarator and keep it if it names a function
    fn record_function(&mut self, decl_node: Node, declarator: Node, base: TypeShape) {
        let (name, shape) = self.resolve_declarator(declarator, base);

        // Function pointer variables resolve to Pointer(Function) and are skipped
        if let (Some(name), TypeShape::Function { returns, params }) = (name, shape) {
            self.functions.push(FunctionDecl {
                name,
                params,
                returns: *returns,
                line: decl_node.start_position().row + 1,
            });
        }
    }

    /// Base type of a declaration or parameter, with its qualifiers
    fn base_type(&self, node: Node) -> TypeShape {
        let mut qualifiers = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "type_qualifier" {
                qualifiers.push(self.node_text(child));
            }
        }

        let Some(type_node) = node.child_by_field_name("type") else {
            return TypeShape::Unrecognized(self.node_text(node));
        };

        match type_node.kind() {
            "primitive_type" | "type_identifier" | "sized_type_specifier" => {
                let mut named = NamedType::from_words(&self.node_text(type_node));
                named.qualifiers = qualifiers;
                TypeShape::Named(named)
            }
            "struct_specifier" | "union_specifier" | "enum_specifier" => {
                let keyword = type_node.kind().trim_end_matches("_specifier");
                let name = type_node
                    .child_by_field_name("name")
                    .map(|n| self.node_text(n))
                    .unwrap_or_else(|| "<anonymous>".to_string());
                TypeShape::Record(format!("{keyword} {name}"))
            }
            _ => TypeShape::Unrecognized(self.node_text(type_node).trim().to_string()),
        }
    }

    /// Apply a declarator to `base`, returning the declared name (if any)
    /// and the resulting shape
    fn resolve_declarator(&self, node: Node, base: TypeShape) -> (Option<String>, TypeShape) {
        match node.kind() {
            "identifier" | "field_identifier" | "type_identifier" => {
                (Some(self.node_text(node)), base)
            }
            "pointer_declarator" | "abstract_pointer_declarator" => {
                self.resolve_inner(node, TypeShape::pointer_to(base))
            }
            "array_declarator" | "abstract_array_declarator" => {
                self.resolve_inner(node, TypeShape::array_of(base))
            }
            "function_declarator" | "abstract_function_declarator" => {
                let params = node
                    .child_by_field_name("parameters")
                    .map(|p| self.extract_parameters(p))
                    .unwrap_or_default();
                let shape = TypeShape::Function {
                    returns: Box::new(base),
                    params,
                };
                self.resolve_inner(node, shape)
            }
            "parenthesized_declarator"
            | "abstract_parenthesized_declarator"
            | "attributed_declarator" => match self.nested_declarator(node) {
                Some(inner) => self.resolve_declarator(inner, base),
                None => (None, base),
            },
            _ => (None, TypeShape::Unrecognized(self.node_text(node))),
        }
    }

    fn resolve_inner(&self, node: Node, shape: TypeShape) -> (Option<String>, TypeShape) {
        match node.child_by_field_name("declarator") {
            Some(inner) => self.resolve_declarator(inner, shape),
            None => (None, shape),
        }
    }

    /// The declarator wrapped by a parenthesized or attributed declarator
    fn nested_declarator<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
        children.into_iter().rev().find(|child| {
            let kind = child.kind();
            kind.ends_with("declarator") || kind == "identifier" || kind == "field_identifier"
        })
    }

    fn extract_parameters(&self, node: Node) -> Vec<ParamDecl> {
        let mut parameters = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "parameter_declaration" => parameters.push(self.extract_parameter(child)),
                "variadic_parameter" | "..." => parameters.push(ParamDecl::unnamed(TypeShape::Ellipsis)),
                _ => {}
            }
        }

        // `(void)` declares no parameters
        if let [only] = parameters.as_slice() {
            if only.name.is_none()
                && matches!(&only.shape, TypeShape::Named(t) if t.is_void() && t.qualifiers.is_empty())
            {
                parameters.clear();
            }
        }

        parameters
    }

    fn extract_parameter(&self, node: Node) -> ParamDecl {
        let base = self.base_type(node);
        let (name, shape) = match node.child_by_field_name("declarator") {
            Some(declarator) => self.resolve_declarator(declarator, base),
            None => (None, base),
        };
        ParamDecl { name, shape }
    }
}

//! Header preprocessing layer
//!
//! Windows SDK style headers are full of macros that only make sense after a
//! real preprocessor has run: calling conventions (`WINAPI`), export markers
//! (`WINBASEAPI`), `__declspec(...)` and SAL annotations (`_In_`,
//! `_Out_writes_(n)`). tree-sitter sees them as stray identifiers and gives up
//! on the declaration. This layer does not expand macros; it removes the
//! known decorations so the remaining text is plain C.
//!
//! Key strategies:
//! 1. Directive stripping: `#define`, `#pragma`, ... become comments
//! 2. C++ guard removal: `#ifdef __cplusplus` branches are blanked
//! 3. Annotation stripping: SAL, `__declspec`, `__attribute__` with arguments
//! 4. Word stripping: calling-convention, export and attribute macros

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Known macro patterns and their semantic meaning
#[derive(Debug, Clone, PartialEq)]
pub enum MacroKind {
    /// Type-like macro that expands to a type or keyword: CONST, STDAPI
    TypeAlias,
    /// Calling convention: WINAPI, __stdcall, CALLBACK
    CallingConvention,
    /// Import/export linkage marker: WINBASEAPI, DECLSPEC_IMPORT
    Export,
    /// Attribute macro: FAR, IN, OPTIONAL, __declspec
    Attribute,
    /// SAL source annotation: _In_, _Out_writes_bytes_
    Annotation,
    /// Generic macro call
    Generic,
}

const CALLING_CONVENTIONS: &[&str] = &[
    "WINAPI",
    "WINAPIV",
    "APIENTRY",
    "APIPRIVATE",
    "CALLBACK",
    "PASCAL",
    "NTAPI",
    "WSAAPI",
    "STDAPICALLTYPE",
    "STDAPIVCALLTYPE",
    "STDMETHODCALLTYPE",
    "STDMETHODVCALLTYPE",
    "CDECL",
    "__stdcall",
    "_stdcall",
    "__cdecl",
    "_cdecl",
    "__fastcall",
    "_fastcall",
    "__thiscall",
    "__vectorcall",
    "__clrcall",
];

const EXPORT_MACROS: &[&str] = &[
    "WINBASEAPI",
    "WINUSERAPI",
    "WINADVAPI",
    "WINGDIAPI",
    "WINSHELLAPI",
    "WINMMAPI",
    "WINSOCK_API_LINKAGE",
    "NTSYSAPI",
    "NTSYSCALLAPI",
    "DECLSPEC_IMPORT",
    "DECLSPEC_EXPORT",
    "DECLSPEC_NORETURN",
    "DECLSPEC_ALLOCATOR",
    "DECLSPEC_NOTHROW",
];

const ATTRIBUTE_MACROS: &[&str] = &[
    "FAR",
    "NEAR",
    "IN",
    "OUT",
    "OPTIONAL",
    "UNALIGNED",
    "FORCEINLINE",
    "__forceinline",
    "__ptr32",
    "__ptr64",
    "__unaligned",
    "__restrict",
    "__RPC_FAR",
    "__RPC_USER",
    "__RPC_STUB",
    "__RPC_API",
    "__callback",
];

/// Attributes that always carry a parenthesised argument list
const ARGUMENT_ATTRIBUTES: &[&str] = &[
    "__declspec",
    "_declspec",
    "__attribute__",
    "__pragma",
    "DECLSPEC_DEPRECATED",
];

const SAL_STEMS: &str = "In|Out|Inout|Outptr|Outref|Deref|Ret|Pre|Post|Success|Must_inspect_result|\
Check_return|Frees_ptr|Reserved|Field|Printf_format_string|Null_terminated|When|\
Use_decl_annotations|Analysis|Struct_size_bytes|Acquires|Releases|Requires|\
Interlocked_operand|Result_nullonfailure|Result_zeroonfailure|Notnull|Maybenull|\
Null|Readable|Writable|Always|Kernel|IRQL|Dispatch";

// Regex patterns compiled once
static RE_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:{}|__drv_\w+|_(?:{SAL_STEMS})(?:_[A-Za-z0-9]+)*_|__(?:in|out|inout|deref|reserved|checkReturn|success)(?:_[a-z0-9_]+)?)\b",
        ARGUMENT_ATTRIBUTES.join("|")
    ))
    .unwrap()
});
static RE_SAL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:__drv_\w+|_(?:{SAL_STEMS})(?:_[A-Za-z0-9]+)*_|__(?:in|out|inout|deref|reserved|checkReturn|success)(?:_[a-z0-9_]+)?)$"
    ))
    .unwrap()
});
static RE_STDAPI_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bSTDAPI_\s*\(\s*([^()]*?)\s*\)").unwrap());
static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap());
static RE_CPLUSPLUS_GUARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#\s*(?:(ifdef|ifndef)\s+__cplusplus\b|if\s+(!)?\s*defined\s*\(?\s*__cplusplus\b)").unwrap()
});

/// State of a `#if` frame in the C++ guard tracker
#[derive(Debug, Clone, Copy, PartialEq)]
enum GuardFrame {
    /// Ordinary conditional, left for tree-sitter
    Other,
    /// `__cplusplus` guard, currently in the C++ branch
    CplusplusBranch,
    /// `__cplusplus` guard, currently in the C branch
    CBranch,
}

/// Header preprocessor for better parsing
pub struct CPreprocessor {
    /// Type-like macros and their expansions
    type_macros: HashMap<String, String>,
    /// Plain words removed from the source, with their kind
    stripped_macros: HashMap<String, MacroKind>,
}

impl Default for CPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl CPreprocessor {
    pub fn new() -> Self {
        let mut preprocessor = Self {
            type_macros: HashMap::new(),
            stripped_macros: HashMap::new(),
        };
        preprocessor.init_windows_macros();
        preprocessor
    }

    /// Initialize Windows SDK macros
    fn init_windows_macros(&mut self) {
        for (macro_name, expansion) in [
            ("CONST", "const"),
            ("VOID", "void"),
            ("EXTERN_C", "extern"),
            ("STDAPI", "HRESULT"),
            ("STDMETHODIMP", "HRESULT"),
        ] {
            self.type_macros
                .insert(macro_name.to_string(), expansion.to_string());
        }

        for (names, kind) in [
            (CALLING_CONVENTIONS, MacroKind::CallingConvention),
            (EXPORT_MACROS, MacroKind::Export),
            (ATTRIBUTE_MACROS, MacroKind::Attribute),
        ] {
            for name in names {
                self.stripped_macros.insert(name.to_string(), kind.clone());
            }
        }
    }

    /// Check if an identifier is a known type macro
    pub fn is_type_macro(&self, name: &str) -> bool {
        self.type_macros.contains_key(name)
    }

    /// Classify a macro by name
    pub fn classify_macro(&self, name: &str) -> MacroKind {
        if self.is_type_macro(name) {
            MacroKind::TypeAlias
        } else if let Some(kind) = self.stripped_macros.get(name) {
            kind.clone()
        } else if ARGUMENT_ATTRIBUTES.contains(&name) {
            MacroKind::Attribute
        } else if RE_SAL_TOKEN.is_match(name) {
            MacroKind::Annotation
        } else {
            MacroKind::Generic
        }
    }

    /// Preprocess source code to make it parseable
    ///
    /// Line structure is preserved so tree-sitter positions still point at
    /// the original header lines. Text inside block comments is passed
    /// through untouched.
    pub fn preprocess(&self, source: &str) -> String {
        let mut result = String::with_capacity(source.len());
        let mut frames: Vec<GuardFrame> = Vec::new();
        let mut in_continuation = false;
        let mut in_comment = false;

        for line in source.lines() {
            let starts_in_comment = in_comment;
            in_comment = comment_open_after(line, starts_in_comment);
            let skipping = frames.contains(&GuardFrame::CplusplusBranch);

            // Continuation lines of a stripped multi-line directive
            if in_continuation {
                in_continuation = line.trim_end().ends_with('\\');
                result.push_str(comment_bridge(starts_in_comment, in_comment));
                result.push('\n');
                continue;
            }

            if starts_in_comment {
                match line.find("*/") {
                    None => result.push_str(line),
                    Some(close) => {
                        let (comment, rest) = line.split_at(close + 2);
                        result.push_str(comment);
                        if skipping {
                            result.push_str(comment_bridge(false, in_comment));
                        } else {
                            result.push_str(&self.process_line(rest));
                        }
                    }
                }
                result.push('\n');
                continue;
            }

            let trimmed = line.trim();
            let is_directive = trimmed.starts_with('#');
            let processed = if is_directive {
                self.process_directive(trimmed, line, &mut frames, skipping)
            } else if skipping {
                String::new()
            } else {
                self.process_line(line)
            };

            if is_directive && trimmed.ends_with('\\') && processed != line {
                in_continuation = true;
            }

            if processed.is_empty() {
                result.push_str(comment_bridge(false, in_comment));
            } else {
                result.push_str(&processed);
            }
            result.push('\n');
        }

        result
    }

    /// Handle a preprocessor directive line, tracking `__cplusplus` guards
    fn process_directive(
        &self,
        trimmed: &str,
        line: &str,
        frames: &mut Vec<GuardFrame>,
        skipping: bool,
    ) -> String {
        let directive = trimmed[1..].trim_start();

        if directive.starts_with("if") {
            let frame = match RE_CPLUSPLUS_GUARD.captures(trimmed) {
                Some(caps) => {
                    let negated = caps.get(1).map(|m| m.as_str()) == Some("ifndef")
                        || caps.get(2).is_some();
                    if negated {
                        GuardFrame::CBranch
                    } else {
                        GuardFrame::CplusplusBranch
                    }
                }
                None => GuardFrame::Other,
            };
            frames.push(frame);
            return if frame == GuardFrame::Other && !skipping {
                line.to_string()
            } else {
                String::new()
            };
        }

        if directive.starts_with("else") || directive.starts_with("elif") {
            if let Some(top) = frames.last_mut() {
                match *top {
                    GuardFrame::CplusplusBranch => {
                        *top = GuardFrame::CBranch;
                        return String::new();
                    }
                    GuardFrame::CBranch => {
                        *top = GuardFrame::CplusplusBranch;
                        return String::new();
                    }
                    GuardFrame::Other => {}
                }
            }
            return if skipping { String::new() } else { line.to_string() };
        }

        if directive.starts_with("endif") {
            let frame = frames.pop();
            return match frame {
                Some(GuardFrame::Other) | None if !skipping => line.to_string(),
                _ => String::new(),
            };
        }

        if skipping {
            return String::new();
        }

        // Handle #include - keep as-is (tree-sitter handles these)
        if directive.starts_with("include") {
            return line.to_string();
        }

        // Strip macro definitions and pragmas; tree-sitter chokes on
        // function-like macros mid-declaration
        String::new()
    }

    /// Process a single line of C
    fn process_line(&self, line: &str) -> String {
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with("//") {
            return line.to_string();
        }

        // STDAPI_(BOOL) -> BOOL
        let mut result = RE_STDAPI_TYPE.replace_all(line, "$1").into_owned();

        // Annotations, with their argument list when present
        while let Some((start, name_end)) = RE_ANNOTATION.find(&result).map(|m| (m.start(), m.end())) {
            let end = argument_end(&result, name_end);
            result.replace_range(start..end, "");
        }

        // Plain macro words
        RE_WORD
            .replace_all(&result, |caps: &regex::Captures| {
                let Some(found) = caps.get(0) else {
                    return String::new();
                };
                let word = found.as_str();
                match self.stripped_macros.get(word) {
                    Some(MacroKind::Attribute)
                        if is_parameter_name(&result, found.start(), found.end()) =>
                    {
                        word.to_string()
                    }
                    Some(_) => String::new(),
                    None => self
                        .type_macros
                        .get(word)
                        .cloned()
                        .unwrap_or_else(|| word.to_string()),
                }
            })
            .into_owned()
    }
}

/// Whether a block comment is still open at the end of `line`
fn comment_open_after(line: &str, mut in_comment: bool) -> bool {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if in_comment {
            if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                in_comment = false;
                i += 2;
                continue;
            }
        } else {
            match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'/') => break,
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    in_comment = true;
                    i += 2;
                    continue;
                }
                quote @ (b'"' | b'\'') => {
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        if bytes[i] == b'\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    in_comment
}

/// Replacement for a removed line that keeps the comment state unchanged
fn comment_bridge(starts_in_comment: bool, ends_in_comment: bool) -> &'static str {
    match (starts_in_comment, ends_in_comment) {
        (false, true) => "/*",
        (true, false) => "*/",
        _ => "",
    }
}

/// Whether the word at `start..end` is the declarator of a parameter, as
/// `OUT` in `(int OUT)` or `FAR` in `(char *FAR, ...)`, rather than a macro
fn is_parameter_name(text: &str, start: usize, end: usize) -> bool {
    let next = text[end..].trim_start().chars().next();
    if !matches!(next, Some(',' | ')' | '[')) {
        return false;
    }

    let before = text[..start].trim_end();
    if before.ends_with('*') || before.ends_with('&') {
        return true;
    }

    // A single type word between the list delimiter and this word
    let head = before.trim_end_matches(|c: char| c.is_alphanumeric() || c == '_');
    if head.len() == before.len() {
        return false;
    }
    matches!(head.trim_end().chars().last(), Some('(' | ','))
}

/// End of an annotation starting before `from`: past its balanced
/// parenthesised arguments if they follow on the same line, else `from`
fn argument_end(text: &str, from: usize) -> usize {
    let rest = &text[from..];
    let offset = rest.len() - rest.trim_start().len();
    if !rest[offset..].starts_with('(') {
        return from;
    }

    let open = from + offset;
    let mut depth = 0;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return open + i + 1;
                }
            }
            _ => {}
        }
    }

    // Unbalanced on this line: drop only the name
    from
}

//! Static completion lexicons.

/// Completion entry category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompletionKind {
    /// Language keyword.
    Keyword,
    /// Type name.
    Type,
    /// Function or method.
    Function,
    /// Variable (including words collected from the document).
    Variable,
    /// Property or field.
    Property,
    /// Code snippet.
    Snippet,
    /// Constant value.
    Constant,
    /// Module or namespace.
    Module,
}

/// A group of lexicon words sharing a kind and a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexiconGroup {
    /// Kind reported for every word in the group.
    pub kind: CompletionKind,
    /// Short description shown next to each word (e.g. `"keyword"`).
    pub description: &'static str,
    /// Words, in presentation order.
    pub words: &'static [&'static str],
}

pub(crate) const CSHARP: &[LexiconGroup] = &[
    LexiconGroup {
        kind: CompletionKind::Keyword,
        description: "keyword",
        words: &[
            "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
            "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
            "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
            "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is",
            "lock", "long", "namespace", "new", "null", "object", "operator", "out", "override",
            "params", "private", "protected", "public", "readonly", "ref", "return", "sbyte",
            "sealed", "short", "sizeof", "stackalloc", "static", "string", "struct", "switch",
            "this", "throw", "true", "try", "typeof", "uint", "ulong", "unchecked", "unsafe",
            "ushort", "using", "var", "virtual", "void", "volatile", "while", "yield", "async",
            "await", "dynamic", "nameof", "when", "where",
        ],
    },
    LexiconGroup {
        kind: CompletionKind::Type,
        description: "type",
        words: &[
            "Boolean", "Byte", "Char", "DateTime", "Decimal", "Double", "Guid", "Int16", "Int32",
            "Int64", "Object", "SByte", "Single", "String", "TimeSpan", "UInt16", "UInt32",
            "UInt64", "List", "Dictionary", "IEnumerable", "Task", "Action", "Func", "Tuple",
            "Array", "Console", "Math", "Exception", "StringBuilder", "HashSet", "Queue", "Stack",
            "IDisposable", "IComparable", "EventArgs", "Nullable",
        ],
    },
    LexiconGroup {
        kind: CompletionKind::Function,
        description: "method",
        words: &[
            "Console.WriteLine", "Console.ReadLine", "string.IsNullOrEmpty", "string.Format",
            "Math.Max", "Math.Min", "Math.Abs", "ToString", "GetType", "Equals", "GetHashCode",
        ],
    },
];

pub(crate) const PYTHON: &[LexiconGroup] = &[
    LexiconGroup {
        kind: CompletionKind::Keyword,
        description: "keyword",
        words: &[
            "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
            "continue", "def", "del", "elif", "else", "except", "finally", "for", "from",
            "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass",
            "raise", "return", "try", "while", "with", "yield",
        ],
    },
    LexiconGroup {
        kind: CompletionKind::Function,
        description: "builtin",
        words: &[
            "abs", "all", "any", "bin", "bool", "chr", "dict", "dir", "enumerate", "eval", "exec",
            "filter", "float", "format", "getattr", "globals", "hasattr", "hash", "hex", "id",
            "input", "int", "isinstance", "issubclass", "iter", "len", "list", "locals", "map",
            "max", "min", "next", "object", "oct", "open", "ord", "pow", "print", "property",
            "range", "repr", "reversed", "round", "set", "setattr", "slice", "sorted",
            "staticmethod", "str", "sum", "super", "tuple", "type", "vars", "zip",
        ],
    },
];

pub(crate) const JAVASCRIPT: &[LexiconGroup] = &[
    LexiconGroup {
        kind: CompletionKind::Keyword,
        description: "keyword",
        words: &[
            "break", "case", "catch", "class", "const", "continue", "debugger", "default",
            "delete", "do", "else", "enum", "export", "extends", "finally", "for", "function",
            "if", "import", "in", "instanceof", "let", "new", "of", "return", "super", "switch",
            "this", "throw", "try", "typeof", "var", "void", "while", "with", "yield", "async",
            "await", "from", "as", "static", "get", "set",
        ],
    },
    LexiconGroup {
        kind: CompletionKind::Type,
        description: "builtin",
        words: &[
            "console", "document", "window", "Array", "Object", "String", "Number", "Boolean",
            "Function", "Symbol", "Map", "Set", "Promise", "RegExp", "Date", "Error", "JSON",
            "Math", "parseInt", "parseFloat", "isNaN", "isFinite", "setTimeout", "setInterval",
            "clearTimeout", "clearInterval", "fetch", "require", "module", "exports",
        ],
    },
    LexiconGroup {
        kind: CompletionKind::Constant,
        description: "constant",
        words: &["undefined", "null", "true", "false", "NaN", "Infinity"],
    },
    LexiconGroup {
        kind: CompletionKind::Function,
        description: "method",
        words: &[
            "console.log", "console.error", "console.warn", "JSON.stringify", "JSON.parse",
            "Array.isArray", "Object.keys", "Object.values", "Object.entries", "Promise.all",
            "Promise.resolve", "Promise.reject", "addEventListener", "removeEventListener",
            "querySelector", "querySelectorAll",
        ],
    },
];

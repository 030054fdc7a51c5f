//! `codepad-highlight-simple` - built-in regex rulesets for `codepad-core`.
//!
//! Each ruleset is an ordered list of [`SyntaxRule`]s in a dark palette: earlier rules win
//! overlapping characters, so comments and strings come first. Patterns run over the whole
//! document, which lets block comments, doc strings and template literals span lines.
//!
//! ```
//! use codepad_core::{Editor, EditorConfig, Language};
//!
//! let ruleset = codepad_highlight_simple::builtin(Language::CSharp).unwrap();
//! let config = EditorConfig::for_language(Language::CSharp).with_ruleset(ruleset);
//! let mut editor = Editor::with_text("int x = 1; // one", config).unwrap();
//! assert!(editor.color_runs_for_line(0).len() > 1);
//! ```

use codepad_core::{Color, FontStyle, Ruleset, RulesetError, SyntaxRule, TextStyle};
use codepad_lang::Language;

/// Palette shared by the built-in rulesets.
pub mod palette {
    use codepad_core::Color;

    pub const COMMENT: Color = Color::rgb(106, 153, 85);
    pub const STRING: Color = Color::rgb(206, 145, 120);
    pub const KEYWORD: Color = Color::rgb(86, 156, 214);
    pub const TYPE: Color = Color::rgb(78, 201, 176);
    pub const NUMBER: Color = Color::rgb(181, 206, 168);
    pub const FUNCTION: Color = Color::rgb(220, 220, 170);
    pub const PREPROCESSOR: Color = Color::rgb(155, 155, 155);
    pub const PROPERTY: Color = Color::rgb(156, 220, 254);
}

/// Names accepted by [`ruleset_by_name`] (canonical spellings).
pub const BUILTIN_NAMES: &[&str] = &["C#", "Python", "JavaScript", "JSON", "INI", "Plain Text"];

const CSHARP_KEYWORDS: &str = r"\b(?:abstract|as|base|bool|break|byte|case|catch|char|checked|class|const|continue|decimal|default|delegate|do|double|else|enum|event|explicit|extern|false|finally|fixed|float|for|foreach|goto|if|implicit|in|int|interface|internal|is|lock|long|namespace|new|null|object|operator|out|override|params|private|protected|public|readonly|ref|return|sbyte|sealed|short|sizeof|stackalloc|static|string|struct|switch|this|throw|true|try|typeof|uint|ulong|unchecked|unsafe|ushort|using|var|virtual|void|volatile|while|yield|async|await|dynamic|nameof|when|where)\b";

const CSHARP_TYPES: &str = r"\b(?:Boolean|Byte|Char|DateTime|Decimal|Double|Guid|Int16|Int32|Int64|Object|SByte|Single|String|TimeSpan|UInt16|UInt32|UInt64|List|Dictionary|IEnumerable|Task|Action|Func|Tuple|Array|Console|Math|Exception)\b";

const PYTHON_KEYWORDS: &str = r"\b(?:False|None|True|and|as|assert|async|await|break|class|continue|def|del|elif|else|except|finally|for|from|global|if|import|in|is|lambda|nonlocal|not|or|pass|raise|return|try|while|with|yield)\b";

const PYTHON_BUILTINS: &str = r"\b(?:abs|all|any|bin|bool|chr|dict|dir|enumerate|eval|exec|filter|float|format|getattr|globals|hasattr|hash|hex|id|input|int|isinstance|issubclass|iter|len|list|locals|map|max|min|next|object|oct|open|ord|pow|print|property|range|repr|reversed|round|set|setattr|slice|sorted|staticmethod|str|sum|super|tuple|type|vars|zip)\b";

const JAVASCRIPT_KEYWORDS: &str = r"\b(?:break|case|catch|class|const|continue|debugger|default|delete|do|else|enum|export|extends|finally|for|function|if|import|in|instanceof|let|new|of|return|super|switch|this|throw|try|typeof|var|void|while|with|yield|async|await|from|as|static|get|set)\b";

const JAVASCRIPT_BUILTINS: &str = r"\b(?:console|document|window|Array|Object|String|Number|Boolean|Function|Symbol|Map|Set|Promise|RegExp|Date|Error|JSON|Math|parseInt|parseFloat|isNaN|isFinite|setTimeout|setInterval|clearTimeout|clearInterval|fetch|require|module|exports)\b";

const DOUBLE_QUOTED: &str = r#""(?:[^"\\\n]|\\.)*""#;
const QUOTED: &str = r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'"#;
const C_COMMENT: &str = r"//.*$|/\*[\s\S]*?\*/";

fn plain(color: Color) -> TextStyle {
    TextStyle::new(color)
}

fn styled(color: Color, font: FontStyle) -> TextStyle {
    TextStyle::with_font(color, font)
}

/// C#: comments, verbatim strings, attributes and preprocessor lines.
pub fn csharp() -> Result<Ruleset, RulesetError> {
    let mut rs = Ruleset::new("C#").with_line_comment("//");
    rs.add_rule("Comment", C_COMMENT, styled(palette::COMMENT, FontStyle::ITALIC))?
        .add_rule(
            "String",
            r#""(?:[^"\\\n]|\\.)*"|@"(?:""|[^"])*""#,
            plain(palette::STRING),
        )?
        .add_rule("Char", r"'(?:[^'\\]|\\.)'", plain(palette::STRING))?
        .add_rule("Keyword", CSHARP_KEYWORDS, styled(palette::KEYWORD, FontStyle::BOLD))?
        .add_rule("Type", CSHARP_TYPES, plain(palette::TYPE))?
        .add_rule(
            "Number",
            r"\b\d+\.?\d*[fFdDmMlLuU]?\b|0x[0-9a-fA-F]+\b",
            plain(palette::NUMBER),
        )?
        .add_rule("Attribute", r"\[\w+(?:\(.*?\))?\]", plain(palette::TYPE))?
        .add_rule("Preprocessor", r"^[ \t]*#[ \t]*\w+.*$", plain(palette::PREPROCESSOR))?;
    Ok(rs)
}

/// Python: doc strings span lines, `self` is italic.
pub fn python() -> Result<Ruleset, RulesetError> {
    let mut rs = Ruleset::new("Python").with_line_comment("#");
    rs.add_rule("Comment", r"#.*$", styled(palette::COMMENT, FontStyle::ITALIC))?
        .add_rule(
            "DocString",
            r#""""[\s\S]*?"""|'''[\s\S]*?'''"#,
            styled(palette::STRING, FontStyle::ITALIC),
        )?
        .add_rule("String", QUOTED, plain(palette::STRING))?
        .add_rule("Keyword", PYTHON_KEYWORDS, styled(palette::KEYWORD, FontStyle::BOLD))?
        .add_rule("Builtin", PYTHON_BUILTINS, plain(palette::FUNCTION))?
        .add_rule("Decorator", r"@\w+(?:\.\w+)*", plain(palette::FUNCTION))?
        .add_rule(
            "Number",
            r"\b\d+\.?\d*[jJ]?\b|0[xXoObB][0-9a-fA-F]+\b",
            plain(palette::NUMBER),
        )?
        .add_rule("Self", r"\bself\b", styled(palette::KEYWORD, FontStyle::ITALIC))?;
    Ok(rs)
}

/// JavaScript: template literals keep `${...}` interpolations in the default style.
pub fn javascript() -> Result<Ruleset, RulesetError> {
    let mut rs = Ruleset::new("JavaScript").with_line_comment("//");
    rs.add_rule("Comment", C_COMMENT, styled(palette::COMMENT, FontStyle::ITALIC))?;
    rs.push(
        SyntaxRule::new(
            "TemplateString",
            r"`(?:[^`\\$]|\\.|\$\{[^}]*\}|\$)*`",
            plain(palette::STRING),
        )?
        .with_exclusion(r"\$\{[^}]*\}")?,
    );
    rs.add_rule("String", QUOTED, plain(palette::STRING))?
        .add_rule("Keyword", JAVASCRIPT_KEYWORDS, styled(palette::KEYWORD, FontStyle::BOLD))?
        .add_rule(
            "Boolean",
            r"\b(?:true|false|null|undefined|NaN|Infinity)\b",
            plain(palette::KEYWORD),
        )?
        .add_rule(
            "Number",
            r"\b\d+\.?\d*(?:e[+-]?\d+)?\b|0x[0-9a-fA-F]+\b",
            plain(palette::NUMBER),
        )?
        .add_rule("Builtin", JAVASCRIPT_BUILTINS, plain(palette::TYPE))?
        .add_rule("Arrow", r"=>", plain(palette::KEYWORD))?;
    Ok(rs)
}

/// JSON: object keys are told apart from string values.
pub fn json() -> Result<Ruleset, RulesetError> {
    let rs = Ruleset::new("JSON")
        .with_rule(
            SyntaxRule::new(
                "Key",
                &format!(r"{DOUBLE_QUOTED}[ \t]*:"),
                plain(palette::PROPERTY),
            )?
            // The colon itself stays in the default style.
            .with_exclusion(r"[ \t]*:\z")?,
        )
        .with_rule(SyntaxRule::new("String", DOUBLE_QUOTED, plain(palette::STRING))?)
        .with_rule(SyntaxRule::new(
            "Number",
            r"-?\b(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?\b",
            plain(palette::NUMBER),
        )?)
        .with_rule(SyntaxRule::new(
            "Literal",
            r"\b(?:true|false|null)\b",
            plain(palette::KEYWORD),
        )?);
    Ok(rs)
}

/// INI: sections, keys and `;`/`#` comment lines.
pub fn ini() -> Result<Ruleset, RulesetError> {
    let rs = Ruleset::new("INI")
        .with_line_comment(";")
        .with_rule(SyntaxRule::new(
            "Comment",
            r"^[ \t]*[;#].*$",
            styled(palette::COMMENT, FontStyle::ITALIC),
        )?)
        .with_rule(SyntaxRule::new(
            "Section",
            r"^[ \t]*\[[^\]\n]+\]",
            styled(palette::KEYWORD, FontStyle::BOLD),
        )?)
        .with_rule(
            SyntaxRule::new("Key", r"^[ \t]*[^=;#\[\s][^=\n]*=", plain(palette::PROPERTY))?
                .with_exclusion(r"[ \t]*=\z")?,
        );
    Ok(rs)
}

/// No rules; everything in the default style.
pub fn plain_text() -> Ruleset {
    Ruleset::plain_text()
}

/// The built-in ruleset for `language`.
pub fn builtin(language: Language) -> Result<Ruleset, RulesetError> {
    match language {
        Language::CSharp => csharp(),
        Language::Python => python(),
        Language::JavaScript => javascript(),
        Language::PlainText => Ok(plain_text()),
    }
}

/// Look up a built-in ruleset by language name or common alias, ignoring case.
pub fn ruleset_by_name(name: &str) -> Result<Ruleset, RulesetError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "c#" | "csharp" | "cs" => csharp(),
        "python" | "py" => python(),
        "javascript" | "js" => javascript(),
        "json" => json(),
        "ini" => ini(),
        "plain text" | "plaintext" | "text" | "txt" => Ok(plain_text()),
        _ => Err(RulesetError::UnknownRuleset(name.to_string())),
    }
}

//! General-purpose highlighting for assembly, LLVM IR and lowered AST output

use std::sync::LazyLock;

use regex::Regex;

use super::escape_html;

const KEYWORDS: &str = concat!(
    // LLVM IR
    "define|declare|call|invoke|ret|br|switch|alloca|load|store|getelementptr|icmp|fcmp|phi|",
    "select|add|sub|mul|sdiv|udiv|and|or|xor|shl|lshr|ashr|bitcast|zext|sext|trunc|",
    "private|internal|global|constant|unnamed_addr|nounwind|",
    // x86 mnemonics
    "mov|movzx|movsx|lea|push|pop|jmp|je|jne|jz|jnz|jl|jle|jg|jge|cmp|test|inc|dec|",
    "imul|idiv|nop|leave|syscall|",
    // D
    "import|module|void|int|uint|long|ulong|char|string|bool|auto|return|struct|class|",
    "if|else|for|foreach|while|static|immutable|const|enum|alias|template|pure|nothrow"
);

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r#"(?m)(?P<comment>;[^\n]*|//[^\n]*)|(?P<string>"(?:[^"\\\n]|\\.)*")|(?P<label>^[ \t]*[A-Za-z_.$][\w.$@]*:)|(?P<directive>\.[A-Za-z_][\w.]*)|(?P<register>[%@][\w.$-]+)|(?P<number>\b(?:0x[0-9a-fA-F]+|[0-9]+(?:\.[0-9]+)?)\b)|(?P<keyword>\b(?:{})\b)"#,
        KEYWORDS
    );
    Regex::new(&pattern).expect("highlight pattern is valid")
});

const KINDS: [&str; 7] = [
    "comment",
    "string",
    "label",
    "directive",
    "register",
    "number",
    "keyword",
];

/// Highlight the whole text; every token becomes `<span class="hl-KIND">`
pub fn highlight(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut last = 0;

    for caps in TOKEN.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let Some(kind) = KINDS.iter().find(|k| caps.name(k).is_some()) else {
            continue;
        };
        out.push_str(&escape_html(&text[last..whole.start()]));
        out.push_str(&format!(
            "<span class=\"hl-{}\">{}</span>",
            kind,
            escape_html(whole.as_str())
        ));
        last = whole.end();
    }

    out.push_str(&escape_html(&text[last..]));
    out
}

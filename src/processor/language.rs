//! Language detection and comment stripping
//!
//! Static pattern-table lookups with no coordination: extension first, then
//! a shebang sniff of the first line. Comment stripping is best-effort and
//! string-literal aware.

use std::path::Path;

/// Detect the language of a file from its name and leading content.
/// Falls back to `"unknown"`.
pub fn detect_language(filename: &str, content: &[u8]) -> String {
    detect_by_extension(filename)
        .or_else(|| detect_by_shebang(content))
        .unwrap_or("unknown")
        .to_string()
}

fn detect_by_extension(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
    let lang = match ext.as_str() {
        "go" => "go",
        "py" => "python",
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "rb" => "ruby",
        "php" => "php",
        "java" => "java",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "c" | "h" => "c",
        "cs" => "csharp",
        "rs" => "rust",
        "swift" => "swift",
        "kt" | "kts" => "kotlin",
        "scala" => "scala",
        "r" => "r",
        "sh" | "bash" | "zsh" | "fish" => "shell",
        "pl" | "pm" => "perl",
        "lua" => "lua",
        "sql" => "sql",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" | "sass" => "scss",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "xml" => "xml",
        "md" | "markdown" => "markdown",
        "txt" => "text",
        _ => return None,
    };
    Some(lang)
}

fn detect_by_shebang(content: &[u8]) -> Option<&'static str> {
    let first_line = content.split(|&b| b == b'\n').next()?;
    let first_line = std::str::from_utf8(first_line).ok()?;
    if !first_line.starts_with("#!") {
        return None;
    }

    const SHEBANGS: &[(&str, &str)] = &[
        ("python", "python"),
        ("node", "javascript"),
        ("ruby", "ruby"),
        ("perl", "perl"),
        ("bash", "shell"),
        ("zsh", "shell"),
        ("sh", "shell"),
    ];

    SHEBANGS
        .iter()
        .find(|(needle, _)| first_line.contains(needle))
        .map(|&(_, lang)| lang)
}

/// Comment syntax for one language family.
struct CommentStyle {
    line: &'static [&'static str],
    block: Option<(&'static str, &'static str)>,
}

fn style_for(language: &str) -> CommentStyle {
    match language {
        "c" | "cpp" | "csharp" | "go" | "java" | "javascript" | "typescript" | "rust"
        | "swift" | "kotlin" | "scala" | "php" | "css" | "scss" => CommentStyle {
            line: &["//"],
            block: Some(("/*", "*/")),
        },
        "python" | "ruby" | "shell" | "perl" | "r" | "yaml" | "toml" => CommentStyle {
            line: &["#"],
            block: None,
        },
        "sql" | "lua" => CommentStyle {
            line: &["--"],
            block: None,
        },
        "html" | "xml" => CommentStyle {
            line: &[],
            block: Some(("<!--", "-->")),
        },
        // Generic fallback: common line-comment markers only.
        _ => CommentStyle {
            line: &["//", "#"],
            block: None,
        },
    }
}

/// Strip comments from source content, best-effort.
///
/// String literals are respected so markers inside them survive. Content
/// that is not valid UTF-8 is returned untouched.
pub fn strip_comments(content: &[u8], language: &str) -> Vec<u8> {
    let Ok(text) = std::str::from_utf8(content) else {
        return content.to_vec();
    };
    let style = style_for(language);
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    let mut string_delim: Option<u8> = None;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(delim) = string_delim {
            out.push(b);
            if b == b'\\' && i + 1 < bytes.len() {
                out.push(bytes[i + 1]);
                i += 2;
                continue;
            }
            if b == delim {
                string_delim = None;
            }
            i += 1;
            continue;
        }

        if b == b'"' || b == b'\'' || b == b'`' {
            string_delim = Some(b);
            out.push(b);
            i += 1;
            continue;
        }

        if let Some((open, close)) = style.block {
            if bytes[i..].starts_with(open.as_bytes()) {
                match find(&bytes[i + open.len()..], close.as_bytes()) {
                    Some(end) => {
                        i += open.len() + end + close.len();
                        continue;
                    }
                    None => break, // unterminated block comment swallows the rest
                }
            }
        }

        if style
            .line
            .iter()
            .any(|marker| bytes[i..].starts_with(marker.as_bytes()))
        {
            // Drop through end of line, keeping the newline itself.
            match find(&bytes[i..], b"\n") {
                Some(end) => {
                    i += end;
                    continue;
                }
                None => break,
            }
        }

        out.push(b);
        i += 1;
    }

    out
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

//! Source normalization applied before lexing.
//!
//! Strips `//` line comments and `/* */` block comments, drops blank lines
//! and trims every remaining line. Line breaks between surviving lines are
//! kept so they still separate tokens.

/// Run every preprocessing step over `input`.
pub fn preprocess(input: &str) -> String {
    trim_lines(&remove_empty_lines(&remove_comments(input)))
}

/// Remove line and block comments.
///
/// A block comment ends at the first `*/`. An unterminated `/*` is left in
/// place and will be rejected by the lexer.
pub fn remove_comments(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(ch) = rest.chars().next() {
        if rest.starts_with("/*") {
            if let Some(end) = rest[2..].find("*/") {
                rest = &rest[2 + end + 2..];
                continue;
            }
        }

        if rest.starts_with("//") {
            let end = rest.find(['\n', '\r']).unwrap_or(rest.len());
            rest = &rest[end..];
            continue;
        }

        output.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    output
}

/// Drop lines made of nothing but spaces and tabs.
pub fn remove_empty_lines(input: &str) -> String {
    input
        .lines()
        .filter(|line| !line.chars().all(|c| c == ' ' || c == '\t'))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trim leading and trailing whitespace from every line.
pub fn trim_lines(input: &str) -> String {
    input.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}

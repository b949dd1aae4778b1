//! Static discovery of imported module names.
//!
//! The scanner tokenizes Python source just far enough to recover `import`
//! and `from … import` statements without executing anything: string
//! literals are blanked, comments dropped, and bracket/backslash
//! continuations folded into logical lines. Sources that cannot be
//! tokenized (unterminated strings, unbalanced brackets, malformed import
//! statements) are *indeterminate*; callers treat that the same as "nothing
//! to install".

/// Scan source text for imported module names, in discovery order.
///
/// Returns `None` when the source is indeterminate. Duplicate module names
/// are reported once, at their first occurrence.
pub fn scan_imports(source: &str) -> Option<Vec<String>> {
    let mut modules = Vec::new();
    for line in logical_lines(source)? {
        for statement in line.split(';') {
            collect_from_statement(statement.trim(), &mut modules)?;
        }
    }
    Some(modules)
}

/// Fold physical lines into logical lines: strings blanked, comments
/// stripped, bracketed and backslash-continued lines joined. `None` when
/// tokenization fails.
fn logical_lines(source: &str) -> Option<Vec<String>> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut depth: u32 = 0;
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '#' => {
                // Comment runs to end of line; the newline itself still
                // terminates the logical line below.
                while matches!(chars.peek(), Some(c) if *c != '\n') {
                    chars.next();
                }
            }
            '\'' | '"' => consume_string(ch, &mut chars)?,
            '(' | '[' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' => {
                depth = depth.checked_sub(1)?;
                current.push(ch);
            }
            '\\' => {
                // Outside a string a backslash is only legal as a line
                // continuation.
                match chars.next() {
                    Some('\n') => current.push(' '),
                    Some('\r') if chars.peek() == Some(&'\n') => {
                        chars.next();
                        current.push(' ');
                    }
                    _ => return None,
                }
            }
            '\n' if depth == 0 => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
            '\n' => current.push(' '),
            _ => current.push(ch),
        }
    }

    if depth != 0 {
        return None;
    }
    if !current.trim().is_empty() {
        lines.push(current);
    }
    Some(lines)
}

/// Consume a string literal whose opening quote was just read. Handles
/// triple quotes and escapes; `None` on an unterminated literal.
fn consume_string(quote: char, chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<()> {
    let mut triple = false;
    if chars.peek() == Some(&quote) {
        chars.next();
        if chars.peek() == Some(&quote) {
            chars.next();
            triple = true;
        } else {
            // Empty short string.
            return Some(());
        }
    }

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                chars.next()?;
            }
            '\n' if !triple => return None,
            c if c == quote => {
                if !triple {
                    return Some(());
                }
                if chars.peek() == Some(&quote) {
                    chars.next();
                    if chars.peek() == Some(&quote) {
                        chars.next();
                        return Some(());
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// Append the modules named by one simple statement, if it is an import.
/// `None` when the statement looks like an import but is malformed.
fn collect_from_statement(statement: &str, modules: &mut Vec<String>) -> Option<()> {
    let mut tokens = statement.split_whitespace();
    match tokens.next() {
        Some("import") => {
            let rest = statement["import".len()..].trim();
            if rest.is_empty() {
                return None;
            }
            for clause in rest.split(',') {
                let mut parts = clause.split_whitespace();
                let module = parts.next().filter(|name| is_module_name(name))?;
                match (parts.next(), parts.next(), parts.next()) {
                    (None, ..) => {}
                    (Some("as"), Some(alias), None) if is_module_name(alias) => {}
                    _ => return None,
                }
                push_unique(modules, module);
            }
            Some(())
        }
        Some("from") => {
            let module = tokens.next()?;
            if tokens.next() != Some("import") {
                return None;
            }
            if module.starts_with('.') {
                // Relative import; nothing installable to discover.
                return Some(());
            }
            if !is_module_name(module) {
                return None;
            }
            push_unique(modules, module);
            Some(())
        }
        _ => Some(()),
    }
}

fn push_unique(modules: &mut Vec<String>, module: &str) {
    if !modules.iter().any(|seen| seen == module) {
        modules.push(module.to_string());
    }
}

fn is_module_name(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}

//! Context formatter
//!
//! Renders an ancestor line as a short snippet. Two shapes of line matter:
//!
//! - control-flow headers (`if `, `while `, ...): the condition is kept but long
//!   identifiers are cut and the whole snippet is capped,
//! - everything else is treated as a possible declaration and kept up to the
//!   first `(` that follows what still looks like a name, so `void Foo::bar(int)`
//!   shows as `void Foo::bar(`.

use crate::config::FormatOptions;
use crate::types::ChainEntry;

/// Punctuation that can appear in a qualified or decorated name before its `(`
const NAME_PUNCTUATION: [char; 7] = [':', '.', '*', '&', '<', '>', '~'];

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Does `text` start with one of `keywords` followed by whitespace?
#[must_use]
pub fn is_control_flow(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| {
        text.strip_prefix(keyword.as_str())
            .and_then(|rest| rest.chars().next())
            .is_some_and(char::is_whitespace)
    })
}

fn strip_prefixes<'t>(mut text: &'t str, prefixes: &[String]) -> &'t str {
    while let Some(rest) = prefixes
        .iter()
        .filter(|prefix| !prefix.is_empty())
        .find_map(|prefix| text.strip_prefix(prefix.as_str()))
    {
        text = rest;
    }
    text
}

/// Abbreviate one line of content. Never fails; invalid UTF-8 is replaced.
#[must_use]
pub fn render_snippet(content: &[u8], options: &FormatOptions) -> String {
    let decoded = String::from_utf8_lossy(content);
    let is_control = is_control_flow(&decoded, &options.control_keywords);
    let text = strip_prefixes(&decoded, &options.strip_prefixes);

    let mut out = String::new();
    let mut rendered = 0usize;
    let mut run_len = 0usize;
    let mut pending_space = false;
    let mut name_mode = !is_control;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch.is_whitespace() || ch.is_control() {
            run_len = 0;
            pending_space = true;
            continue;
        }
        if ch == '/' && chars.peek() == Some(&'/') {
            break;
        }

        if std::mem::take(&mut pending_space) && !out.is_empty() {
            if is_control && rendered + 1 >= options.max_control_len {
                break;
            }
            out.push(' ');
            rendered += 1;
        }

        if is_ident_char(ch) {
            if !is_control || run_len < options.max_ident_len {
                out.push(ch);
                rendered += 1;
            } else if run_len == options.max_ident_len {
                out.push(options.truncation_marker);
                rendered += 1;
            }
            run_len = run_len.saturating_add(1);
        } else {
            out.push(ch);
            rendered += 1;
            run_len = 0;
            if name_mode {
                if ch == '(' {
                    break;
                }
                if !NAME_PUNCTUATION.contains(&ch) {
                    name_mode = false;
                }
            }
        }

        if is_control && rendered >= options.max_control_len {
            break;
        }
    }

    out
}

/// Render a chain entry as `..<line>: <snippet>`
#[must_use]
pub fn format_entry(entry: &ChainEntry, buffer: &[u8], options: &FormatOptions) -> String {
    format!(
        "..{}: {}",
        entry.line_number(),
        render_snippet(entry.span.slice(buffer), options)
    )
}

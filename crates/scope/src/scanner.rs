//! Line scanner
//!
//! Splits a byte buffer into logical lines and classifies each one. The buffer
//! is never modified; every line is described by a [`TextSpan`] into it.
//!
//! Scanning is a small state machine driven one byte at a time:
//!
//! ```text
//!   AtLineStart ──(first non-blank byte)──> resume state (Normal | InBlockComment)
//!   Normal ──"/*"──> InBlockComment ──"*/"──> Normal
//!   Normal ──'"'──> InString ──'"'──> Normal
//!   Normal ──"//"──> (rest of line ignored)
//! ```
//!
//! Only `InBlockComment` survives a line break; string literals end with the line.

use crate::config::ScopeConfig;
use crate::types::{LineKind, ScanWarning, TextSpan};
use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// `ident:` alone on a line, optionally followed by a line comment
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u)^([A-Za-z_][A-Za-z0-9_]*)[ \t]*:[ \t\r]*(?://.*)?$")
        .expect("label pattern is valid")
});

/// Words followed by `:` that are never labels
const SWITCH_HEADERS: [&str; 2] = ["case", "default"];

/// Number of lines in `buffer`: one per `\n`, plus a final unterminated line
#[must_use]
pub fn count_lines(buffer: &[u8]) -> usize {
    let newlines = buffer.iter().filter(|&&b| b == b'\n').count();
    match buffer.last().copied() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

/// A line as produced by the scanner, before resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScannedLine {
    /// Column of the first content byte; meaningless for blank lines
    pub indentation: u32,
    pub span: TextSpan,
    pub kind: LineKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Measuring indentation
    AtLineStart,
    Normal,
    InBlockComment,
    InString { quote: u8 },
}

/// Iterator over the lines of a buffer
pub(crate) struct LineScanner<'a> {
    buffer: &'a [u8],
    pos: usize,
    line: u32,
    tab_width: u32,
    label_exempt: &'a [String],
    /// State the next line's content starts in
    resume: ScanState,
    /// Previous line was a directive ending in a backslash
    directive_continues: bool,
    warnings: Vec<ScanWarning>,
}

impl<'a> LineScanner<'a> {
    /// The buffer length must already have been checked to fit a `u32`
    pub(crate) fn new(buffer: &'a [u8], config: &'a ScopeConfig) -> Self {
        Self {
            buffer,
            pos: 0,
            line: 0,
            tab_width: config.tab_width.max(1),
            label_exempt: &config.label_exempt_keywords,
            resume: ScanState::Normal,
            directive_continues: false,
            warnings: Vec::new(),
        }
    }

    /// Warnings collected so far
    pub(crate) fn take_warnings(&mut self) -> Vec<ScanWarning> {
        std::mem::take(&mut self.warnings)
    }

    fn scan_line(&mut self, start: usize, end: usize) -> ScannedLine {
        let buffer = self.buffer;
        let bytes = &buffer[start..end];
        let continued_directive = std::mem::take(&mut self.directive_continues);

        let mut state = ScanState::AtLineStart;
        let mut column: u32 = 0;
        let mut content_start = bytes.len();
        let mut first_code: Option<usize> = None;
        let resumed_in_comment = self.resume == ScanState::InBlockComment;
        let mut saw_comment = resumed_in_comment;
        let mut directive = false;
        let mut code_end = bytes.len();

        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            let next = bytes.get(i + 1).copied();
            match state {
                ScanState::AtLineStart => match b {
                    b' ' => column += 1,
                    b'\t' => column = (column / self.tab_width + 1) * self.tab_width,
                    b'\r' => {}
                    _ => {
                        content_start = i;
                        state = self.resume;
                        directive = continued_directive
                            || (b == b'#' && state == ScanState::Normal);
                        // reprocess this byte in the resumed state
                        continue;
                    }
                },
                ScanState::InBlockComment => {
                    if b == b'*' && next == Some(b'/') {
                        state = ScanState::Normal;
                        i += 2;
                        continue;
                    }
                }
                ScanState::InString { quote } => {
                    if b == b'\\' {
                        i += 2;
                        continue;
                    }
                    if b == quote {
                        state = ScanState::Normal;
                    }
                }
                ScanState::Normal => {
                    if b == b'/' && next == Some(b'/') {
                        saw_comment = true;
                        code_end = i;
                        break;
                    }
                    if b == b'/' && next == Some(b'*') {
                        saw_comment = true;
                        state = ScanState::InBlockComment;
                        i += 2;
                        continue;
                    }
                    if first_code.is_none() && !matches!(b, b'\t' | b'\r' | b' ') {
                        first_code = Some(i);
                    }
                    match b {
                        b'"' => state = ScanState::InString { quote: b },
                        b'\'' => {
                            if let Some(len) = char_literal_len(&bytes[i..]) {
                                i += len;
                                continue;
                            }
                            // a lone apostrophe (lifetime, prose) stays plain content
                            if bytes[i + 1..].contains(&b'\'') {
                                state = ScanState::InString { quote: b };
                            }
                        }
                        0 => self.warn(ScanWarning::EmbeddedNul { line: self.line }),
                        b if b < 0x20 && b != b'\t' && b != b'\r' => {
                            self.warn(ScanWarning::ControlByte {
                                line: self.line,
                                byte: b,
                            });
                        }
                        _ => {}
                    }
                }
            }
            i += 1;
        }

        // strings do not span lines; a block comment does
        self.resume = match state {
            ScanState::InBlockComment => ScanState::InBlockComment,
            ScanState::AtLineStart => self.resume,
            _ => ScanState::Normal,
        };

        let has_code = first_code.is_some();

        // a line closing a block comment starts at the code after `*/`
        if let Some(first) = first_code.filter(|_| resumed_in_comment) {
            column = visual_column(&bytes[..first], self.tab_width);
            content_start = first;
        }

        let span = TextSpan::new(
            (start + content_start) as u32,
            (bytes.len() - content_start) as u32,
        );
        let content = &bytes[content_start..];
        let code = &bytes[content_start..code_end.max(content_start)];

        let kind = if !has_code {
            if saw_comment {
                LineKind::Comment
            } else {
                LineKind::Blank
            }
        } else if directive {
            self.directive_continues = content.trim_ascii_end().ends_with(b"\\");
            LineKind::Preprocessor
        } else if self.is_label(content) {
            LineKind::Label
        } else if code.trim_ascii() == b"{" {
            LineKind::Brace
        } else {
            LineKind::Code
        };

        ScannedLine {
            indentation: column,
            span,
            kind,
        }
    }

    fn is_label(&self, content: &[u8]) -> bool {
        let Some(caps) = LABEL_RE.captures(content) else {
            return false;
        };
        let word = &caps[1];
        !SWITCH_HEADERS.iter().any(|kw| kw.as_bytes() == word)
            && !self.label_exempt.iter().any(|kw| kw.as_bytes() == word)
    }

    fn warn(&mut self, warning: ScanWarning) {
        log::debug!("line {}: {warning}", warning.line());
        self.warnings.push(warning);
    }
}

impl Iterator for LineScanner<'_> {
    type Item = ScannedLine;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.buffer.len() {
            return None;
        }

        let start = self.pos;
        let (mut end, next_pos) = match self.buffer[start..].iter().position(|&b| b == b'\n') {
            Some(off) => (start + off, start + off + 1),
            None => (self.buffer.len(), self.buffer.len()),
        };
        // "\r\n" ends a line; a lone '\r' is content
        if next_pos > end && end > start && self.buffer[end - 1] == b'\r' {
            end -= 1;
        }

        self.line += 1;
        self.pos = next_pos;
        Some(self.scan_line(start, end))
    }
}

/// Column reached after `prefix`, tabs expanded and UTF-8 continuation bytes skipped
fn visual_column(prefix: &[u8], tab_width: u32) -> u32 {
    prefix.iter().fold(0, |column, &b| match b {
        b'\t' => (column / tab_width + 1) * tab_width,
        b'\r' | 0x80..=0xBF => column,
        _ => column + 1,
    })
}

/// Length of a character literal such as `'x'` or `'\n'` at the start of `bytes`.
/// Returns `None` for a lone apostrophe (lifetimes, prose).
fn char_literal_len(bytes: &[u8]) -> Option<usize> {
    match *bytes.get(1)? {
        b'\\' => {
            let close = bytes.iter().skip(2).take(10).position(|&b| b == b'\'')?;
            Some(close + 3)
        }
        lead => {
            let width = utf8_width(lead);
            (bytes.get(1 + width) == Some(&b'\'')).then_some(width + 2)
        }
    }
}

const fn utf8_width(lead: u8) -> usize {
    match lead {
        0xF0..=0xF7 => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}

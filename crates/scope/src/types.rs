use serde::{Deserialize, Serialize};

/// Byte range of a line's content inside the analyzed buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    /// Offset of the first content byte (after indentation)
    pub offset: u32,

    /// Number of content bytes, terminator excluded
    pub len: u32,
}

impl TextSpan {
    #[must_use]
    pub const fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }

    /// Slice the buffer; out-of-bounds spans yield an empty slice
    #[must_use]
    pub fn slice(self, buffer: &[u8]) -> &[u8] {
        let start = self.offset as usize;
        let end = start.saturating_add(self.len as usize);
        buffer.get(start..end).unwrap_or_default()
    }
}

/// What the scanner found on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Line with code outside comments
    Code,
    /// Code consisting of a lone `{`; opens a scope but says nothing about it
    Brace,
    /// Empty or whitespace-only line
    Blank,
    /// Only comments (line, block, or the interior of a block comment)
    Comment,
    /// `#` directive or a backslash continuation of one
    Preprocessor,
    /// `ident:` on its own, such as `public:` or a goto target
    Label,
}

impl LineKind {
    /// Only code lines (braces included) take part in the indentation stack
    #[must_use]
    pub const fn is_eligible(self) -> bool {
        matches!(self, Self::Code | Self::Brace)
    }
}

/// One logical line after resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Column of the first non-whitespace byte, tabs expanded
    pub indentation: u32,

    /// Index of the nearest enclosing ancestor line, always earlier than this one
    pub outer: Option<u32>,

    /// Content after the indentation
    pub span: TextSpan,

    pub kind: LineKind,
}

impl LineRecord {
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        self.kind.is_eligible()
    }
}

/// Non-fatal problem noticed while scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanWarning {
    /// Non-printable control byte outside comments and literals (1-based line)
    ControlByte { line: u32, byte: u8 },
    /// NUL byte; kept as ordinary content, line counting is unaffected
    EmbeddedNul { line: u32 },
}

impl ScanWarning {
    #[must_use]
    pub const fn line(self) -> u32 {
        match self {
            Self::ControlByte { line, .. } | Self::EmbeddedNul { line } => line,
        }
    }
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ControlByte { byte, .. } => write!(
                f,
                "unexpected non-printable character 0x{byte:02x} encountered"
            ),
            Self::EmbeddedNul { .. } => f.write_str("embedded NUL byte treated as content"),
        }
    }
}

/// An ancestor reported for a queried line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    /// 0-based line index
    pub index: u32,
    pub indentation: u32,
    pub span: TextSpan,
}

impl ChainEntry {
    #[must_use]
    pub const fn new(index: u32, record: &LineRecord) -> Self {
        Self {
            index,
            indentation: record.indentation,
            span: record.span,
        }
    }

    /// 1-based line number
    #[must_use]
    pub const fn line_number(&self) -> u64 {
        self.index as u64 + 1
    }
}

/// Ancestors of one line, outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextChain {
    pub entries: Vec<ChainEntry>,

    /// Some ancestors were left out because they sit within the proximity window
    pub elided: bool,
}

impl ContextChain {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && !self.elided
    }
}

use crate::chain::context_chain;
use crate::config::ScopeConfig;
use crate::error::{Result, ScopeError};
use crate::formatter::format_entry;
use crate::resolver::resolve;
use crate::scanner::{count_lines, LineScanner};
use crate::types::{ContextChain, LineKind, LineRecord, ScanWarning};
use serde::Serialize;
use std::fmt::Write as _;

/// Largest buffer a span offset can address
pub const MAX_BUFFER_BYTES: u64 = u32::MAX as u64;

/// Largest number of lines a line index can address
pub const MAX_LINES: u64 = i32::MAX as u64;

/// Marker appended when nearby ancestors were left out
pub const ELISION_MARKER: &str = "...";

fn check_limits(bytes: u64, lines: u64) -> Result<()> {
    if bytes > MAX_BUFFER_BYTES {
        return Err(ScopeError::InputTooLarge {
            bytes,
            max: MAX_BUFFER_BYTES,
        });
    }
    if lines > MAX_LINES {
        return Err(ScopeError::TooManyLines {
            lines,
            max: MAX_LINES,
        });
    }
    Ok(())
}

/// Scan and resolve `buffer`.
///
/// All-or-nothing: either every line gets a record or an error is returned.
pub fn analyze<'a>(buffer: &'a [u8], config: &ScopeConfig) -> Result<Analysis<'a>> {
    config.validate().map_err(ScopeError::invalid_config)?;

    let line_count = count_lines(buffer);
    check_limits(buffer.len() as u64, line_count as u64)?;

    let mut scanner = LineScanner::new(buffer, config);
    let records = resolve(scanner.by_ref(), line_count);
    let warnings = scanner.take_warnings();
    debug_assert_eq!(records.len(), line_count);

    log::debug!(
        "analyzed {} lines ({} bytes, {} warnings)",
        records.len(),
        buffer.len(),
        warnings.len()
    );

    Ok(Analysis {
        buffer,
        records,
        warnings,
        config: config.clone(),
    })
}

/// Resolved line hierarchy of one buffer
#[derive(Debug, Clone)]
pub struct Analysis<'a> {
    buffer: &'a [u8],
    records: Vec<LineRecord>,
    warnings: Vec<ScanWarning>,
    config: ScopeConfig,
}

impl<'a> Analysis<'a> {
    #[must_use]
    pub fn records(&self) -> &[LineRecord] {
        &self.records
    }

    #[must_use]
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    #[must_use]
    pub const fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.records.len()
    }

    /// Context chain of the 0-based line `index`
    pub fn chain(&self, index: usize) -> Result<ContextChain> {
        context_chain(&self.records, index, self.config.proximity_window)
    }

    /// Chain of the 0-based line `index` as `..<line>: <snippet>` tokens,
    /// followed by `...` when nearby ancestors were elided
    pub fn render_line(&self, index: usize) -> Result<String> {
        let chain = self.chain(index)?;
        Ok(self.render_chain(&chain))
    }

    fn render_chain(&self, chain: &ContextChain) -> String {
        let mut out = String::new();
        for entry in &chain.entries {
            out.push_str(&format_entry(entry, self.buffer, &self.config.format));
        }
        if chain.elided {
            out.push_str(ELISION_MARKER);
        }
        out
    }

    /// Every line as `<line>: <outer line>: <indentation>: <chain>\n`
    #[must_use]
    pub fn render_all(&self) -> String {
        let mut out = String::new();
        for (index, record) in self.records.iter().enumerate() {
            let chain = self.chain(index).unwrap_or_default();
            let _ = writeln!(
                out,
                "{}: {}: {}: {}",
                index + 1,
                record.outer.map_or(0, |outer| u64::from(outer) + 1),
                record.indentation,
                self.render_chain(&chain)
            );
        }
        out
    }

    /// Answer a query for a 1-based `line`; `0` means every line
    pub fn render_query(&self, line: u32) -> Result<String> {
        match line {
            0 => Ok(self.render_all()),
            line => self.render_line(line as usize - 1),
        }
    }

    /// Structured view of one 0-based line, for machine-readable output
    pub fn report(&self, index: usize) -> Result<LineReport> {
        let chain = self.chain(index)?;
        let record = &self.records[index];
        let entries = chain
            .entries
            .iter()
            .map(|entry| ReportEntry {
                line: entry.line_number(),
                indentation: entry.indentation,
                snippet: crate::formatter::render_snippet(
                    entry.span.slice(self.buffer),
                    &self.config.format,
                ),
            })
            .collect();

        Ok(LineReport {
            line: index as u64 + 1,
            outer_line: record.outer.map(|outer| u64::from(outer) + 1),
            indentation: record.indentation,
            kind: record.kind,
            chain: entries,
            elided: chain.elided,
        })
    }

    /// Reports for every line, or for the 1-based `line` only
    pub fn reports(&self, line: u32) -> Result<Vec<LineReport>> {
        match line {
            0 => (0..self.records.len()).map(|index| self.report(index)).collect(),
            line => Ok(vec![self.report(line as usize - 1)?]),
        }
    }
}

/// One line and its context, as emitted by `--json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineReport {
    /// 1-based line number
    pub line: u64,
    /// 1-based line number of the direct outer line
    pub outer_line: Option<u64>,
    pub indentation: u32,
    pub kind: LineKind,
    pub chain: Vec<ReportEntry>,
    pub elided: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub line: u64,
    pub indentation: u32,
    pub snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NESTED: &str = "namespace Foo {\n    void bar() {\n        while (x) {\n            y();\n        }\n    }\n}\n";

    #[test]
    fn renders_nested_chain() {
        let config = ScopeConfig::unfiltered();
        let analysis = analyze(NESTED.as_bytes(), &config).unwrap();
        assert_eq!(
            analysis.render_query(4).unwrap(),
            "..1: Foo {..2: void bar(..3: while (x) {"
        );
    }

    #[test]
    fn nearby_chain_collapses_to_marker() {
        let analysis = analyze(NESTED.as_bytes(), &ScopeConfig::default()).unwrap();
        assert_eq!(analysis.render_query(4).unwrap(), "...");
        assert_eq!(analysis.render_query(1).unwrap(), "");
    }

    #[test]
    fn all_lines_mode() {
        let text = "a {\n    b;\n    c {\n        d;\n}\n";
        let analysis = analyze(text.as_bytes(), &ScopeConfig::unfiltered()).unwrap();
        assert_eq!(
            analysis.render_query(0).unwrap(),
            "1: 0: 0: \n2: 1: 4: ..1: a {\n3: 1: 4: ..1: a {\n4: 3: 8: ..1: a {..3: c {\n5: 0: 0: \n"
        );
    }

    #[test]
    fn query_out_of_range_is_rejected() {
        let analysis = analyze(b"a\nb\n", &ScopeConfig::default()).unwrap();
        assert!(matches!(
            analysis.render_query(3),
            Err(ScopeError::IndexOutOfRange { line: 3, line_count: 2 })
        ));
        assert!(analysis.report(2).is_err());
    }

    #[test]
    fn empty_buffer_has_no_lines() {
        let analysis = analyze(b"", &ScopeConfig::default()).unwrap();
        assert_eq!(analysis.line_count(), 0);
        assert_eq!(analysis.render_query(0).unwrap(), "");
        assert!(analysis.render_query(1).is_err());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ScopeConfig {
            tab_width: 0,
            ..Default::default()
        };
        assert!(matches!(
            analyze(b"x", &config),
            Err(ScopeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn limits() {
        assert!(check_limits(MAX_BUFFER_BYTES, MAX_LINES).is_ok());
        assert!(matches!(
            check_limits(MAX_BUFFER_BYTES + 1, 1),
            Err(ScopeError::InputTooLarge { .. })
        ));
        assert!(matches!(
            check_limits(10, MAX_LINES + 1),
            Err(ScopeError::TooManyLines { .. })
        ));
    }

    #[test]
    fn warnings_are_collected() {
        let analysis = analyze(b"a\x1b;\nb;\n", &ScopeConfig::default()).unwrap();
        assert_eq!(
            analysis.warnings(),
            &[ScanWarning::ControlByte { line: 1, byte: 0x1b }]
        );
    }

    #[test]
    fn report_serializes() {
        let analysis = analyze(NESTED.as_bytes(), &ScopeConfig::unfiltered()).unwrap();
        let report = analysis.report(3).unwrap();
        assert_eq!(report.line, 4);
        assert_eq!(report.outer_line, Some(3));
        assert_eq!(report.chain.len(), 3);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "code");
        assert_eq!(json["chain"][1]["snippet"], "void bar(");
        assert_eq!(json["elided"], false);
    }

    #[test]
    fn reports_cover_every_line() {
        let analysis = analyze(b"a\n  b\n  c\n", &ScopeConfig::default()).unwrap();
        assert_eq!(analysis.reports(0).unwrap().len(), 3);
        assert_eq!(analysis.reports(2).unwrap()[0].line, 2);
    }
}

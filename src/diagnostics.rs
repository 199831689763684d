use crate::scanner::token::{Token, TokenType};

/// One collected error, with the raw message, its anchor position, and the
/// fully rendered block shown to the user.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub friendly: String,
    pub snippet: Option<String>,
}

/// Accumulates lexical, syntactic, and runtime errors for one pipeline run.
///
/// The sink is an explicit value threaded through the scanner, parser, and
/// interpreter; independent runs never share one.
#[derive(Debug, Default)]
pub struct Diagnostics {
    source_lines: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(source: &str) -> Self {
        Diagnostics {
            source_lines: source.lines().map(str::to_string).collect(),
            diagnostics: Vec::new(),
        }
    }

    /// Record an error with the friendly framing and, when the position is
    /// known, a source snippet with a caret under the offending column.
    pub fn report(&mut self, message: impl Into<String>, line: usize, column: usize) {
        self.report_expected(message, line, column, None, None);
    }

    pub fn report_expected(
        &mut self,
        message: impl Into<String>,
        line: usize,
        column: usize,
        expected: Option<&str>,
        found: Option<&str>,
    ) {
        let message = message.into();

        let mut friendly = format!("I found an error on line {}", line);
        if column > 0 {
            friendly.push_str(&format!(", column {}", column));
        }
        friendly.push_str(".\n");

        match (expected, found) {
            (Some(expected), Some(found)) => {
                friendly.push_str(&format!(
                    "   I was expecting {}, but found '{}' instead.\n",
                    expected, found
                ));
            }
            (Some(expected), None) => {
                friendly.push_str(&format!("   I was expecting {}.\n", expected));
            }
            _ => {
                friendly.push_str(&format!("   {}\n", message));
            }
        }

        let snippet = self.render_snippet(line, column);
        if let Some(ref snippet) = snippet {
            friendly.push_str(snippet);
        }

        self.diagnostics.push(Diagnostic {
            message,
            line,
            column,
            friendly,
            snippet,
        });
    }

    /// Frame a parse failure around the token that broke the grammar.
    pub fn report_unexpected_token(&mut self, token: &Token, expected: &str) {
        let found = if token.token_type == TokenType::Eof {
            "end of file"
        } else {
            &token.lexeme
        };
        let found = found.to_string();
        self.report_expected(
            format!("Unexpected token: {}", token.lexeme),
            token.line,
            token.column,
            Some(expected),
            Some(&found),
        );
    }

    /// Runtime failures get a shorter frame and no snippet.
    pub fn report_runtime(&mut self, message: impl Into<String>, line: usize, column: usize) {
        let message = message.into();
        let friendly = format!("Runtime error on line {}:\n   {}\n", line, message);
        self.diagnostics.push(Diagnostic {
            message,
            line,
            column,
            friendly,
            snippet: None,
        });
    }

    fn render_snippet(&self, line: usize, column: usize) -> Option<String> {
        if line == 0 || line > self.source_lines.len() {
            return None;
        }
        let source_line = &self.source_lines[line - 1];
        let mut snippet = format!("\n   {} | {}\n", line, source_line);
        if column > 0 {
            // 3-space indent, the line number gutter, " | ", then the column
            let padding = " ".repeat(3 + line.to_string().len() + 3 + column - 1);
            snippet.push_str(&format!("{}^\n", padding));
        }
        Some(snippet)
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// One rendered block per diagnostic, in the order they were raised.
    pub fn formatted(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.friendly.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

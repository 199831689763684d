use anyhow::Result;

use crate::config::{language_config, LanguageConfig};
use crate::diagnostics::Diagnostics;
use crate::interpreter::Interpreter;
use crate::keywords::keyword_map;
use crate::parser::Parser;
use crate::scanner::Scanner;

/// What one pipeline run produced: the ordered print output, the rendered
/// diagnostic blocks, and whether the run was clean.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub output: Vec<String>,
    pub errors: Vec<String>,
    pub success: bool,
}

/// Drives source text through scan -> parse -> interpret for one language
/// configuration. Each run owns its own diagnostics sink and scope chain.
pub struct Runner {
    config: LanguageConfig,
}

impl Runner {
    pub fn new(language_code: &str) -> Result<Self> {
        Ok(Runner {
            config: language_config(language_code)?,
        })
    }

    pub fn with_config(config: LanguageConfig) -> Self {
        Runner { config }
    }

    pub fn set_language(&mut self, code: &str) -> Result<()> {
        self.config = language_config(code)?;
        Ok(())
    }

    pub fn language_name(&self) -> &str {
        &self.config.name
    }

    pub fn run(&self, source: &str) -> RunResult {
        self.run_with_output(source, &mut |_| {})
    }

    /// Run `source`, delivering each printed line to `on_output` as it is
    /// produced. The interpreter never runs when scanning or parsing raised
    /// any diagnostic.
    pub fn run_with_output(&self, source: &str, on_output: &mut dyn FnMut(&str)) -> RunResult {
        let mut diagnostics = Diagnostics::new(source);
        let keywords = keyword_map(&self.config);

        let tokens = Scanner::new(source, &keywords, &mut diagnostics).scan_tokens();
        if diagnostics.has_errors() {
            return RunResult {
                output: Vec::new(),
                errors: diagnostics.formatted(),
                success: false,
            };
        }

        let program = Parser::new(tokens, &mut diagnostics).parse();
        if diagnostics.has_errors() {
            return RunResult {
                output: Vec::new(),
                errors: diagnostics.formatted(),
                success: false,
            };
        }

        let output = {
            let mut interpreter =
                Interpreter::with_output(&mut diagnostics, Box::new(|text: &str| on_output(text)));
            interpreter.interpret(&program)
        };

        let errors = diagnostics.formatted();
        RunResult {
            output,
            success: errors.is_empty(),
            errors,
        }
    }
}

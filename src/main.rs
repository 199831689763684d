use anyhow::Result;
use bahasa::config::{language_config, load_language_config};
use bahasa::runner::Runner;
use clap::Parser as ClapParser;
use rustyline::DefaultEditor;
use std::fs;

#[derive(ClapParser)]
#[command(name = "bahasa")]
#[command(about = "A small scripting language with localized keywords")]
struct Cli {
    /// Script file to run (omit for REPL)
    script: Option<String>,

    /// Language code for keyword spellings (en, id)
    #[arg(short, long, default_value = "en")]
    language: String,

    /// Path to a custom language configuration JSON file
    #[arg(short, long)]
    config: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => load_language_config(path)?,
        None => language_config(&cli.language)?,
    };
    let mut runner = Runner::with_config(config);

    match cli.script {
        None => run_prompt(&mut runner)?,
        Some(path) => run_file(&path, &runner)?,
    }

    Ok(())
}

fn run_file(path: &str, runner: &Runner) -> Result<()> {
    let contents = fs::read_to_string(path)?;
    let result = runner.run_with_output(&contents, &mut |text| println!("{}", text));

    for error in &result.errors {
        eprint!("{}", error);
    }

    Ok(())
}

fn run_prompt(runner: &mut Runner) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut buffer = String::new();

    let history_path = dirs::home_dir().map(|p| p.join(".bahasa_history"));
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    println!("bahasa ({})", runner.language_name());
    println!("Type #en or #id to switch keyword language, Ctrl-D to exit.");

    loop {
        let prompt = if buffer.is_empty() { "> " } else { "| " };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                // Language switching: "#en", "#id", ...
                if buffer.is_empty() && trimmed.starts_with('#') {
                    match runner.set_language(&trimmed[1..]) {
                        Ok(()) => println!("Language: {}", runner.language_name()),
                        Err(e) => eprintln!("{}", e),
                    }
                    continue;
                }

                buffer.push_str(&line);
                buffer.push('\n');

                if is_complete(&buffer) {
                    if !buffer.trim().is_empty() {
                        let _ = rl.add_history_entry(buffer.trim());
                        let result =
                            runner.run_with_output(&buffer, &mut |text| println!("{}", text));
                        for error in &result.errors {
                            eprint!("{}", error);
                        }
                    }
                    buffer.clear();
                }
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                buffer.clear();
                println!("^C");
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }

    Ok(())
}

/// Whether the buffered input can be handed to the pipeline, or more lines
/// are needed. Strings may legally span lines, so an open quote keeps the
/// buffer growing.
fn is_complete(code: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut iter = code.chars().peekable();

    while let Some(c) = iter.next() {
        if in_string {
            if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '/' => {
                if iter.peek() == Some(&'/') {
                    while let Some(&next) = iter.peek() {
                        if next == '\n' {
                            break;
                        }
                        iter.next();
                    }
                }
            }
            '{' | '(' | '[' => depth += 1,
            '}' | ')' | ']' => depth -= 1,
            _ => {}
        }
    }

    depth <= 0 && !in_string
}

#[cfg(test)]
mod tests {
    use super::is_complete;

    #[test]
    fn balanced_input_is_complete() {
        assert!(is_complete("print 1\n"));
        assert!(is_complete("if (x) { print 1 }\n"));
        assert!(is_complete("if (x) {\n print 1\n}\n"));
        assert!(is_complete("\n"));
    }

    #[test]
    fn open_brackets_keep_the_buffer_growing() {
        assert!(!is_complete("if (x) {\n"));
        assert!(!is_complete("f(1,\n"));
        assert!(!is_complete("var a = [1,\n"));
    }

    #[test]
    fn open_string_keeps_the_buffer_growing() {
        assert!(!is_complete("print \"a\n"));
        assert!(is_complete("print \"a\nb\"\n"));
        // Brackets inside a string do not count toward the depth
        assert!(is_complete("print \"{\"\n"));
        assert!(!is_complete("print \"}\" {\n"));
    }

    #[test]
    fn comments_hide_brackets() {
        assert!(is_complete("print 1 // {\n"));
        assert!(!is_complete("{ // }\n"));
    }
}

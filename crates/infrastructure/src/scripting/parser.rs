//! Parser for the Courier script DSL.
//!
//! One command per line:
//! - `set("name", "value")` - queue an environment update
//! - `log("message")` - record a log line
//! - `test("name", condition)` - record a named test result
//! - `assert(condition, "message")` - fail the script if false
//! - `delay(ms)` - pause for `ms` milliseconds
//!
//! Blank lines and lines starting with `//` or `#` are ignored.

use thiserror::Error;

use courier_domain::scripting::ScriptCommand;

/// Error type for script parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown command.
    #[error("Unknown command at line {line}: {name}")]
    UnknownCommand {
        /// The line number where the command appears.
        line: usize,
        /// The command name.
        name: String,
    },
    /// Invalid syntax.
    #[error("Invalid syntax at line {line}: {message}")]
    InvalidSyntax {
        /// The line number where the error occurred.
        line: usize,
        /// The error message.
        message: String,
    },
    /// Wrong number of arguments.
    #[error("Wrong arguments for {command} at line {line}: expected {expected}")]
    Arity {
        /// The line number.
        line: usize,
        /// The command name.
        command: String,
        /// The expected argument description.
        expected: &'static str,
    },
    /// Argument of the wrong type.
    #[error("Invalid argument for {command} at line {line}: {message}")]
    InvalidArgument {
        /// The line number.
        line: usize,
        /// The command name.
        command: String,
        /// The error message.
        message: String,
    },
}

/// Parse a script into a list of commands.
///
/// # Errors
///
/// Returns the first syntax error found; nothing runs if any line is bad.
pub fn parse_script(script: &str) -> Result<Vec<ScriptCommand>, ParseError> {
    script
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with("//") && !line.starts_with('#'))
        .map(|(line_num, line)| parse_line(line.trim_end_matches(';'), line_num))
        .collect()
}

fn parse_line(line: &str, line_num: usize) -> Result<ScriptCommand, ParseError> {
    let Some(paren_pos) = line.find('(') else {
        return Err(ParseError::InvalidSyntax {
            line: line_num,
            message: "Expected '(' after command name".to_string(),
        });
    };

    let command = line[..paren_pos].trim();
    let rest = line[paren_pos..].trim();

    let Some(inner) = rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')) else {
        return Err(ParseError::InvalidSyntax {
            line: line_num,
            message: "Missing closing ')'".to_string(),
        });
    };

    let mut args = parse_arguments(inner, line_num)?;
    let arity = |expected: &'static str| ParseError::Arity {
        line: line_num,
        command: command.to_string(),
        expected,
    };

    match command {
        "set" | "setVariable" => {
            if args.len() != 2 {
                return Err(arity("2 arguments (name, value)"));
            }
            let value = args.pop().unwrap_or_default();
            let name = args.pop().unwrap_or_default();
            Ok(ScriptCommand::SetVariable { name, value })
        }
        "log" | "console.log" => {
            if args.is_empty() {
                return Err(arity("at least 1 argument (message)"));
            }
            Ok(ScriptCommand::Log {
                message: args.join(" "),
            })
        }
        "test" => {
            if args.len() != 2 {
                return Err(arity("2 arguments (name, condition)"));
            }
            let condition = args.pop().unwrap_or_default();
            let name = args.pop().unwrap_or_default();
            Ok(ScriptCommand::Test { name, condition })
        }
        "assert" => {
            if args.is_empty() || args.len() > 2 {
                return Err(arity("1-2 arguments (condition, optional message)"));
            }
            let message = (args.len() == 2).then(|| args.pop().unwrap_or_default());
            let condition = args.pop().unwrap_or_default();
            Ok(ScriptCommand::Assert { condition, message })
        }
        "delay" | "sleep" => {
            if args.len() != 1 {
                return Err(arity("1 argument (milliseconds)"));
            }
            let millis = args[0].parse().map_err(|_| ParseError::InvalidArgument {
                line: line_num,
                command: command.to_string(),
                message: format!("'{}' is not a valid number", args[0]),
            })?;
            Ok(ScriptCommand::Delay { millis })
        }
        _ => Err(ParseError::UnknownCommand {
            line: line_num,
            name: command.to_string(),
        }),
    }
}

/// Splits on top-level commas, stripping quotes. Quoted text keeps its
/// commas; `\` escapes the next character.
fn parse_arguments(args_str: &str, line_num: usize) -> Result<Vec<String>, ParseError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escape_next = false;

    for ch in args_str.chars() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }

        match (ch, quote) {
            ('\\', _) => escape_next = true,
            ('"' | '\'', None) => quote = Some(ch),
            (c, Some(q)) if c == q => quote = None,
            (',', None) => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if quote.is_some() {
        return Err(ParseError::InvalidSyntax {
            line: line_num,
            message: "Unterminated string".to_string(),
        });
    }

    let last = current.trim();
    if !last.is_empty() || !args.is_empty() {
        args.push(last.to_string());
    }

    Ok(args)
}

//! Parsing of the line-oriented commands typed at the prompt.

use std::path::PathBuf;

use qa_agent_core::{FileRole, Msg};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  doc <path>...     add project documents (md, txt, json, ...)
  html <path>...    add the target HTML page
  rm <name>         remove every file with this name
  build             build the knowledge base (needs a document and an HTML file)
  prompt <text>     set the test generation request
  generate          generate test cases
  select <n>        generate a Selenium script for test case n
  back              return to the test case list
  export            save the current script as <testId>_selenium.py
  show              print the current screen again
  help              show this list
  quit              exit
Paths containing spaces can be wrapped in double quotes.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Msg(Msg),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`; type `help` for a list")]
    Unknown(String),
    #[error("`{command}` needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error("`{0}` is not a test case number")]
    InvalidIndex(String),
    #[error("unterminated quote")]
    UnterminatedQuote,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "doc" | "docs" => Command::Msg(Msg::FilesSelected {
            role: FileRole::Document,
            paths: paths(rest, "doc")?,
        }),
        "html" => Command::Msg(Msg::FilesSelected {
            role: FileRole::Html,
            paths: paths(rest, "html")?,
        }),
        "rm" | "remove" => {
            let name = unquote(rest);
            if name.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "rm",
                    what: "a file name",
                });
            }
            Command::Msg(Msg::FileRemoved {
                name: name.to_string(),
            })
        }
        "build" => Command::Msg(Msg::BuildKnowledgeBaseClicked),
        "prompt" => Command::Msg(Msg::PromptChanged(rest.to_string())),
        "generate" | "gen" => Command::Msg(Msg::GenerateTestsClicked),
        "select" => Command::Msg(Msg::TestCaseSelected {
            index: test_case_index(rest)?,
        }),
        "back" => Command::Msg(Msg::BackClicked),
        "export" => Command::Msg(Msg::ExportClicked),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => return Err(CommandError::Unknown(word.to_string())),
    };
    Ok(Some(command))
}

fn paths(rest: &str, command: &'static str) -> Result<Vec<PathBuf>, CommandError> {
    let args = split_args(rest)?;
    if args.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            what: "at least one path",
        });
    }
    Ok(args.into_iter().map(PathBuf::from).collect())
}

/// Displayed numbers start at 1.
fn test_case_index(rest: &str) -> Result<usize, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command: "select",
            what: "a test case number",
        });
    }
    match rest.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CommandError::InvalidIndex(rest.to_string())),
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

/// Whitespace-separated words; double quotes group a word containing spaces.
fn split_args(text: &str) -> Result<Vec<String>, CommandError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in text.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quoted {
        return Err(CommandError::UnterminatedQuote);
    }
    if in_word {
        args.push(current);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn msg(line: &str) -> Msg {
        match parse_command(line) {
            Ok(Some(Command::Msg(msg))) => msg,
            other => panic!("expected a message for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn doc_and_html_select_paths_with_role() {
        assert_eq!(
            msg("doc specs.md \"ui guide.txt\" api.json"),
            Msg::FilesSelected {
                role: FileRole::Document,
                paths: vec![
                    PathBuf::from("specs.md"),
                    PathBuf::from("ui guide.txt"),
                    PathBuf::from("api.json"),
                ],
            }
        );
        assert_eq!(
            msg("HTML checkout.html"),
            Msg::FilesSelected {
                role: FileRole::Html,
                paths: vec![PathBuf::from("checkout.html")],
            }
        );
    }

    #[test]
    fn file_commands_need_paths() {
        assert_eq!(
            parse_command("doc"),
            Err(CommandError::MissingArgument {
                command: "doc",
                what: "at least one path",
            })
        );
        assert_eq!(
            parse_command("html \"broken.html"),
            Err(CommandError::UnterminatedQuote)
        );
    }

    #[test]
    fn remove_takes_the_whole_name() {
        assert_eq!(
            msg("rm my notes.md"),
            Msg::FileRemoved {
                name: "my notes.md".to_string(),
            }
        );
        assert_eq!(
            msg("rm \"a b.md\""),
            Msg::FileRemoved {
                name: "a b.md".to_string(),
            }
        );
    }

    #[test]
    fn prompt_keeps_text_verbatim() {
        assert_eq!(
            msg("prompt Cover   the discount field"),
            Msg::PromptChanged("Cover   the discount field".to_string())
        );
    }

    #[test]
    fn select_is_one_based() {
        assert_eq!(msg("select 1"), Msg::TestCaseSelected { index: 0 });
        assert_eq!(msg("select 12"), Msg::TestCaseSelected { index: 11 });
        assert_eq!(
            parse_command("select 0"),
            Err(CommandError::InvalidIndex("0".to_string()))
        );
        assert_eq!(
            parse_command("select two"),
            Err(CommandError::InvalidIndex("two".to_string()))
        );
    }

    #[test]
    fn navigation_and_control_words() {
        assert_eq!(msg("build"), Msg::BuildKnowledgeBaseClicked);
        assert_eq!(msg("generate"), Msg::GenerateTestsClicked);
        assert_eq!(msg("back"), Msg::BackClicked);
        assert_eq!(msg("export"), Msg::ExportClicked);
        assert_eq!(parse_command("quit"), Ok(Some(Command::Quit)));
        assert_eq!(parse_command("help"), Ok(Some(Command::Help)));
        assert_eq!(parse_command("show"), Ok(Some(Command::Show)));
    }

    #[test]
    fn unknown_word_is_reported() {
        assert_eq!(
            parse_command("deploy now"),
            Err(CommandError::Unknown("deploy".to_string()))
        );
    }
}

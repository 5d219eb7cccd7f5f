//! Per-file parsing state machine
//!
//! `ParserContext` consumes one physical line at a time and reports what the
//! line means. It does no I/O and knows nothing about the store: filtering,
//! validation and imports are carried out by the loader.
//!
//! States:
//! - `Normal`: comments, blank lines, imports and `key = value` lines
//! - `Continuation`: a value whose previous line ended with `\`

/// What a physical line amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    /// Blank line
    Empty,
    /// `#` comment
    Comment,
    /// `import <path> [filter]`
    Import {
        path: String,
        filter: Option<String>,
    },
    /// A complete property ready for the filter
    Property { key: String, value: String },
    /// The line was absorbed into a continued value
    Continued,
    /// Non-empty line without `=`
    MissingEquals(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    Continuation { key: String, value: String },
}

/// Parser state for one file.
#[derive(Debug, Clone)]
pub struct ParserContext {
    mode: Mode,
    imports_enabled: bool,
}

const IMPORT_TOKEN: &str = "import ";

/// Whitespace as understood by C `isspace`.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

impl ParserContext {
    /// `imports_enabled` is false while a filter is active.
    pub fn new(imports_enabled: bool) -> Self {
        Self {
            mode: Mode::Normal,
            imports_enabled,
        }
    }

    /// Whether a continued value is being accumulated.
    pub fn in_continuation(&self) -> bool {
        matches!(self.mode, Mode::Continuation { .. })
    }

    /// Consumes one physical line.
    pub fn feed(&mut self, line: &str) -> LineAction {
        if let Mode::Continuation { value, .. } = &mut self.mode {
            return match line.strip_suffix('\\') {
                Some(fragment) => {
                    value.push_str(fragment);
                    value.push('\n');
                    LineAction::Continued
                }
                None => {
                    value.push_str(line);
                    self.take_pending()
                        .map(|(key, value)| LineAction::Property { key, value })
                        .unwrap_or(LineAction::Continued)
                }
            };
        }

        self.feed_normal(line)
    }

    fn feed_normal(&mut self, line: &str) -> LineAction {
        if line.is_empty() {
            return LineAction::Empty;
        }

        let line = line.trim_start_matches(is_space);
        if line.starts_with('#') {
            return LineAction::Comment;
        }

        let line = line.trim_end_matches(is_space);
        if line.is_empty() {
            return LineAction::Empty;
        }

        if self.imports_enabled {
            if let Some(rest) = line.strip_prefix(IMPORT_TOKEN) {
                return Self::parse_import(rest);
            }
        }

        let Some((key, value)) = line.split_once('=') else {
            return LineAction::MissingEquals(line.to_string());
        };
        let key = key.trim_end_matches(is_space);
        let value = value.trim_start_matches(is_space);

        match value.strip_suffix('\\') {
            Some(first) => {
                let mut accumulated = String::with_capacity(first.len() + 1);
                accumulated.push_str(first);
                accumulated.push('\n');
                self.mode = Mode::Continuation {
                    key: key.to_string(),
                    value: accumulated,
                };
                LineAction::Continued
            }
            None => LineAction::Property {
                key: key.to_string(),
                value: value.to_string(),
            },
        }
    }

    fn parse_import(rest: &str) -> LineAction {
        let rest = rest.trim_start_matches(is_space);
        let (path, filter) = match rest.split_once(' ') {
            Some((path, filter)) => {
                let filter = filter.trim_start_matches(is_space);
                (path, (!filter.is_empty()).then(|| filter.to_string()))
            }
            None => (rest, None),
        };

        LineAction::Import {
            path: path.to_string(),
            filter,
        }
    }

    /// Ends the input. A value still being continued is returned without the
    /// newline its last `\` introduced.
    pub fn finish(&mut self) -> Option<(String, String)> {
        let (key, mut value) = self.take_pending()?;
        if value.ends_with('\n') {
            value.pop();
        }
        Some((key, value))
    }

    fn take_pending(&mut self) -> Option<(String, String)> {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Continuation { key, value } => Some((key, value)),
            Mode::Normal => None,
        }
    }
}

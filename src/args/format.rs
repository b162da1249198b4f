//! `%s` format templates.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A template with exactly one `%s` placeholder.
///
/// `%%` stands for a literal `%`. Any other `%` sequence is rejected when
/// the template is parsed, so applying a template never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTemplate {
    raw: String,
    prefix: String,
    suffix: String,
}

impl FormatTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let bad = |message: String| Error::BadFormatTemplate {
            template: template.to_string(),
            message,
        };

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut placeholders = 0usize;
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            let literal = if c == '%' {
                match chars.next() {
                    Some('s') => {
                        placeholders += 1;
                        continue;
                    }
                    Some('%') => '%',
                    Some(other) => {
                        return Err(bad(format!(
                            "unsupported sequence '%{}', use '%%' for a literal percent sign",
                            other
                        )))
                    }
                    None => return Err(bad("template ends with a lone '%'".to_string())),
                }
            } else {
                c
            };

            if placeholders == 0 {
                prefix.push(literal);
            } else {
                suffix.push(literal);
            }
        }

        if placeholders != 1 {
            return Err(bad(format!(
                "expected exactly one '%s', found {}",
                placeholders
            )));
        }

        Ok(Self {
            raw: template.to_string(),
            prefix,
            suffix,
        })
    }

    /// `@%s`, the reference most tools expand into a param file's contents.
    pub fn param_file_reference() -> Self {
        Self {
            raw: "@%s".to_string(),
            prefix: "@".to_string(),
            suffix: String::new(),
        }
    }

    /// Substitutes `value` for the placeholder.
    pub fn apply(&self, value: &str) -> String {
        let mut out = String::with_capacity(self.prefix.len() + value.len() + self.suffix.len());
        out.push_str(&self.prefix);
        out.push_str(value);
        out.push_str(&self.suffix);
        out
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for FormatTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FormatTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

//! Bazel label parsing and formatting.
//!
//! Accepts the forms Bazel prints in diagnostics: `//pkg:name`, `//pkg`
//! (name defaults to the last package component), `@repo//pkg:name`,
//! `@@canonical//pkg:name`, `@repo` and relative `:name` / `name`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Visibility marker granting access to every target in a package.
pub const PACKAGE_WILDCARD: &str = "__pkg__";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    pub repo: String,
    pub pkg: String,
    pub name: String,
    pub relative: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("empty label")]
    Empty,

    #[error("label parse error: repository has invalid characters: {label:?}")]
    InvalidRepo { label: String },

    #[error("label parse error: package has invalid characters: {label:?}")]
    InvalidPackage { label: String },

    #[error("label parse error: target has invalid characters: {label:?}")]
    InvalidName { label: String },

    #[error("label parse error: empty package and target: {label:?}")]
    MissingName { label: String },
}

impl Label {
    pub fn parse(s: &str) -> Result<Self, LabelError> {
        if s.is_empty() {
            return Err(LabelError::Empty);
        }
        let original = s;

        // Canonical repository names (`@@repo`) print with one extra `@`.
        let mut rest = s.strip_prefix('@').map_or(s, |r| r.strip_prefix('@').unwrap_or(r));
        let mut repo = String::new();
        if rest.len() != s.len() {
            match rest.find("//") {
                Some(idx) => {
                    repo = rest[..idx].to_string();
                    rest = &rest[idx..];
                }
                None => {
                    // `@repo` is shorthand for `@repo//:repo`.
                    if !is_valid_repo(rest) || rest.is_empty() {
                        return Err(LabelError::InvalidRepo {
                            label: original.to_string(),
                        });
                    }
                    return Ok(Self {
                        repo: rest.to_string(),
                        pkg: String::new(),
                        name: rest.to_string(),
                        relative: false,
                    });
                }
            }
            if !is_valid_repo(&repo) {
                return Err(LabelError::InvalidRepo {
                    label: original.to_string(),
                });
            }
        }

        let Some(absolute) = rest.strip_prefix("//") else {
            let name = rest.strip_prefix(':').unwrap_or(rest);
            if name.is_empty() {
                return Err(LabelError::MissingName {
                    label: original.to_string(),
                });
            }
            if !is_valid_name(name) {
                return Err(LabelError::InvalidName {
                    label: original.to_string(),
                });
            }
            return Ok(Self {
                repo,
                pkg: String::new(),
                name: name.to_string(),
                relative: true,
            });
        };

        let (pkg, name) = match absolute.split_once(':') {
            Some((pkg, name)) => (pkg, name.to_string()),
            None => {
                let last = absolute.rsplit('/').next().unwrap_or_default();
                (absolute, last.to_string())
            }
        };

        if !is_valid_package(pkg) {
            return Err(LabelError::InvalidPackage {
                label: original.to_string(),
            });
        }
        if name.is_empty() {
            return Err(LabelError::MissingName {
                label: original.to_string(),
            });
        }
        if !is_valid_name(&name) {
            return Err(LabelError::InvalidName {
                label: original.to_string(),
            });
        }

        Ok(Self {
            repo,
            pkg: pkg.to_string(),
            name,
            relative: false,
        })
    }

    /// The same package with the name replaced by [`PACKAGE_WILDCARD`].
    pub fn package_wildcard(&self) -> Self {
        Self {
            name: PACKAGE_WILDCARD.to_string(),
            ..self.clone()
        }
    }
}

impl FromStr for Label {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.relative {
            return write!(f, ":{}", self.name);
        }
        if !self.repo.is_empty() {
            write!(f, "@{}", self.repo)?;
        }
        let base = self.pkg.rsplit('/').next().unwrap_or_default();
        if base == self.name {
            write!(f, "//{}", self.pkg)
        } else {
            write!(f, "//{}:{}", self.pkg, self.name)
        }
    }
}

fn is_valid_repo(repo: &str) -> bool {
    repo.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '~' | '+'))
}

fn is_valid_package(pkg: &str) -> bool {
    if pkg.is_empty() {
        return true;
    }
    if pkg.starts_with('/') || pkg.ends_with('/') || pkg.contains("//") {
        return false;
    }
    pkg.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || matches!(
                c,
                '/' | '-' | '.' | '@' | '_' | '+' | '=' | ',' | '~' | '!' | '%' | '^' | '#' | '$'
                    | '&' | '(' | ')' | '[' | ']' | '{' | '}' | ' '
            )
    })
}

fn is_valid_name(name: &str) -> bool {
    if name.starts_with('/') || name.ends_with('/') || name.contains("//") {
        return false;
    }
    if name.split('/').any(|seg| seg == ".." || seg == ".") {
        return false;
    }
    name.chars()
        .all(|c| !c.is_control() && c != ':' && c != '\'' && c != '"')
}

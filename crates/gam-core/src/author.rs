//! Author identity: the on-disk author script and strict ident validation
//!
//! The author script is the three-line, shell-sourceable serialization of
//! the author triple. The reader is strict - the script is meant to be
//! eval'd by shell tooling, and loosely parsing it may not give the results
//! the user expects, so anything malformed is fatal rather than guessed at.

use crate::quote::{sq_dequote, sq_quote};
use crate::session::SessionStore;
use crate::{Error, Result};

/// File name of the author script inside the session directory.
pub const AUTHOR_SCRIPT: &str = "author-script";

/// The author triple as carried between parse and commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorScript {
    /// Author name, as extracted by the mail-header parser
    pub name: String,
    /// Author email
    pub email: String,
    /// Author date, opaque to us, interpreted by git
    pub date: String,
}

impl AuthorScript {
    /// Serializes the triple to `author-script`:
    ///
    /// ```text
    /// GIT_AUTHOR_NAME='...'
    /// GIT_AUTHOR_EMAIL='...'
    /// GIT_AUTHOR_DATE='...'
    /// ```
    ///
    /// Exactly those three lines, each newline-terminated, nothing else.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be written.
    pub fn write(&self, store: &SessionStore) -> Result<()> {
        let script = format!(
            "GIT_AUTHOR_NAME={}\nGIT_AUTHOR_EMAIL={}\nGIT_AUTHOR_DATE={}",
            sq_quote(&self.name),
            sq_quote(&self.email),
            sq_quote(&self.date),
        );
        store.write_scalar(AUTHOR_SCRIPT, &script)
    }

    /// Reads the author script back. An absent file is `Ok(None)`; any
    /// deviation from the exact format is `Error::MalformedAuthorScript`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` on read failure and
    /// `Error::MalformedAuthorScript` when the contents do not parse.
    pub fn read(store: &SessionStore) -> Result<Option<Self>> {
        let Some(contents) = store.read_scalar(AUTHOR_SCRIPT, false)? else {
            return Ok(None);
        };
        Self::parse(&contents).map(Some)
    }

    fn parse(contents: &str) -> Result<Self> {
        let mut lines = contents.split_inclusive('\n');

        let name = dequote_line(lines.next(), "GIT_AUTHOR_NAME=")?;
        let email = dequote_line(lines.next(), "GIT_AUTHOR_EMAIL=")?;
        let date = dequote_line(lines.next(), "GIT_AUTHOR_DATE=")?;

        // No trailing bytes after the third line.
        if lines.next().is_some() {
            return Err(Error::MalformedAuthorScript);
        }

        Ok(Self { name, email, date })
    }
}

fn dequote_line(line: Option<&str>, prefix: &str) -> Result<String> {
    let line = line.ok_or(Error::MalformedAuthorScript)?;
    let line = line.strip_suffix('\n').unwrap_or(line);
    let value = line
        .strip_prefix(prefix)
        .ok_or(Error::MalformedAuthorScript)?;
    sq_dequote(value).ok_or(Error::MalformedAuthorScript)
}

/// An author identity validated for use in a commit object.
///
/// Mirrors the strict ident policy: a commit must never carry a guessed or
/// multi-line identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorIdent {
    /// Validated author name
    pub name: String,
    /// Validated author email
    pub email: String,
    /// Author date string, passed through to git
    pub date: String,
}

impl AuthorIdent {
    /// Validates the raw triple.
    ///
    /// # Errors
    ///
    /// Returns `Error::Ident` when the email is empty, when name or email
    /// span multiple lines, or when they contain angle brackets that would
    /// corrupt the `name <email> date` form.
    pub fn from_triple(name: &str, email: &str, date: &str) -> Result<Self> {
        if email.is_empty() {
            return Err(Error::Ident("empty email".to_string()));
        }
        for (field, value) in [("name", name), ("email", email), ("date", date)] {
            if value.contains('\n') {
                return Err(Error::Ident(format!("{field} spans multiple lines")));
            }
        }
        for (field, value) in [("name", name), ("email", email)] {
            if value.contains('<') || value.contains('>') {
                return Err(Error::Ident(format!("{field} contains angle brackets")));
            }
        }
        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            date: date.to_string(),
        })
    }

    /// The `name <email> date` form used in commit objects.
    #[must_use]
    pub fn format(&self) -> String {
        format!("{} <{}> {}", self.name, self.email, self.date)
    }
}

//! Commit objects and author/committer signatures.

use std::fmt;

use super::oid::Oid;
use super::store::{LooseObjectStore, ObjectType, RawObject};
use crate::error::{Error, Result};

/// An author or committer identity with a timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    name: String,
    email: String,
    /// Seconds since the Unix epoch.
    timestamp: i64,
    /// Timezone offset in minutes east of UTC.
    tz_offset: i32,
}

impl Signature {
    /// Creates a signature with an explicit timestamp.
    pub fn new<N: Into<String>, E: Into<String>>(
        name: N,
        email: E,
        timestamp: i64,
        tz_offset: i32,
    ) -> Self {
        Signature {
            name: name.into(),
            email: email.into(),
            timestamp,
            tz_offset,
        }
    }

    /// Creates a signature stamped with the current system time, in UTC.
    pub fn now<N: Into<String>, E: Into<String>>(name: N, email: E) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Signature::new(name, email, timestamp, 0)
    }

    /// Parses a signature line, e.g. `Alice <alice@example.com> 1700000000 +0900`.
    pub fn parse(s: &str) -> Option<Self> {
        let email_start = s.find('<')?;
        let email_end = s.find('>')?;
        if email_end < email_start {
            return None;
        }

        let name = s[..email_start].trim_end().to_string();
        let email = s[email_start + 1..email_end].to_string();

        let rest = s[email_end + 1..].trim();
        let mut parts = rest.split(' ');
        let timestamp: i64 = parts.next()?.parse().ok()?;
        let tz = parts.next()?;
        if tz.len() != 5 {
            return None;
        }
        let sign: i32 = match &tz[..1] {
            "+" => 1,
            "-" => -1,
            _ => return None,
        };
        let hours: i32 = tz[1..3].parse().ok()?;
        let minutes: i32 = tz[3..5].parse().ok()?;
        let tz_offset = sign * (hours * 60 + minutes);

        Some(Signature {
            name,
            email,
            timestamp,
            tz_offset,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn tz_offset(&self) -> i32 {
        self.tz_offset
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.tz_offset < 0 { '-' } else { '+' };
        let abs = self.tz_offset.abs();
        write!(
            f,
            "{} <{}> {} {}{:02}{:02}",
            self.name,
            self.email,
            self.timestamp,
            sign,
            abs / 60,
            abs % 60
        )
    }
}

/// A parsed commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    oid: Oid,
    tree: Oid,
    parents: Vec<Oid>,
    author: Signature,
    committer: Signature,
    message: String,
}

impl Commit {
    /// Parses a commit from a raw object.
    ///
    /// Commit payloads are header lines (`tree`, zero or more `parent`,
    /// `author`, `committer`), a blank line, then the message.
    pub fn parse(oid: Oid, raw: &RawObject) -> Result<Self> {
        if raw.object_type != ObjectType::Commit {
            return Err(Error::TypeMismatch {
                expected: "commit",
                actual: raw.object_type.as_str(),
            });
        }

        let text = std::str::from_utf8(&raw.content).map_err(|_| Error::CorruptObject {
            oid: oid.to_hex(),
            reason: "commit is not UTF-8".to_string(),
        })?;

        let corrupt = |reason: &str| Error::CorruptObject {
            oid: oid.to_hex(),
            reason: reason.to_string(),
        };

        let (headers, message) = text
            .split_once("\n\n")
            .ok_or_else(|| corrupt("missing blank line before message"))?;

        let mut tree = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        for line in headers.lines() {
            let (key, value) = line
                .split_once(' ')
                .ok_or_else(|| corrupt("malformed header line"))?;
            match key {
                "tree" => {
                    tree = Some(
                        Oid::from_hex(value).map_err(|_| corrupt("invalid tree id"))?,
                    );
                }
                "parent" => {
                    parents.push(
                        Oid::from_hex(value).map_err(|_| corrupt("invalid parent id"))?,
                    );
                }
                "author" => {
                    author =
                        Some(Signature::parse(value).ok_or_else(|| corrupt("invalid author"))?);
                }
                "committer" => {
                    committer = Some(
                        Signature::parse(value).ok_or_else(|| corrupt("invalid committer"))?,
                    );
                }
                // gpgsig and other extension headers are ignored
                _ => {}
            }
        }

        Ok(Commit {
            oid,
            tree: tree.ok_or_else(|| corrupt("missing tree header"))?,
            parents,
            author: author.ok_or_else(|| corrupt("missing author header"))?,
            committer: committer.ok_or_else(|| corrupt("missing committer header"))?,
            message: message.to_string(),
        })
    }

    /// Serializes a commit payload and writes it, returning the new id.
    pub fn write(
        store: &LooseObjectStore,
        tree: &Oid,
        parents: &[Oid],
        author: &Signature,
        committer: &Signature,
        message: &str,
    ) -> Result<Oid> {
        let mut payload = String::new();
        payload.push_str(&format!("tree {}\n", tree.to_hex()));
        for parent in parents {
            payload.push_str(&format!("parent {}\n", parent.to_hex()));
        }
        payload.push_str(&format!("author {}\n", author));
        payload.push_str(&format!("committer {}\n", committer));
        payload.push('\n');
        payload.push_str(message);
        if !message.ends_with('\n') {
            payload.push('\n');
        }

        store.write(ObjectType::Commit, payload.as_bytes())
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn tree(&self) -> &Oid {
        &self.tree
    }

    pub fn parents(&self) -> &[Oid] {
        &self.parents
    }

    /// Returns the first parent, if any.
    pub fn parent(&self) -> Option<&Oid> {
        self.parents.first()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn author(&self) -> &Signature {
        &self.author
    }

    pub fn committer(&self) -> &Signature {
        &self.committer
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the first line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

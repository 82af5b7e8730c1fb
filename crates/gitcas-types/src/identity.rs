use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::temporal::GitTime;

/// Characters that would break the `name <email> time` line shape.
const FORBIDDEN: &[char] = &['<', '>', '\n', '\0'];

/// Author or committer identity recorded in a commit.
///
/// Rendered as `<name> <<email>> <seconds> <±HHMM>`, the shape git writes
/// after the `author` and `committer` keywords:
///
/// ```
/// use gitcas_types::{GitTime, Signature, TzOffset};
///
/// let when = GitTime::new(1_700_000_000, TzOffset::from_minutes(-420).unwrap());
/// let sig = Signature::new("Max Henstell", "max@kapamaki.net", when).unwrap();
/// assert_eq!(sig.to_string(), "Max Henstell <max@kapamaki.net> 1700000000 -0700");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature {
    name: String,
    email: String,
    when: GitTime,
}

impl Signature {
    /// Create a signature, rejecting names or emails that cannot be encoded.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        when: GitTime,
    ) -> Result<Self, TypeError> {
        let name = name.into();
        let email = email.into();
        if name.trim() != name || name.contains(FORBIDDEN) {
            return Err(TypeError::InvalidSignature(format!("bad name: {name:?}")));
        }
        if email.contains(FORBIDDEN) {
            return Err(TypeError::InvalidSignature(format!("bad email: {email:?}")));
        }
        Ok(Self { name, email, when })
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Email address (without angle brackets).
    pub fn email(&self) -> &str {
        &self.email
    }

    /// When the signature was made.
    pub fn when(&self) -> GitTime {
        self.when
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.name, self.email, self.when)
    }
}

impl FromStr for Signature {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidSignature(s.to_string());
        let open = s.find('<').ok_or_else(invalid)?;
        let close = open + s[open..].find('>').ok_or_else(invalid)?;
        let name = s[..open].strip_suffix(' ').ok_or_else(invalid)?;
        let email = &s[open + 1..close];
        let when = s[close + 1..].strip_prefix(' ').ok_or_else(invalid)?;
        Self::new(name, email, when.parse()?)
    }
}

impl TryFrom<String> for Signature {
    type Error = TypeError;

    fn try_from(line: String) -> Result<Self, Self::Error> {
        line.parse()
    }
}

impl From<Signature> for String {
    fn from(sig: Signature) -> Self {
        sig.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::TzOffset;

    fn when() -> GitTime {
        GitTime::new(1_700_000_000, TzOffset::from_minutes(-420).unwrap())
    }

    #[test]
    fn display_matches_git_line_shape() {
        let sig = Signature::new("Max Henstell", "max@kapamaki.net", when()).unwrap();
        assert_eq!(
            sig.to_string(),
            "Max Henstell <max@kapamaki.net> 1700000000 -0700"
        );
    }

    #[test]
    fn parse_roundtrip() {
        let line = "Max Henstell <max@kapamaki.net> 1700000000 -0700";
        let sig: Signature = line.parse().unwrap();
        assert_eq!(sig.name(), "Max Henstell");
        assert_eq!(sig.email(), "max@kapamaki.net");
        assert_eq!(sig.when(), when());
        assert_eq!(sig.to_string(), line);
    }

    #[test]
    fn empty_email_is_allowed() {
        let sig: Signature = "nobody <> 0 +0000".parse().unwrap();
        assert_eq!(sig.email(), "");
    }

    #[test]
    fn rejects_brackets_in_name() {
        assert!(Signature::new("a <b>", "x@y", when()).is_err());
        assert!(Signature::new("line\nbreak", "x@y", when()).is_err());
        assert!(Signature::new("ok", "x>y", when()).is_err());
        assert!(Signature::new(" padded", "x@y", when()).is_err());
    }

    #[test]
    fn rejects_malformed_lines() {
        for bad in [
            "no email 1700000000 -0700",
            "Max <max@kapamaki.net 1700000000 -0700",
            "Max <max@kapamaki.net>",
            "Max <max@kapamaki.net> 1700000000",
            "Max <max@kapamaki.net> 1700000000 PST",
            "Max<max@kapamaki.net> 1700000000 -0700",
            "Max  <max@kapamaki.net> 1700000000 -0700",
            "Max <max@kapamaki.net> 01700000000 -0700",
            "Max <max@kapamaki.net> 1700000000 -0000",
            "Max <max@kapamaki.net> 1700000000 +10000",
        ] {
            assert!(bad.parse::<Signature>().is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn serde_goes_through_validation() {
        let sig = Signature::new("Max Henstell", "max@kapamaki.net", when()).unwrap();
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, r#""Max Henstell <max@kapamaki.net> 1700000000 -0700""#);
        assert_eq!(serde_json::from_str::<Signature>(&json).unwrap(), sig);

        for bad in [
            r#""a <b> 1700000000 +10000""#,
            r#""a <b> 1700000000 -0000""#,
            r#"" padded <b> 0 +0000""#,
        ] {
            assert!(serde_json::from_str::<Signature>(bad).is_err(), "{bad}");
        }
    }
}

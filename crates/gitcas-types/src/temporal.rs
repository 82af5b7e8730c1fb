use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Largest magnitude `±HHMM` can express: 99 hours 59 minutes.
pub const MAX_OFFSET_MINUTES: i32 = 99 * 60 + 59;

/// Offset from UTC in minutes, written as `±HHMM` in commit headers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct TzOffset(i32);

impl TzOffset {
    /// UTC (`+0000`).
    pub const UTC: Self = Self(0);

    /// Create an offset from signed minutes east of UTC.
    ///
    /// Fails outside `±MAX_OFFSET_MINUTES`, which would not fit in `±HHMM`.
    pub fn from_minutes(minutes: i32) -> Result<Self, TypeError> {
        if minutes.unsigned_abs() > MAX_OFFSET_MINUTES.unsigned_abs() {
            return Err(TypeError::InvalidTimezone(format!(
                "{minutes} minutes is out of range"
            )));
        }
        Ok(Self(minutes))
    }

    /// Signed minutes east of UTC.
    pub fn minutes(&self) -> i32 {
        self.0
    }

    /// The offset of the local timezone right now.
    pub fn local() -> Self {
        let seconds = chrono::Local::now().offset().local_minus_utc();
        // chrono bounds offsets to under a day.
        Self(seconds / 60)
    }
}

impl TryFrom<i32> for TzOffset {
    type Error = TypeError;

    fn try_from(minutes: i32) -> Result<Self, Self::Error> {
        Self::from_minutes(minutes)
    }
}

impl From<TzOffset> for i32 {
    fn from(offset: TzOffset) -> Self {
        offset.0
    }
}

impl fmt::Display for TzOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { '-' } else { '+' };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{:02}{:02}", abs / 60, abs % 60)
    }
}

impl FromStr for TzOffset {
    type Err = TypeError;

    /// Parse `±HHMM` (exactly five characters) in the form `Display` writes.
    ///
    /// `-0000` is refused: it would re-render as `+0000`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidTimezone(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 5 || !bytes[1..].iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        let sign = match bytes[0] {
            b'+' => 1,
            b'-' => -1,
            _ => return Err(invalid()),
        };
        let hours: i32 = s[1..3].parse().map_err(|_| invalid())?;
        let minutes: i32 = s[3..5].parse().map_err(|_| invalid())?;
        if minutes >= 60 || (sign < 0 && hours == 0 && minutes == 0) {
            return Err(invalid());
        }
        Ok(Self(sign * (hours * 60 + minutes)))
    }
}

/// A point in time as git records it: unix seconds plus the author's
/// timezone offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitTime {
    /// Seconds since the UNIX epoch.
    pub seconds: i64,
    /// Timezone offset the time was recorded in.
    pub offset: TzOffset,
}

impl GitTime {
    /// Create a time with explicit values.
    pub fn new(seconds: i64, offset: TzOffset) -> Self {
        Self { seconds, offset }
    }

    /// The current wall-clock time, recorded in the given offset.
    pub fn now(offset: TzOffset) -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        Self { seconds, offset }
    }

    /// The current wall-clock time in the local timezone.
    pub fn now_local() -> Self {
        Self::now(TzOffset::local())
    }
}

impl fmt::Display for GitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.seconds, self.offset)
    }
}

/// Decimal seconds exactly as `i64`'s `Display` writes them: optional `-`,
/// no `+`, no leading zeros, no `-0`.
fn is_canonical_seconds(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
        && s != "-0"
}

impl FromStr for GitTime {
    type Err = TypeError;

    /// Parse `<seconds> <±HHMM>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidSignature(s.to_string());
        let (seconds, offset) = s.split_once(' ').ok_or_else(invalid)?;
        if !is_canonical_seconds(seconds) {
            return Err(invalid());
        }
        let seconds = seconds.parse().map_err(|_| invalid())?;
        Ok(Self {
            seconds,
            offset: offset.parse()?,
        })
    }
}

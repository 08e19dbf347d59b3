use std::fmt;
use std::str::FromStr;

use chrono::{Local, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Authorship line recorded in a commit.
///
/// Renders as `"<identity> <unix seconds> <±hhmm>"`, the form git writes after
/// the `author` and `committer` keywords. The identity is opaque text, usually
/// `Name <email>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Who made the change.
    pub identity: String,
    /// Seconds since the UNIX epoch.
    pub timestamp: i64,
    /// Offset from UTC in minutes (east positive).
    pub tz_offset_minutes: i32,
}

impl Signature {
    /// Create a signature with explicit values.
    pub fn new(identity: impl Into<String>, timestamp: i64, tz_offset_minutes: i32) -> Self {
        Self {
            identity: identity.into(),
            timestamp,
            tz_offset_minutes,
        }
    }

    /// Signature for the current wall-clock time in the local timezone.
    pub fn now(identity: impl Into<String>) -> Self {
        let now = Local::now();
        Self::new(
            identity,
            now.timestamp(),
            now.offset().fix().local_minus_utc() / 60,
        )
    }

    /// Signature for the current wall-clock time with a fixed UTC offset.
    pub fn now_with_offset(identity: impl Into<String>, tz_offset_minutes: i32) -> Self {
        Self::new(identity, Utc::now().timestamp(), tz_offset_minutes)
    }

    /// The offset rendered as `±hhmm`.
    pub fn tz_string(&self) -> String {
        format_tz(self.tz_offset_minutes)
    }
}

/// Render a minute offset as `±hhmm`.
pub fn format_tz(offset_minutes: i32) -> String {
    let sign = if offset_minutes < 0 { '-' } else { '+' };
    let abs = offset_minutes.unsigned_abs();
    format!("{sign}{:02}{:02}", abs / 60, abs % 60)
}

/// Parse a `±hhmm` offset into minutes.
pub fn parse_tz(s: &str) -> Result<i32, TypeError> {
    let invalid = || TypeError::InvalidTimezone(s.to_string());
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }
    Ok(sign * (hours * 60 + minutes))
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.identity, self.timestamp, self.tz_string())
    }
}

impl FromStr for Signature {
    type Err = TypeError;

    /// Parse `"<identity> <unix seconds> <±hhmm>"`. The identity may contain
    /// spaces; the last two fields are taken from the right.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidSignature(s.to_string());
        let mut fields = s.rsplitn(3, ' ');
        let tz = fields.next().ok_or_else(invalid)?;
        let ts = fields.next().ok_or_else(invalid)?;
        let identity = fields.next().ok_or_else(invalid)?;
        if identity.is_empty() {
            return Err(invalid());
        }
        let timestamp = ts.parse::<i64>().map_err(|_| invalid())?;
        Ok(Self::new(identity, timestamp, parse_tz(tz)?))
    }
}

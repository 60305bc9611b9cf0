//! `<t:unix:style>` display styles.

use chrono::{DateTime, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampStyle {
    /// `t`: 3:05 PM
    ShortTime,
    /// `T`: 3:05:09 PM
    LongTime,
    /// `d`: 10/17/2026
    ShortDate,
    /// `D`: October 17, 2026
    LongDate,
    /// `f`: October 17, 2026 3:05 PM
    #[default]
    ShortDateTime,
    /// `F`: Saturday, October 17, 2026 3:05 PM
    LongDateTime,
    /// `R`: 5 minutes ago
    Relative,
}

impl TimestampStyle {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            't' => Some(Self::ShortTime),
            'T' => Some(Self::LongTime),
            'd' => Some(Self::ShortDate),
            'D' => Some(Self::LongDate),
            'f' => Some(Self::ShortDateTime),
            'F' => Some(Self::LongDateTime),
            'R' => Some(Self::Relative),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::ShortTime => 't',
            Self::LongTime => 'T',
            Self::ShortDate => 'd',
            Self::LongDate => 'D',
            Self::ShortDateTime => 'f',
            Self::LongDateTime => 'F',
            Self::Relative => 'R',
        }
    }

    /// Human-readable text for `unix_seconds` in `tz`. Out-of-range values
    /// fall back to the raw markup.
    pub fn render<Tz: TimeZone>(self, unix_seconds: i64, tz: &Tz, now: DateTime<Utc>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let Some(at) = DateTime::<Utc>::from_timestamp(unix_seconds, 0) else {
            return format!("<t:{}:{}>", unix_seconds, self.as_char());
        };

        let pattern = match self {
            Self::Relative => return relative(at, now),
            Self::ShortTime => "%-I:%M %p",
            Self::LongTime => "%-I:%M:%S %p",
            Self::ShortDate => "%m/%d/%Y",
            Self::LongDate => "%B %-d, %Y",
            Self::ShortDateTime => "%B %-d, %Y %-I:%M %p",
            Self::LongDateTime => "%A, %B %-d, %Y %-I:%M %p",
        };
        at.with_timezone(tz).format(pattern).to_string()
    }
}

fn relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - at).num_milliseconds();
    let abs = diff.unsigned_abs();
    let suffix = if diff > 0 { "ago" } else { "from now" };

    const MINUTE: u64 = 60_000;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    if abs < MINUTE {
        "just now".to_string()
    } else if abs < HOUR {
        format!("{} minutes {}", abs / MINUTE, suffix)
    } else if abs < DAY {
        format!("{} hours {}", abs / HOUR, suffix)
    } else {
        format!("{} days {}", abs / DAY, suffix)
    }
}

//! Visual grouping of consecutive messages and calendar-day keys.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::model::CanonicalMessage;

/// Maximum gap (in milliseconds) between two messages of one author that
/// still continues a group: 7 minutes.
pub const GROUP_TIME_GAP_MILLIS: i64 = 7 * 60 * 1000;

/// A message annotated with its grouping flags.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMessage<'a> {
    pub message: &'a CanonicalMessage,
    pub is_group_start: bool,
    /// Calendar day of `created_at` as `YYYY-MM-DD`.
    pub date_key: String,
}

/// Calendar day of `at` in `tz`.
pub fn local_date<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

pub fn date_key<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> String {
    local_date(at, tz).format("%Y-%m-%d").to_string()
}

/// Check if `current` is close enough to `previous` to continue a group.
pub fn within_group_window(previous: &DateTime<Utc>, current: &DateTime<Utc>) -> bool {
    (*current - *previous).num_milliseconds() <= GROUP_TIME_GAP_MILLIS
}

/// Whether `current` opens a new visual group after `previous`.
///
/// A new group starts when:
/// 1. there is no previous message
/// 2. the author changed
/// 3. more than 7 minutes passed
/// 4. the message is a reply
/// 5. the message came from a slash-command interaction
/// 6. the calendar day changed
pub fn starts_group<Tz: TimeZone>(
    previous: Option<&CanonicalMessage>,
    current: &CanonicalMessage,
    tz: &Tz,
) -> bool {
    let Some(previous) = previous else {
        return true;
    };
    previous.author.id != current.author.id
        || !within_group_window(&previous.created_at, &current.created_at)
        || current.reference.is_some()
        || current.interaction.is_some()
        || local_date(&previous.created_at, tz) != local_date(&current.created_at, tz)
}

/// Annotate messages (ascending by `created_at`) using calendar days in `tz`.
/// Order is preserved.
pub fn group_in<'a, Tz: TimeZone>(
    messages: &'a [CanonicalMessage],
    tz: &Tz,
) -> Vec<GroupedMessage<'a>> {
    let mut previous: Option<&CanonicalMessage> = None;
    let mut grouped = Vec::with_capacity(messages.len());

    for message in messages {
        grouped.push(GroupedMessage {
            message,
            is_group_start: starts_group(previous, message, tz),
            date_key: date_key(&message.created_at, tz),
        });
        previous = Some(message);
    }

    grouped
}

/// [`group_in`] using the system's local time zone.
pub fn group(messages: &[CanonicalMessage]) -> Vec<GroupedMessage<'_>> {
    group_in(messages, &Local)
}

/// Label shown on a date separator: "Today", "Yesterday" or a long date.
/// Both dates must come from the same time zone as the grouping.
pub fn date_separator_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        return "Today".to_string();
    }
    if today.pred_opt() == Some(date) {
        return "Yesterday".to_string();
    }
    date.format("%B %-d, %Y").to_string()
}

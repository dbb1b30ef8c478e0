//! Decode/encode diagnostics.
//!
//! Non-fatal issues met while reading (unknown group codes, values that do not
//! parse, fields present in a version that should not carry them) are
//! collected as [`Notification`] items instead of aborting the read. Callers
//! and tests inspect the collection afterwards; every item is also forwarded
//! to the `log` facade.

use std::fmt;

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// Group code not known to the entity's schema; skipped.
    UnknownTag,
    /// Value line did not parse as the expected kind; field kept its default.
    MalformedValue,
    /// Field present in a version whose gating excludes it; value kept.
    VersionMismatch,
    /// Subclass marker (group 100) not in the schema's allow-list.
    SubclassMismatch,
    /// Value outside the field's constraint; value kept.
    OutOfRange,
    /// Entity, object or section the reader has no schema for.
    NotImplemented,
    /// Any other non-fatal warning.
    Warning,
    /// Error that was recovered from (failsafe reading).
    Error,
}

impl NotificationType {
    fn log_level(&self) -> log::Level {
        match self {
            Self::NotImplemented | Self::UnknownTag => log::Level::Debug,
            Self::Error => log::Level::Error,
            _ => log::Level::Warn,
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTag => write!(f, "UnknownTag"),
            Self::MalformedValue => write!(f, "MalformedValue"),
            Self::VersionMismatch => write!(f, "VersionMismatch"),
            Self::SubclassMismatch => write!(f, "SubclassMismatch"),
            Self::OutOfRange => write!(f, "OutOfRange"),
            Self::NotImplemented => write!(f, "NotImplemented"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// A single notification produced during reading or writing.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// The severity / category.
    pub notification_type: NotificationType,
    /// A human-readable description of the issue.
    pub message: String,
    /// Line of the value that triggered it, when known.
    pub line: Option<usize>,
    /// Group code involved, when there is one.
    pub code: Option<i32>,
}

impl Notification {
    /// Create a new notification.
    pub fn new(notification_type: NotificationType, message: impl Into<String>) -> Self {
        Self {
            notification_type,
            message: message.into(),
            line: None,
            code: None,
        }
    }

    /// Attach the stream position.
    pub fn at(mut self, line: usize, code: i32) -> Self {
        self.line = Some(line);
        self.code = Some(code);
        self
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.notification_type)?;
        if let Some(line) = self.line {
            write!(f, "line {}: ", line)?;
        }
        write!(f, "{}", self.message)
    }
}

/// Collects notifications during a read/write operation.
#[derive(Debug, Clone, Default)]
pub struct NotificationCollection {
    items: Vec<Notification>,
}

impl NotificationCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Record a notification without a stream position.
    pub fn notify(&mut self, notification_type: NotificationType, message: impl Into<String>) {
        self.push(Notification::new(notification_type, message));
    }

    /// Record a notification tied to a line and group code.
    pub fn notify_at(
        &mut self,
        notification_type: NotificationType,
        line: usize,
        code: i32,
        message: impl Into<String>,
    ) {
        self.push(Notification::new(notification_type, message).at(line, code));
    }

    /// Record a prepared notification.
    pub fn push(&mut self, notification: Notification) {
        log::log!(notification.notification_type.log_level(), "{}", notification);
        self.items.push(notification);
    }

    /// Move every notification of `other` to the end of this collection.
    ///
    /// Items are not logged again.
    pub fn append(&mut self, other: NotificationCollection) {
        self.items.extend(other.items);
    }

    /// Check if there are any notifications.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of notifications.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over all notifications.
    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.items.iter()
    }

    /// Get all notifications of a specific type.
    pub fn of_type(&self, nt: NotificationType) -> Vec<&Notification> {
        self.items.iter().filter(|n| n.notification_type == nt).collect()
    }

    /// Check whether any notification of the given type exists.
    pub fn has_type(&self, nt: NotificationType) -> bool {
        self.items.iter().any(|n| n.notification_type == nt)
    }

    /// Consume the collection into a `Vec`.
    pub fn into_vec(self) -> Vec<Notification> {
        self.items
    }
}

impl Extend<Notification> for NotificationCollection {
    fn extend<I: IntoIterator<Item = Notification>>(&mut self, iter: I) {
        for notification in iter {
            self.push(notification);
        }
    }
}

impl IntoIterator for NotificationCollection {
    type Item = Notification;
    type IntoIter = std::vec::IntoIter<Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a NotificationCollection {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_basics() {
        let mut c = NotificationCollection::new();
        assert!(c.is_empty());

        c.notify(NotificationType::Warning, "w1");
        c.notify_at(NotificationType::UnknownTag, 3, 9999, "unknown group code 9999");
        c.notify(NotificationType::Warning, "w2");

        assert_eq!(c.len(), 3);
        assert_eq!(c.of_type(NotificationType::Warning).len(), 2);
        assert!(c.has_type(NotificationType::UnknownTag));
        assert!(!c.has_type(NotificationType::MalformedValue));
        assert_eq!(c.of_type(NotificationType::UnknownTag)[0].code, Some(9999));
    }

    #[test]
    fn test_append_keeps_order() {
        let mut a = NotificationCollection::new();
        a.notify(NotificationType::Warning, "first");
        let mut b = NotificationCollection::new();
        b.notify(NotificationType::Error, "second");
        a.append(b);
        let messages: Vec<_> = a.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, ["first", "second"]);
    }

    #[test]
    fn test_extend() {
        let mut c = NotificationCollection::new();
        c.extend(vec![
            Notification::new(NotificationType::OutOfRange, "a"),
            Notification::new(NotificationType::Warning, "b").at(4, 70),
        ]);
        assert_eq!(c.len(), 2);
        assert_eq!(c.of_type(NotificationType::Warning)[0].line, Some(4));
    }

    #[test]
    fn test_display() {
        let n = Notification::new(NotificationType::UnknownTag, "group code 9999").at(7, 9999);
        assert_eq!(format!("{}", n), "[UnknownTag] line 7: group code 9999");
    }
}

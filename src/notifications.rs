use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How long a toast stays on screen.
pub const DURATION_MS: u32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
}

/// Notification returned by actions: a toast in the admin UI, a JSON object in the API.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Notification {
    pub severity: Severity,
    pub title: &'static str,
    pub body: &'static str,
    pub duration_ms: u32,
}

/// Every notification the application emits. Redirects carry the key in
/// the `notification` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TalkApproved,
    TalkRejected,
    TalksApproved,
    SignedUp,
    Created,
    Saved,
    Deleted,
}

impl NotificationKind {
    pub const ALL: &'static [NotificationKind] = &[
        NotificationKind::TalkApproved,
        NotificationKind::TalkRejected,
        NotificationKind::TalksApproved,
        NotificationKind::SignedUp,
        NotificationKind::Created,
        NotificationKind::Saved,
        NotificationKind::Deleted,
    ];

    pub fn key(self) -> &'static str {
        match self {
            NotificationKind::TalkApproved => "talk_approved",
            NotificationKind::TalkRejected => "talk_rejected",
            NotificationKind::TalksApproved => "talks_approved",
            NotificationKind::SignedUp => "signed_up",
            NotificationKind::Created => "created",
            NotificationKind::Saved => "saved",
            NotificationKind::Deleted => "deleted",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.key() == key)
    }

    pub fn notification(self) -> Notification {
        let (severity, title, body) = match self {
            NotificationKind::TalkApproved => {
                (Severity::Success, "Approved!", "The talk has been approved.")
            }
            NotificationKind::TalkRejected => (Severity::Info, "Rejected", "This talk has been rejected!"),
            NotificationKind::TalksApproved => {
                (Severity::Success, "Approved!", "The talks has been approved.")
            }
            NotificationKind::SignedUp => {
                (Severity::Success, "Successfully signed up!", "Conference Signed Up")
            }
            NotificationKind::Created => (Severity::Success, "Created", "The record has been created."),
            NotificationKind::Saved => (Severity::Success, "Saved", "Your changes have been saved."),
            NotificationKind::Deleted => (Severity::Success, "Deleted", "The selected records have been deleted."),
        };
        Notification {
            severity,
            title,
            body,
            duration_ms: DURATION_MS,
        }
    }

    /// `path` with this notification appended to its query string.
    pub fn redirect_to(self, path: &str) -> String {
        let separator = if path.contains('?') { '&' } else { '?' };
        format!("{path}{separator}notification={}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for kind in NotificationKind::ALL {
            assert_eq!(NotificationKind::from_key(kind.key()), Some(*kind));
        }
        assert_eq!(NotificationKind::from_key("<script>"), None);
    }

    #[test]
    fn test_talk_notifications() {
        let approved = NotificationKind::TalkApproved.notification();
        assert_eq!(approved.severity, Severity::Success);
        assert_eq!(approved.title, "Approved!");
        assert_eq!(approved.duration_ms, 5000);

        let rejected = NotificationKind::TalkRejected.notification();
        assert_eq!(rejected.severity, Severity::Info);
        assert_eq!(rejected.body, "This talk has been rejected!");
    }

    #[test]
    fn test_redirect_to() {
        assert_eq!(
            NotificationKind::Saved.redirect_to("/admin/talks"),
            "/admin/talks?notification=saved"
        );
        assert_eq!(
            NotificationKind::Deleted.redirect_to("/admin/talks?page=2"),
            "/admin/talks?page=2&notification=deleted"
        );
    }
}

//! Admin resources: the descriptors behind every generated page.

pub mod attendee;
pub mod conference;
pub mod speaker;
pub mod talk;
pub mod venue;

pub use attendee::SignUpForm;
pub use conference::ConferenceResource;
pub use speaker::SpeakerResource;
pub use talk::TalkResource;
pub use venue::VenueResource;

use serde::Serialize;

use crate::schema::{FormSchema, Infolist, TableSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Index,
    Create,
    View,
    Edit,
}

/// A record type administered through generated pages.
pub trait Resource {
    /// URL segment below `/admin` and `/api`.
    const SLUG: &'static str;
    const LABEL: &'static str;
    const PLURAL_LABEL: &'static str;
    const PAGES: &'static [Page];

    fn form() -> FormSchema;

    fn table() -> TableSchema;

    fn infolist() -> Option<Infolist> {
        None
    }

    fn has_page(page: Page) -> bool {
        Self::PAGES.contains(&page)
    }
}

/// Serializable view of one resource, served by the schema endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceDescriptor {
    pub slug: &'static str,
    pub label: &'static str,
    pub plural_label: &'static str,
    pub pages: &'static [Page],
    pub form: FormSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infolist: Option<Infolist>,
}

impl ResourceDescriptor {
    fn of<R: Resource>() -> Self {
        Self {
            slug: R::SLUG,
            label: R::LABEL,
            plural_label: R::PLURAL_LABEL,
            pages: R::PAGES,
            form: R::form(),
            table: Some(R::table()),
            infolist: R::infolist(),
        }
    }
}

/// Descriptor for `slug`, including the form-only sign-up schema.
pub fn describe(slug: &str) -> Option<ResourceDescriptor> {
    match slug {
        ConferenceResource::SLUG => Some(ResourceDescriptor::of::<ConferenceResource>()),
        VenueResource::SLUG => Some(ResourceDescriptor::of::<VenueResource>()),
        SpeakerResource::SLUG => Some(ResourceDescriptor::of::<SpeakerResource>()),
        TalkResource::SLUG => Some(ResourceDescriptor::of::<TalkResource>()),
        SignUpForm::SLUG => Some(ResourceDescriptor {
            slug: SignUpForm::SLUG,
            label: "Attendee",
            plural_label: "Attendees",
            pages: &[],
            form: SignUpForm::form(),
            table: None,
            infolist: None,
        }),
        _ => None,
    }
}

/// Navigation entries of the admin panel: `(slug, plural label)`.
pub fn navigation() -> [(&'static str, &'static str); 4] {
    [
        (ConferenceResource::SLUG, ConferenceResource::PLURAL_LABEL),
        (VenueResource::SLUG, VenueResource::PLURAL_LABEL),
        (SpeakerResource::SLUG, SpeakerResource::PLURAL_LABEL),
        (TalkResource::SLUG, TalkResource::PLURAL_LABEL),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_known_slugs() {
        for slug in ["conferences", "venues", "speakers", "talks", "attendees"] {
            let descriptor = describe(slug).unwrap();
            assert_eq!(descriptor.slug, slug);
            assert!(serde_json::to_value(&descriptor).is_ok());
        }
        assert!(describe("authors").is_none());
    }

    #[test]
    fn test_speaker_has_no_edit_page() {
        assert!(SpeakerResource::has_page(Page::View));
        assert!(!SpeakerResource::has_page(Page::Edit));
        assert!(TalkResource::has_page(Page::Edit));
    }
}

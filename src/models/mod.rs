pub mod attendee;
pub mod conference;
pub mod region;
pub mod speaker;
pub mod talk;
pub mod venue;

pub use attendee::*;
pub use conference::*;
pub use region::*;
pub use speaker::*;
pub use talk::*;
pub use venue::*;

/// Closed set of string-backed values with a display label.
///
/// Implemented by every enum that is offered in a select or checkbox list.
pub trait EnumChoice: Sized + Copy + 'static {
    const ALL: &'static [Self];

    /// Value stored in the database and submitted by forms.
    fn value(self) -> &'static str;

    fn label(self) -> &'static str;

    fn from_value(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.value() == value)
    }
}

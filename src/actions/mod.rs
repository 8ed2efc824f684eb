//! Record operations and workflow actions shared by the admin pages and the
//! JSON API. Each returns the notification to show on success.

pub mod conference;
pub mod signup;
pub mod speaker;
pub mod talk;
pub mod venue;

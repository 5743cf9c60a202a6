//! Authentication state for tracker requests.
//!
//! The tracker authenticates with a browser session cookie supplied by the
//! user. This module holds that cookie together with the site base URL, and a
//! helper for pulling auth parameters out of RSS feed URLs.

mod feed;
mod session;

pub use feed::parse_feed_auth_params;
pub use session::{SessionContext, SessionError};

//! A set of helpers for testing

mod http_client;
mod mailer;
mod record;
mod snapshot;
mod subscription;

pub use http_client::create_test_http_client;
pub use mailer::{RecordingMailer, SentMail};
pub use record::ExceedanceRecordBuilder;
pub use snapshot::{SNAPSHOT_HEADERS, at_midnight, write_snapshot};
pub use subscription::SubscriptionBuilder;

//! Contact-event log provider implementing [`linkdrift_core::EdgeSource`].
//!
//! A contact log is a tab-separated file of `time, source, target, class1,
//! class2` records. Each retained record becomes one undirected observation;
//! the class columns label the communities the two participants belong to.

mod errors;
mod ingest;
mod log;
mod source;

pub use errors::ContactLogError;
pub use log::{ContactEvent, ContactLog};
pub use source::ContactWindow;

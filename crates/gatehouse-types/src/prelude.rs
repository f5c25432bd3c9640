pub use crate::error::{Error, ErrorKind, GhResult};
pub use crate::types::{Timestamp, UserId};

pub use tracing::{debug, error, info, warn};

// vim: ts=4

//! Message templates rendered into Telegram HTML.
//!
//! # Submodules
//!
//! - [`report`]: run reports (channel digest, failure incident, full summary)
//! - [`alerts`]: fixed operator notices (error alert, start notification)
//!
//! # Destinations
//!
//! | Template              | Group        |
//! |-----------------------|--------------|
//! | channel digest        | broadcast    |
//! | incident              | notification |
//! | run summary           | notification |
//! | error alert           | notification |
//! | start notification    | notification |

pub mod alerts;
pub mod report;

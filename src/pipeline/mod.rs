//! Pipeline stages connecting network ingress to the output driver
//!
//! Each stage runs on its own thread for the lifetime of the service and
//! consumes from a single-slot [`Mailbox`](crate::mailbox::Mailbox). Stages
//! terminate cooperatively: the upstream stage writes EOF into the mailbox
//! and the consumer winds itself down, one stage at a time.

mod driver_stage;
mod response_stage;

pub use driver_stage::DriverStage;
pub use response_stage::ResponseStage;

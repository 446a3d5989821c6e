//! Domain model for log delivery.

mod delivery;
mod error;
mod policy;
mod record;
mod state;

pub use delivery::{AckId, Delivery, DroppedRecord};
pub use error::{ParseDeliveryStateError, PipelineDomainError};
pub use policy::RedeliveryPolicy;
pub use record::{LogRecord, RecordId};
pub use state::DeliveryState;

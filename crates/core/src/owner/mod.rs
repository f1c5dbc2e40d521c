//! Owner-side abstractions.
//!
//! Everything the blob subsystem knows about the records that own
//! attachments: static type descriptors, the lifecycle signal hub, and
//! the record/loader seam to the entity layer.

mod descriptor;
mod record;
mod signals;

pub use descriptor::{KeyAssignment, OwnerDescriptor};
pub use record::{OwnerRecord, RecordLoader, RecordRegistry};
pub use signals::{
    LifecycleObserver, LifecycleSignal, LifecycleSignals, SignalKind, SubscriptionId,
};

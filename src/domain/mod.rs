pub mod entities;
pub mod value_objects;

pub use entities::{InspectionDraft, InspectionItem, InspectionPhoto, SyncQueueEntry, SyncReport};
pub use value_objects::{LocalId, ServerId};

pub mod mock_remote;
pub mod queue_outage_store;

pub use mock_remote::*;
pub use queue_outage_store::*;

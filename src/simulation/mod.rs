pub mod census;
pub mod events;
pub mod simulator;
pub mod snapshot;

pub use census::{Census, CensusRecorder};
pub use events::{EventLog, ObserverId, Shared, SimEvent, SimObserver};
pub use simulator::Simulator;
pub use snapshot::{RunOutput, WorldSnapshot};

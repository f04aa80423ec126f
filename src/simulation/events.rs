//! Simulator events and observers
//!
//! Observers are called synchronously, in registration order, with a
//! reference to the event. They never see the simulator itself.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::entity::animal::AnimalInfo;
pub use crate::spatial::region_manager::MapInfo;

/// Something that happened to the simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Sent only to a newly added observer
    Registered {
        time: f64,
        map: MapInfo,
        animals: Vec<AnimalInfo>,
    },
    Reset {
        time: f64,
        map: MapInfo,
        animals: Vec<AnimalInfo>,
    },
    AnimalAdded {
        time: f64,
        map: MapInfo,
        animals: Vec<AnimalInfo>,
        added: AnimalInfo,
    },
    RegionSet {
        time: f64,
        map: MapInfo,
        animals: Vec<AnimalInfo>,
        row: usize,
        col: usize,
        label: String,
    },
    Advanced {
        time: f64,
        map: MapInfo,
        animals: Vec<AnimalInfo>,
        dt: f64,
    },
}

impl SimEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SimEvent::Registered { .. } => "registered",
            SimEvent::Reset { .. } => "reset",
            SimEvent::AnimalAdded { .. } => "animal_added",
            SimEvent::RegionSet { .. } => "region_set",
            SimEvent::Advanced { .. } => "advanced",
        }
    }

    pub fn time(&self) -> f64 {
        match self {
            SimEvent::Registered { time, .. }
            | SimEvent::Reset { time, .. }
            | SimEvent::AnimalAdded { time, .. }
            | SimEvent::RegionSet { time, .. }
            | SimEvent::Advanced { time, .. } => *time,
        }
    }

    pub fn map(&self) -> &MapInfo {
        match self {
            SimEvent::Registered { map, .. }
            | SimEvent::Reset { map, .. }
            | SimEvent::AnimalAdded { map, .. }
            | SimEvent::RegionSet { map, .. }
            | SimEvent::Advanced { map, .. } => map,
        }
    }

    /// Live animals at the time of the event
    pub fn animals(&self) -> &[AnimalInfo] {
        match self {
            SimEvent::Registered { animals, .. }
            | SimEvent::Reset { animals, .. }
            | SimEvent::AnimalAdded { animals, .. }
            | SimEvent::RegionSet { animals, .. }
            | SimEvent::Advanced { animals, .. } => animals,
        }
    }
}

/// Receives simulator events
pub trait SimObserver {
    fn notify(&mut self, event: &SimEvent);
}

impl<F> SimObserver for F
where
    F: FnMut(&SimEvent),
{
    fn notify(&mut self, event: &SimEvent) {
        self(event)
    }
}

/// Observer shared with the caller, who can inspect it between calls
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use ecosim::simulation::events::{EventLog, Shared};
///
/// let log = Rc::new(RefCell::new(EventLog::new()));
/// let observer = Shared(Rc::clone(&log));
/// # let _ = observer;
/// assert!(log.borrow().is_empty());
/// ```
#[derive(Debug)]
pub struct Shared<T>(pub Rc<RefCell<T>>);

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Rc::clone(&self.0))
    }
}

impl<T: SimObserver> SimObserver for Shared<T> {
    fn notify(&mut self, event: &SimEvent) {
        self.0.borrow_mut().notify(event);
    }
}

/// Handle returned by `add_observer`, used to remove the observer again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// Compact record of one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub kind: String,
    pub time: f64,
    pub animals: usize,
}

/// Observer that keeps a summary of every event it sees
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    /// Number of records of the given kind
    pub fn count(&self, kind: &str) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.kind.as_str()).collect()
    }
}

impl SimObserver for EventLog {
    fn notify(&mut self, event: &SimEvent) {
        self.records.push(EventRecord {
            kind: event.kind().to_string(),
            time: event.time(),
            animals: event.animals().len(),
        });
    }
}

pub mod observer;
pub mod scheduler;
pub mod storage;
pub mod teardown;

pub use observer::{
    IntersectionCallback, IntersectionEntry, IntersectionObservation, MutationCallback,
    MutationKind, MutationRecord, ObserverHost, ResizeCallback,
};
pub use scheduler::{Scheduler, Task, TaskId};
pub use storage::{InMemoryStorage, KeyValueStorage, StorageError};
pub use teardown::Teardown;

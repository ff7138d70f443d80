pub mod process;
pub mod task;

pub use process::{ProcessRepairClient, ProcessRepairFactory};
pub use task::{
    ProgressFn, RepairClient, RepairFactory, RepairSettings, RepairTask, IGNORED_PATTERNS_ENV,
};

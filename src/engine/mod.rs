pub mod badge;
pub mod clock;
pub mod matcher;
pub mod orchestrator;
pub mod scan;
pub mod threshold;

pub use badge::Badge;
pub use clock::{Clock, FixedClock, SystemClock};
pub use matcher::RuleMatcher;
pub use orchestrator::{Event, Orchestrator, State};
pub use scan::ScanReport;

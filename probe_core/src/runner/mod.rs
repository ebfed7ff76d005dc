pub mod coordinator;
pub mod executor;
pub mod report;


pub use coordinator::Runner;
pub use executor::execute;
pub use report::{Report, ReportEntry, ReportFormat};

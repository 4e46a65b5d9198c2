pub mod bug_report;
pub mod loaders;
pub mod submission;

pub use bug_report::{BugReport, Credentials};
pub use loaders::{load_all_batch_files, load_batch_file, BatchFile, BugEntry};
pub use submission::{SubmissionFailure, SubmissionResult};

//! Services around the compositing core: file I/O, debug dumps, batch runs
//! and progress reporting

pub mod batch;
pub mod debug;
pub mod io;
pub mod progress;

pub use batch::{BatchFailure, BatchJob, BatchReport, BatchRunner};
pub use debug::DebugSink;
pub use io::ImageIOService;
pub use progress::{ConsoleProgressReporter, NoOpProgressReporter, ProcessingStage, ProgressReporter};

//! Service layer separating file handling and progress from the pixel pipeline

pub mod format;
pub mod io;
pub mod progress;

pub use format::{InputFormat, OutputNames};
pub use io::ImageIOService;
pub use progress::{
    ConsoleProgressReporter, NoOpProgressReporter, ProcessingStage, ProgressReporter,
    ProgressTracker, ProgressUpdate,
};

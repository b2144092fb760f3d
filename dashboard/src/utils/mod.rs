pub mod error;
pub mod format;

pub use error::{AnalyzerError, AnalyzerResult};
pub use format::{calculate_percentage, human_file_size, humanize_time_diff};

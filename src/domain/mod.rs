pub mod message;
pub mod posting;
pub mod traits;
pub mod types;

pub use message::{ChannelMessage, SlackTs};
pub use posting::{EmploymentType, ExtractedJob, JobPosting, RecordOutcome};
pub use traits::{ChatChannel, JobExtractor, JobSink, PageFetcher, WatermarkStore};
pub use types::{ExtractionInput, PageContent, PassReport};

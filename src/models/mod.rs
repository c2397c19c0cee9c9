pub mod prediction;
pub mod result;
pub mod upload;

pub use prediction::{ImageDimensions, PredictionBox};
pub use result::{AnalysisPayload, ProcessingResult, ResultState, ResultStatus};
pub use upload::{FilePreview, FileSource, SelectedFile, UploadItem};

pub mod multipart;
pub mod operation;
pub mod photo;
pub mod submission;

pub use multipart::{FormPart, MultipartForm};
pub use operation::{parse_payload, OperationResult, QUALITY_SUMMARY_FIELD};
pub use photo::{CapturedAsset, CapturedPhoto, PhotoUri, Rotation};
pub use submission::{ParamValue, SubmissionRequest};

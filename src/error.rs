use thiserror::Error;

pub type GalleryResult<T> = Result<T, GalleryError>;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("image {image_id} is shared by option values {values:?} while shared images are disabled")]
    SharedImage {
        image_id: String,
        values: Vec<String>,
    },

    #[error("option `{option}` has no value `{value}`")]
    UnknownOptionValue { option: String, value: String },
}

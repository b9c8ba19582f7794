//! Image labeling and captioning services.
//!
//! Provides a source abstraction over the supported vision APIs (Azure,
//! Google Cloud Vision, AWS Rekognition, Imagga) and a factory that picks providers by name.
//! Each source returns its own confidence scale; the aggregator averages them
//! as-is.

pub(crate) mod azure;
pub(crate) mod google;
pub(crate) mod imagga;
pub(crate) mod provider;
pub(crate) mod rekognition;

pub use provider::{
    CaptionSource, ImageInput, LabelSource, SourceFactory, CAPTION_PROVIDERS, LABEL_PROVIDERS,
};

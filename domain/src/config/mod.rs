//! Presentation-neutral settings shared by every layer

mod output_format;

pub use output_format::OutputFormat;

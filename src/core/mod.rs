//! Transformation engine: projection, date formatting, replace rules, presentation

pub mod dates;
pub mod presentation;
pub mod processor;
pub mod projector;
pub mod replace;

pub use dates::DateFormatter;
pub use presentation::Presentation;
pub use processor::{ProcessingOutcome, Processor};
pub use projector::ColumnProjector;
pub use replace::ReplaceEngine;

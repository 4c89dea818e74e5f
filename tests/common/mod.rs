#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from platescan for tests
pub use platescan::{
    BoundingBox, EngineRole, PlateError, PlateLocator, PlateOutcome, PlatePipeline, PlateRegion,
    PlateService, ProcessConfig, TextEngine, TextRecognizer, UNKNOWN_PLATE_TEXT,
};

pub mod generator;
pub mod measure;
pub mod metadata;
pub mod probe;
pub mod runner;
pub mod strategy;

pub use generator::generate;
pub use measure::{Measured, Measurer};
pub use metadata::{compute_metadata, resolve_metadata};
pub use probe::{ProcessProbe, ResourceProbe, ResourceReading};
pub use runner::{calculate_summary, BenchmarkEvent, BenchmarkResult, BenchmarkRunner};
pub use strategy::{EntireFile, LineByLine, ReadOutcome, ReadStrategy};

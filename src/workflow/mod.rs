pub mod batch_analyzer;

pub use batch_analyzer::BatchAnalyzer;

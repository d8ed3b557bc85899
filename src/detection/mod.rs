//! Echo results, severity grading and pipeline comparison

mod result;

pub use result::{
    AnalysisMetadata, AnalysisResult, EchoEstimate, PipelineComparison, PipelineKind,
    ResultReporter, Severity, SortOrder,
};

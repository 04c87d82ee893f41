pub mod analysis;
pub mod batch;
pub mod fragment;
pub mod report;

pub use analysis::AnalysisResult;
pub use batch::Batch;
pub use fragment::{Fragment, FragmentKind};
pub use report::{ChecklistEntry, CompletionReport, MissingArticle};

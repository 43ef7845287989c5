//! 组件级交互分析

mod analyzer;
mod node_map;
mod report;
mod summary;

pub use analyzer::{Analysis, Analyzer, Diagnostic, InteractionRecord, analyze};
pub use node_map::{FlatNode, NodeMap};
pub use summary::ComponentSummary;

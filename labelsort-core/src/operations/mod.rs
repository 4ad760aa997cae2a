//! Label sorting operations
//!
//! This module provides the steps of a sorting run (assigning targets to
//! pages and assembling the output document) and the pipeline that chains
//! them.

pub mod assemble;
pub mod assign;
pub mod sort;

pub use assemble::{assemble_pdf, AssembleOptions, PageAssembler};
pub use assign::{assign, Assigner, AssignmentResult, EmptyIdentifierPolicy};
pub use sort::{sort_label_pdf, LabelSorter, SortOptions, SortOutcome};

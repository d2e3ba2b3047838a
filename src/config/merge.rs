//! Source merge rules

pub mod merge_policy;

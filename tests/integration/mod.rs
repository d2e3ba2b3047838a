//! Integration tests for planning context management

mod context_cache;
mod multi_query;
mod orchestrator;

//! Deterministic text-processing components that turn a raw model response
//! and a user utterance into validated tool calls: JSON repair, schema
//! coercion, tokenisation, tool matching, proper-noun extraction, schema-
//! driven argument extraction, overlap scoring, and argument
//! post-processing. None of these talk to a model or the network; they are
//! pure functions over strings and `resolver-types` values.

pub mod coerce;
pub mod extract_args;
pub mod json_repair;
pub mod matcher;
pub mod nouns;
pub mod overlap;
pub mod postprocess;
pub mod tokenize;

pub use coerce::{coerce_call, coerce_filter_dedup, dedup, filter_valid};
pub use extract_args::extract_from_schema;
pub use json_repair::{repair, RepairedOutput};
pub use matcher::{find_best_tool, identify_tool_from_text, tool_relevance};
pub use nouns::{build_strip_set, extract_proper_nouns, StripSet};
pub use overlap::overlap_score;
pub use postprocess::post_process_args;
pub use tokenize::{similar, tokenize};

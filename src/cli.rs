//! CLI domain: parse, route and output only.
//! The route table holds the single build command; everything it does lives in
//! the library modules.

mod output;
mod parse;
mod route;

pub use output::{format_build_summary, format_patch_plan, map_error, BuildSummary};
pub use parse::Cli;
pub use route::{apply_cli_overrides, RunContext};

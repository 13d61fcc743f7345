//! Classification artifacts

pub mod results_file;

pub use results_file::{
    classify_output, parse_results, read_iterations, ResultsBlock, ResultsFile,
};

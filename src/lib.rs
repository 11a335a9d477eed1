//! Tooling for preparing FlexMex scenarios for oemof.tabular and reporting on their results.
//!
//! The pipeline has three stages, each exposed as a command of the `flexmex` binary:
//!
//! 1. `preprocess` turns a scenario's parameter table and raw per-region time series into an
//!    oemof.tabular datapackage
//! 2. the datapackage is solved by an external model (not part of this crate)
//! 3. `postprocess` maps the solver's result scalars onto the FlexMex report templates
#![warn(missing_docs)]

pub mod cli;
pub mod component;
pub mod example;
pub mod finance;
pub mod id;
pub mod input;
pub mod log;
pub mod output;
pub mod parameter;
pub mod pipeline;
pub mod profile;
pub mod region;
pub mod report;
pub mod scenario;
pub mod settings;
pub mod units;

#[cfg(test)]
mod fixture;

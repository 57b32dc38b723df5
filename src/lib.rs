//! heapshape - reference-pattern and window-visibility analysis of recorded heap shapes
//!
//! This library turns a directory of per-benchmark shape recordings into two
//! reports: a ranking of reference-offset patterns by mean frequency, and the
//! fraction of objects whose last reference leaves their own aligned memory
//! window, for a family of window sizes.
//!
//! Pipeline: [`decode`] → [`classify`] → [`aggregate`] (per file, in
//! parallel via [`dispatch`]) → [`reduce`] → [`csv_output`] / [`json_output`].

pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod decode;
pub mod dispatch;
pub mod json_output;
pub mod reduce;
pub mod shape;
pub mod window;

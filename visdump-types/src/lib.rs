//! # visdump-types
//!
//! Core types for pulling metrics out of a Visdom server. A Visdom
//! *environment* holds a set of *windows*; a plot window carries one or
//! more *traces* of parallel `x`/`y` samples. The types here model that
//! structure as it arrives over the wire, plus the shapes the exporter works
//! with once a feature has been pulled out of each environment.
//!
//! ```text
//! Environment ──▶ WindowMap ──▶ Window { title, content.data: [Trace] }
//!                                              │
//!                                              ▼
//!                     RunGroup { name, runs: [Run { env, Series }] }
//! ```
//!
//! ## Features
//!
//! - `serde`: deserialize window documents returned by the server and
//!   serialize/deserialize [`Series`] and [`RunGroup`].
//!
//! ## Example
//!
//! ```rust
//! use visdump_types::{RunGroup, Series, Trace, Window, WindowMap};
//!
//! let windows: WindowMap = [
//!     ("win_a".to_string(), Window::plot("test-accuracy", vec![Trace::new(vec![1.0, 2.0], vec![0.5, 0.7])])),
//!     ("win_b".to_string(), Window::titled("notes")),
//! ]
//! .into_iter()
//! .collect();
//!
//! let (id, window) = windows.find_by_title("test-accuracy").unwrap();
//! assert_eq!(id, "win_a");
//! assert_eq!(window.traces().unwrap().len(), 1);
//!
//! let mut group = RunGroup::new("mnist");
//! group.push("mnist_0", Series::new(vec![1.0, 2.0], vec![0.5, 0.7]).unwrap());
//! assert_eq!(group.len(), 1);
//! ```

mod run;
mod series;
mod window;

pub use run::*;
pub use series::*;
pub use window::*;

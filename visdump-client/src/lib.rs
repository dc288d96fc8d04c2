//! # visdump-client
//!
//! A small async client for reading experiment metrics out of a
//! [Visdom](https://github.com/fossasia/visdom) server.
//!
//! Only the read side of the API is covered: listing environments and
//! fetching the windows stored in one environment. Window documents are
//! decoded into [`visdump_types::WindowMap`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use visdump_client::VisdomClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = VisdomClient::builder()
//!         .server("http://localhost")
//!         .port(8097)
//!         .build()?;
//!
//!     let envs = client.env_list().await?;
//!     println!("Server has {} environments", envs.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod visdom;

pub use error::ClientError;
pub use visdom::{VisdomClient, VisdomClientBuilder, DEFAULT_PORT, DEFAULT_SERVER};

// Re-export types for convenience
pub use visdump_types::{PlotContent, Trace, Window, WindowMap};

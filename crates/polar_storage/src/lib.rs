//! # Polar Storage
//!
//! Moves Polar worlds between memory and disk.
//!
//! ## Components
//!
//! - [`PolarSource`]: where encoded bytes live ([`FileSource`], [`BytesSource`])
//! - [`WorldLoader`]: decode on load, encode on save, upgrade deprecated files
//! - [`AutoSaver`]: background thread saving a shared world on an interval
//! - [`StorageConfig`]: TOML configuration for all of the above
//!
//! ## Example
//!
//! ```rust,ignore
//! use polar_format::NoopConverter;
//! use polar_storage::{AutoSaveConfig, AutoSaver, StorageConfig, WorldLoader};
//! use std::sync::Arc;
//!
//! let config = StorageConfig::from_file("polar.toml")?;
//! let loader = WorldLoader::from_config(&config, Arc::new(NoopConverter::default()));
//! let source = config.source_for("lobby");
//! let world = Arc::new(loader.load_or_create(&source, || config.new_world())?);
//!
//! let saver = AutoSaver::start(world.clone(), Arc::new(source), loader, &AutoSaveConfig::from(&config));
//! // ... run the server ...
//! saver.shutdown()?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod autosave;
pub mod config;
pub mod error;
pub mod loader;
pub mod source;

pub use autosave::{AutoSaveConfig, AutoSaveStats, AutoSaver};
pub use config::{CompressionSetting, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use loader::WorldLoader;
pub use source::{BytesSource, FileSource, PolarSource, WORLD_EXTENSION};

//! Configuration management for acton-seq.
//!
//! # Configuration File Format
//!
//! Configuration is stored in TOML format. The search order is:
//! 1. `./acton-seq.toml` (project-local)
//! 2. `~/.config/acton-seq/config.toml` (XDG config)
//!
//! # Example Configuration
//!
//! ```toml
//! # Defaults for every opened sequence
//! [open]
//! tools = true
//! system_prompt = "You are a helpful assistant."
//!
//! # What the prelude announces
//! [prelude]
//! knowledge_cutoff = "December 2023"
//! environment = "ipython"
//!
//! # CLI logging
//! [logging]
//! level = "debug"
//! log_dir = "/var/log/acton-seq"
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use acton_seq::config;
//!
//! let config = config::load()?;
//! let client = SequenceClient::from_config(host, &config);
//! ```

mod file;
mod types;

pub use file::{from_path, from_str, load, search_paths, xdg_config_dir};

pub use types::{OpenDefaults, SeqConfig};

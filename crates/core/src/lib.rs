//! Core library for mcpforge
//!
//! This crate implements the **Functional Core** of the mcpforge application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`mcpforge_core`** (this crate): prompt construction, output
//!   normalization, schema validation and archive packaging. No network I/O.
//! - **`mcpforge`**: the model service client, the CLI, the HTTP route and
//!   the MCP server (the Imperative Shell)
//!
//! The one seam between the two is the [`forge::ModelClient`] trait. The
//! shell implements it against a real model service; tests implement it with
//! scripted responses, so the whole pipeline runs without mocking HTTP.
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use mcpforge_core::forge::{generate, package, GenerationArgs};
//!
//! let request = GenerationArgs {
//!     agent_description: Some("Answers questions about our wiki".to_string()),
//!     ..Default::default()
//! }
//! .into_request()?;
//!
//! let result = generate(&client, &request).await?;
//! let archive = package(&result)?;
//! assert_eq!(archive.len(), archive.as_bytes().len());
//! ```

pub mod forge;

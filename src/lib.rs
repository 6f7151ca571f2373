//! Config docgen - reference documentation for an application's configurable attributes.
//!
//! Given the configurable classes of an application, its command-line aliases and its
//! flags, this library renders one reStructuredText `configtrait` block per attribute,
//! listing its description, type or choices, default value and command-line options.
//!
//! # Architecture
//!
//! 1. [`model`] - Classes, attributes, flags and the validating application builder
//! 2. [`value`] - Attribute values and their literal representation
//! 3. [`walker`] - Orders the classes to document, ancestors first, without duplicates
//! 4. [`aliases`] - Reverse index from attribute to command-line aliases and flags
//! 5. [`renderer`] - Formats documentation blocks into a document
//! 6. [`manifest`] - Loads application definitions from YAML or JSON manifests
//! 7. [`scanner`] - Finds manifest files in a directory tree
//! 8. [`writer`] - Writes documents and the marker file to the output directory
//!
//! # Example Usage
//!
//! ```
//! use config_docgen::model::{Application, ConfigurableAttribute, ConfigurableClass};
//! use config_docgen::renderer::render_document;
//! use config_docgen::value::Value;
//!
//! let app = Application::builder("App")
//!     .define(
//!         ConfigurableClass::new("App").with_attribute(
//!             ConfigurableAttribute::new("color", "Enum")
//!                 .with_help("Pick a color.")
//!                 .with_default("red")
//!                 .with_choices(vec![Value::from("red"), Value::from("blue")]),
//!         ),
//!     )
//!     .alias("color", "App.color")
//!     .build()
//!     .unwrap();
//!
//! let document = render_document(&app, None).unwrap();
//! assert!(document.contains(".. configtrait:: App.color"));
//! assert!(document.contains(":CLI option: ``--color``"));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod model;
pub mod value;
pub mod walker;
pub mod aliases;
pub mod renderer;
pub mod manifest;
pub mod scanner;
pub mod writer;
pub mod error;

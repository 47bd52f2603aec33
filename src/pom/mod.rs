//! Project descriptor (pom.xml) model
//!
//! A descriptor is parsed into a lossless tree of [Node]s so that saving an
//! edited document changes nothing but the text values that were set.

pub mod document;
pub mod element;

pub use document::{PomDocument, POM_FILE_NAME};
pub use element::{Element, Node};

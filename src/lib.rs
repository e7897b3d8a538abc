//! The library code for the `inkstrip` webcomic site generator. A build
//! can be broken down into three steps:
//!
//! 1. Reading the pages of the comic in publication order
//!    ([`crate::source`]) and linking them into a [`crate::sequence`]
//! 2. Rendering every document into memory: one per page
//!    ([`crate::render`]), the about/imprint pages, the archive
//!    ([`crate::archive`]), and the RSS feed ([`crate::feed`])
//! 3. Writing the rendered documents to disk ([`crate::write`])
//!
//! Documents are trees of [`crate::node`]s, composed into complete HTML
//! documents by [`crate::document`]. New pages are released through the
//! collaborators in [`crate::publish`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod archive;
pub mod build;
pub mod config;
pub mod document;
pub mod feed;
pub mod markdown;
pub mod node;
pub mod page;
pub mod publish;
pub mod render;
pub mod sequence;
pub mod source;
pub mod thumbnail;
pub mod write;

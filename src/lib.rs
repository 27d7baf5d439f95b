//! # Comic Shelf
//!
//! A static site builder for a webcomic archive. Drop image files into a
//! source directory; each build records new arrivals in a JSON catalog,
//! publishes compressed copies, and renders an index page plus one page per
//! comic with previous/next navigation.
//!
//! # Architecture: One Pass, Ordered Stages
//!
//! ```text
//! comics/   ──scan/diff/enrich──►  index.json   (catalog of record)
//! catalog   ──compress──────────►  docs/_images/
//! catalog   ──sequence/render───►  docs/index.html, docs/{slug}/index.html
//! ```
//!
//! The catalog is append-only in practice: a file's creation time is captured
//! the first time it is seen and never re-read, so the archive order is fixed
//! even if files are later touched, copied, or deleted. Comics are ordered by
//! that creation time, oldest first.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists comic files in the source directory and reads creation times |
//! | [`catalog`] | Loads/saves `index.json`; diff, enrich, merge, dimension backfill |
//! | [`imaging`] | Image dimensions and publishing (re-encode or copy) behind [`imaging::ImageBackend`] |
//! | [`navigation`] | Previous/next links and public URLs for every comic |
//! | [`generate`] | Renders the index and comic pages with Maud |
//! | [`pipeline`] | Runs the stages in order and reports what changed |
//! | [`config`] | Optional `comics.toml` loading, validation, and color CSS |
//! | [`naming`] | Slug and display-name rules derived from filenames |
//! | [`types`] | The catalog record and its timestamp format |
//! | [`output`] | CLI summaries of each report |
//!
//! # Catalog Format
//!
//! ```json
//! {
//!   "comics": [
//!     {
//!       "filename": "first-strip.png",
//!       "createdAt": "2019-03-04T12:34:56.000Z",
//!       "width": 800,
//!       "height": 600
//!     }
//!   ]
//! }
//! ```
//!
//! Unknown keys, at the top level or in a record, are kept on re-save.

pub mod catalog;
pub mod config;
pub mod generate;
pub mod imaging;
pub mod naming;
pub mod navigation;
pub mod output;
pub mod pipeline;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

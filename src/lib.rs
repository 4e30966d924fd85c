//! Assemble paginated PDF booklets: title pages, a linked table of contents,
//! chapters, bulleted lists, figures, tables and simple graphs.
//!
//! ```no_run
//! use booklet::booklet::Booklet;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut doc = Booklet::new("booklet.pdf");
//! doc.switch_page_template("numbered_page")?;
//! doc.add_toc_header(Some("Table of Contents"));
//! doc.add_toc();
//! doc.add_page_break();
//! doc.add_toc_header(None);
//! doc.add_paragraph("Some <b>bold</b> text.", None)?;
//! doc.add_bullet("point one");
//! doc.build()?;
//! # Ok(())
//! # }
//! ```

pub mod booklet;
pub mod canvas;
pub mod chart;
pub mod colour;
pub mod config;
pub mod demo;
pub mod doc_template;
pub mod drawing;
pub mod figure;
pub mod flowable;
pub mod fonts;
pub mod markup;
pub mod page_template;
pub mod paragraph;
pub mod preview;
pub mod rect;
pub mod styles;
pub mod table;
pub mod toc;
pub mod units;
pub mod writer;

pub use crate::booklet::{Booklet, BuildStats};
pub use crate::config::Configuration;
pub use crate::units::{In, Mm, Pt, INCH};

//! The layout engine.
//!
//! A `DocTemplate` pours a list of flowables into the frames of its page
//! templates, one page at a time, and collects table-of-contents entries as
//! headings land on pages. `multi_build` repeats the layout until the entries
//! a pass starts with are the entries it collects, so page numbers in the
//! table of contents are correct.

use crate::canvas::{Canvas, Destination};
use crate::flowable::Flowable;
use crate::page_template::{builtin_templates, FooterConfig, PageInfo, PageTemplate};
use crate::rect::Margins;
use crate::toc::{TocCollector, TocEntry};
use crate::units::{Pt, INCH};
use anyhow::{anyhow, bail, Result};
use log::{debug, warn};
use std::collections::VecDeque;

pub const A4: (Pt, Pt) = (Pt(595.276), Pt(841.89));
pub const DEFAULT_MAX_PASSES: usize = 10;

/// Slack for floating point comparisons when fitting
const EPSILON: Pt = Pt(1e-3);

#[derive(Clone, Debug)]
pub struct DocTemplate {
    pub page_width: Pt,
    pub page_height: Pt,
    pub margins: Margins,
    pub templates: Vec<PageTemplate>,
    pub footer: FooterConfig,
}

impl Default for DocTemplate {
    fn default() -> Self {
        DocTemplate::new(A4.0, A4.1, Margins::all(INCH))
    }
}

/// The result of a single layout pass
pub struct LayoutPass {
    pub pages: Vec<Canvas>,
    pub toc_entries: Vec<TocEntry>,
}

/// The result of a converged build
pub struct BuildOutput {
    pub pages: Vec<Canvas>,
    pub toc_entries: Vec<TocEntry>,
    pub passes: usize,
}

impl DocTemplate {
    /// A document with the built-in page templates
    pub fn new(page_width: Pt, page_height: Pt, margins: Margins) -> DocTemplate {
        DocTemplate {
            page_width,
            page_height,
            margins,
            templates: builtin_templates(page_width, page_height, margins),
            footer: FooterConfig::default(),
        }
    }

    /// Width between the left and right margins
    pub fn width(&self) -> Pt {
        self.page_width - self.margins.left - self.margins.right
    }

    /// Height between the top and bottom margins
    pub fn height(&self) -> Pt {
        self.page_height - self.margins.top - self.margins.bottom
    }

    /// Adds a template, replacing any existing template with the same id
    pub fn add_page_template(&mut self, template: PageTemplate) {
        match self.templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template,
            None => self.templates.push(template),
        }
    }

    pub fn template_index(&self, id: &str) -> Result<usize> {
        self.templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| anyhow!("Unknown page template '{id}'"))
    }

    /// Lays out the flowables once, rendering tables of contents from
    /// `toc_entries`
    pub fn layout(&self, flowables: &[Flowable], toc_entries: &[TocEntry]) -> Result<LayoutPass> {
        if self.templates.is_empty() {
            bail!("Document has no page templates");
        }
        if let Some(template) = self.templates.iter().find(|t| t.frames.is_empty()) {
            bail!("Page template '{}' has no frames", template.id);
        }

        let mut queue: VecDeque<Flowable> = flowables
            .iter()
            .map(|flowable| match flowable {
                Flowable::TableOfContents(toc) => {
                    let mut toc = toc.clone();
                    toc.entries = toc_entries.to_vec();
                    Flowable::TableOfContents(toc)
                }
                other => other.clone(),
            })
            .collect();

        let mut state = LayoutState::new(self);
        while let Some(flowable) = queue.pop_front() {
            match flowable {
                Flowable::NextPageTemplate(id) => {
                    state.next_template = Some(self.template_index(&id)?);
                }
                Flowable::PageBreak => state.page_break(),
                flowable => {
                    if let Some(rest) = state.place(flowable) {
                        queue.push_front(rest);
                    }
                }
            }
        }

        let LayoutState {
            mut pages,
            page,
            collector,
            ..
        } = state;
        if let Some(page) = page {
            pages.push(page.canvas);
        }
        Ok(LayoutPass {
            pages,
            toc_entries: collector.into_entries(),
        })
    }

    /// Lays out repeatedly until the table of contents settles
    pub fn multi_build(&self, flowables: &[Flowable], max_passes: usize) -> Result<BuildOutput> {
        let mut entries: Vec<TocEntry> = Vec::new();
        for pass in 1..=max_passes {
            let result = self.layout(flowables, &entries)?;
            debug!(
                "Layout pass {pass}: {} pages, {} TOC entries",
                result.pages.len(),
                result.toc_entries.len()
            );
            if result.toc_entries == entries {
                return Ok(BuildOutput {
                    pages: result.pages,
                    toc_entries: result.toc_entries,
                    passes: pass,
                });
            }
            entries = result.toc_entries;
        }
        bail!("Table of contents did not settle after {max_passes} layout passes")
    }
}

struct OpenPage {
    canvas: Canvas,
    template: usize,
    frame: usize,
    /// Top of the free space in the current frame
    cursor: Pt,
    /// Nothing placed in the current frame yet
    frame_empty: bool,
}

struct LayoutState<'a> {
    doc: &'a DocTemplate,
    pages: Vec<Canvas>,
    page: Option<OpenPage>,
    current_template: usize,
    next_template: Option<usize>,
    collector: TocCollector,
    /// The last placement overflowed and closed its page
    ended_by_overflow: bool,
}

impl<'a> LayoutState<'a> {
    fn new(doc: &'a DocTemplate) -> LayoutState<'a> {
        LayoutState {
            doc,
            pages: Vec::new(),
            page: None,
            current_template: 0,
            next_template: None,
            collector: TocCollector::default(),
            ended_by_overflow: false,
        }
    }

    fn start_page(&mut self) -> &mut OpenPage {
        if let Some(next) = self.next_template.take() {
            self.current_template = next;
        }
        let doc = self.doc;
        let template = &doc.templates[self.current_template];
        let page_number = self.pages.len() + 1;
        let mut canvas = Canvas::new(page_number, doc.page_width, doc.page_height);
        template.decoration.draw(
            &mut canvas,
            &PageInfo {
                page_number,
                page_width: doc.page_width,
                page_height: doc.page_height,
                margins: doc.margins,
                footer: &doc.footer,
            },
        );
        let cursor = template.frames[0].content_box().y2;
        self.page.insert(OpenPage {
            canvas,
            template: self.current_template,
            frame: 0,
            cursor,
            frame_empty: true,
        })
    }

    fn finish_page(&mut self) {
        if let Some(page) = self.page.take() {
            self.pages.push(page.canvas);
        }
    }

    /// An open page is finished; with no open page a blank one is emitted,
    /// unless an overflowing flowable has just closed the page
    fn page_break(&mut self) {
        if std::mem::take(&mut self.ended_by_overflow) {
            return;
        }
        if self.page.is_none() {
            self.start_page();
        }
        self.finish_page();
    }

    /// Moves to the next frame, or the first frame of a new page
    fn next_frame(&mut self) {
        let doc = self.doc;
        let Some(page) = self.page.as_mut() else {
            return;
        };
        let frames = &doc.templates[page.template].frames;
        if page.frame + 1 < frames.len() {
            page.frame += 1;
            page.cursor = frames[page.frame].content_box().y2;
            page.frame_empty = true;
        } else {
            self.finish_page();
        }
    }

    /// Places as much of the flowable as fits, returning any remainder
    fn place(&mut self, mut flowable: Flowable) -> Option<Flowable> {
        let doc = self.doc;
        loop {
            if self.page.is_none() {
                self.start_page();
            }
            let page = self.page.as_ref()?;
            let frame = doc.templates[page.template].frames[page.frame].content_box();
            let frame_empty = page.frame_empty;
            let avail_width = frame.width();
            let space_before = if frame_empty {
                Pt(0.0)
            } else {
                flowable.space_before()
            };
            let avail_height = page.cursor - frame.y1 - space_before;
            flowable.fit_frame(frame.height());
            let (_, height) = flowable.wrap(avail_width);

            if height <= avail_height + EPSILON {
                self.draw(&flowable, frame.x1, space_before, height, avail_width);
                return None;
            }
            if let Some((first, rest)) = flowable.split(avail_width, avail_height) {
                let (_, first_height) = first.wrap(avail_width);
                self.draw(&first, frame.x1, space_before, first_height, avail_width);
                self.next_frame();
                return Some(rest);
            }
            if frame_empty {
                warn!(
                    "A {} of height {:.1}pt doesn't fit in a {:.1}pt frame, placing it anyway",
                    flowable.name(),
                    *height,
                    *frame.height()
                );
                self.draw(&flowable, frame.x1, space_before, height, avail_width);
                self.next_frame();
                self.ended_by_overflow = self.page.is_none();
                return None;
            }
            self.next_frame();
        }
    }

    fn draw(&mut self, flowable: &Flowable, x: Pt, space_before: Pt, height: Pt, avail_width: Pt) {
        let page_index = self.pages.len();
        let Some(page) = self.page.as_mut() else {
            return;
        };
        let top = page.cursor - space_before;
        let bottom = top - height;
        flowable.draw(&mut page.canvas, x, bottom, avail_width);
        page.cursor = bottom - flowable.space_after();
        page.frame_empty = false;
        self.ended_by_overflow = false;
        self.collector.after_flowable(
            flowable,
            page_index + 1,
            Destination { page_index, top },
        );
    }
}

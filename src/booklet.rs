//! The document assembler: a running list of flowables plus a chapter counter,
//! with one `add_*` operation per kind of content.

use crate::chart::{Chart, LABEL_COLOUR};
use crate::config::BookletConfig;
use crate::doc_template::{DocTemplate, DEFAULT_MAX_PASSES};
use crate::drawing::Drawing;
use crate::figure::Figure;
use crate::flowable::Flowable;
use crate::page_template::PageTemplate;
use crate::paragraph::Paragraph;
use crate::rect::Margins;
use crate::styles::{ParagraphStyle, StyleSheet, BULLET, HEADING1, HEADING2, PARAGRAPH};
use crate::table::{Table, TableStyle};
use crate::toc::{TableOfContents, TocEntry};
use crate::units::{In, Pt};
use crate::writer::{write_pdf, DocumentInfo};
use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SPECTRA_WIDTH: Pt = Pt(450.0);
const SPECTRA_HEIGHT: Pt = Pt(120.0);
const SPECTRA_BOX_OFFSET: Pt = Pt(30.0);

/// What a finished build produced
#[derive(Debug, Clone, PartialEq)]
pub struct BuildStats {
    pub outfile: PathBuf,
    pub page_count: usize,
    pub passes: usize,
    pub toc_entries: usize,
    pub bytes: usize,
}

#[derive(Debug)]
pub struct Booklet {
    outfile: PathBuf,
    elements: Vec<Flowable>,
    chapter_num: usize,
    doc: DocTemplate,
    styles: StyleSheet,
    info: DocumentInfo,
    max_passes: usize,
}

impl Booklet {
    /// An A4 booklet with one-inch margins and the default styles
    pub fn new<P: Into<PathBuf>>(outfile: P) -> Booklet {
        Booklet {
            outfile: outfile.into(),
            elements: Vec::new(),
            chapter_num: 1,
            doc: DocTemplate::default(),
            styles: StyleSheet::default(),
            info: DocumentInfo::default(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    pub fn with_config(config: &BookletConfig) -> Result<Booklet> {
        let (width, height) = config.page_size();
        if width <= Pt(0.0) || height <= Pt(0.0) {
            bail!(
                "Page size must be positive, got {}in × {}in",
                config.page_width_in,
                config.page_height_in
            );
        }
        let margins = Margins::trbl(
            In(config.margin_top_in).into(),
            In(config.margin_right_in).into(),
            In(config.margin_bottom_in).into(),
            In(config.margin_left_in).into(),
        );
        let mut doc = DocTemplate::new(width, height, margins);
        if doc.width() <= Pt(0.0) || doc.height() <= Pt(0.0) {
            bail!("Margins leave no room for content on the page");
        }
        if config.max_passes < 1 {
            bail!("max_passes must be at least 1");
        }
        doc.footer = config.footer();

        let mut styles = StyleSheet::default();
        for style in &config.styles {
            let derived = styles.derive(style)?;
            styles.insert(derived);
        }

        Ok(Booklet {
            outfile: config.outfile.clone(),
            elements: Vec::new(),
            chapter_num: 1,
            doc,
            styles,
            info: DocumentInfo {
                title: config.title.clone(),
                author: config.author.clone(),
                subject: config.subject.clone(),
                invariant: config.invariant,
                ..DocumentInfo::default()
            },
            max_passes: config.max_passes,
        })
    }

    pub fn outfile(&self) -> &Path {
        &self.outfile
    }

    pub fn flowables(&self) -> &[Flowable] {
        &self.elements
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut StyleSheet {
        &mut self.styles
    }

    pub fn info_mut(&mut self) -> &mut DocumentInfo {
        &mut self.info
    }

    pub fn doc_template(&self) -> &DocTemplate {
        &self.doc
    }

    pub fn set_footer_tag(&mut self, tag: Option<String>) {
        self.doc.footer.tag = tag;
    }

    pub fn set_footer_link(&mut self, link: Option<String>) {
        self.doc.footer.link = link;
    }

    pub fn set_footer_font_size(&mut self, size: Pt) {
        self.doc.footer.font_size = size;
    }

    pub fn set_max_passes(&mut self, max_passes: usize) {
        self.max_passes = max_passes.max(1);
    }

    /// Registers a page template, replacing any with the same id
    pub fn add_page_template(&mut self, template: PageTemplate) {
        self.doc.add_page_template(template);
    }

    /// Uses the template `id` from the next page on
    pub fn switch_page_template(&mut self, id: &str) -> Result<()> {
        self.doc.template_index(id)?;
        self.elements.push(Flowable::NextPageTemplate(id.to_string()));
        Ok(())
    }

    pub fn add_toc(&mut self) {
        self.elements
            .push(Flowable::TableOfContents(TableOfContents::default()));
    }

    pub fn add_page_break(&mut self) {
        self.elements.push(Flowable::PageBreak);
    }

    /// Adds marked-up text in the named style, `Paragraph` if none is given
    pub fn add_paragraph(&mut self, text: &str, style: Option<&str>) -> Result<()> {
        let style = self.styles.get(style.unwrap_or(PARAGRAPH))?;
        self.elements.push(Paragraph::new(text, style).into());
        Ok(())
    }

    pub fn add_bullet(&mut self, text: &str) {
        let style = self.style_or_default(BULLET);
        self.elements.push(Paragraph::bullet(text, style).into());
    }

    /// Vertical space, 0.1in wide
    pub fn add_spacer(&mut self, height_in_inches: f32) {
        self.elements.push(Flowable::Spacer {
            width: In(0.1).into(),
            height: In(height_in_inches).into(),
        });
    }

    /// A first-level heading that shows up in the table of contents,
    /// `Chapter N` when no text is given
    pub fn add_toc_header(&mut self, text: Option<&str>) {
        let text = match text.filter(|t| !t.is_empty()) {
            Some(text) => text.to_string(),
            None => format!("Chapter {}", self.chapter_num),
        };
        let style = self.style_or_default(HEADING1);
        self.elements.push(Paragraph::new(&text, style).into());
        self.add_spacer(0.1);
        self.chapter_num += 1;
    }

    /// A second-level heading that shows up in the table of contents
    pub fn add_sub_header(&mut self, text: &str) {
        let style = self.style_or_default(HEADING2);
        self.elements.push(Paragraph::new(text, style).into());
    }

    pub fn add_figure<P: AsRef<Path>>(&mut self, path: P, caption: &str) -> Result<()> {
        let path = path.as_ref();
        let figure = Figure::load(path, caption)
            .with_context(|| format!("Failed to add figure {}", path.display()))?;
        self.elements.push(figure.into());
        Ok(())
    }

    /// A stick graph of `y` against `x`, one grey line per pair
    pub fn add_spectra_graph(&mut self, x_vals: &[f32], y_vals: &[f32]) -> Result<()> {
        if x_vals.is_empty() || y_vals.is_empty() {
            bail!("A spectra graph needs at least one value on each axis");
        }
        if x_vals.len() != y_vals.len() {
            warn!(
                "Spectra graph has {} x values and {} y values, extra values are ignored",
                x_vals.len(),
                y_vals.len()
            );
        }
        let mut chart = Chart::new(
            SPECTRA_WIDTH,
            SPECTRA_HEIGHT,
            Chart::auto_limits(x_vals),
            Chart::auto_limits(y_vals),
            SPECTRA_BOX_OFFSET,
        )?;
        for (&x, &y) in x_vals.iter().zip(y_vals) {
            chart.add_vert_line(x, y, None, LABEL_COLOUR);
        }
        self.add_chart(chart);
        Ok(())
    }

    pub fn add_chart(&mut self, chart: Chart) {
        self.add_drawing(chart.into_drawing());
    }

    pub fn add_drawing(&mut self, drawing: Drawing) {
        self.elements.push(drawing.into());
    }

    /// A table of plain text rows, the style's header rows repeated on every page
    pub fn add_table(&mut self, rows: Vec<Vec<String>>, style: TableStyle) {
        self.elements.push(Table::new(rows, style).into());
    }

    /// Appends an arbitrary flowable
    pub fn push(&mut self, flowable: Flowable) {
        self.elements.push(flowable);
    }

    /// Built-in styles are always registered
    fn style_or_default(&self, name: &str) -> Arc<ParagraphStyle> {
        self.styles
            .get(name)
            .unwrap_or_else(|_| Arc::new(ParagraphStyle::default()))
    }

    /// Lays out the document until the table of contents settles and
    /// serializes it, without touching the filesystem
    pub fn render(&self) -> Result<Vec<u8>> {
        self.render_with_summary().map(|(bytes, _)| bytes)
    }

    pub fn render_with_summary(&self) -> Result<(Vec<u8>, RenderSummary)> {
        let output = self
            .doc
            .multi_build(&self.elements, self.max_passes)
            .with_context(|| "Failed to lay out booklet")?;
        let summary = RenderSummary {
            page_count: output.pages.len(),
            passes: output.passes,
            toc_entries: output.toc_entries.clone(),
        };
        let bytes = write_pdf(output.pages, &output.toc_entries, &self.info)
            .with_context(|| "Failed to write PDF")?;
        Ok((bytes, summary))
    }

    /// Renders and writes the outfile
    pub fn build(&self) -> Result<BuildStats> {
        let (bytes, summary) = self.render_with_summary()?;
        if let Some(parent) = self.outfile.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        std::fs::write(&self.outfile, &bytes)
            .with_context(|| format!("Failed to write {}", self.outfile.display()))?;
        info!(
            "Wrote {} pages ({} bytes) to {} after {} passes",
            summary.page_count,
            bytes.len(),
            self.outfile.display(),
            summary.passes
        );
        Ok(BuildStats {
            outfile: self.outfile.clone(),
            page_count: summary.page_count,
            passes: summary.passes,
            toc_entries: summary.toc_entries.len(),
            bytes: bytes.len(),
        })
    }
}

/// Layout results accompanying rendered bytes
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub page_count: usize,
    pub passes: usize,
    pub toc_entries: Vec<TocEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::TITLE;

    fn sample() -> Booklet {
        let mut doc = Booklet::new("sample.pdf");
        doc.add_spacer(2.5);
        doc.add_paragraph("Example PDF Title", Some(TITLE)).expect("title style exists");
        doc.switch_page_template("numbered_page").expect("builtin template");
        doc.add_page_break();
        doc.add_toc_header(Some("Table of Contents"));
        doc.add_toc();
        doc.add_page_break();
        doc.add_toc_header(None);
        doc.add_paragraph("Lorum Ipsum et cetera.", None).expect("default style");
        doc.add_bullet("point one");
        doc.add_bullet("point two");
        doc.add_page_break();
        doc.add_toc_header(Some("Next Chapter"));
        doc.add_sub_header("Details");
        doc.add_spectra_graph(&[10.0, 50.0, 90.0], &[20.0, 100.0, 40.0])
            .expect("can add graph");
        doc
    }

    #[test]
    fn can_number_chapters() {
        let mut doc = Booklet::new("x.pdf");
        doc.add_toc_header(Some("Contents"));
        doc.add_toc_header(None);
        doc.add_toc_header(Some(""));
        let headings: Vec<String> = doc
            .flowables()
            .iter()
            .filter_map(|f| match f {
                Flowable::Paragraph(p) => Some(p.plain_text().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(headings, vec!["Contents", "Chapter 2", "Chapter 3"]);
        // every header is followed by a spacer
        assert_eq!(doc.flowables().len(), 6);
        assert!(matches!(
            doc.flowables()[1],
            Flowable::Spacer { width, height }
                if (width.0 - 7.2).abs() < 1e-4 && (height.0 - 7.2).abs() < 1e-4
        ));
    }

    #[test]
    fn can_reject_unknown_names() {
        let mut doc = Booklet::new("x.pdf");
        assert!(doc.switch_page_template("no_such_page").is_err());
        assert!(doc.add_paragraph("text", Some("NoSuchStyle")).is_err());
        assert!(doc.add_spectra_graph(&[], &[]).is_err());
        assert!(doc.add_figure("does/not/exist.png", "missing").is_err());
        assert!(doc.flowables().is_empty());
    }

    #[test]
    fn can_render_sample_booklet() {
        let doc = sample();
        let (bytes, summary) = doc.render_with_summary().expect("can render");
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(summary.page_count, 4);
        assert!(summary.passes >= 2);
        let texts: Vec<(&str, usize, usize)> = summary
            .toc_entries
            .iter()
            .map(|e| (e.text.as_str(), e.level, e.page))
            .collect();
        assert_eq!(
            texts,
            vec![
                ("Table of Contents", 1, 2),
                ("Chapter 2", 1, 3),
                ("Next Chapter", 1, 4),
                ("Details", 2, 4),
            ]
        );
    }

    #[test]
    fn can_build_to_file() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let outfile = dir.path().join("nested").join("booklet.pdf");
        let mut doc = Booklet::new(&outfile);
        doc.set_footer_tag(Some("made with booklet".to_string()));
        doc.set_footer_link(Some("https://example.com".to_string()));
        doc.switch_page_template("numbered_page").expect("builtin template");
        doc.add_paragraph("Hello", None).expect("default style");

        let stats = doc.build().expect("can build");
        assert_eq!(stats.page_count, 1);
        assert_eq!(stats.toc_entries, 0);
        let written = std::fs::read(&outfile).expect("outfile exists");
        assert_eq!(written.len(), stats.bytes);
        assert!(written.starts_with(b"%PDF"));
    }

    #[test]
    fn can_add_tables_drawings_and_templates() {
        use crate::page_template::{Frame, PageDecoration};

        let mut doc = Booklet::new("x.pdf");
        let frame = Frame::new("wide", Pt(36.0), Pt(36.0), Pt(523.0), Pt(770.0));
        doc.add_page_template(PageTemplate::new("wide_page", vec![frame], PageDecoration::Numbered));
        doc.switch_page_template("wide_page").expect("template was added");
        doc.add_page_break();
        doc.add_table(
            vec![
                vec!["Peptide".to_string(), "Mass".to_string()],
                vec!["PEPTIDE".to_string(), "799.36".to_string()],
            ],
            TableStyle::default(),
        );
        doc.add_drawing(Drawing::new(Pt(100.0), Pt(50.0)));
        assert!(matches!(doc.flowables()[2], Flowable::Table(_)));
        assert!(matches!(doc.flowables()[3], Flowable::Drawing(_)));

        let (bytes, summary) = doc.render_with_summary().expect("can render");
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(summary.page_count, 2);
        assert_eq!(summary.passes, 1);
    }

    #[test]
    fn can_configure_page_geometry() {
        let config = BookletConfig {
            page_width_in: 8.5,
            page_height_in: 11.0,
            margin_left_in: 0.5,
            footer_tag: Some("tag".to_string()),
            title: Some("Configured".to_string()),
            ..BookletConfig::default()
        };
        let doc = Booklet::with_config(&config).expect("valid config");
        assert_eq!(doc.doc_template().page_width, Pt(612.0));
        assert_eq!(doc.doc_template().margins.left, Pt(36.0));
        assert_eq!(doc.doc_template().footer.tag.as_deref(), Some("tag"));

        let cramped = BookletConfig {
            page_width_in: 1.5,
            ..BookletConfig::default()
        };
        assert!(Booklet::with_config(&cramped).is_err());
    }

    #[test]
    fn rejects_zero_layout_passes() {
        let config = BookletConfig {
            max_passes: 0,
            ..BookletConfig::default()
        };
        assert!(Booklet::with_config(&config).is_err());

        let mut doc = Booklet::new("out.pdf");
        doc.set_max_passes(0);
        doc.add_paragraph("still renders", None).expect("can add paragraph");
        assert!(doc.render().is_ok());
    }
}

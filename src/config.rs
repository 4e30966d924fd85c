//! Document descriptions loaded from `booklet.toml` (or JSON).
//!
//! A configuration has a `[booklet]` table describing the output and page
//! geometry, followed by any number of `[[block]]` tables, each of which maps
//! onto one of the `Booklet::add_*` operations.

use crate::booklet::Booklet;
use crate::chart::{Chart, ChartPoint};
use crate::colour::Colour;
use crate::page_template::FooterConfig;
use crate::styles::StyleConfig;
use crate::table::TableStyle;
use crate::units::{In, Pt};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "booklet.toml";

/// Output and page settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookletConfig {
    /// Output PDF file path
    pub outfile: PathBuf,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    /// Page width in inches (A4 by default)
    #[serde(default = "default_page_width")]
    pub page_width_in: f32,
    /// Page height in inches (A4 by default)
    #[serde(default = "default_page_height")]
    pub page_height_in: f32,
    #[serde(default = "default_margin")]
    pub margin_top_in: f32,
    #[serde(default = "default_margin")]
    pub margin_right_in: f32,
    #[serde(default = "default_margin")]
    pub margin_bottom_in: f32,
    #[serde(default = "default_margin")]
    pub margin_left_in: f32,
    /// Text right-aligned in the footer of numbered pages
    #[serde(default)]
    pub footer_tag: Option<String>,
    /// URL the footer tag links to
    #[serde(default)]
    pub footer_link: Option<String>,
    #[serde(default = "default_footer_font_size")]
    pub footer_font_size_pt: f32,
    /// Leave out the creation date so identical input renders identical bytes
    #[serde(default = "default_invariant")]
    pub invariant: bool,
    /// Give up if the table of contents hasn't settled after this many passes
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
    /// Extra paragraph styles, usable by name from paragraph blocks
    #[serde(default)]
    pub styles: Vec<StyleConfig>,
}

fn default_page_width() -> f32 {
    210.0 / 25.4
}
fn default_page_height() -> f32 {
    297.0 / 25.4
}
fn default_margin() -> f32 {
    1.0
}
fn default_footer_font_size() -> f32 {
    6.0
}
fn default_invariant() -> bool {
    true
}
fn default_max_passes() -> usize {
    crate::doc_template::DEFAULT_MAX_PASSES
}
fn default_box_offset() -> f32 {
    30.0
}

impl Default for BookletConfig {
    fn default() -> Self {
        BookletConfig {
            outfile: PathBuf::from("booklet.pdf"),
            title: None,
            author: None,
            subject: None,
            page_width_in: default_page_width(),
            page_height_in: default_page_height(),
            margin_top_in: default_margin(),
            margin_right_in: default_margin(),
            margin_bottom_in: default_margin(),
            margin_left_in: default_margin(),
            footer_tag: None,
            footer_link: None,
            footer_font_size_pt: default_footer_font_size(),
            invariant: default_invariant(),
            max_passes: default_max_passes(),
            styles: Vec::new(),
        }
    }
}

impl BookletConfig {
    pub fn page_size(&self) -> (Pt, Pt) {
        (In(self.page_width_in).into(), In(self.page_height_in).into())
    }

    pub fn footer(&self) -> FooterConfig {
        FooterConfig {
            tag: self.footer_tag.clone(),
            link: self.footer_link.clone(),
            font_size: Pt(self.footer_font_size_pt),
        }
    }
}

/// A data point in a chart block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointConfig {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub colour: Option<Colour>,
}

/// One piece of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        text: String,
        /// Style name, `Paragraph` if unset
        #[serde(default)]
        style: Option<String>,
    },
    Bullet {
        text: String,
    },
    Spacer {
        height_in: f32,
    },
    /// A numbered chapter heading, `Chapter N` if no text is given
    TocHeader {
        #[serde(default)]
        text: Option<String>,
    },
    SubHeader {
        text: String,
    },
    Toc,
    PageBreak,
    /// Switches the template used from the next page on
    PageTemplate {
        id: String,
    },
    Figure {
        path: PathBuf,
        #[serde(default)]
        caption: String,
    },
    SpectraGraph {
        x: Vec<f32>,
        y: Vec<f32>,
    },
    Chart {
        width_pt: f32,
        height_pt: f32,
        /// Computed from the data when unset
        #[serde(default)]
        x_lims: Option<[f32; 2]>,
        #[serde(default)]
        y_lims: Option<[f32; 2]>,
        #[serde(default = "default_box_offset")]
        box_offset_pt: f32,
        #[serde(default)]
        x_label: Option<String>,
        #[serde(default)]
        points: Vec<PointConfig>,
        /// Drawn as a polyline
        #[serde(default)]
        line: Vec<[f32; 2]>,
        #[serde(default)]
        line_colour: Option<Colour>,
        #[serde(default)]
        scatter: Vec<[f32; 2]>,
        #[serde(default)]
        scatter_colour: Option<Colour>,
    },
    Table {
        rows: Vec<Vec<String>>,
        #[serde(default)]
        col_widths_pt: Option<Vec<f32>>,
        #[serde(default)]
        style: TableStyle,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub booklet: BookletConfig,
    #[serde(default)]
    pub block: Vec<Block>,
}

impl Configuration {
    /// Loads TOML, or JSON when the file ends in `.json`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Configuration> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to load {} contents", path.display()))?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON in {}", path.display()))
        } else {
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML in {}", path.display()))
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).with_context(|| "Failed to serialize configuration to TOML")
    }

    /// A small document exercising most block types, written by `booklet init`
    pub fn example() -> Configuration {
        Configuration {
            booklet: BookletConfig {
                title: Some("Example PDF Title".to_string()),
                ..BookletConfig::default()
            },
            block: vec![
                Block::Spacer { height_in: 2.5 },
                Block::Paragraph {
                    text: "Example PDF Title".to_string(),
                    style: Some(crate::styles::TITLE.to_string()),
                },
                Block::PageTemplate {
                    id: crate::page_template::NUMBERED_PAGE.to_string(),
                },
                Block::PageBreak,
                Block::TocHeader {
                    text: Some("Table of Contents".to_string()),
                },
                Block::Toc,
                Block::PageBreak,
                Block::TocHeader { text: None },
                Block::Paragraph {
                    text: "Lorum Ipsum et cetera.".to_string(),
                    style: None,
                },
                Block::Bullet {
                    text: "point one".to_string(),
                },
                Block::Bullet {
                    text: "point two".to_string(),
                },
                Block::SubHeader {
                    text: "Some numbers".to_string(),
                },
                Block::SpectraGraph {
                    x: vec![10.0, 25.0, 40.0, 80.0],
                    y: vec![50.0, 20.0, 90.0, 35.0],
                },
            ],
        }
    }

    /// Builds the booklet, resolving the relative outfile and figure paths
    /// against `base_dir`
    pub fn to_booklet(&self, base_dir: &Path) -> Result<Booklet> {
        let mut booklet = Booklet::with_config(&BookletConfig {
            outfile: base_dir.join(&self.booklet.outfile),
            ..self.booklet.clone()
        })?;
        for (index, block) in self.block.iter().enumerate() {
            add_block(&mut booklet, block, base_dir)
                .with_context(|| format!("Failed to add block {} ({})", index + 1, block.name()))?;
        }
        Ok(booklet)
    }
}

impl Block {
    pub fn name(&self) -> &'static str {
        match self {
            Block::Paragraph { .. } => "paragraph",
            Block::Bullet { .. } => "bullet",
            Block::Spacer { .. } => "spacer",
            Block::TocHeader { .. } => "toc_header",
            Block::SubHeader { .. } => "sub_header",
            Block::Toc => "toc",
            Block::PageBreak => "page_break",
            Block::PageTemplate { .. } => "page_template",
            Block::Figure { .. } => "figure",
            Block::SpectraGraph { .. } => "spectra_graph",
            Block::Chart { .. } => "chart",
            Block::Table { .. } => "table",
        }
    }
}

fn add_block(booklet: &mut Booklet, block: &Block, base_dir: &Path) -> Result<()> {
    match block {
        Block::Paragraph { text, style } => booklet.add_paragraph(text, style.as_deref())?,
        Block::Bullet { text } => booklet.add_bullet(text),
        Block::Spacer { height_in } => booklet.add_spacer(*height_in),
        Block::TocHeader { text } => booklet.add_toc_header(text.as_deref()),
        Block::SubHeader { text } => booklet.add_sub_header(text),
        Block::Toc => booklet.add_toc(),
        Block::PageBreak => booklet.add_page_break(),
        Block::PageTemplate { id } => booklet.switch_page_template(id)?,
        Block::Figure { path, caption } => booklet.add_figure(base_dir.join(path), caption)?,
        Block::SpectraGraph { x, y } => booklet.add_spectra_graph(x, y)?,
        Block::Chart {
            width_pt,
            height_pt,
            x_lims,
            y_lims,
            box_offset_pt,
            x_label,
            points,
            line,
            line_colour,
            scatter,
            scatter_colour,
        } => {
            let xs = points
                .iter()
                .map(|p| p.x)
                .chain(line.iter().chain(scatter).map(|p| p[0]));
            let ys = points
                .iter()
                .map(|p| p.y)
                .chain(line.iter().chain(scatter).map(|p| p[1]));
            let x_lims = x_lims.unwrap_or_else(|| Chart::auto_limits(&xs.collect::<Vec<f32>>()));
            let y_lims = y_lims.unwrap_or_else(|| Chart::auto_limits(&ys.collect::<Vec<f32>>()));

            let mut chart = Chart::new(
                Pt(*width_pt),
                Pt(*height_pt),
                x_lims,
                y_lims,
                Pt(*box_offset_pt),
            )?;
            if let Some(label) = x_label {
                chart = chart.with_x_label(label.clone());
            }
            let points: Vec<ChartPoint> = points
                .iter()
                .map(|p| ChartPoint {
                    x: p.x,
                    y: p.y,
                    label: p.label.clone(),
                    colour: p.colour,
                })
                .collect();
            chart.plot(&points);
            let pairs = |values: &[[f32; 2]]| values.iter().map(|p| (p[0], p[1])).collect::<Vec<_>>();
            if !line.is_empty() {
                chart.add_line_series(&pairs(line), line_colour.unwrap_or(crate::colour::colours::BLUE));
            }
            if !scatter.is_empty() {
                chart.add_scatter(&pairs(scatter), scatter_colour.unwrap_or(crate::colour::colours::RED));
            }
            booklet.add_chart(chart);
        }
        Block::Table {
            rows,
            col_widths_pt,
            style,
        } => {
            let mut table = crate::table::Table::new(rows.clone(), style.clone());
            if let Some(widths) = col_widths_pt {
                table = table.with_col_widths(widths.iter().copied().map(Pt).collect());
            }
            booklet.push(table.into());
        }
    }
    Ok(())
}

//! Named paragraph styles.
//!
//! The default sheet mirrors the handful of styles a booklet needs: a title, two
//! heading levels whose names double as table-of-contents markers
//! (`toc-entry-1`, `toc-entry-2`), bullets, body paragraphs and a footer.

use crate::colour::{colours, Colour};
use crate::fonts::BuiltinFont;
use crate::units::Pt;
use anyhow::{anyhow, Context, Result};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const TITLE: &str = "Title";
pub const HEADING1: &str = "toc-entry-1";
pub const HEADING2: &str = "toc-entry-2";
pub const BULLET: &str = "Bullet";
pub const PARAGRAPH: &str = "Paragraph";
pub const FOOTER: &str = "footer";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Right,
    #[serde(alias = "center")]
    Centre,
    Justify,
}

#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(setter(into))]
pub struct ParagraphStyle {
    pub name: String,
    #[builder(default)]
    pub font: BuiltinFont,
    #[builder(default = "Pt(10.0)")]
    pub font_size: Pt,
    #[builder(default = "Pt(12.0)")]
    pub leading: Pt,
    #[builder(default)]
    pub space_before: Pt,
    #[builder(default)]
    pub space_after: Pt,
    #[builder(default)]
    pub text_colour: Colour,
    #[builder(default)]
    pub alignment: Alignment,
    #[builder(default)]
    pub left_indent: Pt,
    #[builder(default)]
    pub bullet_indent: Pt,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        ParagraphStyle {
            name: "Normal".to_string(),
            font: BuiltinFont::Helvetica,
            font_size: Pt(10.0),
            leading: Pt(12.0),
            space_before: Pt(0.0),
            space_after: Pt(0.0),
            text_colour: colours::BLACK,
            alignment: Alignment::Left,
            left_indent: Pt(0.0),
            bullet_indent: Pt(0.0),
        }
    }
}

pub fn title_style() -> ParagraphStyle {
    ParagraphStyle {
        name: TITLE.to_string(),
        font: BuiltinFont::HelveticaBold,
        font_size: Pt(30.0),
        leading: Pt(30.0),
        space_after: Pt(12.0),
        text_colour: colours::MAROON,
        ..ParagraphStyle::default()
    }
}

pub fn heading1_style() -> ParagraphStyle {
    ParagraphStyle {
        name: HEADING1.to_string(),
        font: BuiltinFont::HelveticaBold,
        font_size: Pt(20.0),
        leading: Pt(20.0),
        space_after: Pt(20.0),
        ..ParagraphStyle::default()
    }
}

pub fn heading2_style() -> ParagraphStyle {
    ParagraphStyle {
        name: HEADING2.to_string(),
        font: BuiltinFont::HelveticaBold,
        font_size: Pt(16.0),
        leading: Pt(16.0),
        space_after: Pt(16.0),
        ..ParagraphStyle::default()
    }
}

pub fn bullet_style() -> ParagraphStyle {
    ParagraphStyle {
        name: BULLET.to_string(),
        font_size: Pt(12.0),
        leading: Pt(12.0),
        space_after: Pt(6.0),
        bullet_indent: Pt(0.0),
        left_indent: Pt(10.0),
        ..ParagraphStyle::default()
    }
}

pub fn paragraph_style() -> ParagraphStyle {
    ParagraphStyle {
        name: PARAGRAPH.to_string(),
        font_size: Pt(12.0),
        leading: Pt(12.0),
        space_after: Pt(12.0),
        alignment: Alignment::Justify,
        ..ParagraphStyle::default()
    }
}

pub fn footer_style() -> ParagraphStyle {
    ParagraphStyle {
        name: FOOTER.to_string(),
        font_size: Pt(12.0),
        leading: Pt(12.0),
        ..ParagraphStyle::default()
    }
}

/// A user-defined style, optionally derived from a registered one
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub name: String,
    #[serde(default)]
    pub based_on: Option<String>,
    #[serde(default)]
    pub font: Option<BuiltinFont>,
    #[serde(default)]
    pub font_size_pt: Option<f32>,
    #[serde(default)]
    pub leading_pt: Option<f32>,
    #[serde(default)]
    pub space_before_pt: Option<f32>,
    #[serde(default)]
    pub space_after_pt: Option<f32>,
    #[serde(default)]
    pub colour: Option<Colour>,
    #[serde(default)]
    pub alignment: Option<Alignment>,
    #[serde(default)]
    pub left_indent_pt: Option<f32>,
    #[serde(default)]
    pub bullet_indent_pt: Option<f32>,
}

/// Registry of styles by name
#[derive(Clone, Debug)]
pub struct StyleSheet {
    styles: HashMap<String, Arc<ParagraphStyle>>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        let mut sheet = StyleSheet {
            styles: HashMap::new(),
        };
        for style in [
            title_style(),
            heading1_style(),
            heading2_style(),
            bullet_style(),
            paragraph_style(),
            footer_style(),
        ] {
            sheet.insert(style);
        }
        sheet
    }
}

impl StyleSheet {
    pub fn get(&self, name: &str) -> Result<Arc<ParagraphStyle>> {
        self.styles
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown paragraph style '{name}'"))
    }

    /// Registers a style, replacing any style of the same name
    pub fn insert(&mut self, style: ParagraphStyle) -> Arc<ParagraphStyle> {
        let style = Arc::new(style);
        self.styles.insert(style.name.clone(), style.clone());
        style
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.styles.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    /// Builds a style from configuration, inheriting unset fields from `based_on`
    pub fn derive(&self, config: &StyleConfig) -> Result<ParagraphStyle> {
        let base = match &config.based_on {
            Some(parent) => self.get(parent)?.as_ref().clone(),
            None => ParagraphStyle::default(),
        };
        let pt = |value: Option<f32>, fallback: Pt| value.map(Pt).unwrap_or(fallback);

        ParagraphStyleBuilder::default()
            .name(config.name.clone())
            .font(config.font.unwrap_or(base.font))
            .font_size(pt(config.font_size_pt, base.font_size))
            .leading(pt(config.leading_pt, base.leading))
            .space_before(pt(config.space_before_pt, base.space_before))
            .space_after(pt(config.space_after_pt, base.space_after))
            .text_colour(config.colour.unwrap_or(base.text_colour))
            .alignment(config.alignment.unwrap_or(base.alignment))
            .left_indent(pt(config.left_indent_pt, base.left_indent))
            .bullet_indent(pt(config.bullet_indent_pt, base.bullet_indent))
            .build()
            .with_context(|| format!("Failed to build style '{}'", config.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_look_up_default_styles() {
        let sheet = StyleSheet::default();
        assert_eq!(
            sheet.names(),
            vec!["Bullet", "Paragraph", "Title", "footer", "toc-entry-1", "toc-entry-2"]
        );
        let title = sheet.get(TITLE).expect("title style exists");
        assert_eq!(title.font_size, Pt(30.0));
        assert_eq!(title.font, BuiltinFont::HelveticaBold);
        assert_eq!(title.text_colour, Colour::new_rgb(0.4, 0.0, 0.0));
        let paragraph = sheet.get(PARAGRAPH).expect("paragraph style exists");
        assert_eq!(paragraph.alignment, Alignment::Justify);
        assert!(sheet.get("nope").is_err());
    }

    #[test]
    fn can_derive_style_from_config() {
        let mut sheet = StyleSheet::default();
        let config = StyleConfig {
            name: "Quote".to_string(),
            based_on: Some(PARAGRAPH.to_string()),
            font: Some(BuiltinFont::HelveticaOblique),
            left_indent_pt: Some(24.0),
            ..StyleConfig::default()
        };
        let style = sheet.derive(&config).expect("can derive style");
        assert_eq!(style.font, BuiltinFont::HelveticaOblique);
        assert_eq!(style.left_indent, Pt(24.0));
        assert_eq!(style.font_size, Pt(12.0));
        assert_eq!(style.alignment, Alignment::Justify);
        sheet.insert(style);
        assert!(sheet.get("Quote").is_ok());
    }

    #[test]
    fn derive_fails_for_unknown_parent() {
        let sheet = StyleSheet::default();
        let config = StyleConfig {
            name: "Orphan".to_string(),
            based_on: Some("Missing".to_string()),
            ..StyleConfig::default()
        };
        assert!(sheet.derive(&config).is_err());
    }

    #[test]
    fn builder_requires_name() {
        assert!(ParagraphStyleBuilder::default().build().is_err());
        let style = ParagraphStyleBuilder::default()
            .name("Small")
            .font_size(Pt(8.0))
            .build()
            .expect("can build style");
        assert_eq!(style.leading, Pt(12.0));
    }
}

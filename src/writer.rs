//! Serializes laid out pages into PDF bytes with `pdf-writer`.

use crate::canvas::{image_resource_name, Canvas, LinkTarget};
use crate::figure::{ImageData, ImageEncoding};
use crate::fonts::BuiltinFont;
use crate::toc::TocEntry;
use anyhow::{Context, Result};
use chrono::{Datelike, Timelike};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Date, Filter, Finish, Name, Pdf, Ref, Str, TextStr};
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

/// Document properties written to the info dictionary
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: String,
    /// Leave out anything that changes between runs, such as the creation date
    pub invariant: bool,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        DocumentInfo {
            title: None,
            author: None,
            subject: None,
            creator: "booklet".to_string(),
            invariant: true,
        }
    }
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .with_context(|| "Failed to compress stream")?;
    encoder.finish().with_context(|| "Failed to compress stream")
}

fn write_image(pdf: &mut Pdf, refs: &mut Ref, image: &ImageData) -> Result<Ref> {
    let (width, height) = (image.width as i32, image.height as i32);
    let id = refs.bump();
    match &image.encoding {
        ImageEncoding::Jpeg { data, grey } => {
            let mut xobject = pdf.image_xobject(id, data);
            xobject.filter(Filter::DctDecode);
            xobject.width(width);
            xobject.height(height);
            if *grey {
                xobject.color_space().device_gray();
            } else {
                xobject.color_space().device_rgb();
            }
            xobject.bits_per_component(8);
        }
        ImageEncoding::Raw { rgb, alpha } => {
            let mask = match alpha {
                Some(alpha) => {
                    let mask_id = refs.bump();
                    let data = compress(alpha)?;
                    let mut mask = pdf.image_xobject(mask_id, &data);
                    mask.filter(Filter::FlateDecode);
                    mask.width(width);
                    mask.height(height);
                    mask.color_space().device_gray();
                    mask.bits_per_component(8);
                    Some(mask_id)
                }
                None => None,
            };
            let data = compress(rgb)?;
            let mut xobject = pdf.image_xobject(id, &data);
            xobject.filter(Filter::FlateDecode);
            xobject.width(width);
            xobject.height(height);
            xobject.color_space().device_rgb();
            xobject.bits_per_component(8);
            if let Some(mask) = mask {
                xobject.s_mask(mask);
            }
        }
    }
    Ok(id)
}

/// One bookmark in the outline tree
struct OutlineNode {
    id: Ref,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Nests TOC entries by level: each entry becomes a child of the closest
/// preceding entry with a smaller level
fn outline_tree(entries: &[TocEntry], refs: &mut Ref) -> (Vec<OutlineNode>, Vec<usize>) {
    let mut nodes: Vec<OutlineNode> = Vec::with_capacity(entries.len());
    let mut roots = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        while let Some(&top) = stack.last() {
            if entries[top].level >= entry.level {
                stack.pop();
            } else {
                break;
            }
        }
        let parent = stack.last().copied();
        match parent {
            Some(parent) => nodes[parent].children.push(index),
            None => roots.push(index),
        }
        nodes.push(OutlineNode {
            id: refs.bump(),
            parent,
            children: Vec::new(),
        });
        stack.push(index);
    }
    (nodes, roots)
}

fn descendants(nodes: &[OutlineNode], index: usize) -> usize {
    nodes[index]
        .children
        .iter()
        .map(|&child| 1 + descendants(nodes, child))
        .sum()
}

fn write_outline(
    pdf: &mut Pdf,
    refs: &mut Ref,
    entries: &[TocEntry],
    page_ids: &[Ref],
) -> Option<Ref> {
    let entries: Vec<TocEntry> = entries
        .iter()
        .filter(|e| e.destination.page_index < page_ids.len())
        .cloned()
        .collect();
    if entries.is_empty() {
        return None;
    }
    let outline_id = refs.bump();
    let (nodes, roots) = outline_tree(&entries, refs);

    for (index, entry) in entries.iter().enumerate() {
        let node = &nodes[index];
        let siblings = match node.parent {
            Some(parent) => &nodes[parent].children,
            None => &roots,
        };
        let position = siblings.iter().position(|&s| s == index).unwrap_or(0);

        let mut item = pdf.outline_item(node.id);
        item.title(TextStr(&entry.text));
        item.parent(node.parent.map(|p| nodes[p].id).unwrap_or(outline_id));
        if position > 0 {
            item.prev(nodes[siblings[position - 1]].id);
        }
        if let Some(&next) = siblings.get(position + 1) {
            item.next(nodes[next].id);
        }
        if let (Some(&first), Some(&last)) = (node.children.first(), node.children.last()) {
            item.first(nodes[first].id);
            item.last(nodes[last].id);
            item.count(descendants(&nodes, index) as i32);
        }
        item.dest()
            .page(page_ids[entry.destination.page_index])
            .xyz(0.0, *entry.destination.top, None);
    }

    let total = roots.len() + roots.iter().map(|&r| descendants(&nodes, r)).sum::<usize>();
    let mut outline = pdf.outline(outline_id);
    if let (Some(&first), Some(&last)) = (roots.first(), roots.last()) {
        outline.first(nodes[first].id);
        outline.last(nodes[last].id);
    }
    outline.count(total as i32);
    Some(outline_id)
}

fn pdf_date(now: chrono::DateTime<chrono::Local>) -> Date {
    Date::new(now.year() as u16)
        .month(now.month() as u8)
        .day(now.day() as u8)
        .hour(now.hour() as u8)
        .minute(now.minute() as u8)
        .second(now.second() as u8)
}

/// Writes the pages, bookmarks and document info into a complete PDF file
pub fn write_pdf(pages: Vec<Canvas>, toc_entries: &[TocEntry], info: &DocumentInfo) -> Result<Vec<u8>> {
    let mut pdf = Pdf::new();
    let mut refs = Ref::new(1);
    let catalog_id = refs.bump();
    let tree_id = refs.bump();
    let page_ids: Vec<Ref> = pages.iter().map(|_| refs.bump()).collect();

    let mut font_ids: BTreeMap<BuiltinFont, Ref> = BTreeMap::new();
    for font in pages.iter().flat_map(|page| page.fonts.iter()) {
        if !font_ids.contains_key(font) {
            let id = refs.bump();
            pdf.type1_font(id)
                .base_font(Name(font.base_name().as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            font_ids.insert(*font, id);
        }
    }

    let mut image_ids: Vec<(Arc<ImageData>, Ref)> = Vec::new();

    for (index, page) in pages.into_iter().enumerate() {
        let mut page_images = Vec::with_capacity(page.images.len());
        for image in &page.images {
            let existing = image_ids
                .iter()
                .find(|(seen, _)| Arc::ptr_eq(seen, image))
                .map(|(_, id)| *id);
            let id = match existing {
                Some(id) => id,
                None => {
                    let id = write_image(&mut pdf, &mut refs, image).with_context(|| {
                        format!("Failed to write image on page {}", index + 1)
                    })?;
                    image_ids.push((image.clone(), id));
                    id
                }
            };
            page_images.push(id);
        }

        let mut annotation_ids = Vec::with_capacity(page.links.len());
        for link in &page.links {
            let target_page = match &link.target {
                LinkTarget::Internal(dest) => match page_ids.get(dest.page_index) {
                    Some(id) => Some((*id, dest.top)),
                    None => {
                        log::warn!("Dropping link to missing page {}", dest.page_index + 1);
                        continue;
                    }
                },
                LinkTarget::Uri(_) => None,
            };
            let id = refs.bump();
            let mut annotation = pdf.annotation(id);
            annotation
                .subtype(AnnotationType::Link)
                .rect(link.rect.to_pdf())
                .border(0.0, 0.0, 0.0, None);
            match (&link.target, target_page) {
                (_, Some((page_id, top))) => {
                    annotation
                        .action()
                        .action_type(ActionType::GoTo)
                        .destination()
                        .page(page_id)
                        .xyz(0.0, *top, None);
                }
                (LinkTarget::Uri(uri), None) => {
                    annotation
                        .action()
                        .action_type(ActionType::Uri)
                        .uri(Str(uri.as_bytes()));
                }
                (LinkTarget::Internal(_), None) => {}
            }
            annotation_ids.push(id);
        }

        let content_id = refs.bump();
        let content = compress(&page.content.finish())?;
        pdf.stream(content_id, &content).filter(Filter::FlateDecode);

        let mut pdf_page = pdf.page(page_ids[index]);
        pdf_page
            .media_box(pdf_writer::Rect::new(0.0, 0.0, *page.width, *page.height))
            .parent(tree_id)
            .contents(content_id);
        if !annotation_ids.is_empty() {
            pdf_page.annotations(annotation_ids);
        }
        let mut resources = pdf_page.resources();
        let mut fonts = resources.fonts();
        for font in &page.fonts {
            if let Some(id) = font_ids.get(font) {
                fonts.pair(Name(font.resource_name()), *id);
            }
        }
        fonts.finish();
        if !page_images.is_empty() {
            let mut x_objects = resources.x_objects();
            for (i, id) in page_images.iter().enumerate() {
                x_objects.pair(Name(image_resource_name(i).as_bytes()), *id);
            }
        }
    }

    pdf.pages(tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    let outline_id = write_outline(&mut pdf, &mut refs, toc_entries, &page_ids);

    let mut catalog = pdf.catalog(catalog_id);
    catalog.pages(tree_id);
    if let Some(outline_id) = outline_id {
        catalog.outlines(outline_id);
    }
    catalog.finish();

    let info_id = refs.bump();
    let mut document_info = pdf.document_info(info_id);
    if let Some(title) = &info.title {
        document_info.title(TextStr(title));
    }
    if let Some(author) = &info.author {
        document_info.author(TextStr(author));
    }
    if let Some(subject) = &info.subject {
        document_info.subject(TextStr(subject));
    }
    document_info.creator(TextStr(&info.creator));
    document_info.producer(TextStr(concat!("booklet ", env!("CARGO_PKG_VERSION"))));
    if !info.invariant {
        document_info.creation_date(pdf_date(chrono::Local::now()));
    }
    document_info.finish();

    Ok(pdf.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Destination;
    use crate::rect::Rect;
    use crate::units::Pt;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn entry(level: usize, text: &str, page_index: usize) -> TocEntry {
        TocEntry {
            level,
            text: text.to_string(),
            page: page_index + 1,
            destination: Destination {
                page_index,
                top: Pt(700.0),
            },
        }
    }

    fn pages() -> Vec<Canvas> {
        let mut first = Canvas::new(1, Pt(200.0), Pt(300.0));
        first
            .set_font(BuiltinFont::HelveticaBold, Pt(12.0))
            .draw_string(Pt(10.0), Pt(10.0), "Hello")
            .link_url("https://example.com", Rect::new(Pt(0.0), Pt(0.0), Pt(10.0), Pt(10.0)))
            .link_to(
                Destination {
                    page_index: 1,
                    top: Pt(250.0),
                },
                Rect::new(Pt(0.0), Pt(20.0), Pt(10.0), Pt(10.0)),
            );
        let second = Canvas::new(2, Pt(200.0), Pt(300.0));
        vec![first, second]
    }

    #[test]
    fn can_nest_outline_entries() {
        let entries = vec![
            entry(1, "One", 0),
            entry(2, "One.a", 0),
            entry(2, "One.b", 1),
            entry(1, "Two", 1),
            entry(3, "Two deep", 1),
        ];
        let mut refs = Ref::new(1);
        let (nodes, roots) = outline_tree(&entries, &mut refs);
        assert_eq!(roots, vec![0, 3]);
        assert_eq!(nodes[0].children, vec![1, 2]);
        assert_eq!(nodes[3].children, vec![4]);
        assert_eq!(nodes[4].parent, Some(3));
        assert_eq!(descendants(&nodes, 0), 2);
    }

    #[test]
    fn can_write_pdf() {
        let info = DocumentInfo {
            title: Some("Example".to_string()),
            ..DocumentInfo::default()
        };
        let bytes = write_pdf(pages(), &[entry(1, "Chapter 1", 1)], &info).expect("can write");
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"/Helvetica-Bold"));
        assert!(contains(&bytes, b"/WinAnsiEncoding"));
        assert!(contains(&bytes, b"https://example.com"));
        assert!(contains(&bytes, b"/Outlines"));
        assert!(contains(&bytes, b"Example"));
        assert!(!contains(&bytes, b"/CreationDate"));
    }

    #[test]
    fn invariant_output_is_reproducible() {
        let info = DocumentInfo::default();
        let a = write_pdf(pages(), &[], &info).expect("can write");
        let b = write_pdf(pages(), &[], &info).expect("can write");
        assert_eq!(a, b);
        assert!(!contains(&a, b"/Outlines"));

        let dated = DocumentInfo {
            invariant: false,
            ..DocumentInfo::default()
        };
        let c = write_pdf(pages(), &[], &dated).expect("can write");
        assert!(contains(&c, b"/CreationDate"));
    }
}

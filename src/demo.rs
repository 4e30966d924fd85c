//! The sample booklet: a title page, a table of contents and two short
//! chapters, one with an optional figure and one with a random stick graph.

use crate::booklet::Booklet;
use crate::figure::resize_image;
use crate::page_template::NUMBERED_PAGE;
use crate::styles::TITLE;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

pub const FOOTER_TAG: &str = "made with http://boscoh.github.io/peptagram";
pub const FOOTER_LINK: &str = "http://boscoh.github.io/peptagram";

const GRAPH_POINTS: usize = 100;
const FIGURE_WIDTH: u32 = 100;

#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub outfile: PathBuf,
    /// Resized and placed in the first chapter
    pub image: Option<PathBuf>,
    /// Seeds the graph data, random if unset
    pub seed: Option<u64>,
}

fn random_values(rng: &mut StdRng) -> Vec<f32> {
    (0..GRAPH_POINTS)
        .map(|_| rng.random_range(0..=100) as f32)
        .collect()
}

/// Assembles the sample booklet. The returned temp dir holds the resized
/// figure and has to outlive the build.
pub fn sample_booklet(options: &DemoOptions) -> Result<(Booklet, tempfile::TempDir)> {
    let scratch = tempfile::tempdir().with_context(|| "Failed to create scratch directory")?;
    let mut doc = Booklet::new(&options.outfile);
    doc.set_footer_tag(Some(FOOTER_TAG.to_string()));
    doc.set_footer_link(Some(FOOTER_LINK.to_string()));

    doc.add_spacer(2.5);
    doc.add_paragraph("Example PDF Title", Some(TITLE))?;
    doc.add_paragraph("Oh Yeah", Some(TITLE))?;

    doc.switch_page_template(NUMBERED_PAGE)?;
    doc.add_page_break();

    doc.add_toc_header(Some("Table of Contents"));
    doc.add_toc();

    doc.add_page_break();
    doc.add_toc_header(Some("Chapter 1"));
    doc.add_paragraph("Lorum Ipsum et cetera.", None)?;
    doc.add_bullet("point one");
    doc.add_bullet("point two");

    if let Some(image) = &options.image {
        let resized = resized_path(scratch.path(), image);
        resize_image(image, &resized, Some(FIGURE_WIDTH), None)?;
        doc.add_figure(&resized, "This is a seal.")?;
    }

    doc.add_page_break();
    doc.add_toc_header(Some("Next Chapter"));
    doc.add_paragraph("More spicey.", None)?;

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let x_vals = random_values(&mut rng);
    let y_vals = random_values(&mut rng);
    doc.add_spectra_graph(&x_vals, &y_vals)?;

    Ok((doc, scratch))
}

/// `seal.jpg` becomes `<dir>/seal-100.jpg`
fn resized_path(dir: &Path, image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "figure".to_string());
    let extension = image
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "png".to_string());
    dir.join(format!("{stem}-{FIGURE_WIDTH}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_name_resized_images() {
        assert_eq!(
            resized_path(Path::new("/tmp"), Path::new("pics/seal.jpg")),
            PathBuf::from("/tmp/seal-100.jpg")
        );
    }

    #[test]
    fn can_render_seeded_demo_reproducibly() {
        let options = DemoOptions {
            outfile: PathBuf::from("demo.pdf"),
            image: None,
            seed: Some(42),
        };
        let (first, _scratch) = sample_booklet(&options).expect("can assemble demo");
        let (second, _scratch) = sample_booklet(&options).expect("can assemble demo");
        let a = first.render_with_summary().expect("can render");
        let b = second.render().expect("can render");
        assert_eq!(a.0, b);
        assert_eq!(a.1.page_count, 4);
        let titles: Vec<&str> = a.1.toc_entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(titles, vec!["Table of Contents", "Chapter 1", "Next Chapter"]);
    }

    #[test]
    fn can_include_a_figure() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let image = dir.path().join("seal.png");
        image::RgbImage::from_pixel(300, 200, image::Rgb([90, 120, 150]))
            .save(&image)
            .expect("can write png");
        let options = DemoOptions {
            outfile: dir.path().join("demo.pdf"),
            image: Some(image),
            seed: Some(7),
        };
        let (doc, _scratch) = sample_booklet(&options).expect("can assemble demo");
        assert!(doc
            .flowables()
            .iter()
            .any(|f| matches!(f, crate::flowable::Flowable::Figure(_))));
        let stats = doc.build().expect("can build");
        assert_eq!(stats.page_count, 4);
    }
}

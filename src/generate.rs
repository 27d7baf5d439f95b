//! HTML site generation.
//!
//! Takes the navigation sequence and writes the static site. Rendering goes
//! through the [`PageRenderer`] trait; the production implementation is
//! [`MaudRenderer`].
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): every comic, newest first
//! - **Comic pages** (`/{slug}/index.html`): one comic with previous/next links
//!
//! ## Output Structure
//!
//! ```text
//! docs/
//! ├── index.html
//! ├── _images/                   # Published images (see imaging)
//! │   └── first-strip.png
//! └── first-strip/
//!     └── index.html
//! ```
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time; color variables from the
//! config are prepended.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::config::{self, SiteConfig};
use crate::navigation::{self, ComicLink, NavigationEntry};
use crate::types::ComicRecord;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot write {0}: {1}")]
    Io(PathBuf, #[source] io::Error),
    #[error("{template} template failed for {page}: {reason}")]
    Template {
        template: Template,
        page: String,
        reason: String,
    },
    #[error("{first} and {second} share the slug {slug:?}; their pages would overwrite each other")]
    DuplicateSlug {
        slug: String,
        first: String,
        second: String,
    },
    #[error("{filename} has the slug {slug:?}, which is the published images directory")]
    ReservedSlug { slug: String, filename: String },
}

/// Which page layout to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Index,
    Comic,
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Template::Index => "index",
            Template::Comic => "comic",
        })
    }
}

/// A page to render, with its data.
#[derive(Debug, Clone, Copy)]
pub enum Page<'a> {
    /// The listing. Entries are in catalog order (oldest first); the
    /// template reverses them.
    Index(&'a [NavigationEntry<'a>]),
    Comic(&'a NavigationEntry<'a>),
}

impl Page<'_> {
    pub fn template(&self) -> Template {
        match self {
            Page::Index(_) => Template::Index,
            Page::Comic(_) => Template::Comic,
        }
    }

    /// Where the page lands under `output_dir`.
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        match self {
            Page::Index(_) => output_dir.join("index.html"),
            Page::Comic(entry) => output_dir.join(entry.slug).join("index.html"),
        }
    }
}

/// Turns page data into HTML text.
///
/// `Sync` because comic pages render on the rayon pool.
pub trait PageRenderer: Sync {
    fn render(&self, page: &Page<'_>) -> Result<String, RenderError>;
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Renders pages with maud.
#[derive(Debug, Clone)]
pub struct MaudRenderer {
    title: String,
    home: String,
    css: String,
}

impl MaudRenderer {
    pub fn new(config: &SiteConfig) -> Self {
        let color_css = config::generate_color_css(&config.colors);
        Self {
            title: config.title.clone(),
            home: config.public_paths().root(),
            css: format!("{}\n\n{}", color_css, CSS_STATIC),
        }
    }
}

impl PageRenderer for MaudRenderer {
    fn render(&self, page: &Page<'_>) -> Result<String, RenderError> {
        let markup = match page {
            Page::Index(entries) => self.render_index(entries),
            Page::Comic(entry) => self.render_comic(entry),
        };
        Ok(markup.into_string())
    }
}

/// Write the index page, then every comic page in parallel.
///
/// Returns the number of pages written. Fails before writing anything if two
/// comics share a slug, or if a slug names the images directory
/// (`images_path`) that lives next to the comic pages.
pub fn write_site(
    renderer: &impl PageRenderer,
    entries: &[NavigationEntry<'_>],
    output_dir: &Path,
    images_path: &str,
) -> Result<usize, RenderError> {
    if let Some(entry) = entries.iter().find(|e| e.slug == images_path) {
        return Err(RenderError::ReservedSlug {
            slug: entry.slug.to_string(),
            filename: entry.record.filename.clone(),
        });
    }
    if let Some((slug, first, second)) = navigation::find_slug_collision(entries) {
        return Err(RenderError::DuplicateSlug {
            slug: slug.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        });
    }

    write_page(renderer, &Page::Index(entries), output_dir)?;
    tracing::debug!("index page written");

    entries
        .par_iter()
        .map(|entry| write_page(renderer, &Page::Comic(entry), output_dir))
        .collect::<Result<Vec<()>, _>>()?;
    Ok(entries.len() + 1)
}

fn write_page(
    renderer: &impl PageRenderer,
    page: &Page<'_>,
    output_dir: &Path,
) -> Result<(), RenderError> {
    let html = renderer.render(page)?;
    let path = page.output_path(output_dir);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| RenderError::Io(dir.to_path_buf(), e))?;
    }
    fs::write(&path, html).map_err(|e| RenderError::Io(path, e))
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

fn site_header(title: &str, home: &str) -> Markup {
    html! {
        header.site-header {
            a.site-title href=(home) { (title) }
        }
    }
}

/// `<img>` for a comic, sized when dimensions are known so the layout
/// does not jump while loading.
fn comic_image(record: &ComicRecord, src: &str, alt: &str, lazy: bool) -> Markup {
    let (width, height) = record.dimensions().unzip();
    html! {
        img src=(src) alt=(alt) width=[width] height=[height] loading=[lazy.then_some("lazy")];
    }
}

fn published(record: &ComicRecord) -> Markup {
    html! {
        time datetime=(record.created_at.to_iso_string()) { (record.created_at.display_date()) }
    }
}

fn nav_link(link: Option<&ComicLink<'_>>, class: &str, rel: &str, label: &str) -> Markup {
    html! {
        @match link {
            Some(link) => {
                a class=(class) href=(link.href) rel=(rel) title=(link.name) { (label) }
            }
            None => {
                span class={ (class) " disabled" } aria-disabled="true" { (label) }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

impl MaudRenderer {
    /// Index page: every comic, newest first.
    fn render_index(&self, entries: &[NavigationEntry<'_>]) -> Markup {
        let content = html! {
            (site_header(&self.title, &self.home))
            main.index-page {
                @if entries.is_empty() {
                    p.empty { "No comics yet." }
                } @else {
                    ol.comic-list reversed {
                        @for entry in entries.iter().rev() {
                            li.comic-card {
                                a.comic-thumb href=(entry.href) {
                                    (comic_image(entry.record, &entry.image_url, &entry.display_name, true))
                                }
                                div.comic-meta {
                                    a.comic-title href=(entry.href) { (entry.display_name) }
                                    (published(entry.record))
                                }
                            }
                        }
                    }
                }
            }
        };

        base_document(&self.title, &self.css, Some("index"), content)
    }

    /// Comic page: one strip with previous/next navigation.
    fn render_comic(&self, entry: &NavigationEntry<'_>) -> Markup {
        let page_title = format!("{} - {}", entry.name, self.title);

        let comic_nav = html! {
            nav.comic-nav {
                (nav_link(entry.previous.as_ref(), "prev", "prev", "‹ Previous"))
                a.archive href=(self.home) { "All comics" }
                (nav_link(entry.next.as_ref(), "next", "next", "Next ›"))
            }
        };

        let content = html! {
            (site_header(&self.title, &self.home))
            main.comic-page {
                article.comic {
                    header.comic-header {
                        h1 { (entry.name) }
                        (published(entry.record))
                    }
                    figure.comic-frame {
                        (comic_image(entry.record, &entry.image_url, entry.name, false))
                    }
                }
                (comic_nav)
            }
        };

        base_document(&page_title, &self.css, Some("comic-view"), content)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{PublicPaths, sequence};
    use crate::test_helpers::{record, sized};
    use tempfile::TempDir;

    fn renderer() -> MaudRenderer {
        MaudRenderer::new(&SiteConfig::default())
    }

    fn paths() -> PublicPaths {
        PublicPaths::new("/comics", "_images")
    }

    fn three() -> Vec<ComicRecord> {
        vec![
            sized("alpha-one.png", "2019-01-01T00:00:00.000Z", 800, 600),
            record("bravo.png", "2019-01-02T00:00:00.000Z"),
            record("charlie_three.jpg", "2019-01-03T00:00:00.000Z"),
        ]
    }

    fn render(page: &Page<'_>) -> String {
        renderer().render(page).unwrap()
    }

    #[test]
    fn base_document_includes_doctype() {
        let html = base_document("Test", "", None, html! {}).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Test</title>"));
    }

    #[test]
    fn base_document_applies_body_class() {
        let html = base_document("T", "", Some("comic-view"), html! {}).into_string();
        assert!(html.contains(r#"<body class="comic-view">"#));
    }

    #[test]
    fn page_templates_and_paths() {
        let records = three();
        let entries = sequence(&records, &paths());
        let out = Path::new("/out");

        assert_eq!(Page::Index(&entries).template(), Template::Index);
        assert_eq!(Page::Index(&entries).output_path(out), PathBuf::from("/out/index.html"));
        assert_eq!(Page::Comic(&entries[1]).template(), Template::Comic);
        assert_eq!(
            Page::Comic(&entries[1]).output_path(out),
            PathBuf::from("/out/bravo/index.html")
        );
    }

    #[test]
    fn index_lists_newest_first() {
        let records = three();
        let entries = sequence(&records, &paths());
        let html = render(&Page::Index(&entries));

        let alpha = html.find("Alpha one").unwrap();
        let bravo = html.find("Bravo").unwrap();
        let charlie = html.find("Charlie three").unwrap();
        assert!(charlie < bravo && bravo < alpha);
    }

    #[test]
    fn index_links_and_images_use_public_paths() {
        let records = three();
        let entries = sequence(&records, &paths());
        let html = render(&Page::Index(&entries));

        assert!(html.contains(r#"href="/comics/alpha-one/""#));
        assert!(html.contains(r#"src="/comics/_images/alpha-one.png""#));
        assert!(html.contains(r#"width="800" height="600""#));
        assert!(html.contains(r#"<time datetime="2019-01-01T00:00:00.000Z">January 1, 2019</time>"#));
    }

    #[test]
    fn index_image_without_dimensions_has_no_size_attributes() {
        let records = vec![record("bravo.png", "2019-01-02T00:00:00.000Z")];
        let entries = sequence(&records, &paths());
        let html = render(&Page::Index(&entries));
        assert!(!html.contains(" width=\""));
    }

    #[test]
    fn empty_index_says_so() {
        let html = render(&Page::Index(&[]));
        assert!(html.contains("No comics yet."));
    }

    #[test]
    fn comic_page_middle_has_both_links() {
        let records = three();
        let entries = sequence(&records, &paths());
        let html = render(&Page::Comic(&entries[1]));

        assert!(html.contains("<h1>bravo</h1>"));
        assert!(html.contains(r#"href="/comics/alpha-one/" rel="prev""#));
        assert!(html.contains(r#"href="/comics/charlie_three/" rel="next""#));
        assert!(!html.contains("aria-disabled"));
    }

    #[test]
    fn comic_page_first_has_no_previous() {
        let records = three();
        let entries = sequence(&records, &paths());
        let html = render(&Page::Comic(&entries[0]));

        assert!(!html.contains(r#"rel="prev""#));
        assert!(html.contains(r#"class="prev disabled""#));
        assert!(html.contains(r#"rel="next""#));
    }

    #[test]
    fn comic_page_last_has_no_next() {
        let records = three();
        let entries = sequence(&records, &paths());
        let html = render(&Page::Comic(&entries[2]));

        assert!(html.contains(r#"rel="prev""#));
        assert!(!html.contains(r#"rel="next""#));
        assert!(html.contains(r#"class="next disabled""#));
    }

    #[test]
    fn comic_page_links_home() {
        let records = three();
        let entries = sequence(&records, &paths());
        let html = render(&Page::Comic(&entries[0]));
        assert!(html.contains(r#"href="/comics/""#));
        assert!(html.contains("<title>alpha-one - Comics</title>"));
    }

    #[test]
    fn html_escape_in_names() {
        let records = vec![record("<b>bold</b>.png", "2019-01-01T00:00:00.000Z")];
        let entries = sequence(&records, &paths());
        let html = render(&Page::Comic(&entries[0]));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!html.contains("<b>bold"));
    }

    #[test]
    fn css_includes_config_colors() {
        let html = render(&Page::Index(&[]));
        assert!(html.contains("--color-bg: #fffdf7;"));
    }

    #[test]
    fn write_site_writes_index_and_pages() {
        let tmp = TempDir::new().unwrap();
        let records = three();
        let entries = sequence(&records, &paths());

        let pages = write_site(&renderer(), &entries, tmp.path(), "_images").unwrap();

        assert_eq!(pages, 4);
        assert!(tmp.path().join("index.html").exists());
        for slug in ["alpha-one", "bravo", "charlie_three"] {
            assert!(tmp.path().join(slug).join("index.html").exists(), "{slug}");
        }
    }

    #[test]
    fn write_site_empty_catalog_writes_only_index() {
        let tmp = TempDir::new().unwrap();
        let pages = write_site(&renderer(), &[], tmp.path(), "_images").unwrap();
        assert_eq!(pages, 1);
        assert!(tmp.path().join("index.html").exists());
    }

    #[test]
    fn write_site_rejects_duplicate_slugs() {
        let tmp = TempDir::new().unwrap();
        let records = vec![
            record("strip.png", "2019-01-01T00:00:00.000Z"),
            record("strip.jpg", "2019-01-02T00:00:00.000Z"),
        ];
        let entries = sequence(&records, &paths());

        let err = write_site(&renderer(), &entries, tmp.path(), "_images").unwrap_err();

        assert!(matches!(err, RenderError::DuplicateSlug { ref slug, .. } if slug == "strip"));
        assert!(!tmp.path().join("index.html").exists());
    }

    #[test]
    fn write_site_rejects_slug_of_images_dir() {
        let tmp = TempDir::new().unwrap();
        let records = vec![
            record("a.png", "2019-01-01T00:00:00.000Z"),
            record("_images.png", "2019-01-02T00:00:00.000Z"),
        ];
        let entries = sequence(&records, &paths());

        let err = write_site(&renderer(), &entries, tmp.path(), "_images").unwrap_err();

        assert!(matches!(
            err,
            RenderError::ReservedSlug { ref slug, ref filename } if slug == "_images" && filename == "_images.png"
        ));
        assert!(!tmp.path().join("index.html").exists());
        assert!(!tmp.path().join("_images").exists());
    }

    #[test]
    fn write_site_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        let records = three();
        let entries = sequence(&records, &paths());

        write_site(&renderer(), &entries, tmp.path(), "_images").unwrap();
        let first = fs::read(tmp.path().join("bravo/index.html")).unwrap();
        write_site(&renderer(), &entries, tmp.path(), "_images").unwrap();
        let second = fs::read(tmp.path().join("bravo/index.html")).unwrap();

        assert_eq!(first, second);
    }
}

//! Previous/next sequencing over the ordered catalog.
//!
//! Every record becomes a [`NavigationEntry`] carrying its derived names and
//! URLs plus links to its neighbours. Entries borrow from the record slice
//! and are rebuilt on every run; nothing here is persisted.
//!
//! ```text
//! records:   [a]        [b]        [c]
//! previous:  -          a          b
//! next:      b          c          -
//! ```

use crate::naming;
use crate::types::ComicRecord;
use std::collections::HashMap;

/// Public URL layout of the published site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicPaths {
    base_path: String,
    images_path: String,
}

impl PublicPaths {
    /// `base_path` like `/comics` (or empty for a site at the domain root);
    /// `images_path` is the assets directory name under it.
    pub fn new(base_path: &str, images_path: &str) -> Self {
        Self {
            base_path: base_path.trim_end_matches('/').to_string(),
            images_path: images_path.trim_matches('/').to_string(),
        }
    }

    /// URL of the index page.
    pub fn root(&self) -> String {
        format!("{}/", self.base_path)
    }

    /// URL of a comic's detail page.
    pub fn href(&self, slug: &str) -> String {
        format!("{}/{}/", self.base_path, slug)
    }

    /// URL of a published image.
    pub fn image_url(&self, filename: &str) -> String {
        format!("{}/{}/{}", self.base_path, self.images_path, filename)
    }
}

/// A neighbour link: enough to label and point at another comic.
#[derive(Debug, Clone, PartialEq)]
pub struct ComicLink<'a> {
    pub slug: &'a str,
    pub name: &'a str,
    pub href: String,
}

/// One comic with everything a page needs to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationEntry<'a> {
    pub record: &'a ComicRecord,
    pub slug: &'a str,
    /// Detail-page name: the slug as-is.
    pub name: &'a str,
    /// Index-listing name, e.g. `First strip`.
    pub display_name: String,
    pub href: String,
    pub image_url: String,
    pub previous: Option<ComicLink<'a>>,
    pub next: Option<ComicLink<'a>>,
}

fn link<'a>(record: &'a ComicRecord, paths: &PublicPaths) -> ComicLink<'a> {
    let slug = naming::slug(&record.filename);
    ComicLink {
        slug,
        name: slug,
        href: paths.href(slug),
    }
}

/// Build navigation entries for `records`, which must already be in
/// catalog order.
pub fn sequence<'a>(records: &'a [ComicRecord], paths: &PublicPaths) -> Vec<NavigationEntry<'a>> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let slug = naming::slug(&record.filename);
            NavigationEntry {
                record,
                slug,
                name: slug,
                display_name: naming::display_name(slug),
                href: paths.href(slug),
                image_url: paths.image_url(&record.filename),
                previous: idx
                    .checked_sub(1)
                    .and_then(|prev| records.get(prev))
                    .map(|r| link(r, paths)),
                next: records.get(idx + 1).map(|r| link(r, paths)),
            }
        })
        .collect()
}

/// First pair of entries whose slugs collide, as `(slug, first, second)`
/// filenames. Colliding entries would render to the same page.
pub fn find_slug_collision<'a>(
    entries: &[NavigationEntry<'a>],
) -> Option<(&'a str, &'a str, &'a str)> {
    let mut seen: HashMap<&'a str, &'a str> = HashMap::new();
    for entry in entries {
        let record: &'a ComicRecord = entry.record;
        if let Some(first) = seen.insert(entry.slug, &record.filename) {
            return Some((entry.slug, first, &record.filename));
        }
    }
    None
}

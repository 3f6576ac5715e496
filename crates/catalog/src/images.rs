//! Published image selection.

use records::ImageRow;

/// Picks the published image URLs for one product.
///
/// Thumbnail renditions are dropped, JPEG files shadowed by a WebP
/// rendition of the same name are dropped, and the survivors are capped
/// at `max` with the cover image first and the rest by upload recency.
/// A product with nothing left gets the placeholder so consumers never
/// see an empty gallery.
pub fn select_images(rows: &[ImageRow], max: usize, placeholder: &str) -> Vec<String> {
    let mut kept: Vec<&ImageRow> = rows.iter().filter(|r| !is_thumbnail(&r.url)).collect();

    let webp_stems: Vec<String> = kept
        .iter()
        .filter(|r| has_extension(&r.url, &["webp"]))
        .map(|r| stem(&r.url).to_string())
        .collect();
    kept.retain(|r| !(has_extension(&r.url, &["jpg", "jpeg"]) && webp_stems.contains(&stem(&r.url).to_string())));

    kept.sort_by(|a, b| {
        b.cover
            .cmp(&a.cover)
            .then(b.uploaded_at.cmp(&a.uploaded_at))
            .then(a.url.cmp(&b.url))
    });
    kept.truncate(max);

    if kept.is_empty() {
        return vec![placeholder.to_string()];
    }
    kept.into_iter().map(|r| r.url.clone()).collect()
}

fn is_thumbnail(url: &str) -> bool {
    let s = stem(url);
    s.ends_with("_thumb") || s.ends_with("-thumb")
}

/// File name without extension or query string.
fn stem(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name)
}

fn has_extension(url: &str, extensions: &[&str]) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit_once('.') {
        Some((_, ext)) => extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)),
        None => false,
    }
}

//! Deterministic image URL construction for studio assets.
//!
//! Asset references look like `image-<assetId>-<width>x<height>-<format>`.
//! URL construction is a pure function of the reference and the requested
//! transform: no I/O, and a malformed or absent reference yields `None`
//! rather than a malformed URL.

use url::Url;

use crate::types::ImageRef;

const CDN_BASE: &str = "https://cdn.sanity.io/images";

/// Decoded parts of an image asset reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAssetRef {
    pub asset_id: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

/// Parse `image-<assetId>-<w>x<h>-<format>` into its parts.
pub fn parse_asset_ref(reference: &str) -> Option<ParsedAssetRef> {
    let rest = reference.strip_prefix("image-")?;
    let (body, format) = rest.rsplit_once('-')?;
    let (asset_id, dims) = body.rsplit_once('-')?;
    let (w, h) = dims.split_once('x')?;

    if asset_id.is_empty() || format.is_empty() {
        return None;
    }

    Some(ParsedAssetRef {
        asset_id: asset_id.to_string(),
        width: w.parse().ok()?,
        height: h.parse().ok()?,
        format: format.to_string(),
    })
}

/// Transform profile applied to an image URL.
///
/// The three profiles match the site's call sites: `Full` for in-flow
/// images (width-constrained, aspect preserved), `Cropped` for fixed-aspect
/// thumbnails, `FullRes` for the enlarged overlay view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Full { width: u32 },
    Cropped { width: u32, height: u32 },
    FullRes,
}

/// Build the CDN URL for an image, or `None` if the reference is unusable.
pub fn image_url(
    project_id: &str,
    dataset: &str,
    image: &ImageRef,
    transform: Transform,
) -> Option<String> {
    let parsed = parse_asset_ref(image.asset_ref()?)?;

    let base = format!(
        "{CDN_BASE}/{project_id}/{dataset}/{id}-{w}x{h}.{fmt}",
        id = parsed.asset_id,
        w = parsed.width,
        h = parsed.height,
        fmt = parsed.format,
    );
    let mut url = Url::parse(&base).ok()?;

    match transform {
        Transform::Full { width } => {
            url.query_pairs_mut()
                .append_pair("w", &width.to_string())
                .append_pair("auto", "format");
        }
        Transform::Cropped { width, height } => {
            url.query_pairs_mut()
                .append_pair("w", &width.to_string())
                .append_pair("h", &height.to_string())
                .append_pair("fit", "crop")
                .append_pair("auto", "format");
        }
        Transform::FullRes => {}
    }

    Some(url.to_string())
}

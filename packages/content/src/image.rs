//! Image CDN URLs for asset references.

use poi_map_poi_models::ImageRef;

use crate::ContentConfig;

const IMAGE_CDN: &str = "https://cdn.sanity.io/images";

/// Builds the CDN URL for an image asset reference.
///
/// Asset IDs look like `image-<hash>-<width>x<height>-<ext>` and map to
/// `<cdn>/<project>/<dataset>/<hash>-<width>x<height>.<ext>`. Returns
/// `None` for references that do not follow that shape.
#[must_use]
pub fn image_url(config: &ContentConfig, image: &ImageRef) -> Option<String> {
    let id = image.asset.reference.strip_prefix("image-")?;

    let mut parts = id.rsplitn(3, '-');
    let ext = parts.next()?;
    let dimensions = parts.next()?;
    let hash = parts.next()?;

    let (width, height) = dimensions.split_once('x')?;
    if hash.is_empty()
        || ext.is_empty()
        || width.parse::<u32>().is_err()
        || height.parse::<u32>().is_err()
    {
        return None;
    }

    Some(format!(
        "{IMAGE_CDN}/{}/{}/{hash}-{dimensions}.{ext}",
        config.project_id, config.dataset
    ))
}

#[cfg(test)]
mod tests {
    use poi_map_poi_models::AssetRef;

    use super::*;

    fn image(reference: &str) -> ImageRef {
        ImageRef {
            asset: AssetRef {
                reference: reference.to_string(),
            },
        }
    }

    #[test]
    fn builds_cdn_url() {
        let config = ContentConfig::new("abc123");
        let url = image_url(
            &config,
            &image("image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg"),
        );
        assert_eq!(
            url.as_deref(),
            Some(
                "https://cdn.sanity.io/images/abc123/production/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg"
            )
        );
    }

    #[test]
    fn rejects_non_image_assets() {
        let config = ContentConfig::new("abc123");
        assert!(image_url(&config, &image("file-abc-pdf")).is_none());
    }

    #[test]
    fn rejects_bad_dimensions() {
        let config = ContentConfig::new("abc123");
        assert!(image_url(&config, &image("image-abc-widexhigh-png")).is_none());
        assert!(image_url(&config, &image("image-abc-png")).is_none());
    }
}

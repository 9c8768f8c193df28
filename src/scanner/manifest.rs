use super::Candidate;
use crate::address;
use crate::size::Dimension;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    icons: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ManifestIcon {
    src: String,
    #[serde(default)]
    sizes: Option<String>,
}

/// Finds the icons listed in a web app manifest, such as
///
/// ```json
/// { "icons": [{ "src": "/android-chrome-192x192.png", "sizes": "192x192" }] }
/// ```
///
/// Icons are resolved against the manifest's own address. An entry that is malformed, has no
/// single `WxH` size, or has an invalid `src` is skipped. A document that isn't json at all
/// yields nothing.
pub fn parse_manifest(target: &Url, text: &str) -> Vec<Candidate> {
    let manifest: Manifest = match serde_json::from_str(text) {
        Ok(manifest) => manifest,
        Err(_e) => {
            #[cfg(feature = "log")]
            log::debug!("{target} is not a usable manifest: {_e}");

            return vec![];
        }
    };

    manifest
        .icons
        .into_iter()
        .filter_map(|icon| serde_json::from_value::<ManifestIcon>(icon).ok())
        .filter_map(|icon| {
            let expected_size = Dimension::parse(icon.sizes.as_deref()?.trim())?;
            let location = address::resolve(target, &icon.src)
                .inspect_err(|_e| {
                    #[cfg(feature = "log")]
                    log::debug!("dropping manifest icon: {_e}");
                })
                .ok()?;

            Some(Candidate {
                location,
                expected_size,
            })
        })
        .collect()
}

use super::{Candidate, ScanOutput, ScanTask};
use crate::address::BaseResolver;
use crate::size::Dimension;
use crate::text::{Attributes, TextCursor, parse_attributes};
use url::Url;

/// Finds icon references in the `<head>` of an html page.
///
/// References are collected as written and only resolved once the whole head has been read,
/// so a `<base href>` applies to every reference on the page, including the ones before it.
/// References that don't resolve to a valid address are dropped.
///
/// The fallback `/favicon.ico` is not part of the output: [`ScanTask::execute`] adds it.
pub fn parse_page(target: &Url, text: &str) -> ScanOutput {
    let mut cursor = TextCursor::new(text);
    let mut page = PageScan::new(target.clone());

    // icons outside of <head> don't count.
    if cursor.skip_until("<html") && cursor.skip_until_any(&["<head", "<body"]) == Some("<head") {
        const TAGS: [&str; 6] = ["<base", "<link", "<meta", "</head", "<body", "</body"];

        while let Some(tag) = cursor.skip_until_any(&TAGS) {
            match tag {
                "<base" => page.base(&parse_attributes(&mut cursor)),
                "<link" => page.link(&parse_attributes(&mut cursor)),
                "<meta" => page.meta(&parse_attributes(&mut cursor)),
                _ => break,
            }
        }
    }

    page.finish()
}

type SuggestFn = fn(Url) -> ScanTask;

struct PageScan {
    resolver: BaseResolver,
    icons: Vec<(String, Dimension)>,
    suggestions: Vec<(String, SuggestFn)>,
}

impl PageScan {
    fn new(target: Url) -> Self {
        Self {
            resolver: BaseResolver::new(target),
            icons: vec![],
            suggestions: vec![],
        }
    }

    fn base(&mut self, attributes: &Attributes) {
        if let Some(href) = attributes.get("href") {
            self.resolver.set_base(href);
        }
    }

    fn link(&mut self, attributes: &Attributes) {
        // If there's no href, then there's definitely no icon.
        let Some(href) = attributes.get("href") else {
            return;
        };
        let Some(rel) = attributes.get("rel") else {
            return;
        };
        let rel = rel.to_ascii_lowercase();

        if rel.split_ascii_whitespace().any(|r| r == "manifest") {
            self.suggestions.push((href.to_owned(), ScanTask::Manifest));
            return;
        }

        if !rel.contains("icon") {
            return;
        }

        let mut sizes = attributes
            .get("sizes")
            .map(Dimension::parse_list)
            .unwrap_or_default();

        if attributes
            .get("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("image/svg+xml"))
        {
            sizes.push(Dimension::Scalable);
        }

        if sizes.is_empty() {
            let guessed = if rel.contains("apple") {
                // apple touch icons without sizes are 57x57, historically.
                Some(Dimension::square(57))
            } else {
                Dimension::guess_from_digits(href)
            };

            sizes.push(guessed.unwrap_or(Dimension::square(16)));
        }

        for size in sizes {
            self.icons.push((href.to_owned(), size));
        }
    }

    fn meta(&mut self, attributes: &Attributes) {
        // <meta rel="manifest" href="manifest.json">
        if attributes
            .get("rel")
            .is_some_and(|rel| rel.trim().eq_ignore_ascii_case("manifest"))
        {
            if let Some(href) = attributes.get("href") {
                self.suggestions.push((href.to_owned(), ScanTask::Manifest));
            }
        }
        // <meta name="msapplication-config" content="browserconfig.xml">
        else if attributes
            .get("name")
            .is_some_and(|name| name.trim().eq_ignore_ascii_case("msapplication-config"))
        {
            let Some(content) = attributes.get("content") else {
                return;
            };
            // "none" opts out of browserconfig.xml
            if content.trim().eq_ignore_ascii_case("none") {
                return;
            }

            self.suggestions
                .push((content.to_owned(), ScanTask::TileConfig));
        }
    }

    fn finish(self) -> ScanOutput {
        let PageScan {
            resolver,
            icons,
            suggestions,
        } = self;

        let results = icons
            .into_iter()
            .filter_map(|(href, expected_size)| {
                let location = resolver
                    .resolve(&href)
                    .inspect_err(|_e| {
                        #[cfg(feature = "log")]
                        log::debug!("dropping icon reference: {_e}");
                    })
                    .ok()?;

                Some(Candidate {
                    location,
                    expected_size,
                })
            })
            .collect();

        let suggestions = suggestions
            .into_iter()
            .filter_map(|(href, suggest)| {
                let target = resolver
                    .resolve(&href)
                    .inspect_err(|_e| {
                        #[cfg(feature = "log")]
                        log::debug!("dropping suggested document: {_e}");
                    })
                    .ok()?;

                Some(suggest(target))
            })
            .collect();

        ScanOutput {
            results,
            suggestions,
        }
    }
}

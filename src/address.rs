use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("`{0}` is a network-path reference without a host")]
    EmptyAuthority(String),
    #[error("`{reference}` is not a valid address")]
    Invalid {
        reference: String,
        #[source]
        source: url::ParseError,
    },
}

/// Resolves `reference` (absolute, or relative to `base`) into an absolute address.
///
/// `url` happily turns `///invalid` into `http://invalid/`, which is never what a page author
/// meant, so network-path references must name a host.
pub fn resolve(base: &Url, reference: &str) -> Result<Url, AddressError> {
    let trimmed = reference.trim();

    if let Some(rest) = trimmed
        .strip_prefix("//")
        .or_else(|| trimmed.strip_prefix("\\\\"))
    {
        let authority_len = rest.find(['/', '\\', '?', '#']).unwrap_or(rest.len());
        if authority_len == 0 {
            return Err(AddressError::EmptyAuthority(reference.to_owned()));
        }
    }

    base.join(trimmed).map_err(|source| AddressError::Invalid {
        reference: reference.to_owned(),
        source,
    })
}

/// Resolves references found on a page, taking the page's `<base href>` into account.
///
/// Without a base, references resolve against the page address. An absolute base replaces the
/// page address, a relative one is itself resolved against the page address first.
#[derive(Debug, Clone)]
pub(crate) struct BaseResolver {
    target: Url,
    base: Url,
}

impl BaseResolver {
    pub(crate) fn new(target: Url) -> Self {
        Self {
            base: target.clone(),
            target,
        }
    }

    /// Adopts a new `<base href>`. Empty and invalid values are ignored, keeping the previous
    /// base. Returns whether the base was adopted.
    pub(crate) fn set_base(&mut self, href: &str) -> bool {
        if href.trim().is_empty() {
            return false;
        }

        match resolve(&self.target, href) {
            Ok(base) if !base.cannot_be_a_base() => {
                self.base = base;
                true
            }
            Ok(_) => false,
            Err(_e) => {
                #[cfg(feature = "log")]
                log::debug!("ignoring <base href={href:?}>: {_e}");

                false
            }
        }
    }

    pub(crate) fn resolve(&self, reference: &str) -> Result<Url, AddressError> {
        resolve(&self.base, reference)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn example() -> Url {
        Url::parse("http://www.example.com").unwrap()
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let base = example();

        assert_eq!(
            resolve(&base, "favicon.png").unwrap().as_str(),
            "http://www.example.com/favicon.png"
        );
        assert_eq!(
            resolve(&base, " /img/icon.ico ").unwrap().as_str(),
            "http://www.example.com/img/icon.ico"
        );
        assert_eq!(
            resolve(&base, "https://cdn.example.org/icon.png").unwrap().as_str(),
            "https://cdn.example.org/icon.png"
        );
        assert_eq!(
            resolve(&base, "//cdn.example.org/icon.png").unwrap().as_str(),
            "http://cdn.example.org/icon.png"
        );
    }

    #[test]
    fn test_resolve_rejects_malformed() {
        let base = example();

        assert!(matches!(
            resolve(&base, "///invalid"),
            Err(AddressError::EmptyAuthority(_))
        ));
        assert!(matches!(
            resolve(&base, "http://exa mple.com/icon.png"),
            Err(AddressError::Invalid { .. })
        ));
    }

    #[test]
    fn test_base_resolver() {
        let mut resolver = BaseResolver::new(example());
        assert_eq!(
            resolver.resolve("favicon.ico").unwrap().as_str(),
            "http://www.example.com/favicon.ico"
        );

        assert!(!resolver.set_base(""));
        assert!(resolver.set_base("icons/"));
        assert_eq!(
            resolver.resolve("favicon.ico").unwrap().as_str(),
            "http://www.example.com/icons/favicon.ico"
        );

        assert!(resolver.set_base("http://www.other.com"));
        assert_eq!(
            resolver.resolve("favicon.ico").unwrap().as_str(),
            "http://www.other.com/favicon.ico"
        );

        assert!(!resolver.set_base("///nowhere"));
        assert_eq!(
            resolver.resolve("favicon.ico").unwrap().as_str(),
            "http://www.other.com/favicon.ico"
        );
    }
}

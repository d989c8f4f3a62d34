//! The download request.
//!
//! A [`Download`] names one logical file and the mirrors it can be fetched
//! from. The first URL is authoritative: it gives the file its name and is
//! the one probed for size and range support.
//!
//! # Examples
//!
//! ```rust
//! use tessera::download::Download;
//!
//! // A single source, file name taken from the URL.
//! let download = Download::try_from("https://example.com/file.iso")?;
//! assert_eq!(download.filename, "file.iso");
//!
//! // Several mirrors of the same file.
//! let download = Download::mirrors([
//!     "https://eu.example.com/file.iso",
//!     "https://us.example.com/file.iso",
//! ])?;
//! assert_eq!(download.urls.len(), 2);
//! # Ok::<(), tessera::Error>(())
//! ```

use crate::error::Error;

use reqwest::Url;
use std::convert::TryFrom;

/// Represents a file to be downloaded from one or more mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Mirrors of the file. Never empty.
    pub urls: Vec<Url>,
    /// File name used to save the file on disk.
    pub filename: String,
}

impl Download {
    /// Creates a new [`Download`] with an explicit file name.
    pub fn new(urls: &[Url], filename: &str) -> Result<Self, Error> {
        if urls.is_empty() {
            return Err(Error::InvalidUrl("at least one source URL is required".into()));
        }
        Ok(Self {
            urls: urls.to_vec(),
            filename: String::from(filename),
        })
    }

    /// Creates a [`Download`] from a list of mirror URLs.
    ///
    /// Every URL must parse, and the file name is extracted from the first.
    pub fn mirrors<I, S>(urls: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = urls
            .into_iter()
            .map(|u| parse_url(u.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let primary = urls
            .first()
            .ok_or_else(|| Error::InvalidUrl("at least one source URL is required".into()))?;
        let filename = filename_from_url(primary)?;
        Download::new(&urls, &filename)
    }

    /// The authoritative URL.
    pub fn primary(&self) -> &Url {
        &self.urls[0]
    }
}

fn parse_url(value: &str) -> Result<Url, Error> {
    Url::parse(value.trim())
        .map_err(|e| Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", value, e)))
}

/// Extracts the percent-decoded last path segment of a URL.
pub fn filename_from_url(url: &Url) -> Result<String, Error> {
    url.path_segments()
        .ok_or_else(|| {
            Error::InvalidUrl(format!("The url \"{}\" does not contain a valid path", url))
        })?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            form_urlencoded::parse(segment.as_bytes())
                .map(|(key, val)| [key, val].concat())
                .collect()
        })
        .ok_or_else(|| Error::InvalidUrl(format!("The url \"{}\" does not contain a filename", url)))
}

impl TryFrom<&Url> for Download {
    type Error = crate::error::Error;

    fn try_from(value: &Url) -> Result<Self, Self::Error> {
        let filename = filename_from_url(value)?;
        Download::new(std::slice::from_ref(value), &filename)
    }
}

impl TryFrom<&str> for Download {
    type Error = crate::error::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        parse_url(value).and_then(|u| Download::try_from(&u))
    }
}

// ABOUTME: URL detection over grid rows and the addon that opens hovered links.
// ABOUTME: Links are found per row with a regex; activation hands the URI to an opener.

use regex::Regex;
use std::ops::Range;
use std::rc::Rc;

use crate::addon::Addon;
use crate::terminal::Terminal;

const URL_PATTERN: &str = r#"https?://[^\s<>"'`]+"#;

/// Characters that end a sentence rather than a URL
const TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '\''];

/// A link occupying `columns` of grid row `row`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    pub row: usize,
    pub columns: Range<usize>,
    pub uri: String,
}

impl LinkSpan {
    pub fn contains(&self, col: usize, row: usize) -> bool {
        self.row == row && self.columns.contains(&col)
    }
}

/// Supplies links for a row of text and acts on activated ones
pub trait LinkProvider {
    fn provide_links(&self, row: usize, text: &str) -> Vec<LinkSpan>;
    fn activate(&self, link: &LinkSpan);
}

pub type Opener = Rc<dyn Fn(&str)>;

/// Detects http(s) URLs
pub struct UrlLinkProvider {
    pattern: Regex,
    opener: Opener,
}

impl UrlLinkProvider {
    pub fn new(opener: Opener) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(URL_PATTERN)?,
            opener,
        })
    }
}

impl LinkProvider for UrlLinkProvider {
    fn provide_links(&self, row: usize, text: &str) -> Vec<LinkSpan> {
        self.pattern
            .find_iter(text)
            .filter_map(|m| {
                let uri = m.as_str().trim_end_matches(TRAILING);
                if uri.split_once("://").map_or(true, |(_, rest)| rest.is_empty()) {
                    return None;
                }
                // One char per column, so char offsets are column offsets
                let start = text[..m.start()].chars().count();
                let len = uri.chars().count();
                Some(LinkSpan {
                    row,
                    columns: start..start + len,
                    uri: uri.to_string(),
                })
            })
            .collect()
    }

    fn activate(&self, link: &LinkSpan) {
        tracing::info!("Opening link {}", link.uri);
        (self.opener)(&link.uri);
    }
}

/// Open a URI with the platform's default handler
pub fn open_with_system(uri: &str) {
    report_open(uri, open::that(uri));
}

fn report_open(uri: &str, result: std::io::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to open {}: {}", uri, e);
            false
        }
    }
}

/// Underlines hovered URLs and opens them on Ctrl+click
pub struct LinkAddon {
    opener: Opener,
}

impl LinkAddon {
    pub fn new() -> Self {
        Self::with_opener(Rc::new(open_with_system))
    }

    pub fn with_opener(opener: Opener) -> Self {
        Self { opener }
    }
}

impl Default for LinkAddon {
    fn default() -> Self {
        Self::new()
    }
}

impl Addon for LinkAddon {
    fn name(&self) -> &'static str {
        "links"
    }

    fn activate(&mut self, terminal: &mut Terminal) {
        match UrlLinkProvider::new(Rc::clone(&self.opener)) {
            Ok(provider) => terminal.register_link_provider(Box::new(provider)),
            Err(e) => tracing::warn!("Link detection disabled: {}", e),
        }
    }
}

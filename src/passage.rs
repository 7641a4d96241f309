//! The Twee 2 passage model and passage header parsing
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// The delimiter separating the namespace segments of a passage name
pub const NAME_PATH_DELIMITER: char = '.';

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"^:: *([^\[]*?) *(\[(.*?)\])? *(<(.*?)>)? *$").expect("valid header regex")
    })
}

/// The metadata carried by a passage header line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    /// The passage name, trimmed of surrounding spaces
    pub name: String,

    /// Non-empty tags, in source order
    pub tags: Vec<String>,

    /// Geometry values. Empty means none were given
    pub geometry: Vec<String>,
}

impl Header {
    /// Parses a line as a passage header
    ///
    /// Returns `None` if the line does not open a passage, in which case it is
    /// ordinary content
    pub fn parse(line: &str) -> Option<Header> {
        let captures = header_regex().captures(line)?;
        let name = captures.get(1).map(|m| m.as_str())?;
        if name.is_empty() {
            return None;
        }

        let tags = captures
            .get(3)
            .map(|m| {
                m.as_str()
                    .split(' ')
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let geometry = captures
            .get(5)
            .map(|m| m.as_str().split(',').map(str::to_string).collect())
            .unwrap_or_default();

        Some(Header {
            name: name.to_string(),
            tags,
            geometry,
        })
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "::{}", self.name)?;
        if !self.tags.is_empty() {
            write!(f, " [{}]", self.tags.join(" "))?;
        }
        if !self.geometry.is_empty() {
            write!(f, " <{}>", self.geometry.join(","))?;
        }
        Ok(())
    }
}

/// A named unit of story content
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Passage {
    /// The name, tags, and geometry from the header line
    pub header: Header,

    /// Raw lines following the header, up to the next header
    pub content: Vec<String>,
}

impl Passage {
    pub fn new(header: Header) -> Self {
        Passage {
            header,
            content: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn tags(&self) -> &[String] {
        &self.header.tags
    }

    /// True if the passage has the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.header.tags.iter().any(|t| t == tag)
    }
}

/// Renders the header line, then the content lines
impl fmt::Display for Passage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.header, self.content.join("\n"))
    }
}

/// Splits a passage name into its first namespace segment and the remainder
///
/// The remainder is empty if the name has no delimiter
pub fn split_name(name: &str) -> (&str, &str) {
    match name.find(NAME_PATH_DELIMITER) {
        Some(pos) => (&name[..pos], &name[pos + NAME_PATH_DELIMITER.len_utf8()..]),
        None => (name, ""),
    }
}

//! Whitelisted tag vocabulary for the restricted message markup.

/// Element kinds the parser accepts.
///
/// `Root` and `InnerText` are internal pseudo-tags: they never appear in
/// input and have no name. The heading variants are ordered so that their
/// level can be read off directly; rendering uses it for font sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    /// Pseudo-tag for the document root.
    Root,
    /// Pseudo-tag for freestanding text runs.
    InnerText,
    Paragraph,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    OrderedList,
    UnorderedList,
    ListItem,
    Pre,
    Code,
}

impl Tag {
    /// Look up a tag by its markup name. Returns `None` for anything
    /// outside the whitelist, including the internal pseudo-tags.
    pub fn from_name(name: &str) -> Option<Tag> {
        match name {
            "p" => Some(Tag::Paragraph),
            "h1" => Some(Tag::H1),
            "h2" => Some(Tag::H2),
            "h3" => Some(Tag::H3),
            "h4" => Some(Tag::H4),
            "h5" => Some(Tag::H5),
            "h6" => Some(Tag::H6),
            "ol" => Some(Tag::OrderedList),
            "ul" => Some(Tag::UnorderedList),
            "li" => Some(Tag::ListItem),
            "pre" => Some(Tag::Pre),
            "code" => Some(Tag::Code),
            _ => None,
        }
    }

    /// Markup name of the tag, empty for the pseudo-tags.
    pub fn name(&self) -> &'static str {
        match self {
            Tag::Root | Tag::InnerText => "",
            Tag::Paragraph => "p",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::H4 => "h4",
            Tag::H5 => "h5",
            Tag::H6 => "h6",
            Tag::OrderedList => "ol",
            Tag::UnorderedList => "ul",
            Tag::ListItem => "li",
            Tag::Pre => "pre",
            Tag::Code => "code",
        }
    }

    /// Heading level (1..=6) for the heading tags, `None` otherwise.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Tag::H1 => Some(1),
            Tag::H2 => Some(2),
            Tag::H3 => Some(3),
            Tag::H4 => Some(4),
            Tag::H5 => Some(5),
            Tag::H6 => Some(6),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_whitelist() {
        assert_eq!(Tag::from_name("p"), Some(Tag::Paragraph));
        assert_eq!(Tag::from_name("ol"), Some(Tag::OrderedList));
        assert_eq!(Tag::from_name("ul"), Some(Tag::UnorderedList));
        assert_eq!(Tag::from_name("li"), Some(Tag::ListItem));
        assert_eq!(Tag::from_name("pre"), Some(Tag::Pre));
        assert_eq!(Tag::from_name("code"), Some(Tag::Code));
    }

    #[test]
    fn test_from_name_rejects_unknown() {
        assert_eq!(Tag::from_name("div"), None);
        assert_eq!(Tag::from_name("script"), None);
        assert_eq!(Tag::from_name("P"), None); // names are case-sensitive
        assert_eq!(Tag::from_name(""), None);
    }

    #[test]
    fn test_heading_levels_match_ordinal() {
        for (name, level) in [("h1", 1), ("h2", 2), ("h3", 3), ("h4", 4), ("h5", 5), ("h6", 6)] {
            let tag = Tag::from_name(name).unwrap();
            assert_eq!(tag.heading_level(), Some(level));
        }
        assert_eq!(Tag::Paragraph.heading_level(), None);
    }

    #[test]
    fn test_name_round_trip() {
        for name in ["p", "h1", "h2", "h3", "h4", "h5", "h6", "ol", "ul", "li", "pre", "code"] {
            assert_eq!(Tag::from_name(name).unwrap().name(), name);
        }
    }
}

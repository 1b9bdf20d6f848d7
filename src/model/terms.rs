//! Term taxonomy: which value shape each property of each node kind expects.
//!
//! Every node kind has one immutable [`Terms`] table. A property belongs to at
//! most one category; properties absent from every category are unknown and
//! are passed through untouched.

use super::NodeKind;

/// Value-shape category of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermCategory {
    SingleLiteral,
    ArrayOfLiterals,
    SingleLocString,
    ArrayOfLocStrings,
    ArrayOfEntities,
    ArrayOfLinks,
    SingleUrl,
    ArrayOfUrls,
    SingleBoolean,
    SingleNumber,
    Misc,
}

impl TermCategory {
    /// Whether values of this category are sequences.
    pub fn is_array(self) -> bool {
        matches!(
            self,
            TermCategory::ArrayOfLiterals
                | TermCategory::ArrayOfLocStrings
                | TermCategory::ArrayOfEntities
                | TermCategory::ArrayOfLinks
                | TermCategory::ArrayOfUrls
        )
    }

    /// The category of a single element of this category's sequence.
    pub fn element(self) -> TermCategory {
        match self {
            TermCategory::ArrayOfLiterals => TermCategory::SingleLiteral,
            TermCategory::ArrayOfLocStrings => TermCategory::SingleLocString,
            TermCategory::ArrayOfUrls => TermCategory::SingleUrl,
            other => other,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            TermCategory::SingleLiteral | TermCategory::ArrayOfLiterals => "a literal",
            TermCategory::SingleLocString | TermCategory::ArrayOfLocStrings => {
                "a localizable string"
            }
            TermCategory::ArrayOfEntities => "an entity",
            TermCategory::ArrayOfLinks => "a linked resource",
            TermCategory::SingleUrl | TermCategory::ArrayOfUrls => "an absolute URL",
            TermCategory::SingleBoolean => "a boolean",
            TermCategory::SingleNumber => "a number",
            TermCategory::Misc => "a value",
        }
    }
}

impl std::fmt::Display for TermCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// The taxonomy table of one node kind.
#[derive(Debug)]
pub struct Terms {
    pub single_literal: &'static [&'static str],
    pub array_of_literals: &'static [&'static str],
    pub single_loc_string: &'static [&'static str],
    pub array_of_loc_strings: &'static [&'static str],
    pub array_of_entities: &'static [&'static str],
    pub array_of_links: &'static [&'static str],
    pub single_url: &'static [&'static str],
    pub array_of_urls: &'static [&'static str],
    pub single_boolean: &'static [&'static str],
    pub single_number: &'static [&'static str],
    pub misc: &'static [&'static str],
}

impl Terms {
    fn partitions(&self) -> [(TermCategory, &'static [&'static str]); 11] {
        [
            (TermCategory::SingleLiteral, self.single_literal),
            (TermCategory::ArrayOfLiterals, self.array_of_literals),
            (TermCategory::SingleLocString, self.single_loc_string),
            (TermCategory::ArrayOfLocStrings, self.array_of_loc_strings),
            (TermCategory::ArrayOfEntities, self.array_of_entities),
            (TermCategory::ArrayOfLinks, self.array_of_links),
            (TermCategory::SingleUrl, self.single_url),
            (TermCategory::ArrayOfUrls, self.array_of_urls),
            (TermCategory::SingleBoolean, self.single_boolean),
            (TermCategory::SingleNumber, self.single_number),
            (TermCategory::Misc, self.misc),
        ]
    }

    /// Category of `term`, or `None` for unknown terms.
    pub fn category(&self, term: &str) -> Option<TermCategory> {
        self.partitions()
            .into_iter()
            .find(|(_, names)| names.contains(&term))
            .map(|(category, _)| category)
    }

    pub fn is_valid(&self, term: &str) -> bool {
        self.category(term).is_some()
    }

    pub fn is_array(&self, term: &str) -> bool {
        self.category(term).is_some_and(TermCategory::is_array)
    }

    pub fn is_entity(&self, term: &str) -> bool {
        self.array_of_entities.contains(&term)
    }

    pub fn is_loc_string(&self, term: &str) -> bool {
        self.single_loc_string.contains(&term) || self.array_of_loc_strings.contains(&term)
    }

    pub fn is_link(&self, term: &str) -> bool {
        self.array_of_links.contains(&term)
    }

    pub fn is_url(&self, term: &str) -> bool {
        self.single_url.contains(&term) || self.array_of_urls.contains(&term)
    }

    /// All declared terms, in category order.
    pub fn all(&self) -> impl Iterator<Item = &'static str> {
        self.partitions()
            .into_iter()
            .flat_map(|(_, names)| names.iter().copied())
    }
}

pub static MANIFEST_TERMS: Terms = Terms {
    single_literal: &[
        "id",
        "dateModified",
        "datePublished",
        "readingProgression",
        "duration",
    ],
    array_of_literals: &[
        "type",
        "conformsTo",
        "accessMode",
        "accessibilityFeature",
        "accessibilityHazard",
        "inLanguage",
    ],
    single_loc_string: &["accessibilitySummary"],
    array_of_loc_strings: &["name"],
    array_of_entities: &[
        "artist",
        "author",
        "colorist",
        "contributor",
        "creator",
        "editor",
        "illustrator",
        "inker",
        "letterer",
        "penciler",
        "publisher",
        "readBy",
        "translator",
    ],
    array_of_links: &["readingOrder", "resources", "links"],
    single_url: &[],
    array_of_urls: &["url"],
    single_boolean: &["abridged"],
    single_number: &[],
    misc: &["accessModeSufficient", "@context"],
};

pub static ENTITY_TERMS: Terms = Terms {
    single_literal: &[],
    array_of_literals: &["type", "identifier"],
    single_loc_string: &[],
    array_of_loc_strings: &["name"],
    array_of_entities: &[],
    array_of_links: &[],
    single_url: &["id", "url"],
    array_of_urls: &[],
    single_boolean: &[],
    single_number: &[],
    misc: &[],
};

pub static LOCALIZABLE_STRING_TERMS: Terms = Terms {
    single_literal: &["value", "language", "direction"],
    array_of_literals: &[],
    single_loc_string: &[],
    array_of_loc_strings: &[],
    array_of_entities: &[],
    array_of_links: &[],
    single_url: &[],
    array_of_urls: &[],
    single_boolean: &[],
    single_number: &[],
    misc: &[],
};

pub static LINKED_RESOURCE_TERMS: Terms = Terms {
    single_literal: &["encodingFormat", "integrity", "duration"],
    array_of_literals: &["type", "rel"],
    single_loc_string: &["description"],
    array_of_loc_strings: &["name"],
    array_of_entities: &[],
    array_of_links: &["alternate"],
    single_url: &["url"],
    array_of_urls: &[],
    single_boolean: &[],
    single_number: &["length"],
    misc: &[],
};

impl NodeKind {
    /// The taxonomy table for this node kind.
    pub fn terms(self) -> &'static Terms {
        match self {
            NodeKind::Manifest => &MANIFEST_TERMS,
            NodeKind::Entity => &ENTITY_TERMS,
            NodeKind::LocalizableString => &LOCALIZABLE_STRING_TERMS,
            NodeKind::LinkedResource => &LINKED_RESOURCE_TERMS,
        }
    }
}

use regex::Regex;

/// One compiled path component of a glob pattern.
///
/// The traversal engine dispatches on the variant; every variant can also
/// answer whether it accepts a single entry name.
#[derive(Debug, Clone)]
pub enum Segment {
    /// An exact name, compared case-insensitively.
    Constant(String),

    /// `**`: the current directory and any number of directories below it.
    Recurse,

    /// A case-insensitive, anchored regular expression over one name.
    Filter(Regex),
}

impl Segment {
    /// Regex source of the filter appended after a trailing `**`.
    pub(crate) const CATCH_ALL: &'static str = "(?i)^.*$";

    /// Whether `name` (a single path component) is accepted by this segment.
    pub fn is_match(&self, name: &str) -> bool {
        match self {
            Segment::Constant(lit) => lit.to_lowercase() == name.to_lowercase(),
            Segment::Recurse => true,
            Segment::Filter(re) => re.is_match(name),
        }
    }

    pub fn is_recurse(&self) -> bool {
        matches!(self, Segment::Recurse)
    }

    pub fn is_filter(&self) -> bool {
        matches!(self, Segment::Filter(_))
    }
}

// Filters compare by regex source so two compilations of one pattern are equal.
impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Segment::Constant(a), Segment::Constant(b)) => a == b,
            (Segment::Recurse, Segment::Recurse) => true,
            (Segment::Filter(a), Segment::Filter(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for Segment {}

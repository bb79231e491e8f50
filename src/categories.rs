//! Coarse categories for the 20 Newsgroups labels.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Computer,
    Hobbies,
    Science,
    Politics,
    Miscellaneous,
    Religion,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Computer => "Computer",
            Category::Hobbies => "Hobbies",
            Category::Science => "Science",
            Category::Politics => "Politics",
            Category::Miscellaneous => "Miscellaneous",
            Category::Religion => "Religion",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! group_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

group_pattern!(RE_COMP, r"^comp\.");
group_pattern!(RE_REC, r"^rec\.");
group_pattern!(RE_SCI, r"^sci\.");
group_pattern!(RE_POLITICS, r"^talk\.politics\.");
group_pattern!(RE_MISC, r"^misc\.");

/// Checked in order; the first match wins.
static GROUPS: [(&LazyLock<Option<Regex>>, Category); 5] = [
    (&RE_COMP, Category::Computer),
    (&RE_REC, Category::Hobbies),
    (&RE_SCI, Category::Science),
    (&RE_POLITICS, Category::Politics),
    (&RE_MISC, Category::Miscellaneous),
];

/// Maps a newsgroup name such as `sci.space` onto its general category.
///
/// Anything without a known prefix (`alt.atheism`, `soc.religion.christian`,
/// `talk.religion.misc`) is Religion.
pub fn general_category(label: &str) -> Category {
    GROUPS
        .iter()
        .find(|&&(regex, _)| regex.as_ref().is_some_and(|re| re.is_match(label)))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Religion)
}

/// Newsgroup name from a corpus file path, e.g. `.../train/sci.space/60804`.
pub fn newsgroup_from_path(path: &str) -> Option<&str> {
    let mut parts = path.rsplit('/');
    parts.next()?;
    parts.next().filter(|group| !group.is_empty())
}

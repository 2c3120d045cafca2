//! Corpus descriptors.
//!
//! The two corpora share one retrieval pipeline and differ only in which
//! record field is embedded and where their files live.

use std::fmt;
use std::str::FromStr;

use crate::record::Record;

/// Record field embedded and matched against for a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    /// [`Record::question`].
    Question,
    /// [`Record::answer`].
    Answer,
}

impl TextField {
    /// Borrows the designated text of `record`.
    pub fn of<'a>(&self, record: &'a Record) -> &'a str {
        match self {
            Self::Question => &record.question,
            Self::Answer => &record.answer,
        }
    }
}

/// One of the two independent record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corpus {
    /// Forum question/answer pairs. Embeds the question.
    Forum,
    /// Course pages (title/content). Embeds the page content.
    Course,
}

impl Corpus {
    /// Both corpora, in the order the assistant consults them.
    pub const ALL: [Corpus; 2] = [Corpus::Forum, Corpus::Course];

    /// Stable identifier used for directory names and log fields.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Forum => "forum",
            Self::Course => "course",
        }
    }

    /// Field whose text is embedded for this corpus.
    pub fn designated_field(&self) -> TextField {
        match self {
            Self::Forum => TextField::Question,
            Self::Course => TextField::Answer,
        }
    }

    /// File name of the normalized record snapshot.
    pub fn records_file_name(&self) -> &'static str {
        match self {
            Self::Forum => "forum_filtered.json",
            Self::Course => "course_filtered.json",
        }
    }
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Corpus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forum" | "discourse" => Ok(Self::Forum),
            "course" | "tds" => Ok(Self::Course),
            _ => Err(format!("Unknown corpus: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record {
            question: "How do I install uv?".to_string(),
            answer: "Run the installer script.".to_string(),
            answered_by: "s.anand".to_string(),
            source_url: None,
        }
    }

    #[test]
    fn test_designated_fields_are_asymmetric() {
        assert_eq!(Corpus::Forum.designated_field(), TextField::Question);
        assert_eq!(Corpus::Course.designated_field(), TextField::Answer);
    }

    #[test]
    fn test_text_field_of() {
        let r = record();
        assert_eq!(TextField::Question.of(&r), "How do I install uv?");
        assert_eq!(TextField::Answer.of(&r), "Run the installer script.");
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("forum".parse::<Corpus>(), Ok(Corpus::Forum));
        assert_eq!("Discourse".parse::<Corpus>(), Ok(Corpus::Forum));
        assert_eq!(" course ".parse::<Corpus>(), Ok(Corpus::Course));
        assert_eq!("TDS".parse::<Corpus>(), Ok(Corpus::Course));
        assert!("wiki".parse::<Corpus>().is_err());
    }

    #[test]
    fn test_display_matches_id() {
        for corpus in Corpus::ALL {
            assert_eq!(corpus.to_string(), corpus.id());
        }
    }

    #[test]
    fn test_distinct_file_names() {
        assert_ne!(
            Corpus::Forum.records_file_name(),
            Corpus::Course.records_file_name()
        );
    }
}

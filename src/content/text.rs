use regex::{NoExpand, Regex, RegexBuilder};

/// Case-insensitive rewrite of one fixed name into another.
///
/// The replacement is inserted literally and never rescanned, so applying the
/// substitution twice gives the same text as applying it once.
#[derive(Debug, Clone)]
pub struct Substitution {
    pattern: Regex,
    replacement: String,
}

impl Substitution {
    /// # Errors
    ///
    /// Rejects an empty subject, and any replacement that could form a new
    /// occurrence of the subject: one containing it, one contained in it
    /// (including the empty string), or one whose leading or trailing part
    /// lines up with the other end of the subject.
    pub fn new(subject: &str, replacement: &str) -> Result<Self, String> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err("subject cannot be empty".to_string());
        }
        let pattern = RegexBuilder::new(&regex::escape(subject))
            .case_insensitive(true)
            .build()
            .map_err(|err| err.to_string())?;
        if pattern.is_match(replacement) {
            return Err(format!(
                "replacement {replacement:?} contains the subject {subject:?}"
            ));
        }
        if can_rebuild(subject, replacement) {
            return Err(format!(
                "replacement {replacement:?} can combine with nearby text into the subject {subject:?}"
            ));
        }
        Ok(Self {
            pattern,
            replacement: replacement.to_string(),
        })
    }

    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, NoExpand(&self.replacement))
            .into_owned()
    }
}

/// Whether `replacement`, spliced into arbitrary text, can complete a fresh
/// case-insensitive occurrence of `subject`.
fn can_rebuild(subject: &str, replacement: &str) -> bool {
    let subject = subject.to_lowercase();
    let replacement = replacement.to_lowercase();
    if subject.contains(&replacement) {
        return true;
    }
    replacement.char_indices().skip(1).any(|(at, _)| {
        subject.starts_with(&replacement[at..]) || subject.ends_with(&replacement[..at])
    })
}

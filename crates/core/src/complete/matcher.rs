/// The single comparison rule used by every completion step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Matcher {
    case_sensitive: bool,
}

impl Matcher {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Whether `candidate` starts with `prefix`.
    pub fn starts_with(&self, candidate: &str, prefix: &str) -> bool {
        if self.case_sensitive {
            return candidate.starts_with(prefix);
        }
        if candidate.is_ascii() && prefix.is_ascii() {
            return candidate.len() >= prefix.len()
                && candidate.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes());
        }
        candidate.to_lowercase().starts_with(&prefix.to_lowercase())
    }

    pub fn eq(&self, a: &str, b: &str) -> bool {
        if self.case_sensitive {
            a == b
        } else if a.is_ascii() && b.is_ascii() {
            a.eq_ignore_ascii_case(b)
        } else {
            a.to_lowercase() == b.to_lowercase()
        }
    }

    /// Key form used for set lookups under this rule.
    pub fn fold(&self, s: &str) -> String {
        if self.case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insensitive() {
        let m = Matcher::new(false);
        assert!(m.starts_with("Button", "bu"));
        assert!(m.starts_with("Ärger", "är"));
        assert!(!m.starts_with("Bu", "button"));
        assert!(m.eq("FOR", "for"));
        assert_eq!(m.fold("For"), "for");
    }

    #[test]
    fn test_sensitive() {
        let m = Matcher::new(true);
        assert!(!m.starts_with("Button", "bu"));
        assert!(m.starts_with("Button", "Bu"));
        assert!(!m.eq("FOR", "for"));
        assert_eq!(m.fold("For"), "For");
    }
}

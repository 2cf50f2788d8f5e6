/// Technology names recognised in uploaded documents. Lower-case, fixed at build time.
const BUILTIN_TERMS: &[&str] = &[
    "javascript",
    "python",
    "java",
    "c++",
    "c#",
    "go",
    "ruby",
    "node.js",
    "react",
    "angular",
    "vue.js",
    "express",
    "next.js",
    "mongodb",
    "mysql",
    "postgresql",
    "firebase",
    "docker",
    "kubernetes",
    "aws",
    "azure",
    "gcp",
    "git",
    "linux",
    "html",
    "css",
    "typescript",
    "graphql",
    "rest",
    "jenkins",
    "terraform",
    "spring",
    "laravel",
];

/// Read-only, process-wide list of technology names. Cheap to copy.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    terms: &'static [&'static str],
}

impl Vocabulary {
    pub const fn new(terms: &'static [&'static str]) -> Self {
        Self { terms }
    }

    pub const fn builtin() -> Self {
        Self::new(BUILTIN_TERMS)
    }

    pub fn terms(&self) -> impl Iterator<Item = &'static str> {
        self.terms.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| *t == term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_terms_are_lowercase_and_unique() {
        let vocabulary = Vocabulary::builtin();
        let unique: HashSet<_> = vocabulary.terms().collect();

        assert_eq!(unique.len(), vocabulary.len());
        assert!(vocabulary.terms().all(|t| t == t.to_lowercase()));
    }

    #[test]
    fn test_builtin_size() {
        assert_eq!(Vocabulary::builtin().len(), 33);
    }
}

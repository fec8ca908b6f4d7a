//! HTTP path-template matching.
//!
//! Binding templates use `{var}` placeholders for single path segments
//! (`/v1/shelves/{shelf}/books/{book}`). A template without placeholders
//! matches its path exactly; one with placeholders compiles to a regex
//! where every placeholder becomes `[^\/]+`, anchored at the end.

/// How a path template matches request paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    /// The template has no placeholders; match the path exactly.
    Exact(String),
    /// The template has placeholders; match against this regex.
    Regex(String),
}

impl PathMatch {
    /// Compile a binding template.
    #[must_use]
    pub fn compile(template: &str) -> Self {
        if !template.contains('{') {
            return PathMatch::Exact(template.to_string());
        }

        let mut regex = String::with_capacity(template.len() + 8);
        let mut chars = template.chars();
        while let Some(c) = chars.next() {
            if c == '{' {
                // Consume through the closing brace; `{var}` and
                // `{var=**}` alike become a single-segment wildcard.
                for inner in chars.by_ref() {
                    if inner == '}' {
                        break;
                    }
                }
                regex.push_str("[^\\/]+");
            } else {
                regex.push(c);
            }
        }
        regex.push('$');
        PathMatch::Regex(regex)
    }
}

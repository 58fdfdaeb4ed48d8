/// Canonical delimiter that every recognized separator collapses into.
const DELIMITER: char = '.';

/// Normalize a name for fuzzy comparison.
///
/// Lower-cases the input, unifies separators (spaces, hyphens, underscores
/// and dot runs) into a single `.`, and strips everything that is neither
/// alphanumeric nor the delimiter. The result is only ever used for
/// containment checks against other normalized names, never for naming
/// files on disk.
#[must_use]
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        let c = match c {
            ' ' | '-' | '_' | DELIMITER => DELIMITER,
            other => other,
        };
        if c == DELIMITER {
            // Collapse delimiter runs so normalization is idempotent.
            if !out.ends_with(DELIMITER) {
                out.push(DELIMITER);
            }
        } else if c.is_alphanumeric() {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unifies_separators() {
        assert_eq!(normalize("Show Name"), "show.name");
        assert_eq!(normalize("Show_Name-2"), "show.name.2");
        assert_eq!(normalize("Show.Name.S02E05"), "show.name.s02e05");
    }

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(normalize("It's a Show!"), "its.a.show");
        assert_eq!(normalize("Show: Name (2020)"), "show.name.2020");
    }

    #[test]
    fn test_collapses_delimiter_runs() {
        assert_eq!(normalize("Show - Name"), "show.name");
        assert_eq!(normalize("Show...Name"), "show.name");
        assert_eq!(normalize("Show .-_ Name"), "show.name");
    }

    #[test]
    fn test_idempotent() {
        for s in [
            "Show Name",
            "Show...Name - S01E01",
            "It's a Show! (2020) [1080p]",
            "__weird -- spacing__",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_output_charset() {
        let out = normalize("Mixed CASE & Sym*bols 42 -- done");
        assert!(
            out.chars()
                .all(|c| c == '.' || (c.is_alphanumeric() && !c.is_uppercase()))
        );
    }
}

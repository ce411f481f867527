//! Company-name slugs: lowercase, transliterated, URL- and filesystem-safe.

/// Derives a slug from a company name: lowercase, common Latin accents
/// folded to ASCII, every other non-alphanumeric run collapsed to a single
/// `-`. Returns an empty string when nothing survives; callers fall back.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.to_lowercase().chars() {
        let folded = fold_ascii(ch);
        if folded.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(folded);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Folds the Latin-1 accented letters that show up in company names.
/// Anything else non-ASCII is treated as a separator by the caller.
fn fold_ascii(ch: char) -> char {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_company_name() {
        assert_eq!(slugify("Acme Corp"), "acme-corp");
    }

    #[test]
    fn test_punctuation_collapses() {
        assert_eq!(slugify("O'Neill & Sons, Inc."), "o-neill-sons-inc");
    }

    #[test]
    fn test_accents_fold_to_ascii() {
        assert_eq!(slugify("Café Müller"), "cafe-muller");
        assert_eq!(slugify("Señor Systems"), "senor-systems");
    }

    #[test]
    fn test_leading_and_trailing_separators_trimmed() {
        assert_eq!(slugify("  --Acme--  "), "acme");
    }

    #[test]
    fn test_nothing_alphanumeric_yields_empty() {
        assert_eq!(slugify("!!! ???"), "");
    }
}

//! Canonical short names for annotation columns

use std::borrow::Cow;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Source attribute name -> canonical column name
pub const CANONICAL_COLUMNS: &[(&str, &str)] = &[
    ("ensembl_gene_id", "GeneID"),
    ("mgi_symbol", "MGI_Symbol"),
    ("mgi_description", "MGI_Desc"),
    ("gene_biotype", "GeneType"),
    ("entrezgene_id", "EntrezID"),
    ("go_id", "GO_ID"),
];

/// Compatibility decomposition folds full-width forms onto ASCII and splits
/// accented letters into base letter plus combining mark; marks are dropped,
/// then case is folded without locale rules.
fn fold(name: &str) -> String {
    name.trim()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether two column names are equal up to case, accents and character width
pub fn names_equivalent(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}

/// Map a known source column name to its canonical name; other names are
/// returned unchanged
pub fn canonical_column_name(name: &str) -> Cow<'_, str> {
    let folded = fold(name);
    CANONICAL_COLUMNS
        .iter()
        .find(|(source, _)| *source == folded)
        .map(|(_, canonical)| Cow::Borrowed(*canonical))
        .unwrap_or(Cow::Borrowed(name))
}

/// Canonicalize every name in a header
pub fn canonicalize_columns(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|c| canonical_column_name(c).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        assert_eq!(canonical_column_name("ensembl_gene_id"), "GeneID");
        assert_eq!(canonical_column_name("Ensembl_Gene_ID"), "GeneID");
        assert_eq!(canonical_column_name("MGI_SYMBOL"), "MGI_Symbol");
        assert_eq!(canonical_column_name("Go_Id"), "GO_ID");
    }

    #[test]
    fn test_width_insensitive() {
        // full-width "ｇｅｎｅ＿ｂｉｏｔｙｐｅ"
        let wide = "\u{FF47}\u{FF45}\u{FF4E}\u{FF45}\u{FF3F}\u{FF42}\u{FF49}\u{FF4F}\u{FF54}\u{FF59}\u{FF50}\u{FF45}";
        assert_eq!(canonical_column_name(wide), "GeneType");
        assert!(names_equivalent(wide, "GENE_BIOTYPE"));
    }

    #[test]
    fn test_accent_insensitive() {
        assert_eq!(canonical_column_name("ensembl_g\u{e8}ne_id"), "GeneID");
        // decomposed form: 'e' + combining grave
        assert_eq!(canonical_column_name("ensembl_ge\u{300}ne_id"), "GeneID");
        assert_eq!(canonical_column_name("MG\u{cf}_Symb\u{f4}l"), "MGI_Symbol");
        assert!(names_equivalent("g\u{e9}ne_biotype", "GENE_BIOTYPE"));
        assert!(!names_equivalent("gene_biotype", "gene_biotypes"));
    }

    #[test]
    fn test_unknown_names_pass_through() {
        assert_eq!(canonical_column_name("Nv__1"), "Nv__1");
        assert_eq!(canonical_column_name("baseMean"), "baseMean");
    }

    #[test]
    fn test_idempotent() {
        for (source, canonical) in CANONICAL_COLUMNS {
            let once = canonical_column_name(source).into_owned();
            assert_eq!(once, *canonical);
            assert_eq!(canonical_column_name(&once), once);
        }
    }
}

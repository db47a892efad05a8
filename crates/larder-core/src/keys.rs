//! Canonical lookup-key normalization.
//!
//! Every vertex is unique per (label, `name`) pair, so the strings users
//! type must map to one canonical key before any lookup or write. These
//! functions are pure, total, and idempotent: applying one to its own
//! output returns the output unchanged.

use std::fmt::Display;

/// Normalize an ingredient string (possibly a comma-separated list) to its
/// canonical key.
///
/// Lower-cases and trims the input, splits on commas, trims each token,
/// sorts the tokens ascending, and rejoins with single commas. Any
/// permutation or whitespace variation of the same ingredient set maps to
/// the same key.
///
/// An input that is empty after trimming yields the empty string. Callers
/// must treat that as "no ingredients supplied" rather than a legitimate
/// key; the store rejects it before reaching the backend.
///
/// # Examples
///
/// ```
/// use larder_core::keys::normalize_ingredients;
///
/// assert_eq!(normalize_ingredients("Egg, Flour"), "egg,flour");
/// assert_eq!(normalize_ingredients("flour,egg"), "egg,flour");
/// assert_eq!(normalize_ingredients("  Onion  "), "onion");
/// ```
pub fn normalize_ingredients(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut tokens: Vec<&str> = lowered.trim().split(',').map(str::trim).collect();
    tokens.sort_unstable();
    tokens.join(",")
}

/// Normalize a cuisine name to its canonical key: lower-case and trim.
///
/// # Examples
///
/// ```
/// use larder_core::keys::normalize_cuisine;
///
/// assert_eq!(normalize_cuisine("  Thai "), "thai");
/// ```
pub fn normalize_cuisine(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalize a recipe identifier to its canonical key: stringify,
/// lower-case, trim.
///
/// Accepts any displayable value so numeric ids from the upstream recipe
/// API can be passed directly.
///
/// # Examples
///
/// ```
/// use larder_core::keys::normalize_recipe_id;
///
/// assert_eq!(normalize_recipe_id(41470), "41470");
/// assert_eq!(normalize_recipe_id(" ABC-1 "), "abc-1");
/// ```
pub fn normalize_recipe_id<T: Display>(raw: T) -> String {
    raw.to_string().trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // normalize_ingredients tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_ingredients_single() {
        assert_eq!(normalize_ingredients("onion"), "onion");
    }

    #[test]
    fn test_ingredients_case_and_trim() {
        assert_eq!(normalize_ingredients("  Onion "), "onion");
        assert_eq!(normalize_ingredients("ONION"), "onion");
    }

    #[test]
    fn test_ingredients_sorted() {
        assert_eq!(normalize_ingredients("Egg, Flour"), "egg,flour");
        assert_eq!(normalize_ingredients("flour,egg"), "egg,flour");
    }

    #[test]
    fn test_ingredients_permutations_agree() {
        let variants = [
            "egg,flour,milk",
            "Milk, Egg, Flour",
            "flour , milk ,egg",
            "  MILK,FLOUR,EGG  ",
        ];
        for v in variants {
            assert_eq!(normalize_ingredients(v), "egg,flour,milk", "input: {v:?}");
        }
    }

    #[test]
    fn test_ingredients_idempotent() {
        let once = normalize_ingredients("Basil, Tomato");
        assert_eq!(normalize_ingredients(&once), once);
    }

    #[test]
    fn test_ingredients_empty() {
        assert_eq!(normalize_ingredients(""), "");
        assert_eq!(normalize_ingredients("   "), "");
    }

    #[test]
    fn test_ingredients_internal_whitespace_kept() {
        // Multi-word ingredients keep their internal spacing.
        assert_eq!(
            normalize_ingredients("Olive Oil, garlic"),
            "garlic,olive oil"
        );
    }

    // -------------------------------------------------------------------------
    // normalize_cuisine tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_cuisine() {
        assert_eq!(normalize_cuisine("Thai"), "thai");
        assert_eq!(normalize_cuisine("  ITALIAN  "), "italian");
        assert_eq!(normalize_cuisine(""), "");
    }

    #[test]
    fn test_cuisine_idempotent() {
        let once = normalize_cuisine(" Tex-Mex ");
        assert_eq!(normalize_cuisine(&once), once);
    }

    // -------------------------------------------------------------------------
    // normalize_recipe_id tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_recipe_id_numeric() {
        assert_eq!(normalize_recipe_id(41470), "41470");
        assert_eq!(normalize_recipe_id(0), "0");
    }

    #[test]
    fn test_recipe_id_string() {
        assert_eq!(normalize_recipe_id("  Recipe-9 "), "recipe-9");
    }
}

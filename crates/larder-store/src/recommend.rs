//! Recommendation result types and the streaming-cap reduction.

use serde::{Deserialize, Serialize};

/// A recipe from a favorites query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Normalized recipe key.
    pub id: String,
    /// Display title.
    pub title: String,
}

/// A recipe from a recommendation query, with the number of contributing
/// co-interacting users.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecommendation {
    /// Normalized recipe key.
    pub id: String,
    /// Display title.
    pub title: String,
    /// How many traversal arrivals reinforced this recipe.
    #[serde(rename = "recommendedUserCount")]
    pub recommended_user_count: usize,
}

/// Reduces traversal arrivals into at most `limit` distinct
/// recommendations, in first-seen order.
///
/// The cap applies to the traversal's arrival order, not to final
/// aggregate counts: a pair whose recipe is already in the result list
/// increments that entry unconditionally, but a pair whose recipe is not
/// in the list is dropped permanently once the list holds `limit`
/// entries — later repeats of a refused recipe are dropped with it. A
/// recipe arriving after the cap fills is never admitted even if its
/// eventual aggregate would have outranked an admitted one.
pub fn reduce_recommendations<I>(arrivals: I, limit: usize) -> Vec<RecipeRecommendation>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut results: Vec<RecipeRecommendation> = Vec::new();
    for (id, title) in arrivals {
        if let Some(existing) = results.iter_mut().find(|r| r.id == id) {
            existing.recommended_user_count += 1;
        } else if results.len() < limit {
            results.push(RecipeRecommendation {
                id,
                title,
                recommended_user_count: 1,
            });
        }
        // A recipe refused admission falls through both arms and is gone:
        // the membership check only looks inside the result list.
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrival(id: &str) -> (String, String) {
        (id.to_string(), format!("{id}-title"))
    }

    #[test]
    fn test_cap_with_no_backfill() {
        let arrivals = vec![arrival("x"), arrival("y"), arrival("x"), arrival("z")];
        let results = reduce_recommendations(arrivals, 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "x");
        assert_eq!(results[0].recommended_user_count, 2);
        assert_eq!(results[1].id, "y");
        assert_eq!(results[1].recommended_user_count, 1);
        // z arrived after both slots filled and is gone for good.
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let arrivals = vec![arrival("a"), arrival("b"), arrival("c")];
        let results = reduce_recommendations(arrivals, 3);
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_increment_past_cap_for_admitted_recipe() {
        // Once admitted, a recipe keeps accumulating even after the cap.
        let arrivals = vec![
            arrival("a"),
            arrival("b"),
            arrival("c"),
            arrival("a"),
            arrival("a"),
        ];
        let results = reduce_recommendations(arrivals, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].recommended_user_count, 3);
        assert_eq!(results[1].recommended_user_count, 1);
    }

    #[test]
    fn test_refused_recipe_never_reconsidered() {
        let arrivals = vec![arrival("a"), arrival("b"), arrival("z"), arrival("z")];
        let results = reduce_recommendations(arrivals, 2);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.id != "z"));
    }

    #[test]
    fn test_empty_arrivals() {
        assert!(reduce_recommendations(Vec::new(), 5).is_empty());
    }

    #[test]
    fn test_zero_limit() {
        let arrivals = vec![arrival("a"), arrival("a")];
        assert!(reduce_recommendations(arrivals, 0).is_empty());
    }

    #[test]
    fn test_title_comes_from_first_arrival() {
        let arrivals = vec![
            ("x".to_string(), "First Title".to_string()),
            ("x".to_string(), "Second Title".to_string()),
        ];
        let results = reduce_recommendations(arrivals, 1);
        assert_eq!(results[0].title, "First Title");
        assert_eq!(results[0].recommended_user_count, 2);
    }

    #[test]
    fn test_wire_field_name() {
        let rec = RecipeRecommendation {
            id: "41470".to_string(),
            title: "Pad Thai".to_string(),
            recommended_user_count: 2,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["recommendedUserCount"], 2);
    }
}

use crate::models::{clamp_rating, Business, MAX_RATING};

/// z for a 95% confidence interval
pub const Z_95: f64 = 1.96;

/// Lower bound of the Wilson score interval for a star rating
///
/// The rating is read as a proportion `p = rating / 5` observed over
/// `review_count` trials:
///
/// ```text
/// score = (p + z²/2n − z·√((p(1−p) + z²/4n) / n)) / (1 + z²/n)
/// ```
///
/// Zero reviews score 0.
#[inline]
pub fn wilson_score(rating: f64, review_count: u32) -> f64 {
    if review_count == 0 {
        return 0.0;
    }

    let n = review_count as f64;
    let p = clamp_rating(rating) / MAX_RATING;
    let z2 = Z_95 * Z_95;

    let centre = p + z2 / (2.0 * n);
    let spread = Z_95 * ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt();

    // p = 0 cancels to zero on paper; rounding can leave a tiny negative
    ((centre - spread) / (1.0 + z2 / n)).max(0.0)
}

/// Confidence-adjusted score of a business, dirty ratings clamped first
#[inline]
pub fn confidence_score(business: &Business) -> f64 {
    wilson_score(business.rating, business.review_count)
}

/// Order businesses best-first by [`confidence_score`]
///
/// The sort is stable: equal scores (including every zero-review business)
/// keep their input order.
pub fn rank_by_confidence_score(businesses: Vec<Business>) -> Vec<Business> {
    let mut scored: Vec<(f64, Business)> = businesses
        .into_iter()
        .map(|business| (confidence_score(&business), business))
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored.into_iter().map(|(_, business)| business).collect()
}

/// Pick the business to highlight on the home page
///
/// The best-scoring business flagged as featured, otherwise the best-scoring
/// business overall. Ties go to the earlier record.
pub fn select_featured(businesses: Vec<Business>) -> Option<Business> {
    let (featured, rest): (Vec<Business>, Vec<Business>) =
        businesses.into_iter().partition(Business::is_featured);

    let pool = if featured.is_empty() { rest } else { featured };
    rank_by_confidence_score(pool).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(id: &str, rating: f64, reviews: u32) -> Business {
        Business::new(id, id, "ontario", "toronto").with_rating(rating, reviews)
    }

    fn ids(businesses: &[Business]) -> Vec<&str> {
        businesses.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_known_values() {
        // 5.0 from a single review
        let single = wilson_score(5.0, 1);
        assert!((single - 0.2065).abs() < 1e-3, "got {}", single);

        // 4.7 over 200 reviews
        let many = wilson_score(4.7, 200);
        assert!((many - 0.8981).abs() < 1e-3, "got {}", many);
    }

    #[test]
    fn test_zero_reviews_score_zero() {
        assert_eq!(wilson_score(5.0, 0), 0.0);
        assert_eq!(wilson_score(0.0, 0), 0.0);
    }

    #[test]
    fn test_zero_rating_scores_zero() {
        for n in 1..2000 {
            assert_eq!(wilson_score(0.0, n), 0.0, "n = {}", n);
        }
    }

    #[test]
    fn test_zero_rating_ties_with_unreviewed() {
        let ranked = rank_by_confidence_score(vec![rated("rated-zero", 0.0, 15), rated("unreviewed", 5.0, 0)]);
        assert_eq!(ids(&ranked), vec!["rated-zero", "unreviewed"]);
    }

    #[test]
    fn test_out_of_range_inputs_clamped() {
        assert_eq!(wilson_score(9.0, 10), wilson_score(5.0, 10));
        assert_eq!(wilson_score(-2.0, 10), wilson_score(0.0, 10));
        assert_eq!(wilson_score(f64::NAN, 10), wilson_score(0.0, 10));
    }

    #[test]
    fn test_volume_beats_single_perfect_review() {
        let ranked = rank_by_confidence_score(vec![rated("a", 5.0, 1), rated("b", 4.7, 200)]);
        assert_eq!(ids(&ranked), vec!["b", "a"]);
    }

    #[test]
    fn test_stable_on_ties() {
        let ranked = rank_by_confidence_score(vec![
            rated("a", 4.0, 10),
            rated("b", 4.0, 10),
            rated("c", 0.0, 0),
            rated("d", 3.0, 0),
        ]);
        assert_eq!(ids(&ranked), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_unreviewed_sorts_last() {
        let ranked = rank_by_confidence_score(vec![
            rated("none", 5.0, 0),
            rated("low", 1.0, 3),
            rated("high", 4.5, 80),
        ]);
        assert_eq!(ids(&ranked), vec!["high", "low", "none"]);
    }

    #[test]
    fn test_empty() {
        assert!(rank_by_confidence_score(vec![]).is_empty());
        assert!(select_featured(vec![]).is_none());
    }

    #[test]
    fn test_featured_flag_wins() {
        let mut flagged = rated("flagged", 3.0, 5);
        flagged.featured = crate::models::TriState::Yes;

        let picked = select_featured(vec![rated("best", 4.9, 900), flagged]).unwrap();
        assert_eq!(picked.id, "flagged");
    }

    #[test]
    fn test_featured_falls_back_to_best_score() {
        let picked = select_featured(vec![
            rated("perfect-once", 5.0, 1),
            rated("solid", 4.6, 300),
        ])
        .unwrap();
        assert_eq!(picked.id, "solid");
    }
}

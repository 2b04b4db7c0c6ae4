use std::cmp::Ordering;

use super::types::ArticleCandidate;

/// Sort by score (highest first), ties in discovery order, then keep `max`.
pub fn top_k(mut candidates: Vec<ArticleCandidate>, max: usize) -> Vec<ArticleCandidate> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.position.cmp(&b.position))
    });
    candidates.truncate(max);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::SubScores;
    use chrono::Utc;

    fn cand(score: f64, position: (usize, usize)) -> ArticleCandidate {
        ArticleCandidate {
            title: format!("s{score}"),
            body: String::new(),
            link: format!("https://x.example/{}/{}", position.0, position.1),
            published_at: Utc::now(),
            score,
            sub_scores: SubScores { title_keywords: 0, body_keywords: 0, source_authority: 5, readability: 0.0 },
            position,
        }
    }

    #[test]
    fn keeps_top_scores_in_order() {
        let input = vec![cand(4.0, (0, 0)), cand(10.0, (0, 1)), cand(2.0, (1, 0)), cand(8.0, (1, 1)), cand(6.0, (2, 0))];
        let out = top_k(input, 2);
        let scores: Vec<f64> = out.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![10.0, 8.0]);
    }

    #[test]
    fn ties_follow_discovery_order() {
        let input = vec![cand(5.0, (1, 0)), cand(5.0, (0, 2)), cand(7.0, (2, 0)), cand(5.0, (0, 1))];
        let out = top_k(input, 10);
        let pos: Vec<(usize, usize)> = out.iter().map(|c| c.position).collect();
        assert_eq!(pos, vec![(2, 0), (0, 1), (0, 2), (1, 0)]);
    }

    #[test]
    fn fewer_than_max_returns_all() {
        assert_eq!(top_k(vec![cand(1.0, (0, 0))], 5).len(), 1);
        assert!(top_k(Vec::new(), 5).is_empty());
        assert!(top_k(vec![cand(1.0, (0, 0))], 0).is_empty());
    }
}

//! Weighted combination of per-section similarity scores.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matching::sections::{Section, SectionMap, SectionSplitter};
use crate::matching::similarity::{round2, EmbeddingError, SimilarityScorer};

#[derive(Debug, Clone, Deserialize)]
pub struct MatchRequest {
    pub resume_text: String,
    pub job_description: String,
}

/// Per-section scores plus the weighted overall score, all in `[0, 100]`.
/// Sections that were not found score 0.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub projects: f64,
    pub summary: f64,
    pub overall_score: f64,
}

impl MatchResult {
    /// The result returned when the resume could not be read at all.
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub fn section_score(&self, section: Section) -> f64 {
        match section {
            Section::Skills => self.skills,
            Section::Experience => self.experience,
            Section::Education => self.education,
            Section::Projects => self.projects,
            Section::Summary => self.summary,
        }
    }

    fn set_section_score(&mut self, section: Section, score: f64) {
        let slot = match section {
            Section::Skills => &mut self.skills,
            Section::Experience => &mut self.experience,
            Section::Education => &mut self.education,
            Section::Projects => &mut self.projects,
            Section::Summary => &mut self.summary,
        };
        *slot = score;
    }
}

/// Splits the resume and scores it against the job description.
pub async fn analyze_resume(
    resume_text: &str,
    job_description: &str,
    splitter: &dyn SectionSplitter,
    scorer: &dyn SimilarityScorer,
) -> Result<MatchResult, EmbeddingError> {
    let sections = splitter.split(resume_text);
    if sections.is_empty() {
        debug!("No section keywords found in resume text");
    }
    score_sections(&sections, job_description, scorer).await
}

/// Scores every non-blank fragment against the job description and combines
/// the scores with the fixed section weights.
pub async fn score_sections(
    sections: &SectionMap,
    job_description: &str,
    scorer: &dyn SimilarityScorer,
) -> Result<MatchResult, EmbeddingError> {
    let mut result = MatchResult::zeroed();
    let mut total = 0.0_f64;

    for (section, fragment) in sections.iter() {
        if fragment.trim().is_empty() {
            continue;
        }
        let score = scorer.similarity(fragment, job_description).await?;
        result.set_section_score(section, score);
        total += score * section.weight();
    }

    result.overall_score = round2(total.clamp(0.0, 100.0));
    for section in Section::ALL {
        debug!("{} scored {}", section.label(), result.section_score(section));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::sections::KeywordSectionSplitter;
    use crate::matching::test_support::{FailingScorer, FixedScorer};

    fn sections(pairs: &[(Section, &str)]) -> SectionMap {
        let mut map = SectionMap::default();
        for (section, fragment) in pairs {
            map.insert(*section, *fragment);
        }
        map
    }

    #[tokio::test]
    async fn test_all_empty_sections_score_zero() {
        let scorer = FixedScorer::new(87.5);
        let result = score_sections(&SectionMap::default(), "Rust engineer", &scorer)
            .await
            .unwrap();
        assert_eq!(result, MatchResult::zeroed());
        assert_eq!(scorer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_fragment_is_not_scored() {
        let scorer = FixedScorer::new(50.0);
        let map = sections(&[(Section::Skills, "   \n\t "), (Section::Summary, "Summary: hi")]);
        let result = score_sections(&map, "jd", &scorer).await.unwrap();

        assert_eq!(result.skills, 0.0);
        assert_eq!(result.summary, 50.0);
        assert_eq!(result.overall_score, 2.5);
        assert_eq!(scorer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_every_section_compared_against_job_description() {
        let scorer = FixedScorer::new(10.0);
        let map = sections(&[
            (Section::Skills, "skills a"),
            (Section::Experience, "experience b"),
        ]);
        score_sections(&map, "the jd", &scorer).await.unwrap();

        let calls = scorer.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(_, jd)| jd == "the jd"));
        assert_eq!(calls[0].0, "skills a");
        assert_eq!(calls[1].0, "experience b");
    }

    #[tokio::test]
    async fn test_full_scores_give_full_overall() {
        let scorer = FixedScorer::new(100.0);
        let map = sections(&Section::ALL.map(|s| (s, s.label())));
        let result = score_sections(&map, "jd", &scorer).await.unwrap();
        assert_eq!(result.overall_score, 100.0);
    }

    #[tokio::test]
    async fn test_overall_is_weighted_sum() {
        let scorer = FixedScorer::new(80.0);
        // skills .30 + projects .15 = .45 → 36.0
        let map = sections(&[(Section::Skills, "x"), (Section::Projects, "y")]);
        let result = score_sections(&map, "jd", &scorer).await.unwrap();
        assert_eq!(result.skills, 80.0);
        assert_eq!(result.projects, 80.0);
        assert_eq!(result.experience, 0.0);
        assert!((result.overall_score - 36.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_overall_stays_in_bounds() {
        let scorer = FixedScorer::new(100.0);
        let splitter = KeywordSectionSplitter::new();
        let resume = "Summary Skills Experience Education Projects";
        let result = analyze_resume(resume, "jd", &splitter, &scorer)
            .await
            .unwrap();
        assert!((0.0..=100.0).contains(&result.overall_score));
        for section in Section::ALL {
            assert_eq!(result.section_score(section), 100.0);
        }
    }

    #[tokio::test]
    async fn test_scorer_failure_propagates() {
        let map = sections(&[(Section::Education, "BSc")]);
        let err = score_sections(&map, "jd", &FailingScorer).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Inference(_)));
    }

    #[tokio::test]
    async fn test_keywordless_resume_scores_zero() {
        let scorer = FixedScorer::new(99.0);
        let splitter = KeywordSectionSplitter::new();
        let result = analyze_resume("hello world", "hello world", &splitter, &scorer)
            .await
            .unwrap();
        assert_eq!(result.summary, 0.0);
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(scorer.call_count(), 0);
    }

    #[test]
    fn test_match_result_serializes_flat() {
        let json = serde_json::to_value(MatchResult::zeroed()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        for key in [
            "skills",
            "experience",
            "education",
            "projects",
            "summary",
            "overall_score",
        ] {
            assert!(keys.contains(&key), "missing {key}");
        }
    }
}

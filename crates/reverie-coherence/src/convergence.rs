//! Storyline convergence analysis.

use std::collections::BTreeMap;

use tracing::debug;
use uuid::Uuid;

use reverie_canon::StorylineThread;
use reverie_core::score::UnitScore;

use crate::config::ConvergenceConfig;
use crate::domain::convergence::ConvergenceValidation;

/// Judges whether a session's storyline threads are converging toward a
/// shared resolution.
///
/// The shared-element scan is O(threads²); call this periodically or ahead
/// of narrative climaxes, not on every turn.
pub struct StorylineConvergenceValidator {
    config: ConvergenceConfig,
}

impl StorylineConvergenceValidator {
    /// Creates a validator with the given constants.
    #[must_use]
    pub fn new(config: ConvergenceConfig) -> Self {
        Self { config }
    }

    /// Analyzes the threads:
    /// `score = min(1.0, base + weight * (shared participants + shared themes))`,
    /// convergent at or above the configured threshold.
    #[must_use]
    pub fn validate(&self, threads: &[StorylineThread], session_id: Uuid) -> ConvergenceValidation {
        if threads.len() < 2 {
            return ConvergenceValidation {
                session_id,
                storyline_count: threads.len(),
                is_convergent: false,
                score: UnitScore::new(self.config.base),
                convergence_points: Vec::new(),
                integration_issues: vec![
                    "fewer than two active storylines; convergence needs at least two".to_owned(),
                ],
                recommended_adjustments: vec![
                    "introduce a second active storyline before steering toward convergence"
                        .to_owned(),
                ],
            };
        }

        let shared_participants = shared_elements(threads, |thread| &thread.participants);
        let shared_themes = shared_elements(threads, |thread| &thread.themes);

        let mut convergence_points = Vec::new();
        for (participant, titles) in &shared_participants {
            convergence_points.push(format!(
                "participant '{participant}' links {}",
                titles.join(" and ")
            ));
        }
        for (theme, titles) in &shared_themes {
            convergence_points.push(format!("theme '{theme}' runs through {}", titles.join(" and ")));
        }

        let points = shared_participants.len() + shared_themes.len();
        #[allow(clippy::cast_precision_loss)]
        let raw = self.config.base + self.config.weight_per_point * points as f64;
        let score = UnitScore::new(raw.min(1.0));
        let is_convergent = score.value() >= self.config.threshold;
        debug!(%session_id, points, score = %score, is_convergent, "convergence analyzed");

        let mut integration_issues = Vec::new();
        let mut recommended_adjustments = Vec::new();
        if !is_convergent {
            let isolated: Vec<&StorylineThread> = threads
                .iter()
                .filter(|thread| {
                    threads.iter().filter(|other| other.id != thread.id).all(|other| {
                        thread.participants.is_disjoint(&other.participants)
                            && thread.themes.is_disjoint(&other.themes)
                    })
                })
                .collect();
            for thread in &isolated {
                integration_issues.push(format!(
                    "storyline '{}' shares no participants or themes with any other thread",
                    thread.title
                ));
            }
            for thread in &isolated {
                if let Some(other) = threads.iter().find(|other| other.id != thread.id) {
                    recommended_adjustments.push(format!(
                        "introduce a shared participant or theme between '{}' and '{}'",
                        thread.title, other.title
                    ));
                }
            }
            if isolated.is_empty() {
                recommended_adjustments.push(
                    "deepen an existing shared participant or theme to add a convergence point"
                        .to_owned(),
                );
            }
        }

        ConvergenceValidation {
            session_id,
            storyline_count: threads.len(),
            is_convergent,
            score,
            convergence_points,
            integration_issues,
            recommended_adjustments,
        }
    }
}

/// Elements appearing in more than one thread, with the titles of the
/// threads they link. `BTreeMap` keeps output order deterministic.
fn shared_elements<'a>(
    threads: &'a [StorylineThread],
    elements_of: impl Fn(&'a StorylineThread) -> &'a std::collections::BTreeSet<String>,
) -> BTreeMap<&'a str, Vec<&'a str>> {
    let mut owners: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for thread in threads {
        for element in elements_of(thread) {
            owners
                .entry(element.as_str())
                .or_default()
                .push(thread.title.as_str());
        }
    }
    owners.retain(|_, titles| titles.len() > 1);
    owners
}

#[cfg(test)]
mod tests {
    use super::*;

    use reverie_test_support::thread_with;

    fn validator() -> StorylineConvergenceValidator {
        StorylineConvergenceValidator::new(ConvergenceConfig::default())
    }

    #[test]
    fn test_two_threads_sharing_participant_and_theme_are_convergent() {
        let threads = vec![
            thread_with("The Debt", &["john", "marta"], &["grief", "duty"]),
            thread_with("The Tower", &["john"], &["duty", "ambition"]),
        ];

        let result = validator().validate(&threads, Uuid::new_v4());

        // 1 shared participant + 1 shared theme = 2 points.
        assert_eq!(result.convergence_points.len(), 2);
        assert!((result.score.value() - 0.8).abs() < 1e-9);
        assert!(result.is_convergent);
        assert!(result.integration_issues.is_empty());
    }

    #[test]
    fn test_three_disjoint_threads_are_not_convergent() {
        let threads = vec![
            thread_with("The Debt", &["john"], &["grief"]),
            thread_with("The Tower", &["marta"], &["ambition"]),
            thread_with("The Harvest", &["pia"], &["renewal"]),
        ];

        let result = validator().validate(&threads, Uuid::new_v4());

        assert_eq!(result.convergence_points.len(), 0);
        assert!((result.score.value() - 0.4).abs() < 1e-9);
        assert!(!result.is_convergent);
        assert_eq!(result.integration_issues.len(), 3);
        assert!(!result.recommended_adjustments.is_empty());
        assert!(
            result.recommended_adjustments[0].contains("introduce a shared participant or theme")
        );
    }

    #[test]
    fn test_score_caps_at_one() {
        let threads = vec![
            thread_with(
                "A",
                &["p1", "p2", "p3"],
                &["t1", "t2", "t3"],
            ),
            thread_with(
                "B",
                &["p1", "p2", "p3"],
                &["t1", "t2", "t3"],
            ),
        ];

        let result = validator().validate(&threads, Uuid::new_v4());

        // 6 shared elements would give 1.6 uncapped.
        assert!((result.score.value() - 1.0).abs() < f64::EPSILON);
        assert!(result.is_convergent);
        assert_eq!(result.convergence_points.len(), 6);
    }

    #[test]
    fn test_single_thread_reports_integration_issue() {
        let threads = vec![thread_with("The Debt", &["john"], &["grief"])];

        let result = validator().validate(&threads, Uuid::new_v4());

        assert!(!result.is_convergent);
        assert_eq!(result.storyline_count, 1);
        assert!(!result.integration_issues.is_empty());
        assert!(!result.recommended_adjustments.is_empty());
    }

    #[test]
    fn test_one_shared_element_is_not_enough() {
        let threads = vec![
            thread_with("The Debt", &["john"], &["grief"]),
            thread_with("The Tower", &["john"], &["ambition"]),
        ];

        let result = validator().validate(&threads, Uuid::new_v4());

        // 1 point: 0.4 + 0.2 = 0.6 < 0.7.
        assert!((result.score.value() - 0.6).abs() < 1e-9);
        assert!(!result.is_convergent);
        // Neither thread is fully isolated, so the advice is to deepen.
        assert!(result.integration_issues.is_empty());
        assert_eq!(result.recommended_adjustments.len(), 1);
        assert!(result.recommended_adjustments[0].contains("deepen"));
    }

    #[test]
    fn test_points_describe_the_shared_elements() {
        let threads = vec![
            thread_with("The Debt", &["john"], &["duty"]),
            thread_with("The Tower", &["john"], &["duty"]),
        ];

        let result = validator().validate(&threads, Uuid::new_v4());

        assert!(result.convergence_points.iter().any(|p| p.contains("'john'")));
        assert!(result.convergence_points.iter().any(|p| p.contains("'duty'")));
    }
}

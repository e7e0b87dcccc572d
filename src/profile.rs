//! Profile analysis stage.

use crate::agent::Stage;
use crate::state::{AiInsights, CurrentStep, Experience, NextAction, Post, ProfileData, WorkflowState};
use anyhow::{Context as _, Result};

/// Where profile data comes from.
pub trait ProfileSource: Send + Sync {
    /// Fetch the profile behind `profile_url`.
    fn fetch(&self, profile_url: &str) -> Result<ProfileData>;
}

/// Deterministic stand-in for a real profile source.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProfileSource;

impl ProfileSource for MockProfileSource {
    fn fetch(&self, _profile_url: &str) -> Result<ProfileData> {
        Ok(ProfileData {
            name: "John Doe".to_string(),
            title: "Software Engineer at TechCorp".to_string(),
            location: "San Francisco, CA".to_string(),
            connections: 500,
            recent_posts: vec![
                Post {
                    content: "Excited about AI developments".to_string(),
                    date: "2024-01-15".to_string(),
                },
                Post {
                    content: "Great conference today".to_string(),
                    date: "2024-01-10".to_string(),
                },
            ],
            experience: vec![Experience {
                company: "TechCorp".to_string(),
                role: "Software Engineer".to_string(),
                years: 2,
            }],
        })
    }
}

/// Acquires a profile and derives insights and an engagement score from it.
pub struct ProfileAnalysis {
    source: Box<dyn ProfileSource>,
}

impl ProfileAnalysis {
    pub fn new(source: Box<dyn ProfileSource>) -> Self {
        Self { source }
    }
}

impl Default for ProfileAnalysis {
    fn default() -> Self {
        Self::new(Box::new(MockProfileSource))
    }
}

impl Stage for ProfileAnalysis {
    fn name(&self) -> &str {
        "ProfileIntelligenceAgent"
    }

    fn run_stage(&self, state: &mut WorkflowState) -> Result<()> {
        if state.profile_url.is_empty() {
            state.record_error("No profile URL provided");
            return Ok(());
        }

        let profile = self
            .source
            .fetch(&state.profile_url)
            .with_context(|| format!("failed to fetch profile {}", state.profile_url))?;

        tracing::debug!(
            profile_url = %state.profile_url,
            connections = profile.connections,
            posts = profile.recent_posts.len(),
            "Profile acquired"
        );

        state.ai_insights = Some(derive_insights(&profile));
        state.engagement_score = Some(engagement_score(&profile));
        state.profile_data = Some(profile);
        state.current_step = CurrentStep::ProfileAnalysisComplete;
        state.next_action = NextAction::GenerateMessages;

        Ok(())
    }
}

/// Derive communication insights from a profile.
pub fn derive_insights(profile: &ProfileData) -> AiInsights {
    let technical = profile.title.to_lowercase().contains("engineer");
    let posts_about_ai = profile
        .recent_posts
        .iter()
        .any(|p| p.content.contains("AI"));

    let mut interests = vec!["Technology".to_string()];
    if posts_about_ai {
        interests.push("AI".to_string());
    }
    interests.push("Professional Development".to_string());

    let (personality_type, mutual_interests) = if technical {
        (
            "Professional, Tech-savvy",
            vec!["Software Development".to_string(), "Tech Industry".to_string()],
        )
    } else {
        ("Professional", vec!["Professional Networking".to_string()])
    };

    AiInsights {
        personality_type: personality_type.to_string(),
        communication_style: "Direct, Informal".to_string(),
        interests,
        best_contact_time: "Weekday mornings".to_string(),
        message_tone: "professional_friendly".to_string(),
        mutual_interests,
    }
}

/// Likelihood of a positive response, in `[0.0, 1.0]`.
pub fn engagement_score(profile: &ProfileData) -> f64 {
    let mut score = 0.5;

    if profile.connections > 500 {
        score += 0.2;
    } else if profile.connections > 100 {
        score += 0.1;
    }

    if profile.recent_posts.len() > 2 {
        score += 0.2;
    }

    f64::min(score, 1.0)
}

//! # sahaay-insights
//!
//! Read-only aggregations for dashboards: emotion counts, recurring themes,
//! assessment trends, and the short summary attached to entries shared with
//! `therapist_ai` scope. Nothing here gates visibility; callers pass in only
//! data the viewer may already see.

pub mod emotions;
pub mod themes;
pub mod trend;

pub use emotions::{dominant_emotion, emotion_counts, emotion_distribution, entries_within, EmotionShare};
pub use themes::{summarize_entry, top_themes, Theme, SUMMARY_MAX_CHARS};
pub use trend::{assessment_trend, AssessmentTrend, TrendDirection};

// ── Tests ─────────────────────────────────────────────────────────────────────

//! IRS collaborators: blank-form retrieval and the tax advisor requests.

pub mod advisor;
pub mod download;

pub use advisor::{
    parse_deductions, parse_recommendations, recommend_forms, suggest_deductions, FormRecommendation,
};
pub use download::{FormSource, IrsFormSource, IRS_PDF_BASE_URL};

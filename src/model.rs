use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One customer review. The author is kept only while merging review lists
/// (it is the dedup key) and is stripped before the record is reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub rating: f64,
    pub date: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantOption {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarProduct {
    pub title: String,
    pub image: String,
    pub asin: Option<String>,
    pub url: String,
    pub price: String,
}

/// The normalized output record for one product page plus its side fetches.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub product_id: String,
    pub job_id: String,
    pub domain: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub specs: HashMap<String, String>,
    pub features: Vec<String>,
    pub rating: f64,
    pub number_of_reviews: String,
    pub price: f64,
    pub discount_percentage: f64,
    pub stock: String,
    pub variants: HashMap<String, Vec<VariantOption>>,
    pub similar_products: Vec<SimilarProduct>,
    pub reviews: Vec<Review>,
    pub qa: Vec<QaPair>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub generated_review: String,
}

/// One result card from a search listing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingProduct {
    pub product_id: Option<String>,
    pub image_url: String,
    pub title: String,
    pub price: f64,
    pub rating: f64,
    pub brand: String,
    pub stock: String,
    pub discount: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Completed,
}

/// The one document handed to the reporting sink per job.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport<T> {
    pub job_id: String,
    pub status: JobStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub result: T,
    pub url: String,
    pub error: serde_json::Map<String, serde_json::Value>,
}

// ── Tests ──

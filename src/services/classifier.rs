// src/services/classifier.rs
//! Zero-shot genre classification through an external inference endpoint
//!
//! The classifier is an oracle: any failure (missing credential, network
//! error, non-200 status, empty label list) degrades to `Genre::Other`.
//! Classification must never abort an ingestion.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::videos::Genre;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Candidate labels sent to the zero-shot model, top-ranked label wins
const CANDIDATE_LABELS: [&str; 10] = [
    "Music and Entertainment",
    "Gaming and Esports",
    "Education and Learning",
    "Technology and Programming",
    "Lifestyle and Vlogs",
    "Sports and Fitness",
    "News and Politics",
    "Arts and Creativity",
    "Science and Nature",
    "Food and Cooking",
];

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
    parameters: ClassifyParameters,
}

#[derive(Serialize)]
struct ClassifyParameters {
    candidate_labels: Vec<&'static str>,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    // Ranked best-first by the inference API
    labels: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GenreClassifier {
    http: Client,
    api_url: String,
    api_token: Option<String>,
}

impl GenreClassifier {
    pub fn new(http: Client, api_url: String, api_token: Option<String>) -> Self {
        Self {
            http,
            api_url,
            api_token,
        }
    }

    /// Classify a video from its title and optional description
    ///
    /// Infallible by contract: error paths log and return `Genre::Other`.
    pub async fn classify(&self, title: &str, description: &str) -> Genre {
        let text = format!("{}. {}", title, description);

        match self.top_label(&text).await {
            Ok(Some(label)) => {
                let genre = map_label(&label);
                debug!(label = %label, genre = ?genre, "Classified video genre");
                genre
            }
            Ok(None) => {
                warn!("Classifier returned no labels, falling back to 'other'");
                Genre::Other
            }
            Err(e) => {
                warn!(error = %e, "Genre classification failed, falling back to 'other'");
                Genre::Other
            }
        }
    }

    async fn top_label(&self, text: &str) -> Result<Option<String>, reqwest::Error> {
        let mut request = self
            .http
            .post(&self.api_url)
            .timeout(REQUEST_TIMEOUT)
            .json(&ClassifyRequest {
                inputs: text,
                parameters: ClassifyParameters {
                    candidate_labels: CANDIDATE_LABELS.to_vec(),
                },
            });

        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let body: ClassifyResponse = response.json().await?;

        Ok(body.labels.into_iter().next())
    }
}

/// Map the top-ranked candidate label to an internal genre slug
fn map_label(label: &str) -> Genre {
    match label {
        "Music and Entertainment" => Genre::Music,
        "Gaming and Esports" => Genre::Gaming,
        "Education and Learning" => Genre::Education,
        "Technology and Programming" => Genre::Technology,
        "Lifestyle and Vlogs" => Genre::Lifestyle,
        "Sports and Fitness" => Genre::Sports,
        "News and Politics" => Genre::News,
        "Arts and Creativity" => Genre::Arts,
        "Science and Nature" => Genre::Science,
        "Food and Cooking" => Genre::Food,
        _ => Genre::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_candidate_label_maps_to_a_genre() {
        for label in CANDIDATE_LABELS {
            assert_ne!(
                map_label(label),
                Genre::Other,
                "candidate label {:?} must map to a concrete genre",
                label
            );
        }
    }

    #[test]
    fn unknown_label_maps_to_other() {
        assert_eq!(map_label("Completely Unrelated"), Genre::Other);
        assert_eq!(map_label(""), Genre::Other);
    }

    #[tokio::test]
    async fn classification_failure_degrades_to_other() {
        // Nothing listens on this port, so the request fails fast
        let classifier = GenreClassifier::new(
            Client::new(),
            "http://127.0.0.1:1/models/zero-shot".to_string(),
            None,
        );

        let genre = classifier.classify("Some title", "some description").await;
        assert_eq!(genre, Genre::Other);
    }
}

// libs/assistant-cell/src/services/assistant.rs
use rand::seq::SliceRandom;
use tracing::debug;

use shared_models::auth::User;

use crate::models::{AssistantError, ChatMessage, MedicineRecommendation, MedicineSuggestion};

const CANNED_REPLIES: [&str; 5] = [
    "How can I help you with your health today?",
    "I recommend drinking plenty of fluids and getting rest for those symptoms.",
    "That's a common concern. Have you discussed this with your doctor?",
    "I'm here to provide general guidance, but please consult your doctor for personalized advice.",
    "It's important to take your medication as prescribed by your doctor.",
];

const COMMON_SYMPTOMS: [&str; 15] = [
    "Fever", "Headache", "Cough", "Sore Throat", "Runny Nose",
    "Body Ache", "Nausea", "Dizziness", "Fatigue", "Chills",
    "Rash", "Stomach Pain", "Diarrhea", "Joint Pain", "Back Pain",
];

const GENERAL_ADVICE: &str =
    "Ensure proper rest and hydration. If symptoms persist for more than 3 days, consult a doctor.";

/// Canned assistant. Replies never depend on what was asked.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssistantService;

impl AssistantService {
    pub fn new() -> Self {
        Self
    }

    pub fn greeting(&self, user: &User) -> ChatMessage {
        ChatMessage::from_bot(format!(
            "Hello {}! I'm your AI health assistant. How can I help you today?",
            user.name
        ))
    }

    pub fn reply(&self, message: &str) -> Result<ChatMessage, AssistantError> {
        if message.trim().is_empty() {
            return Err(AssistantError::EmptyMessage);
        }

        let text = CANNED_REPLIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(CANNED_REPLIES[0]);

        debug!("Assistant replying with canned text");
        Ok(ChatMessage::from_bot(text))
    }

    pub fn common_symptoms(&self) -> Vec<String> {
        COMMON_SYMPTOMS.iter().map(|s| s.to_string()).collect()
    }

    pub fn recommend(&self, symptoms: Vec<String>) -> Result<MedicineRecommendation, AssistantError> {
        let symptoms = normalize_symptoms(symptoms);
        if symptoms.is_empty() {
            return Err(AssistantError::NoSymptoms);
        }

        Ok(MedicineRecommendation {
            symptoms,
            medicines: vec![
                MedicineSuggestion {
                    name: "Paracetamol".to_string(),
                    description: "For pain relief and fever reduction".to_string(),
                    dosage: "500-1000mg every 4-6 hours as needed".to_string(),
                    warning: "Do not exceed 4000mg in 24 hours".to_string(),
                },
                MedicineSuggestion {
                    name: "Ibuprofen".to_string(),
                    description: "Anti-inflammatory for pain and swelling".to_string(),
                    dosage: "200-400mg every 4-6 hours as needed".to_string(),
                    warning: "Take with food to reduce stomach irritation".to_string(),
                },
            ],
            general_advice: GENERAL_ADVICE.to_string(),
        })
    }
}

/// Trims entries, drops blanks and repeats, keeps first-seen order.
fn normalize_symptoms(symptoms: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(symptoms.len());
    for symptom in symptoms {
        let symptom = symptom.trim();
        if !symptom.is_empty() && !seen.iter().any(|s| s == symptom) {
            seen.push(symptom.to_string());
        }
    }
    seen
}

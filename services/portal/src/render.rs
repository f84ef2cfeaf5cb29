//! Terminal rendering of alerts and page content

use analysis::{AnalysisRecord, AnalysisResult};
use auth::ProfileData;
use common::alerts::{Alert, AlertKind};
use common::validation::PasswordStrength;

pub fn alerts(alerts: &[Alert]) {
    for alert in alerts {
        let marker = match alert.kind {
            AlertKind::Success => "✔",
            AlertKind::Error => "✖",
            AlertKind::Warning => "!",
            AlertKind::Info => "i",
            AlertKind::Validation => "✎",
        };
        println!("[{}] {}", marker, alert.message);
    }
}

pub fn analysis(result: &AnalysisResult) {
    println!("Diagnosis:  {}", result.diagnosis);
    println!("Confidence: {:.1}%", result.confidence);
    if !result.conditions.is_empty() {
        println!("Conditions:");
        for condition in &result.conditions {
            println!("  {:<24} {:>5.1}%", condition.name, condition.probability);
        }
    }
    println!();
    println!("{}", result.recommendations);
}

pub fn history(records: &[AnalysisRecord]) {
    if records.is_empty() {
        println!("No analyses yet.");
        return;
    }

    for record in records {
        let date = record
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let diagnosis = record.diagnosis.as_deref().unwrap_or("-");
        let confidence = record
            .confidence
            .map(|value| format!("{:.1}%", value))
            .unwrap_or_else(|| "-".to_string());
        let file = record
            .file_path
            .as_deref()
            .or(record.file_name.as_deref())
            .unwrap_or("-");

        println!("{:<16}  {:<22} {:>6}  {}", date, diagnosis, confidence, file);
    }
}

pub fn profile(profile: &ProfileData) {
    println!("Name:     {}", profile.full_name());
    println!("Email:    {}", profile.user_name);
    if let Some(created_at) = profile.created_at {
        println!("Joined:   {}", created_at.format("%B %-d, %Y"));
    }
}

pub fn password_strength(strength: &PasswordStrength) {
    if strength.score > 0 {
        println!(
            "Password strength: {} ({}/5, {})",
            strength.label, strength.score, strength.color
        );
    }
}

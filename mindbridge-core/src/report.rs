//! Plain-text reports: a patient-facing summary and a clinician-facing
//! comprehensive assessment.

use chrono::{DateTime, FixedOffset};

use crate::analysis::AnalysisResult;
use crate::clock::malaysia_now;
use crate::lexicon::{
    ANXIETY_TERMS, DEPRESSION_TERMS, Lexicon, RELATIONSHIP_TERMS, SLEEP_TERMS, WORK_STRESS_TERMS,
};
use crate::patients::{PatientRecord, Session};
use crate::recommendations::{RecommendationSet, format_percent, recommend};

/// Clinical themes looked for in a patient's messages, in report order.
pub const THEMES: [(&str, Lexicon); 5] = [
    ("Depressive symptoms", DEPRESSION_TERMS),
    ("Anxiety symptoms", ANXIETY_TERMS),
    ("Sleep disturbances", SLEEP_TERMS),
    ("Work-related stress", WORK_STRESS_TERMS),
    ("Relationship concerns", RELATIONSHIP_TERMS),
];

const NO_THEME: &str = "General mental health discussion";

pub fn format_patient_report(session: &Session, patient: &PatientRecord) -> String {
    let analysis = &session.analysis;
    let mut report = String::new();

    report.push_str(&format!(
        "
MINDBRIDGE MENTAL HEALTH REPORT
===============================

Patient: {name}
Date: {date}
Time: {time}

ASSESSMENT SUMMARY
------------------
Risk Level: {risk}
Sentiment Score: {sentiment:.2}
Depression Indicators: {depression}
Anxiety Indicators: {anxiety}
AI Confidence: {confidence}
",
        name = patient.name,
        date = report_date(&session.timestamp),
        time = report_time(&session.timestamp),
        risk = analysis.risk_level,
        sentiment = analysis.sentiment_score,
        depression = analysis.depression_indicators,
        anxiety = analysis.anxiety_indicators,
        confidence = format_percent(analysis.confidence),
    ));

    if analysis.is_sarcastic {
        report.push_str(&format!(
            "\nNote: Communication style detected - True emotion: {}\n",
            analysis.true_emotion.as_deref().unwrap_or("unknown")
        ));
    }

    if let Some(state) = &analysis.emotional_state {
        report.push_str(&format!("Emotional State: {state}\n"));
    }

    if !analysis.key_concerns.is_empty() {
        report.push_str("\nKey Concerns Identified:\n");
        for concern in &analysis.key_concerns {
            report.push_str(&format!("- {concern}\n"));
        }
    }

    report.push_str(
        "
RECOMMENDATIONS
---------------
",
    );

    let recommendations = recommend(analysis);
    report.push_str(&format!("Immediate Action: {}\n\n", recommendations.immediate_action));
    report.push_str("Suggested Next Steps:\n");
    write_numbered(&mut report, &recommendations.recommendations);
    report.push_str(&format!("\nFollow-up Timeline: {}\n", recommendations.follow_up));

    if !recommendations.additional_notes.is_empty() {
        report.push_str("\nAdditional Notes:\n");
        for note in &recommendations.additional_notes {
            report.push_str(&format!("- {note}\n"));
        }
    }

    report.push_str(
        "
IMPORTANT NOTES
---------------
- This report is generated by AI and should be reviewed by a healthcare professional
- If you're experiencing a mental health crisis, contact emergency services (999) immediately
- For ongoing support, contact Befrienders: 03-76272929
- Regular follow-up with your healthcare provider is recommended

PRIVACY NOTICE
--------------
This report contains confidential medical information. Keep it secure and only share with authorized healthcare providers.

Generated by MindBridge AI Mental Health Platform
",
    );

    report
}

pub fn format_clinical_report(
    session: &Session,
    patient: &PatientRecord,
    doctor_notes: &str,
) -> String {
    format_clinical_report_at(session, patient, doctor_notes, malaysia_now())
}

/// [`format_clinical_report`] with an explicit generation time.
pub fn format_clinical_report_at(
    session: &Session,
    patient: &PatientRecord,
    doctor_notes: &str,
    generated_at: DateTime<FixedOffset>,
) -> String {
    let analysis = &session.analysis;
    let mut report = String::new();

    report.push_str(&format!(
        "
COMPREHENSIVE MENTAL HEALTH ASSESSMENT REPORT
============================================

PATIENT INFORMATION
-------------------
Name: {name}
Age: {age}
Gender: {gender}
Assessment Date: {date}
Assessment Time: {time}

MEDICAL HISTORY SUMMARY
-----------------------
Last Medical Visit: {last_visit}

Current Medications:
",
        name = patient.name,
        age = patient.age,
        gender = patient.gender,
        date = report_date(&session.timestamp),
        time = report_time(&session.timestamp),
        last_visit = patient.last_visit,
    ));

    for med in &patient.medications {
        report.push_str(&format!("- {} {} ({})\n", med.name, med.dosage, med.frequency));
    }

    report.push_str(&format!("\nKnown Allergies: {}\n", patient.allergies.join(", ")));

    if !patient.mental_health_history.is_empty() {
        report.push_str("\nPrevious Mental Health History:\n");
        for entry in &patient.mental_health_history {
            report.push_str(&format!(
                "- {}: {} ({})\n",
                entry.date, entry.condition, entry.severity
            ));
        }
    }

    write_analysis_results(&mut report, analysis);

    report.push_str(&format!(
        "

RISK INTERPRETATION
-------------------
{}
",
        analysis.risk_level.interpretation()
    ));

    write_clinical_recommendations(&mut report, &recommend(analysis));

    let user_messages: Vec<&str> = session.user_messages().collect();
    if !user_messages.is_empty() {
        write_communication_analysis(&mut report, &user_messages);
    }

    if !doctor_notes.trim().is_empty() {
        report.push_str(&format!(
            "

CLINICAL NOTES
--------------
{doctor_notes}
"
        ));
    }

    report.push_str(&format!(
        "

TECHNICAL DETAILS
-----------------
Analysis Engine: MindBridge AI v2.0
Assessment Method: Natural Language Processing + AI Sentiment Analysis
AI Model: {model}
Confidence Level: {confidence}
Data Quality: {quality}

DISCLAIMER
----------
This report is generated using AI technology and should be used as a clinical decision support tool only.
All recommendations should be reviewed and validated by qualified mental health professionals.
The AI analysis is based on text communication patterns and may not capture all relevant clinical factors.

CONFIDENTIALITY NOTICE
----------------------
This document contains privileged and confidential information intended solely for authorized healthcare providers.
Distribution should be limited to personnel directly involved in patient care.
Ensure compliance with local privacy and data protection regulations.

Report Generated: {generated}
Generated by: MindBridge AI Mental Health Platform v2.0
",
        model = analysis.source_model,
        confidence = format_percent(analysis.confidence),
        quality = if user_messages.len() > 2 { "Good" } else { "Limited" },
        generated = generated_at.format("%Y-%m-%d %H:%M:%S"),
    ));

    report
}

fn write_analysis_results(report: &mut String, analysis: &AnalysisResult) {
    report.push_str(&format!(
        "

AI ANALYSIS RESULTS
-------------------
Overall Risk Assessment: {risk}
Sentiment Analysis Score: {sentiment:.3}
Depression Risk Indicators: {depression}
Anxiety Risk Indicators: {anxiety}
Crisis Risk Indicators: {crisis}
AI Confidence Level: {confidence}
",
        risk = analysis.risk_level,
        sentiment = analysis.sentiment_score,
        depression = analysis.depression_indicators,
        anxiety = analysis.anxiety_indicators,
        crisis = analysis.crisis_indicators,
        confidence = format_percent(analysis.confidence),
    ));

    if analysis.is_sarcastic {
        report.push_str("\n⚠️ SARCASM DETECTED: Patient may be masking true emotions\n");
        report.push_str(&format!(
            "True Emotional State: {}\n",
            analysis.true_emotion.as_deref().unwrap_or("Unknown")
        ));
    }

    if let Some(state) = &analysis.emotional_state {
        report.push_str(&format!("\nEmotional State Assessment: {state}\n"));
    }

    if !analysis.key_concerns.is_empty() {
        report.push_str("\nAI-Identified Key Concerns:\n");
        for concern in &analysis.key_concerns {
            report.push_str(&format!("• {concern}\n"));
        }
    }
}

fn write_clinical_recommendations(report: &mut String, recommendations: &RecommendationSet) {
    report.push_str(&format!(
        "

CLINICAL RECOMMENDATIONS
------------------------
Immediate Action Required: {}

Recommended Interventions:
",
        recommendations.immediate_action
    ));
    write_numbered(report, &recommendations.recommendations);
    report.push_str(&format!("\nFollow-up Timeline: {}\n", recommendations.follow_up));

    if !recommendations.additional_notes.is_empty() {
        report.push_str("\nAdditional Clinical Notes:\n");
        for note in &recommendations.additional_notes {
            report.push_str(&format!("• {note}\n"));
        }
    }
}

fn write_communication_analysis(report: &mut String, user_messages: &[&str]) {
    report.push_str(&format!(
        "

COMMUNICATION ANALYSIS
----------------------
Total Patient Messages: {count}
Average Message Length: {mean:.1} words

Key Themes Identified:
",
        count = user_messages.len(),
        mean = mean_word_count(user_messages),
    ));

    let themes = extract_themes(user_messages);
    if themes.is_empty() {
        report.push_str(&format!("- {NO_THEME}\n"));
    } else {
        for theme in themes {
            report.push_str(&format!("- {theme}\n"));
        }
    }
}

/// Themes whose keywords appear anywhere in the space-joined messages.
pub fn extract_themes(user_messages: &[&str]) -> Vec<&'static str> {
    let all_text = user_messages.join(" ").to_lowercase();
    THEMES
        .iter()
        .filter(|(_, lexicon)| lexicon.matches_any(&all_text))
        .map(|(theme, _)| *theme)
        .collect()
}

fn mean_word_count(messages: &[&str]) -> f64 {
    if messages.is_empty() {
        return 0.0;
    }
    let words: usize = messages.iter().map(|m| m.split_whitespace().count()).sum();
    words as f64 / messages.len() as f64
}

fn write_numbered(report: &mut String, items: &[String]) {
    for (i, item) in items.iter().enumerate() {
        report.push_str(&format!("{}. {item}\n", i + 1));
    }
}

fn report_date(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

fn report_time(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format("%H:%M").to_string()
}

/// Download name of a patient report; `session_number` is 1-based.
pub fn patient_report_file_name(session_number: usize) -> String {
    format!("mental_health_report_{session_number}.txt")
}

/// Download name of a clinical report; `session_number` is 1-based.
pub fn clinical_report_file_name(patient_name: &str, session_number: usize) -> String {
    format!(
        "comprehensive_report_{}_session_{session_number}.txt",
        patient_name.replace(' ', "_")
    )
}

//! Resume analysis — PDF text extraction and skill detection against a fixed
//! ML/AI vocabulary.

use crate::errors::AppError;

/// Lowercase keyword → canonical display label.
///
/// Matching is plain substring membership, no word boundaries: "sql" matches
/// inside "mysql". That over-match is intentional and covered by tests.
const SKILL_VOCABULARY: &[(&str, &str)] = &[
    ("python", "Python"),
    ("pytorch", "PyTorch"),
    ("tensorflow", "TensorFlow"),
    ("keras", "Keras"),
    ("sklearn", "Scikit-Learn"),
    ("nlp", "NLP"),
    ("llm", "LLM"),
    ("transformers", "Transformers"),
    ("huggingface", "HuggingFace"),
    ("pandas", "Pandas"),
    ("numpy", "NumPy"),
    ("sql", "SQL"),
    ("docker", "Docker"),
    ("aws", "AWS"),
    ("gcp", "GCP"),
    ("azure", "Azure"),
    ("git", "Git"),
    ("linux", "Linux"),
    ("cv", "Computer Vision"),
    ("opencv", "OpenCV"),
    ("spark", "Spark"),
    ("hadoop", "Hadoop"),
];

const MAX_SKILLS: usize = 10;

/// Extracts plain text from an uploaded PDF.
///
/// Malformed documents and PDFs without an extractable text layer are
/// reported as parse errors, never as a panic.
pub fn extract_text(data: &[u8]) -> Result<String, AppError> {
    let text = pdf_extract::extract_text_from_mem(data)
        .map_err(|e| AppError::Pdf(format!("Could not parse PDF: {e}")))?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Pdf(
            "PDF contains no extractable text".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

/// Scans resume text for known skills. Returns at most 10 canonical labels;
/// order is not guaranteed. Empty input yields an empty list.
pub fn extract_skills(resume_text: &str) -> Vec<String> {
    let resume_lower = resume_text.to_lowercase();

    let mut found: Vec<String> = SKILL_VOCABULARY
        .iter()
        .filter(|(keyword, _)| resume_lower.contains(keyword))
        .map(|(_, label)| label.to_string())
        .collect();

    found.truncate(MAX_SKILLS);
    found
}

//! PDF report rendering — turns a finished (or in-progress) interview
//! transcript into a downloadable report.

use chrono::Utc;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

use crate::errors::AppError;
use crate::interview::session::InterviewSession;

const PAGE_WIDTH_MM: f64 = 215.9; // US letter
const PAGE_HEIGHT_MM: f64 = 279.4;
const MARGIN_MM: f64 = 20.0;
const LINE_HEIGHT_MM: f64 = 6.0;

/// Total score at or above this qualifies the candidate.
const QUALIFY_THRESHOLD: u32 = 70;

fn status_label(total_score: u32) -> &'static str {
    if total_score >= QUALIFY_THRESHOLD {
        "QUALIFIED"
    } else {
        "REVIEW"
    }
}

/// Keeps at most `max` characters, appending an ellipsis when truncated.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut out: String = text.chars().take(max).collect();
        out.push_str("...");
        out
    } else {
        text.to_string()
    }
}

fn sanitize_filename(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Simple top-down line writer with automatic page breaks.
struct LineWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: printpdf::PdfLayerReference,
    y: f64,
}

impl<'a> LineWriter<'a> {
    fn new(doc: &'a PdfDocumentReference, layer: printpdf::PdfLayerReference) -> Self {
        Self {
            doc,
            layer,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        }
    }

    fn write(&mut self, text: &str, size: f64, font: &IndirectFontRef) {
        if self.y < MARGIN_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM as _), Mm(PAGE_HEIGHT_MM as _), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        self.layer
            .use_text(text, size as _, Mm(MARGIN_MM as _), Mm(self.y as _), font);
        self.y -= LINE_HEIGHT_MM;
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT_MM / 2.0;
    }
}

/// Renders the session transcript as a PDF, returning the byte buffer and a
/// suggested filename.
pub fn render_report(session: &InterviewSession) -> Result<(Vec<u8>, String), AppError> {
    let filename = format!("{}_Interview_Report.pdf", sanitize_filename(&session.candidate));

    let (doc, page, layer) = PdfDocument::new(
        "ML/AI Interview Report",
        Mm(PAGE_WIDTH_MM as _),
        Mm(PAGE_HEIGHT_MM as _),
        "Layer 1",
    );

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Report(format!("font setup failed: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Report(format!("font setup failed: {e}")))?;

    let mut writer = LineWriter::new(&doc, doc.get_page(page).get_layer(layer));

    writer.write("ML/AI Interview Report", 20.0, &bold);
    writer.gap();

    writer.write(&format!("Candidate: {}", session.candidate), 12.0, &regular);
    writer.write(&format!("Position: {}", session.role), 12.0, &regular);
    writer.write(
        &format!("Date: {}", Utc::now().format("%B %d, %Y")),
        12.0,
        &regular,
    );
    writer.write(
        &format!("Total Score: {}/100", session.total_score),
        12.0,
        &regular,
    );
    writer.write(
        &format!("Status: {}", status_label(session.total_score)),
        12.0,
        &bold,
    );
    writer.gap();

    if !session.skills.is_empty() {
        writer.write("Skills Identified", 14.0, &bold);
        let shown: Vec<&str> = session.skills.iter().take(8).map(String::as_str).collect();
        writer.write(&shown.join(", "), 11.0, &regular);
        writer.gap();
    }

    writer.write("Question-wise Breakdown", 14.0, &bold);
    for (i, exchange) in session.transcript.iter().enumerate() {
        writer.write(
            &format!("Q{}: {}", i + 1, truncate_chars(&exchange.question, 80)),
            11.0,
            &bold,
        );
        writer.write(
            &format!("A: {}", truncate_chars(&exchange.answer, 120)),
            11.0,
            &regular,
        );
        writer.write(
            &format!(
                "Score: {}/20 — {} ({})",
                exchange.score, exchange.feedback, exchange.reasoning
            ),
            11.0,
            &regular,
        );
        writer.gap();
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| AppError::Report(format!("PDF serialization failed: {e}")))?;

    Ok((bytes, filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, QuestionMode, ScorerMode};
    use crate::interview::scoring::ScoreBreakdown;
    use crate::interview::session::Exchange;

    fn session_with_score(total: u32) -> InterviewSession {
        let config = Config {
            groq_api_key: None,
            question_mode: QuestionMode::Static,
            scorer_mode: ScorerMode::Heuristic,
            cache_ttl_secs: 3600,
            rate_limit_max_requests: 10,
            rate_limit_window_secs: 60,
            breaker_cooldown_secs: 300,
            port: 8080,
            rust_log: "info".to_string(),
        };
        let mut session = InterviewSession::new(
            "Sakshi Kumar".to_string(),
            "ML Engineer".to_string(),
            "python pytorch aws".to_string(),
            vec!["Python".to_string(), "PyTorch".to_string()],
            &config,
        );
        session.record_exchange(Exchange {
            question: "Explain L1 vs L2 regularization.".to_string(),
            answer: "L1 promotes sparsity while L2 shrinks weights smoothly.".to_string(),
            score: total,
            feedback: "Good".to_string(),
            reasoning: "Depth: 4/7 | Clarity: 2/3 | Relevance: 0/3".to_string(),
            breakdown: ScoreBreakdown {
                depth: 4,
                clarity: 2,
                relevance: 0,
            },
        });
        session
    }

    #[test]
    fn test_render_produces_pdf_bytes_and_filename() {
        let session = session_with_score(16);
        let (bytes, filename) = render_report(&session).unwrap();
        assert!(bytes.starts_with(b"%PDF"), "output must be a PDF");
        assert_eq!(filename, "Sakshi_Kumar_Interview_Report.pdf");
    }

    #[test]
    fn test_qualification_threshold() {
        assert_eq!(status_label(70), "QUALIFIED");
        assert_eq!(status_label(90), "QUALIFIED");
        assert_eq!(status_label(69), "REVIEW");
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("short", 80), "short");
        let long = "é".repeat(100);
        let truncated = truncate_chars(&long, 80);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 83);
    }

    #[test]
    fn test_filename_sanitizes_awkward_names() {
        assert_eq!(sanitize_filename("A/B..C d"), "A_B__C_d");
    }

    #[test]
    fn test_long_transcript_overflows_to_new_page() {
        let mut session = session_with_score(10);
        for i in 0..30 {
            session.record_exchange(Exchange {
                question: format!("Question number {i} with some padding text?"),
                answer: "An answer long enough to be representative of real input.".to_string(),
                score: 10,
                feedback: "Needs improvement".to_string(),
                reasoning: String::new(),
                breakdown: ScoreBreakdown {
                    depth: 0,
                    clarity: 1,
                    relevance: 0,
                },
            });
        }
        let (bytes, _) = render_report(&session).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}

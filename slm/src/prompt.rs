//! Prompt templates for the clinical summary and the follow-up chat.

pub const SUMMARY_INSTRUCTIONS: &str = "\
You are a medical AI assistant. You will receive medical text extracted from one or more full-body checkup reports.
Your tasks:
1. Extract patient history with name (if present).
2. Identify key abnormal findings from all reports and highlight abnormal values using **bold**.
3. Based on the findings, provide:
    - Likely diagnosis
    - Suggested treatment plan
    - Medicines
4. Generate a short summary of the case.
Only include medically relevant data. Format the output clearly with headings.";

pub const SUMMARY_CONTEXT_MARKER: &str = "--- MEDICAL SUMMARY CONTEXT ---";
pub const USER_QUESTION_MARKER: &str = "--- USER QUESTION ---";

/// The full corpus follows the instructions after one blank line.
pub fn summary_prompt(corpus: &str) -> String {
    format!("{SUMMARY_INSTRUCTIONS}\n\n{corpus}")
}

pub fn follow_up_prompt(summary: &str, question: &str) -> String {
    format!(
        "Based on the following medical report summary, answer the user's question.\n\
         Maintain a helpful, medically-aware, and cautious tone. If the information\n\
         is not in the summary, state that fact and remind them to consult a doctor.\n\
         \n\
         {SUMMARY_CONTEXT_MARKER}\n\
         {summary}\n\
         {USER_QUESTION_MARKER}\n\
         {question}\n"
    )
}

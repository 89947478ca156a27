//! Fixed retrieval query and the analysis prompt template.

/// Query every passage is ranked against.
pub const ANALYSIS_QUERY: &str = "Analyze resume for ATS score, skills, grammar and improvements";

/// Returned as the analysis when the generation service answers without any candidate text.
pub const NO_RESPONSE_SENTINEL: &str = "No response from AI";

/// Joins the retrieved passages (already in ranked order) and embeds them in the instruction
/// block sent to the generation service.
pub fn build_prompt<S: AsRef<str>>(passages: &[S]) -> String {
    let context = passages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are an ATS resume analyzer.\n\
         \n\
         Analyze the resume content below and return:\n\
         - ATS Score /100\n\
         - Skill Match Score /100\n\
         - Grammar Score /100\n\
         - Summary\n\
         - Improvements\n\
         \n\
         Resume:\n\
         {context}\n"
    )
}

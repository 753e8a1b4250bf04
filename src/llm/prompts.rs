//! Prompt templates

/// Direct variant: the question is wrapped and sent as-is
pub fn direct_prompt(question: &str) -> String {
    format!("Respond in Urdu: {}", question)
}

const STUFF_PREAMBLE: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer. \
Answer in Urdu.";

/// Retrieval variant: every retrieved chunk is stuffed into one prompt
pub fn stuff_prompt<S: AsRef<str>>(context: &[S], question: &str) -> String {
    let joined = context
        .iter()
        .map(|c| c.as_ref().trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\n{}\n\nQuestion: {}\nHelpful Answer:",
        STUFF_PREAMBLE, joined, question
    )
}

// Prompt strings shared by the explain and ask flows.

pub const SYSTEM_PROMPT: &str = "You are an expert coding assistant. Explain the following code or answer the question. If it contains a bug, point it out. Be concise.";

/// Single-turn prompt for providers that take one combined text part.
pub fn combined_prompt(source_text: &str) -> String {
    format!("{}\n\nCode:\n{}", SYSTEM_PROMPT, source_text)
}

//! Prompt assembly and reply post-processing.

/// Instructional preamble prepended to every user message.
const PROMPT_TEMPLATE: &str = "\
Respond to users' questions in a clean, structured format.
- Your answers should be concise and clear.
- If you use lists, separate each item with a line break and number it.
- Avoid unnecessary repetition and provide specific advice that reflects the user's context.
";

/// Builds the full prompt sent upstream: fixed preamble plus user message.
pub fn build_prompt(message: &str) -> String {
    format!("{PROMPT_TEMPLATE}{message}")
}

/// Removes the first occurrence of the exact prompt from the generated text
/// and trims surrounding whitespace.
///
/// Models behind this endpoint tend to echo their input; stripping it is a
/// heuristic kept as its own step so it can be swapped out if the upstream
/// model stops echoing. If stripping leaves nothing, the untouched text is
/// returned instead.
pub fn strip_prompt_echo(prompt: &str, generated: &str) -> String {
    let stripped = generated.replacen(prompt, "", 1);
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        generated.to_string()
    } else {
        trimmed.to_string()
    }
}

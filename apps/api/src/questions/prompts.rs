/// Prompt sent to Gemini for one technology. `{technology}` is substituted.
pub const QUESTION_PROMPT_TEMPLATE: &str =
    "Generate 5 technical interview questions on {technology}. Respond as a plain list.";

pub fn question_prompt(technology: &str) -> String {
    QUESTION_PROMPT_TEMPLATE.replace("{technology}", technology)
}

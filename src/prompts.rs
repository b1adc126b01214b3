pub const ANSWER_SYSTEM_PROMPT: &str = r####"According to the picture, answer the question. Note that when referring to angles in the answer, you must use the symbol ∠. Return {k_answers} distinct answers separated by commas, and do not add any extra text."####;

pub const OPTION_SYSTEM_PROMPT: &str = r####"According to the picture, answer the multiple-choice question. Choose exactly one option and give only its letter in braces, for example {B}. Do not add any extra text."####;

pub const PARAPHRASE_PROMPT: &str = r####"
Rewrite the following geometry question about a diagram in {k_perturbations} different ways.

Rules:
- Every rewrite must ask exactly the same thing as the original and have exactly the same answer.
- Keep every point, segment, angle and circle name unchanged (for example AB, ∠BAC, ⊙O).
- Do not answer the question and do not add hints.
- Output one rewritten question per line, with no numbering, bullets, quotes or extra text.

Question:
{question}"####;

pub fn answer_system_prompt(k_answers: usize) -> String {
    ANSWER_SYSTEM_PROMPT.replace("{k_answers}", &k_answers.to_string())
}

pub fn option_system_prompt() -> String {
    OPTION_SYSTEM_PROMPT.to_string()
}

pub fn paraphrase_prompt(question: &str, k_perturbations: usize) -> String {
    PARAPHRASE_PROMPT
        .replace("{k_perturbations}", &k_perturbations.to_string())
        .replace("{question}", question.trim())
}

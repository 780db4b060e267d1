// All LLM prompt constants for the coach. Question generation and critique
// each run in JSON mode, so every prompt pins an exact response schema.

/// System prompt for question generation — enforces JSON-only output.
pub const QGEN_SYSTEM: &str = "You are an expert interviewer. \
    Generate questions that are specific to the candidate's resume section text. \
    Do NOT include answers. \
    You MUST respond with valid JSON only, with a single key 'questions'. \
    Do NOT include any text outside the JSON object.";

/// Question generation template. Replace `{section}`, `{section_text}` and
/// `{count}` before sending.
pub const QGEN_PROMPT_TEMPLATE: &str = r#"SECTION: {section}

TEXT
-----
{section_text}

TASK
Generate {count} interview questions grounded ONLY in TEXT. Mix behavioral and technical when relevant.
Return JSON:
{"questions": ["Q1", "Q2", ...]}
"#;

/// System prompt for answer critique.
pub const CRITIQUE_SYSTEM: &str = "You are a precise interview coach. \
    Provide constructive feedback and a numeric rating. \
    You MUST respond with valid JSON only.";

/// Critique template. Replace `{section}`, `{question}` and `{answer}`
/// before sending.
pub const CRITIQUE_PROMPT_TEMPLATE: &str = r#"RESUME SECTION (context)
--------------------------
{section}

QUESTION
--------
{question}

CANDIDATE ANSWER
----------------
{answer}

TASK
1) Give brief, actionable feedback (max 6 bullet points).
2) Give a 1-5 rating using this rubric:
   5=exceptional (specific impact, metrics, clear structure),
   4=strong (clear, mostly specific, minor gaps),
   3=acceptable (some specifics, needs structure/clarity),
   2=weak (vague, missing key details),
   1=poor (off-topic or no evidence).
3) Provide a concise "strong sample answer" that would likely score 5.

Return JSON with keys: feedback (list of strings), rating (int 1-5), sample_answer (string).
"#;

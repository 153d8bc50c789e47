// Shared prompt fragments for the vision client.
// Task prompts live alongside the service that sends them.

/// System message that enforces JSON-only output from the resume parser.
pub const RESUME_PARSER_SYSTEM: &str = "You are a resume parser that returns ONLY valid JSON \
    matching the requested schema. Do not wrap the JSON in markdown code fences (```), \
    do not add explanations, and do not write any text outside the JSON object.";

// Resume analysis: the request boundary around the extractor and the scoring call.
// All LLM calls go through llm_client — no direct gateway calls here.

pub mod handlers;
pub mod models;
pub mod prompts;
pub mod scorer;

// AI proxy: fills a prompt template with a job description and forwards it
// to the configured `TextGenerator`. Output is returned verbatim.

pub mod handlers;
pub mod prompts;

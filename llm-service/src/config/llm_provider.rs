/// Backend used for LLM inference.
///
/// Everything the backend talks to speaks the OpenAI REST shape, so a single
/// variant covers OpenAI itself and the local runtimes that expose the same
/// API (vLLM, LM Studio, Ollama's `/v1` compatibility endpoint). Adding a
/// provider with a different wire protocol means extending this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Any server exposing `/v1/chat/completions` and `/v1/embeddings`.
    OpenAiCompatible,
}

impl LlmProvider {
    /// Parses the `LLM_PROVIDER` value.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "openai_compatible" => Some(LlmProvider::OpenAiCompatible),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_the_documented_provider_name() {
        assert_eq!(
            LlmProvider::parse("openai_compatible"),
            Some(LlmProvider::OpenAiCompatible)
        );
        assert_eq!(
            LlmProvider::parse(" openai_compatible "),
            Some(LlmProvider::OpenAiCompatible)
        );
        assert_eq!(LlmProvider::parse("anthropic"), None);
    }
}

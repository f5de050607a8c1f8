use super::{CommentOracle, OracleRequest, OracleResponse, OracleResult};

/// Offline oracle that summarises what the context already knows.
///
/// Output depends only on the request, so repeated runs are stable.
#[derive(Debug, Default, Clone, Copy)]
pub struct OutlineOracle;

impl OutlineOracle {
    /// Construct the oracle.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CommentOracle for OutlineOracle {
    fn id(&self) -> &'static str {
        "outline"
    }

    fn generate(&self, request: &OracleRequest) -> OracleResult<OracleResponse> {
        let context = &request.context;
        let summary = context
            .existing_doc
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map_or_else(
                || format!("{} {}.", capitalize(context.kind.label()), context.name),
                str::to_owned,
            );

        Ok(OracleResponse::new(format!(
            "{summary}\n\nComplexity: {}.",
            context.complexity
        )))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

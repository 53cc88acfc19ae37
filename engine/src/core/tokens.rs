//! Keyword tokenization shared by the scorer and the optimizer

/// Lowercase alphanumeric tokens of at least two characters, first occurrence order
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for raw in text.split(|c: char| !c.is_alphanumeric()) {
        let token = raw.to_lowercase();
        if token.chars().count() >= 2 && !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

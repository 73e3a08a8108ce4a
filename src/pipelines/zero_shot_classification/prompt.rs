//! Classification prompt formatting.
//!
//! GLiClass models see every candidate label inline in the prompt: each
//! label is lower-cased, wrapped with the `<<LABEL>>` marker, and the label
//! block is closed with `<<SEP>>`. The block goes before the text
//! (`prompt_first`) or after it.

/// Marker prepended to every candidate label.
pub const LABEL_MARKER: &str = "<<LABEL>>";

/// Marker closing the label block.
pub const SEPARATOR: &str = "<<SEP>>";

/// One formatted prompt plus the label order it was built with.
///
/// `label_order` is the input labels exactly as given, never reordered or
/// deduplicated. It is the authoritative mapping from logits column index
/// to label for this text and must reach the decoder unchanged.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub text: String,
    pub label_order: Vec<String>,
}

/// Format one (text, labels) pair into a classification prompt.
///
/// Labels are lower-cased in the prompt only; `label_order` keeps them as
/// given. No other normalization is applied to the text or the labels.
pub fn build(text: &str, labels: &[String], prompt_first: bool) -> Prompt {
    let marker_len: usize = labels
        .iter()
        .map(|label| LABEL_MARKER.len() + label.len())
        .sum();
    let mut prompt = String::with_capacity(text.len() + marker_len + SEPARATOR.len());

    if prompt_first {
        push_label_block(&mut prompt, labels);
        prompt.push_str(text);
    } else {
        prompt.push_str(text);
        push_label_block(&mut prompt, labels);
    }

    Prompt {
        text: prompt,
        label_order: labels.to_vec(),
    }
}

fn push_label_block(prompt: &mut String, labels: &[String]) {
    for label in labels {
        prompt.push_str(LABEL_MARKER);
        prompt.push_str(&label.to_lowercase());
    }
    prompt.push_str(SEPARATOR);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn labels_lead_when_prompt_first() {
        let prompt = build("Some text", &labels(&["Cat", "DOG"]), true);
        assert_eq!(prompt.text, "<<LABEL>>cat<<LABEL>>dog<<SEP>>Some text");
    }

    #[test]
    fn labels_trail_when_not_prompt_first() {
        let prompt = build("Some text", &labels(&["Cat", "DOG"]), false);
        assert_eq!(prompt.text, "Some text<<LABEL>>cat<<LABEL>>dog<<SEP>>");
    }

    #[test]
    fn label_order_preserves_input_order_and_case() {
        let prompt = build("x", &labels(&["DOG", "cat", "DOG"]), true);
        assert_eq!(prompt.label_order, ["DOG", "cat", "DOG"]);
    }

    #[test]
    fn empty_label_set_still_emits_separator() {
        let prompt = build("x", &[], true);
        assert_eq!(prompt.text, "<<SEP>>x");
        assert!(prompt.label_order.is_empty());
    }

    #[test]
    fn text_is_not_normalized() {
        let prompt = build("  MiXeD Case  ", &labels(&["a"]), false);
        assert_eq!(prompt.text, "  MiXeD Case  <<LABEL>>a<<SEP>>");
    }
}

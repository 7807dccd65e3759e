//! Completion for the command input line.
//!
//! Completes the leading word against command names, and the argument of
//! `info` against the model's module names.

use rewind_session::COMMANDS;

/// Computes the completed input line for a Tab press, or `None` when
/// nothing applies.
///
/// With a single candidate the word completes fully (plus a trailing
/// space for command words); with several, the word extends to their
/// longest common prefix.
pub fn complete(input: &str, module_names: &[&str]) -> Option<String> {
    let (head, partial) = match input.rsplit_once(char::is_whitespace) {
        Some((head, partial)) => (head.trim_end(), partial),
        None => ("", input),
    };

    let candidates: Vec<&str> = if head.is_empty() {
        command_words().filter(|w| w.starts_with(partial)).collect()
    } else if head == "info" || head == "i" {
        module_names
            .iter()
            .copied()
            .filter(|name| name.starts_with(partial))
            .collect()
    } else {
        return None;
    };

    let completed = match candidates.as_slice() {
        [] => return None,
        [only] => {
            let mut word = only.to_string();
            if head.is_empty() {
                word.push(' ');
            }
            word
        }
        many => {
            let prefix = longest_common_prefix(many);
            if prefix.len() <= partial.len() {
                return None;
            }
            prefix
        }
    };

    if head.is_empty() {
        Some(completed)
    } else {
        Some(format!("{head} {completed}"))
    }
}

fn command_words() -> impl Iterator<Item = &'static str> {
    COMMANDS
        .iter()
        .map(|(usage, _, _)| usage.split_whitespace().next().unwrap())
}

fn longest_common_prefix(words: &[&str]) -> String {
    let first = words[0];
    let mut len = first.len();
    for word in &words[1..] {
        len = len.min(
            first
                .bytes()
                .zip(word.bytes())
                .take_while(|(a, b)| a == b)
                .count(),
        );
    }
    first[..len].to_string()
}

//! Word chunking of backend fragments.

/// Split a fragment on single spaces into chunk pieces.
///
/// The first piece is emitted as-is and every later piece gets exactly one
/// leading space, so concatenating the pieces gives back `fragment`. A leading
/// empty piece is dropped. Runs of spaces yield pieces that are just `" "`.
pub fn split_words(fragment: &str) -> impl Iterator<Item = String> + '_ {
    fragment
        .split(' ')
        .enumerate()
        .filter_map(|(i, word)| match i {
            0 if word.is_empty() => None,
            0 => Some(word.to_string()),
            _ => Some(format!(" {word}")),
        })
}

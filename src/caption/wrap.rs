use std::str::SplitWhitespace;

/// Greedy character-budget word wrap.
///
/// Words are packed onto a line while `line + ' ' + word` stays within
/// `max_chars` characters. A word longer than the budget is emitted alone and
/// never split. Widths are character counts, not glyph widths.
pub fn wrap(text: &str, max_chars: usize) -> WordWrap<'_> {
    WordWrap {
        words: text.split_whitespace(),
        pending: None,
        max_chars,
    }
}

/// Lazy line sequence returned by [`wrap`]. Clone it (or call [`wrap`]
/// again) to walk the lines a second time.
#[derive(Clone, Debug)]
pub struct WordWrap<'a> {
    words: SplitWhitespace<'a>,
    pending: Option<&'a str>,
    max_chars: usize,
}

impl Iterator for WordWrap<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let first = self.pending.take().or_else(|| self.words.next())?;
        let mut line = first.to_string();
        let mut used = first.chars().count();
        for word in self.words.by_ref() {
            let len = word.chars().count();
            if used + 1 + len > self.max_chars {
                self.pending = Some(word);
                break;
            }
            line.push(' ');
            line.push_str(word);
            used += 1 + len;
        }
        Some(line)
    }
}

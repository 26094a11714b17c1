use unicode_general_category::{get_general_category, GeneralCategory};

use crate::types::{TextBlock, TextChar, TextWord};

/// Collapses the engine's block/line/span/char hierarchy into lines of words.
///
/// Whitespace ends the current word and is dropped. Punctuation ends the
/// current word and then becomes a one-character word of its own. Lines that
/// end up without any word are left out.
pub fn segment_words(blocks: &[TextBlock]) -> Vec<Vec<TextWord>> {
    let mut lines = Vec::new();

    for block in blocks {
        for line in &block.lines {
            let mut words = Vec::new();
            let mut word = TextWord::default();

            for ch in line.spans.iter().flat_map(|span| span.chars.iter()) {
                match classify(ch) {
                    CharClass::Separator => flush(&mut word, &mut words),
                    CharClass::Punctuation => {
                        flush(&mut word, &mut words);
                        word.push(ch);
                        flush(&mut word, &mut words);
                    }
                    CharClass::Letter => word.push(ch),
                }
            }
            flush(&mut word, &mut words);

            if !words.is_empty() {
                lines.push(words);
            }
        }
    }

    lines
}

fn flush(word: &mut TextWord, words: &mut Vec<TextWord>) {
    if !word.is_empty() {
        words.push(std::mem::take(word));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Separator,
    Punctuation,
    Letter,
}

fn classify(ch: &TextChar) -> CharClass {
    if is_separator(ch.c) {
        return CharClass::Separator;
    }
    match get_general_category(ch.c) {
        GeneralCategory::OpenPunctuation
        | GeneralCategory::ClosePunctuation
        | GeneralCategory::InitialPunctuation
        | GeneralCategory::FinalPunctuation
        | GeneralCategory::OtherPunctuation => CharClass::Punctuation,
        _ => CharClass::Letter,
    }
}

/// Breaking whitespace. No-break spaces and NEL keep words together.
fn is_separator(c: char) -> bool {
    match c {
        '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{0085}' => false,
        '\u{001C}'..='\u{001F}' => true,
        _ => c.is_whitespace(),
    }
}

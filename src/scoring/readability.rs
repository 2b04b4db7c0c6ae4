// Flesch Reading Ease, rescaled onto 0..=10.

#[derive(Debug, Clone, PartialEq)]
pub enum ReadabilityError {
    NoWords,
}

impl std::fmt::Display for ReadabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadabilityError::NoWords => write!(f, "text contains no words"),
        }
    }
}

impl std::error::Error for ReadabilityError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextCounts {
    pub sentences: usize,
    pub words: usize,
    pub syllables: usize,
}

pub fn counts(text: &str) -> TextCounts {
    let mut words = 0usize;
    let mut syllables = 0usize;
    for raw in text.split_whitespace() {
        let word: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
        if word.is_empty() { continue; }
        words += 1;
        syllables += count_syllables(&word);
    }
    let sentences = text
        .split(|c: char| matches!(c, '.' | '!' | '?'))
        .filter(|s| s.chars().any(|c| c.is_alphanumeric()))
        .count();
    TextCounts { sentences: sentences.max(1), words, syllables }
}

/// Vowel-group heuristic: silent trailing `e` dropped (but not in "-le"), at least one per word.
pub fn count_syllables(word: &str) -> usize {
    let w: Vec<char> = word.to_lowercase().chars().filter(|c| c.is_alphabetic()).collect();
    if w.is_empty() { return 1; }
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut groups = 0usize;
    let mut prev_vowel = false;
    for &c in &w {
        let v = is_vowel(c);
        if v && !prev_vowel { groups += 1; }
        prev_vowel = v;
    }
    let n = w.len();
    if groups > 1 && w[n - 1] == 'e' && !is_vowel(w[n - 2]) {
        let consonant_le = n >= 3 && w[n - 2] == 'l' && !is_vowel(w[n - 3]);
        if !consonant_le { groups -= 1; }
    }
    groups.max(1)
}

pub fn flesch_reading_ease(text: &str) -> Result<f64, ReadabilityError> {
    let c = counts(text);
    if c.words == 0 { return Err(ReadabilityError::NoWords); }
    let words = c.words as f64;
    Ok(206.835 - 1.015 * (words / c.sentences as f64) - 84.6 * (c.syllables as f64 / words))
}

/// `clamp(raw / 100 * 10, 0, 10)` over Flesch Reading Ease.
pub fn score(text: &str) -> Result<f64, ReadabilityError> {
    let raw = flesch_reading_ease(text)?;
    Ok(normalize(raw))
}

pub fn normalize(raw: f64) -> f64 {
    (raw / 100.0 * 10.0).clamp(0.0, 10.0)
}

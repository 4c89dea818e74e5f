use image::DynamicImage;

use super::TextEngine;

/// Restricts another engine to a single line drawn from a fixed character set.
///
/// Each line the inner engine reports is filtered on its own and the longest
/// surviving line is kept (the first one on ties). Lowercase letters are
/// folded to uppercase before filtering, so a general engine that reads
/// `ab12` yields `AB12` under an uppercase charset.
pub struct WhitelistEngine<E> {
    inner: E,
    allowed: &'static str,
    name: String,
}

impl<E: TextEngine> WhitelistEngine<E> {
    pub fn new(inner: E, allowed: &'static str) -> Self {
        let name = format!("{} (whitelist)", inner.name());
        Self { inner, allowed, name }
    }

    fn keep_allowed(&self, line: &str) -> String {
        line.chars()
            .flat_map(char::to_uppercase)
            .filter(|c| self.allowed.contains(*c))
            .collect()
    }
}

impl<E: TextEngine> TextEngine for WhitelistEngine<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_text(&self, image: &DynamicImage) -> anyhow::Result<String> {
        let mut best = String::new();
        for line in self.inner.read_lines(image)? {
            let kept = self.keep_allowed(&line);
            if kept.len() > best.len() {
                best = kept;
            }
        }
        Ok(best)
    }

    fn read_lines(&self, image: &DynamicImage) -> anyhow::Result<Vec<String>> {
        let text = self.read_text(image)?;
        Ok(if text.is_empty() { Vec::new() } else { vec![text] })
    }
}

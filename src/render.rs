/*!
 * HTML rendering of translated documents.
 *
 * Records are grouped back into their paragraphs; each paragraph becomes a
 * `paragraph-block` holding one numbered entry per chunk. The body is then
 * dropped into a template at its single `{{content}}` placeholder.
 */

use crate::document::{TranslationRecord, WordGloss, WordParagraph, group_by_paragraph};
use crate::errors::AppError;
use crate::language_utils::is_han;

/// Placeholder replaced by the rendered body
pub const CONTENT_PLACEHOLDER: &str = "{{content}}";

/// Bundled book template
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/book.html");

const SPEAK_ICON: &str = r#"<svg viewBox="0 0 24 24" aria-hidden="true"><path d="M3 9v6h4l5 5V4L7 9H3zm13.5 3c0-1.77-1.02-3.29-2.5-4.03v8.05c1.48-.73 2.5-2.25 2.5-4.02z"/></svg>"#;

// Follow the reader's light/dark preference
const THEME_SCRIPT: &str = r#"<script>
(function () {
  var query = window.matchMedia('(prefers-color-scheme: dark)');
  function apply() { document.body.setAttribute('data-theme', query.matches ? 'dark' : 'light'); }
  apply();
  query.addEventListener('change', apply);
})();
</script>
"#;

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders translation records and word glosses to HTML
#[derive(Debug, Clone)]
pub struct Renderer {
    /// Emit the reference-language line when a record has one
    pub show_reference: bool,
    /// BCP 47 tag handed to the page's speech function
    pub speech_language: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            show_reference: true,
            speech_language: "zh-CN".to_string(),
        }
    }
}

impl Renderer {
    /// Body HTML for index-ordered records
    pub fn render(&self, records: &[TranslationRecord]) -> String {
        let mut html = String::new();
        for paragraph in group_by_paragraph(records) {
            html.push_str("<div class=\"paragraph-block\">\n");
            for record in paragraph {
                html.push_str(&self.render_entry(record));
            }
            html.push_str("</div>\n");
        }
        html
    }

    fn render_entry(&self, record: &TranslationRecord) -> String {
        let source = escape_html(&record.source_text);
        let mut html = String::from("<div class=\"sentence-part\">");

        html.push_str(&format!(
            "<div class=\"original\">{}. {}{}</div>",
            record.index + 1,
            source,
            self.speak_button(&source)
        ));

        if let Some(gloss) = record.phonetic_gloss.as_deref().filter(|g| !g.trim().is_empty()) {
            html.push_str(&format!("<div class=\"pinyin\">{}</div>", escape_html(gloss)));
        }

        if self.show_reference {
            if let Some(reference) = record
                .reference_translation
                .as_deref()
                .filter(|r| !r.trim().is_empty())
            {
                html.push_str(&format!("<div class=\"reference\">{}</div>", escape_html(reference)));
            }
        }

        match &record.error_state {
            Some(error) => html.push_str(&format!(
                "<div class=\"translation translation-error\" data-error=\"{}\">{}</div>",
                escape_html(error),
                escape_html(&record.target_translation)
            )),
            None => html.push_str(&format!(
                "<div class=\"translation\">{}</div>",
                escape_html(&record.target_translation)
            )),
        }

        html.push_str("</div>\n");
        html
    }

    // Text is already escaped
    fn speak_button(&self, escaped_text: &str) -> String {
        format!(
            "<button class=\"speak-button\" type=\"button\" data-text=\"{}\" data-lang=\"{}\" \
             onclick=\"speak(this.dataset.text, this.dataset.lang)\">{}</button>",
            escaped_text,
            escape_html(&self.speech_language),
            SPEAK_ICON
        )
    }

    /// Body HTML for the interactive word-by-word view
    pub fn render_interactive(&self, paragraphs: &[WordParagraph]) -> String {
        let mut html = String::from("<div class=\"interactive-text\">\n");

        for paragraph in paragraphs {
            html.push_str("<div class=\"paragraph-block\">\n<p class=\"interactive-paragraph\">");

            let mut previous: Option<&WordGloss> = None;
            for word in &paragraph.words {
                if previous.is_some_and(|p| needs_space(&p.word, &word.word)) {
                    html.push(' ');
                }
                html.push_str(&self.render_word(word));
                previous = Some(word);
            }
            html.push_str("</p>\n");

            if self.show_reference {
                if let Some(reference) = paragraph
                    .reference_translation
                    .as_deref()
                    .filter(|r| !r.trim().is_empty())
                {
                    html.push_str(&format!("<div class=\"reference\">{}</div>\n", escape_html(reference)));
                }
            }
            html.push_str("</div>\n");
        }

        html.push_str("</div>\n");
        html
    }

    fn render_word(&self, word: &WordGloss) -> String {
        let text = escape_html(&word.word);
        if word.meaning.trim().is_empty() {
            return format!("<span class=\"plain-word\">{}</span>", text);
        }

        let tooltip = [word.phonetic.trim(), word.meaning.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "<span class=\"interactive-word\" data-tooltip=\"{}\" data-lang=\"{}\" \
             onclick=\"speak(this.textContent, this.dataset.lang)\">{}</span>",
            escape_html(&tooltip),
            escape_html(&self.speech_language),
            text
        )
    }
}

// Latin words need a separating space; Han text and punctuation do not
fn needs_space(previous: &str, next: &str) -> bool {
    let ends_word = previous
        .chars()
        .last()
        .is_some_and(|c| c.is_alphanumeric() && !is_han(c));
    let starts_word = next
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() && !is_han(c));
    let after_punctuation = previous
        .chars()
        .last()
        .is_some_and(|c| matches!(c, ',' | '.' | '!' | '?' | ';' | ':'));

    starts_word && (ends_word || after_punctuation)
}

/// Put `body` into `template` and add the theme script.
///
/// The template must contain exactly one `{{content}}` placeholder.
pub fn render_document(template: &str, body: &str) -> Result<String, AppError> {
    match template.matches(CONTENT_PLACEHOLDER).count() {
        1 => {}
        0 => {
            return Err(AppError::Config(format!(
                "template has no {} placeholder",
                CONTENT_PLACEHOLDER
            )));
        }
        n => {
            return Err(AppError::Config(format!(
                "template has {} {} placeholders, expected one",
                n, CONTENT_PLACEHOLDER
            )));
        }
    }

    let mut html = template.replacen(CONTENT_PLACEHOLDER, body, 1);
    match html.rfind("</body>") {
        Some(pos) => html.insert_str(pos, THEME_SCRIPT),
        None => html.push_str(THEME_SCRIPT),
    }
    Ok(html)
}

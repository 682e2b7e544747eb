use ratatui::text::Line;

/// Task descriptions are written in the web editor and stored as HTML;
/// convert them to markdown for the terminal.
pub fn html_to_markdown(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let options = htmd::options::Options {
        ul_bullet_spacing: 1,
        ol_number_spacing: 1,
        ..Default::default()
    };

    let converter = htmd::HtmlToMarkdown::builder().options(options).build();

    match converter.convert(html) {
        Ok(markdown) => markdown.trim().to_string(),
        Err(e) => {
            tracing::debug!("Falling back to raw description: {}", e);
            html.to_string()
        }
    }
}

pub fn to_lines(text: &str) -> Vec<Line<'static>> {
    text.lines().map(|line| Line::from(line.to_string())).collect()
}

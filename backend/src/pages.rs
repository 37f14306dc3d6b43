use std::path::{Path, PathBuf};

pub const FLASH_SLOT: &str = "<!-- flash -->";
pub const RESULT_SLOT: &str = "<!-- result -->";

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Page {name} could not be read: {source}")]
    Missing {
        name: String,
        source: std::io::Error,
    },
}

/// Static HTML pages under `<static_dir>/pages`, with two substitution slots
/// for flash messages and prediction results.
#[derive(Clone, Debug)]
pub struct Pages {
    dir: PathBuf,
}

impl Pages {
    pub fn new(static_dir: &Path) -> Self {
        Self {
            dir: static_dir.join("pages"),
        }
    }

    pub async fn render(&self, name: &str, slots: &[(&str, &str)]) -> Result<String, PageError> {
        let path = self.dir.join(format!("{}.html", name));
        let mut html = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| PageError::Missing {
                name: name.to_string(),
                source,
            })?;
        for (slot, content) in slots {
            html = html.replace(slot, content);
        }
        Ok(html)
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

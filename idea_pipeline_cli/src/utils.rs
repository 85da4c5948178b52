use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

pub fn save_json<T: Serialize + ?Sized>(data: &T, path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    let mut file = File::create(path)?;
    file.write_all(serde_json::to_string_pretty(data)?.as_bytes())?;
    println!("✅ {} written.", path.display());
    Ok(())
}

/// Plain-text side-by-side rendering of a translated page.
pub fn bilingual_summary(content: &crate::translate::TranslatedContent) -> String {
    let mut out = String::new();
    let original = &content.original;
    out.push_str(&format!("# {}\n# {}\n\n", content.translated.title, original.title));

    for field in crate::BusinessFitField::ALL {
        let translated = content.translated.business_fit.get(&field).map(String::as_str).unwrap_or("");
        if translated.is_empty() {
            continue;
        }
        out.push_str(&format!("## {}\n{}\n\n{}\n\n", field.label(), translated, original.business_fit_text(field)));
    }

    if !original.keywords.is_empty() {
        out.push_str("## Keywords\n");
        for (keyword, name) in original.keywords.iter().zip(&content.translated.keywords) {
            out.push_str(&format!(
                "- {} ({}): {} / {:+}% ({})\n",
                name,
                keyword.name,
                keyword.volume,
                keyword.growth_percent,
                keyword.trend.as_str()
            ));
        }
    }

    if !content.metadata.failed_fields.is_empty() {
        out.push_str(&format!("\nUntranslated: {}\n", content.metadata.failed_fields.join(", ")));
    }
    out
}

pub fn save_text(content: &str, path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    println!("✅ {} written.", path.display());
    Ok(())
}

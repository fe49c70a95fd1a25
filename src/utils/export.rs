use crate::domain::model::RecommendationItem;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

const HEADER: [&str; 8] = [
    "rank",
    "program_id",
    "program_name",
    "score",
    "explanation",
    "skills",
    "course_url",
    "course_rating",
];

/// Writes the ranked list to `path` as CSV, creating parent directories.
pub fn export_recommendations<P: AsRef<Path>>(path: P, items: &[RecommendationItem]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADER)?;

    for (idx, item) in items.iter().enumerate() {
        writer.write_record([
            (idx + 1).to_string(),
            item.program_id.clone(),
            item.program_name.clone(),
            format!("{:.4}", item.score),
            item.explanation.clone(),
            item.skills.clone(),
            item.course_url.clone().unwrap_or_default(),
            item.course_rating.map(|r| r.to_string()).unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    tracing::debug!("Exported {} recommendations to {}", items.len(), path.display());
    Ok(())
}

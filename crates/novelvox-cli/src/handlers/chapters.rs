//! Chapters command handler.

use novelvox_core::ChapterInfo;

use crate::bootstrap::CliContext;
use crate::error::CliError;

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn format_row(chapter: &ChapterInfo) -> String {
    format!("{:>6}  {}", chapter.number, truncate(&chapter.title, 70))
}

/// List a novel's chapters in reading order.
pub async fn execute(ctx: &CliContext, novel: &str) -> Result<(), CliError> {
    let mut chapters = ctx.source.list_chapters(novel).await?;
    chapters.sort_by_key(|c| c.number);

    if chapters.is_empty() {
        println!("'{novel}' has no chapters.");
        return Ok(());
    }

    println!("{novel}: {} chapter(s)\n", chapters.len());
    println!("{:>6}  Title", "No.");
    println!("{}", "-".repeat(78));
    for chapter in &chapters {
        println!("{}", format_row(chapter));
    }
    println!("\nUse 'novelvox read \"{novel}\" <chapter>' to start listening.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_titles_are_truncated() {
        let title = "x".repeat(100);
        let shown = truncate(&title, 70);
        assert_eq!(shown.chars().count(), 70);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_row_aligns_number() {
        let chapter = ChapterInfo {
            number: 12,
            title: "Dawn".to_string(),
            link: "https://example.com/12".to_string(),
        };
        assert_eq!(format_row(&chapter), "    12  Dawn");
    }
}

use std::io::{self, Write};

use whatif_common::{models::Story, utils::IntoReadable as _};
use whatif_views::{
    archive::{SortMode, UniverseFilter},
    rating::{RatingControl, RatingDisplay},
    share::ShareLink,
    stats::Stats,
};

pub(crate) fn universes(out: &mut impl Write, universes: &[String]) -> io::Result<()> {
    for universe in universes {
        writeln!(out, "{}", universe)?;
    }

    Ok(())
}

pub(crate) fn list(
    out: &mut impl Write,
    stories: &[Story],
    total: usize,
    filter: &UniverseFilter,
    sort: SortMode,
) -> io::Result<()> {
    writeln!(
        out,
        "{} of {} {} ({}, {})",
        stories.len(),
        total,
        if total == 1 { "story" } else { "stories" },
        filter,
        sort.label()
    )?;

    if stories.is_empty() {
        writeln!(
            out,
            "{}",
            if total == 0 {
                "No stories yet"
            } else {
                "No matches found"
            }
        )?;
    }

    for story in stories {
        let rating = RatingDisplay::new(&story.rating);

        writeln!(
            out,
            "{:>6}  {}  {}  {:>6}w  [{}] {}",
            story.id,
            story.created_at.date(),
            rating.stars,
            story.word_count.into_readable(),
            story.universe,
            story.what_if,
        )?;
    }

    Ok(())
}

pub(crate) fn story(
    out: &mut impl Write,
    story: &Story,
    control: Option<&RatingControl>,
) -> io::Result<()> {
    let rating = RatingDisplay::new(&story.rating);

    writeln!(out, "{}", story.what_if)?;
    writeln!(
        out,
        "{} | {} | {} words",
        story.universe,
        story.created_at,
        story.word_count.into_readable()
    )?;
    writeln!(out, "{} {} ({})", rating.stars, rating.average, rating.count)?;

    if let Some(picked) = control.and_then(RatingControl::picked) {
        let n = picked.get();

        writeln!(out, "You rated: {} {}", n, if n == 1 { "star" } else { "stars" })?;
    }

    writeln!(out)?;

    for paragraph in story.paragraphs() {
        writeln!(out, "{}", paragraph)?;
        writeln!(out)?;
    }

    Ok(())
}

pub(crate) fn share_link(out: &mut impl Write, link: &ShareLink) -> io::Result<()> {
    writeln!(out, "{}", link.url)
}

pub(crate) fn stats(out: &mut impl Write, stats: &Stats) -> io::Result<()> {
    writeln!(out, "Stories crafted: {}", stats.total_stories.into_readable())?;
    writeln!(out, "Average rating:  {:.1}", stats.average_rating)?;
    writeln!(out, "Words written:   {}", stats.total_words.into_readable())?;

    if !stats.universes.is_empty() {
        writeln!(out)?;
        writeln!(out, "By universe")?;

        for universe in &stats.universes {
            writeln!(
                out,
                "  {:<24} {:>5} stories {:>9} words  {:.1}",
                universe.universe,
                universe.stories.into_readable(),
                universe.words.into_readable(),
                universe.average_rating
            )?;
        }
    }

    for (title, podium) in [("Top rated", &stats.top_rated), ("Longest", &stats.longest)] {
        if podium.is_empty() {
            continue;
        }

        writeln!(out)?;
        writeln!(out, "{}", title)?;

        for (place, story) in podium.iter().enumerate() {
            writeln!(
                out,
                "  {}. {} ({:.1}, {} words)",
                place + 1,
                story.what_if,
                story.rating.average(),
                story.word_count.into_readable()
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use whatif_common::models::{RatingSummary, StoryId};

    use super::*;

    fn sample() -> Story {
        Story {
            id: StoryId(12),
            universe: "Lord of the Rings".into(),
            what_if: "What if Boromir took the Ring?".into(),
            story: Some("He ran.\n\nGondor fell.".into()),
            word_count: 1450,
            created_at: "2024-05-05T18:00:00".parse().unwrap(),
            rating: RatingSummary::new(0.0, 0),
        }
    }

    fn text(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn story_shows_zero_for_unrated() {
        let out = text(|buf| story(buf, &sample(), None));

        assert!(out.contains("☆☆☆☆☆ 0.0 (0 ratings)"));
        assert!(out.contains("1,450 words"));
        assert!(out.contains("He ran.\n\nGondor fell.\n"));
    }

    #[test]
    fn empty_filter_result_says_so() {
        let out = text(|buf| {
            list(
                buf,
                &[],
                3,
                &UniverseFilter::Only("DC".into()),
                SortMode::Newest,
            )
        });

        assert!(out.starts_with("0 of 3 stories (DC, Newest)"));
        assert!(out.contains("No matches found"));
    }

    #[test]
    fn list_rows_carry_the_id() {
        let out = text(|buf| list(buf, &[sample()], 1, &UniverseFilter::All, SortMode::Words));

        assert!(out.contains("12  2024-05-05"));
        assert!(out.contains("[Lord of the Rings] What if Boromir took the Ring?"));
    }
}

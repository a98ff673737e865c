use std::io::{self, Write};

use drill_core::model::Preferences;
use services::StatsReport;

/// Print the statistics report as plain text.
///
/// # Errors
///
/// Returns `io::Error` if writing fails.
pub fn print_stats<W: Write>(report: &StatsReport, out: &mut W) -> io::Result<()> {
    writeln!(out, "Reviews:   {}", report.total_reviews)?;
    writeln!(out, "Correct:   {}", report.correct)?;
    writeln!(out, "Incorrect: {}", report.incorrect)?;
    writeln!(out, "Accuracy:  {:.1}%", report.accuracy)?;
    writeln!(out, "Streak:    {} day(s)", report.streak)?;

    writeln!(out, "\nBy level")?;
    for row in &report.by_level {
        writeln!(
            out,
            "  {:<12} {:>4} / {:<4} {:>5.1}%",
            row.name, row.correct, row.incorrect, row.accuracy
        )?;
    }

    if !report.by_category.is_empty() {
        writeln!(out, "\nBy category")?;
        for row in &report.by_category {
            writeln!(
                out,
                "  {:<12} {:>4} / {:<4} {:>5.1}%",
                row.name, row.correct, row.incorrect, row.accuracy
            )?;
        }
    }

    if !report.difficult_words.is_empty() {
        writeln!(out, "\nDifficult words")?;
        for word in &report.difficult_words {
            writeln!(out, "  {:<20} {}", word.german, word.misses)?;
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns `io::Error` if writing fails.
pub fn print_preferences<W: Write>(prefs: &Preferences, out: &mut W) -> io::Result<()> {
    let level = prefs.default_level().map_or("All", |l| l.as_str());
    let category = prefs.default_category().map_or("All", |c| c.as_str());
    writeln!(out, "max_cards         {}", prefs.max_cards())?;
    writeln!(out, "transition_delay  {}ms", prefs.transition_delay())?;
    writeln!(out, "dark_mode         {}", prefs.dark_mode())?;
    writeln!(out, "sound_enabled     {}", prefs.sound_enabled())?;
    writeln!(out, "keyboard_enabled  {}", prefs.keyboard_enabled())?;
    writeln!(out, "default_level     {level}")?;
    writeln!(out, "default_category  {category}")?;
    Ok(())
}

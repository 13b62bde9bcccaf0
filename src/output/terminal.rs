// Colored terminal output for price tables, topics, and headline summaries.
//
// main.rs delegates all terminal formatting here.

use colored::Colorize;

use crate::prices::series::PriceSeries;
use crate::sentiment::traits::{mean_compound, SentimentScore};
use crate::text::clean::HeadlineLength;
use crate::topics::lda::TopicModel;

/// Display the last `rows` rows of a price series.
pub fn display_price_tail(series: &PriceSeries, rows: usize) {
    println!(
        "\n{}",
        format!("=== {} ({} rows) ===", series.ticker(), series.len()).bold()
    );
    if series.is_empty() {
        println!("  No rows.");
        return;
    }

    let names = series.column_names();
    let header: Vec<String> = names.iter().map(|n| format!("{n:>12}")).collect();
    println!("  {:<10} {}", "Date".dimmed(), header.join(" ").dimmed());
    println!("  {}", "-".repeat(11 + 13 * names.len()).dimmed());

    for (date, values) in series.tail(rows) {
        let cells: Vec<String> = values
            .iter()
            .map(|v| match v {
                Some(x) => format!("{x:>12.4}"),
                None => format!("{:>12}", "-"),
            })
            .collect();
        println!("  {:<10} {}", date.format("%Y-%m-%d"), cells.join(" "));
    }
}

/// Display each topic with its heaviest terms.
pub fn display_topics(model: &TopicModel, num_words: usize) {
    println!(
        "\n{}",
        format!("=== Topics ({}) ===", model.num_topics()).bold()
    );
    println!(
        "{}",
        format!("  vocabulary: {} terms", model.vocabulary_size()).dimmed()
    );
    for k in 0..model.num_topics() {
        let terms: Vec<String> = model
            .top_terms(k, num_words)
            .iter()
            .map(|t| format!("{} {}", t.term, format!("({:.3})", t.weight).dimmed()))
            .collect();
        println!("  {} {}", format!("Topic {k}:").bold(), terms.join(", "));
    }
}

/// Display per-headline sentiment plus the batch mean.
pub fn display_sentiment(texts: &[Option<String>], scores: &[SentimentScore]) {
    println!(
        "\n{}",
        format!("=== Sentiment ({} headlines) ===", scores.len()).bold()
    );
    println!(
        "  {:>8} {:>6} {:>6} {:>6}  {}",
        "Compound".dimmed(),
        "Pos".dimmed(),
        "Neg".dimmed(),
        "Neu".dimmed(),
        "Headline".dimmed(),
    );
    println!("  {}", "-".repeat(90).dimmed());

    for (text, score) in texts.iter().zip(scores) {
        let preview = super::truncate_chars(text.as_deref().unwrap_or(""), 60);
        println!(
            "  {} {:>6.3} {:>6.3} {:>6.3}  {}",
            colorize_compound(score.compound),
            score.positive,
            score.negative,
            score.neutral,
            preview,
        );
    }

    if let Some(mean) = mean_compound(scores) {
        println!("\n  Mean compound: {}", colorize_compound(mean));
    }
}

/// Display a ranked publisher-domain frequency table.
pub fn display_publishers(counts: &[(String, usize)]) {
    if counts.is_empty() {
        println!("No publishers found.");
        return;
    }
    println!("\n{}", "=== Publisher Domains ===".bold());
    for (i, (domain, count)) in counts.iter().enumerate() {
        println!("  {:>4}. {:<40} {:>6}", i + 1, domain, count);
    }
}

/// Display mean and max headline lengths.
pub fn display_headline_summary(lengths: &[HeadlineLength]) {
    println!(
        "\n{}",
        format!("=== Headline Lengths ({} headlines) ===", lengths.len()).bold()
    );
    if lengths.is_empty() {
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = lengths.len() as f64;
    let mean_chars = lengths.iter().map(|l| l.chars).sum::<usize>() as f64 / n;
    let mean_tokens = lengths.iter().map(|l| l.tokens).sum::<usize>() as f64 / n;
    let max_chars = lengths.iter().map(|l| l.chars).max().unwrap_or(0);
    let max_tokens = lengths.iter().map(|l| l.tokens).max().unwrap_or(0);
    println!("  Characters: mean {mean_chars:.1}, max {max_chars}");
    println!("  Tokens:     mean {mean_tokens:.1}, max {max_tokens}");
}

/// Colorize a compound polarity score.
fn colorize_compound(compound: f64) -> colored::ColoredString {
    let text = format!("{compound:>8.3}");
    if compound >= 0.05 {
        text.green()
    } else if compound <= -0.05 {
        text.red()
    } else {
        text.normal()
    }
}

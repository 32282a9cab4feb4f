use anyhow::Result;
use serde_json::json;

use n5lab_lib::srs::{ReviewOutcome, SessionTally};

use crate::app::{warn_unsaved, App};
use crate::OutputFormat;

/// Parse a `card=know` / `card=dont-know` pair
pub fn parse_answer(raw: &str) -> Result<(String, ReviewOutcome), String> {
    let (card, outcome) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected <card>=<know|dont-know>, got {}", raw))?;
    if card.is_empty() {
        return Err(format!("missing card id in {}", raw));
    }
    Ok((card.to_string(), outcome.parse()?))
}

pub fn run_due(
    app: &App,
    cards: &[String],
    limit: Option<usize>,
    format: &OutputFormat,
) -> Result<()> {
    let scheduler = &app.core.scheduler;
    let limit = limit.unwrap_or(scheduler.config().session_size);
    let due = scheduler.get_due_cards(cards, limit);

    match format {
        OutputFormat::Json => {
            let output = json!({
                "due": due,
                "dueTotal": scheduler.due_count(cards),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if due.is_empty() {
                println!("Nothing to review");
                return Ok(());
            }
            for card in &due {
                let marker = if scheduler.get_card_stats(card).is_some() { " " } else { "*" };
                println!("{} {}", marker, card);
            }
            println!("\n{} due in total (* = new)", scheduler.due_count(cards));
        }
    }

    Ok(())
}

pub fn run_answer(
    app: &mut App,
    card: &str,
    outcome: ReviewOutcome,
    format: &OutputFormat,
) -> Result<()> {
    let scheduler = &mut app.core.scheduler;
    warn_unsaved(scheduler.record_response(card, outcome));

    // record_response always leaves a record behind, saved or not
    let Some(record) = scheduler.get_card_stats(card) else {
        return Ok(());
    };

    match format {
        OutputFormat::Json => {
            let output = json!({ "card": card, "record": record });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "{}: {} -> next review in {} day(s) ({})",
                card,
                outcome,
                record.interval,
                record.next_review.format("%Y-%m-%d")
            );
        }
    }

    Ok(())
}

/// Record a batch of answers as one session and award the session XP
pub fn run_session(
    app: &mut App,
    answers: &[(String, ReviewOutcome)],
    format: &OutputFormat,
) -> Result<()> {
    let mut tally = SessionTally::default();
    for (card, outcome) in answers {
        warn_unsaved(app.core.scheduler.record_response(card, *outcome));
        tally.record(*outcome);
    }

    let xp = tally.xp_earned(app.core.progression.rewards());
    if xp > 0 {
        warn_unsaved(app.core.progression.award_xp(xp));
    }

    match format {
        OutputFormat::Json => {
            let output = json!({
                "tally": tally,
                "perfect": tally.is_perfect(),
                "xpEarned": xp,
                "xp": app.core.progression.profile().xp,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "Reviewed {} card(s): {} known, {} to practise",
                tally.answered(),
                tally.known,
                tally.unknown
            );
            if tally.is_perfect() {
                println!("Perfect session!");
            }
            println!("+{} XP", xp);
        }
    }

    Ok(())
}

pub fn run_card(app: &App, card: &str, format: &OutputFormat) -> Result<()> {
    let record = app.core.scheduler.get_card_stats(card);

    match format {
        OutputFormat::Json => {
            let output = json!({ "card": card, "record": record });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => match record {
            None => println!("{}: never reviewed", card),
            Some(record) => {
                println!("{}", card);
                println!("  Seen: {} time(s)", record.total_seen);
                println!("  Repetitions: {}", record.repetitions);
                println!("  Ease factor: {:.2}", record.ease_factor);
                println!("  Interval: {} day(s)", record.interval);
                println!("  Last seen: {}", record.last_seen.format("%Y-%m-%d %H:%M"));
                println!("  Next review: {}", record.next_review.format("%Y-%m-%d %H:%M"));
            }
        },
    }

    Ok(())
}

pub fn run_deck(app: &App, cards: &[String], format: &OutputFormat) -> Result<()> {
    let scheduler = &app.core.scheduler;
    let stats = scheduler.deck_stats(cards);
    let mastery = scheduler.mastery_rate(cards);

    match format {
        OutputFormat::Json => {
            let output = json!({ "stats": stats, "masteryRate": mastery });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Cards: {}", stats.total_cards);
            println!("  New: {}", stats.new_cards);
            println!("  Learning: {}", stats.learning_cards);
            println!("  Mastered: {} ({:.0}%)", stats.mastered_cards, mastery * 100.0);
            println!("  Due: {}", stats.due_cards);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert_eq!(
            parse_answer("hira_a=know").unwrap(),
            ("hira_a".to_string(), ReviewOutcome::Know)
        );
        assert_eq!(
            parse_answer("vocab=x=dont-know").unwrap(),
            ("vocab=x".to_string(), ReviewOutcome::DontKnow)
        );
        assert!(parse_answer("hira_a").is_err());
        assert!(parse_answer("=know").is_err());
        assert!(parse_answer("hira_a=maybe").is_err());
    }
}

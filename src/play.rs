use std::{
    io::{self, BufRead, Write},
    thread,
    time::Instant,
};

use anyhow::{Context, Result, bail};
use rand::rngs::StdRng;

use etet::data::{MemorySymbol, QuizQuestion, TriviaQuestion};
use etet::game::{
    self, GameError,
    memory::{Face, FlipOutcome, MemoryGame},
    quiz::Quiz,
    trivia::Trivia,
};

type Lines<'a> = io::Lines<io::StdinLock<'a>>;

fn ask(lines: &mut Lines<'_>, prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    lines
        .next()
        .transpose()
        .with_context(|| "could not read from stdin")
}

pub fn quiz(questions: &[QuizQuestion], count: usize, rng: &mut StdRng, json: bool) -> Result<()> {
    let mut quiz = Quiz::new(questions);
    quiz.start(count, rng)?;
    let mut lines = io::stdin().lock().lines();

    while let Some(question) = quiz.current_question() {
        let (answered, total) = quiz.progress();
        println!(
            "\nQuestion {}/{} [{}, {} pts]",
            answered + 1,
            total,
            question.category.label(),
            question.points
        );
        println!("{}", question.prompt);
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}) {}", i + 1, option);
        }

        let Some(line) = ask(&mut lines, "Your answer: ")? else {
            bail!("quiz aborted");
        };
        let choice = match line.trim().parse::<usize>() {
            Ok(n) if (1..=question.options.len()).contains(&n) => n - 1,
            _ => {
                println!("Please enter a number from 1 to {}", question.options.len());
                continue;
            }
        };

        let outcome = quiz.submit_answer(choice)?;
        if outcome.correct {
            println!("Correct! +{} points", outcome.points_awarded);
        } else {
            println!(
                "Not quite. The answer was: {}",
                question.options[outcome.correct_index]
            );
        }
        if !question.explanation.is_empty() {
            println!("{}", question.explanation);
        }
    }

    let result = quiz.result().context("quiz ended before the last question")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "\n{} / {} points ({}%): {}",
            result.final_score, result.max_possible_score, result.percentage, result.grade
        );
    }
    Ok(())
}

pub fn trivia(questions: &[TriviaQuestion], json: bool) -> Result<()> {
    let mut trivia = Trivia::new(questions);
    trivia.start()?;
    let mut lines = io::stdin().lock().lines();

    while let Some(question) = trivia.current_question() {
        println!(
            "\n{} ({} s, {} pts)",
            question.prompt, question.time_limit_seconds, question.points
        );

        let started = Instant::now();
        let Some(answer) = ask(&mut lines, "> ")? else {
            bail!("trivia aborted");
        };

        let mut timed_out = None;
        for _ in 0..started.elapsed().as_secs() {
            if let Some(outcome) = trivia.tick()? {
                timed_out = Some(outcome);
                break;
            }
        }

        let outcome = match timed_out {
            Some(outcome) => outcome,
            None => trivia.submit_answer(&answer)?,
        };
        if outcome.timed_out {
            println!("Time's up! The answer was: {}", outcome.expected_answer);
        } else if outcome.correct {
            println!("Correct! +{} points", outcome.points_awarded);
        } else {
            println!("Wrong. The answer was: {}", outcome.expected_answer);
        }
        thread::sleep(game::trivia_reveal_delay());
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "score": trivia.score(),
                "max_possible_score": trivia.max_possible_score(),
            })
        );
    } else {
        println!(
            "\nFinal score: {} / {}",
            trivia.score(),
            trivia.max_possible_score()
        );
    }
    Ok(())
}

fn print_board(game: &MemoryGame) {
    for (row, cards) in game.cards().chunks(4).enumerate() {
        let cells: Vec<String> = cards
            .iter()
            .enumerate()
            .map(|(col, card)| {
                let number = row * 4 + col + 1;
                match card.face {
                    Face::Hidden => format!("{number:>2}: {:<8}", "?"),
                    Face::Revealed => format!("{number:>2}: {:<8}", card.symbol.name),
                    Face::Matched => {
                        format!("{number:>2}: {:<8}", format!("*{}", card.symbol.name))
                    }
                }
            })
            .collect();
        println!("{}", cells.join("  "));
    }
}

pub fn memory(symbols: &[MemorySymbol], rng: &mut StdRng, json: bool) -> Result<()> {
    let mut game = MemoryGame::new(symbols, rng)?;
    let mut lines = io::stdin().lock().lines();

    while game.state() == game::GameState::InProgress {
        print_board(&game);
        let Some(line) = ask(&mut lines, "Card: ")? else {
            bail!("memory game aborted");
        };
        let Ok(number) = line.trim().parse::<usize>() else {
            println!("Please enter a card number");
            continue;
        };

        match game.flip(number.wrapping_sub(1)) {
            Ok(FlipOutcome::Revealed) => {}
            Ok(FlipOutcome::Matched) => println!("Match! ({} moves)", game.moves()),
            Ok(FlipOutcome::Mismatched) => {
                print_board(&game);
                println!("No match.");
                thread::sleep(game::memory_flip_back_delay());
                game.hide_mismatched();
            }
            Err(GameError::InvalidArgument(message)) => println!("{message}"),
            Err(e) => return Err(e.into()),
        }
    }

    let efficiency = game.efficiency().unwrap_or_default();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "pairs": game.pair_count(),
                "moves": game.moves(),
                "efficiency": efficiency,
            })
        );
    } else {
        println!(
            "\nAll {} pairs found in {} moves ({}% efficiency)",
            game.pair_count(),
            game.moves(),
            efficiency
        );
    }
    Ok(())
}

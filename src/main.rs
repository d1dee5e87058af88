use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use etet::Fixtures;
use etet::contact::{self, ContactFormSubmission, ContactReason, LogTransport, Relationship};
use etet::data::{self, DataError, LocationType, TimelineCategory};
use etet::gallery::{self, CategoryFilter, Media};
use etet::game;

mod play;

#[derive(Parser)]
#[command(version = env!("LONG_VERSION"), about, long_about = None)]
struct Cli {
    /// Directory holding the fixture TOML files; defaults to the embedded set.
    #[arg(long, global = true, env = "ETET_DATA")]
    data: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Stats {
        /// Compute ages as of this year instead of the current one.
        #[arg(short = 'y', long)]
        year: Option<i32>,
    },

    Person {
        id: String,
    },

    Generations,

    Gallery {
        #[arg(short = 'c', long, default_value = "all")]
        category: CategoryFilter,

        #[arg(short = 's', long, default_value = "")]
        search: String,

        #[arg(long)]
        videos: bool,

        #[arg(long)]
        featured: bool,

        /// Lay results out in masonry columns.
        #[arg(long, conflicts_with = "width")]
        columns: Option<usize>,

        /// Pick the column count for a viewport width in pixels.
        #[arg(long)]
        width: Option<u32>,
    },

    Map {
        #[arg(short = 't', long = "type")]
        kind: Option<LocationType>,

        #[arg(short = 'm', long)]
        member: Option<String>,

        #[arg(long)]
        stats: bool,
    },

    Timeline {
        #[arg(short = 'c', long)]
        category: Option<TimelineCategory>,
    },

    Quiz {
        #[arg(short = 'n', long)]
        count: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,
    },

    Trivia,

    Memory {
        #[arg(long)]
        seed: Option<u64>,
    },

    Contact {
        #[arg(long, default_value = "general")]
        reason: ContactReason,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long, default_value = "other")]
        relationship: Relationship,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        message: String,
    },

    Schema {
        #[arg(value_enum)]
        kind: SchemaKind,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchemaKind {
    Family,
    Gallery,
    Locations,
    Quiz,
    Trivia,
    Memory,
    Timeline,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "etet=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Cli::parse();
    let json = args.json;

    if let Commands::Schema { kind } = args.command {
        return print_json(&schema(kind)).with_context(|| "could not run `schema`");
    }

    let fixtures = load_fixtures(args.data.as_deref())?;

    match args.command {
        Commands::Stats { year } => {
            stats(&fixtures, year, json).with_context(|| "could not run `stats`")
        }

        Commands::Person { id } => {
            person(&fixtures, &id, json).with_context(|| "could not run `person`")
        }

        Commands::Generations => {
            generations(&fixtures, json).with_context(|| "could not run `generations`")
        }

        Commands::Gallery {
            category,
            search,
            videos,
            featured,
            columns,
            width,
        } => {
            let columns = columns.or(width.map(gallery::columns_for_width));
            let options = GalleryOptions {
                category,
                search: &search,
                featured,
                columns,
                json,
            };
            let shown = if videos {
                show_media(&fixtures.gallery().videos, options)
            } else {
                show_media(&fixtures.gallery().photos, options)
            };
            shown.with_context(|| "could not run `gallery`")
        }

        Commands::Map { kind, member, stats } => {
            map(&fixtures, kind, member.as_deref(), stats, json)
                .with_context(|| "could not run `map`")
        }

        Commands::Timeline { category } => {
            timeline(&fixtures, category, json).with_context(|| "could not run `timeline`")
        }

        Commands::Quiz { count, seed } => {
            let count = count.unwrap_or_else(game::default_quiz_length);
            play::quiz(fixtures.quiz_questions(), count, &mut rng(seed), json)
                .with_context(|| "could not run `quiz`")
        }

        Commands::Trivia => play::trivia(fixtures.trivia_questions(), json)
            .with_context(|| "could not run `trivia`"),

        Commands::Memory { seed } => play::memory(fixtures.memory_symbols(), &mut rng(seed), json)
            .with_context(|| "could not run `memory`"),

        Commands::Contact {
            reason,
            name,
            email,
            phone,
            relationship,
            subject,
            message,
        } => {
            let submission = ContactFormSubmission {
                reason,
                name,
                email,
                phone,
                relationship,
                subject,
                message,
            };
            let response = contact::submit(&submission, &LogTransport)
                .with_context(|| "could not run `contact`")?;
            if json {
                print_json(&response)
            } else {
                println!("{}\n{}", response.title, response.body);
                Ok(())
            }
        }

        Commands::Schema { .. } => unreachable!("handled before loading fixtures"),
    }
}

fn load_fixtures(dir: Option<&Path>) -> Result<Fixtures> {
    let loaded = match dir {
        Some(dir) => {
            debug!(?dir, "loading fixtures from disk");
            Fixtures::open(dir)
        }
        None => Fixtures::embedded(),
    };

    match loaded {
        Ok(fixtures) => Ok(fixtures),
        Err(DataError::Validation(e)) => {
            eprintln!("{:?}", miette::Report::new(e));
            bail!("fixture validation failed")
        }
        Err(e) => Err(e).with_context(|| "could not load fixtures"),
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn schema(kind: SchemaKind) -> schemars::Schema {
    match kind {
        SchemaKind::Family => schemars::schema_for!(data::FamilyTree),
        SchemaKind::Gallery => schemars::schema_for!(data::Gallery),
        SchemaKind::Locations => schemars::schema_for!(data::FamilyMap),
        SchemaKind::Quiz => schemars::schema_for!(data::QuizBank),
        SchemaKind::Trivia => schemars::schema_for!(data::TriviaSet),
        SchemaKind::Memory => schemars::schema_for!(data::MemoryDeck),
        SchemaKind::Timeline => schemars::schema_for!(data::Timeline),
    }
}

fn stats(fixtures: &Fixtures, year: Option<i32>, json: bool) -> Result<()> {
    let family = fixtures.family();
    let stats = match year {
        Some(year) => family.family_statistics_at(year),
        None => family.family_statistics(),
    };
    if json {
        return print_json(&stats);
    }

    println!("{}", family.name);
    println!("----------------------");
    println!("Members:            {}", stats.total_members);
    println!("Living:             {}", stats.living_members);
    println!("Generations:        {}", stats.generation_count);
    println!("Countries:          {}", stats.distinct_country_count);
    match stats.average_age_of_living {
        Some(age) => println!("Average living age: {age}"),
        None => println!("Average living age: -"),
    }
    Ok(())
}

fn person(fixtures: &Fixtures, id: &str, json: bool) -> Result<()> {
    let family = fixtures.family();
    let person = family.find_person_by_id(id)?;
    let relatives = family.relatives(id)?;
    let locations = fixtures.map().locations_by_member(id);
    if json {
        return print_json(&serde_json::json!({
            "person": person,
            "relatives": relatives,
            "locations": locations,
        }));
    }

    let names = |persons: &[&data::Person]| {
        persons
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!("{} ({})", person.name, person.role);
    match person.death_date {
        Some(death) => println!("{} - {}", person.birth_date, death),
        None => println!("Born {}", person.birth_date),
    }
    println!("{}", person.location);
    if !person.bio.is_empty() {
        println!("\n{}", person.bio);
    }
    if let Some(spouse) = relatives.spouse {
        println!("\nSpouse:   {}", spouse.name);
    }
    if !relatives.parents.is_empty() {
        println!("Parents:  {}", names(&relatives.parents));
    }
    if !relatives.children.is_empty() {
        println!("Children: {}", names(&relatives.children));
    }
    for location in locations {
        println!("Place:    {} ({}, {})", location.name, location.kind, location.year);
    }
    Ok(())
}

fn generations(fixtures: &Fixtures, json: bool) -> Result<()> {
    let summaries = fixtures.family().generation_summaries();
    if json {
        return print_json(&summaries);
    }

    for summary in summaries {
        println!(
            "Generation {}: {} members, {}",
            summary.generation_number, summary.member_count, summary.year_range_label
        );
    }
    Ok(())
}

struct GalleryOptions<'a> {
    category: CategoryFilter,
    search: &'a str,
    featured: bool,
    columns: Option<usize>,
    json: bool,
}

fn show_media<M: Media + Serialize>(items: &[M], options: GalleryOptions<'_>) -> Result<()> {
    let mut filtered = gallery::filter_media(items, options.category, options.search);
    if options.featured {
        filtered.retain(|m| m.is_featured());
    }

    match options.columns {
        Some(count) => {
            let columns = gallery::build_masonry_columns(&filtered, count)?;
            if options.json {
                return print_json(&columns);
            }
            for (i, column) in columns.iter().enumerate() {
                println!("Column {}:", i + 1);
                for item in column {
                    println!("  {:>3}  {}", item.id(), item.title());
                }
            }
        }
        None => {
            if options.json {
                return print_json(&filtered);
            }
            for item in &filtered {
                println!(
                    "{:>3}  {}  [{}] {}",
                    item.id(),
                    item.date(),
                    item.category().label(),
                    item.title()
                );
            }
        }
    }
    Ok(())
}

fn map(
    fixtures: &Fixtures,
    kind: Option<LocationType>,
    member: Option<&str>,
    stats: bool,
    json: bool,
) -> Result<()> {
    let family_map = fixtures.map();
    let mut locations: Vec<&data::MapLocation> = match kind {
        Some(kind) => family_map.locations_by_type(kind),
        None => family_map.locations.iter().collect(),
    };
    if let Some(member) = member {
        let visited = family_map.locations_by_member(member);
        locations.retain(|l| visited.iter().any(|v| v.id == l.id));
    }

    if stats {
        let stats = etet::map::location_statistics(locations.iter().copied());
        if json {
            return print_json(&stats);
        }
        println!("Locations: {}", stats.total_locations);
        for (kind, count) in &stats.counts_by_type {
            println!("  {:<18} {count}", kind.as_str());
        }
        println!("Members:   {}", stats.distinct_member_count);
        if let (Some(first), Some(last)) = (stats.earliest_year, stats.latest_year) {
            println!("Years:     {first}-{last}");
        }
        return Ok(());
    }

    if json {
        return print_json(&locations);
    }
    for location in locations {
        let position = location.screen_position()?;
        println!(
            "{:<20} {:<18} {}  ({:.1}%, {:.1}%)",
            location.id,
            location.kind.as_str(),
            location.year,
            position.x_percent,
            position.y_percent
        );
    }
    Ok(())
}

fn timeline(fixtures: &Fixtures, category: Option<TimelineCategory>, json: bool) -> Result<()> {
    let timeline = fixtures.timeline();
    let events = match category {
        Some(category) => timeline.events_in_category(category),
        None => timeline.chronological(),
    };
    if json {
        return print_json(&events);
    }

    for event in events {
        println!("{}  {:<12} {}", event.year, event.category.label(), event.title);
        for achievement in &event.achievements {
            println!("        - {achievement}");
        }
    }
    Ok(())
}
